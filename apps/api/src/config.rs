use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// fastembed model code, e.g. `all-mpnet-base-v2` or `Xenova/all-mpnet-base-v2`.
    pub embedding_model: String,
    pub max_upload_bytes: usize,
}

pub const DEFAULT_EMBEDDING_MODEL: &str = "all-mpnet-base-v2";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let port: u16 = parse_env("MATCHER_TEST_UNSET_PORT", 8000).unwrap();
        assert_eq!(port, 8000);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("MATCHER_TEST_BAD_LIMIT", "ten megabytes");
        let limit: Result<usize> = parse_env("MATCHER_TEST_BAD_LIMIT", 1);
        assert!(limit.is_err());
    }

    #[test]
    fn test_parse_env_trims_value() {
        std::env::set_var("MATCHER_TEST_PORT", " 9090 ");
        let port: u16 = parse_env("MATCHER_TEST_PORT", 8000).unwrap();
        assert_eq!(port, 9090);
    }
}
