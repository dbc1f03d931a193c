//! Similarity scoring — pluggable, trait-based scorer comparing two texts.
//!
//! Default: `EmbeddingScorer` (local sentence-embedding model via fastembed).
//! The model is loaded once per process and used read-only afterwards.
//!
//! `AppState` holds an `Arc<dyn SimilarityScorer>`, so handlers and tests never
//! depend on the concrete backend.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Failed to load embedding model {model}: {message}")]
    ModelLoad { model: String, message: String },

    #[error("Embedding inference failed: {0}")]
    Inference(String),

    #[error("Embedding task failed: {0}")]
    Task(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Scores how semantically close two texts are, as a percentage in `[0, 100]`
/// rounded to two decimals.
#[async_trait]
pub trait SimilarityScorer: Send + Sync {
    async fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64, EmbeddingError>;
}

// ────────────────────────────────────────────────────────────────────────────
// EmbeddingScorer
// ────────────────────────────────────────────────────────────────────────────

/// Cosine similarity of sentence embeddings.
///
/// `TextEmbedding::embed` needs `&mut self`, so inference is serialised behind a
/// mutex and run on the blocking pool.
pub struct EmbeddingScorer {
    model: EmbeddingModel,
    embedder: OnceCell<Arc<Mutex<TextEmbedding>>>,
}

impl EmbeddingScorer {
    /// Creates the scorer without loading the model; see `warm_up`.
    pub fn new(model: EmbeddingModel) -> Self {
        Self {
            model,
            embedder: OnceCell::new(),
        }
    }

    /// Loads the model now instead of on the first request.
    pub async fn warm_up(&self) -> Result<(), EmbeddingError> {
        self.embedder().await.map(|_| ())
    }

    async fn embedder(&self) -> Result<Arc<Mutex<TextEmbedding>>, EmbeddingError> {
        self.embedder
            .get_or_try_init(|| async {
                let model = self.model.clone();
                let model_name = format!("{model:?}");
                info!("Loading embedding model {model_name}...");

                let embedder = tokio::task::spawn_blocking(move || {
                    TextEmbedding::try_new(
                        InitOptions::new(model).with_show_download_progress(false),
                    )
                })
                .await
                .map_err(|e| EmbeddingError::Task(e.to_string()))?
                .map_err(|e| EmbeddingError::ModelLoad {
                    model: model_name.clone(),
                    message: e.to_string(),
                })?;

                info!("Embedding model {model_name} ready");
                Ok::<_, EmbeddingError>(Arc::new(Mutex::new(embedder)))
            })
            .await
            .cloned()
    }
}

#[async_trait]
impl SimilarityScorer for EmbeddingScorer {
    async fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64, EmbeddingError> {
        let embedder = self.embedder().await?;
        let texts = vec![text_a.to_owned(), text_b.to_owned()];

        let vectors = tokio::task::spawn_blocking(move || {
            let mut embedder = lock_recovering(&embedder);
            embedder
                .embed(texts, None)
                .map_err(|e| EmbeddingError::Inference(e.to_string()))
        })
        .await
        .map_err(|e| EmbeddingError::Task(e.to_string()))??;

        let [first, second] = vectors.as_slice() else {
            return Err(EmbeddingError::Inference(format!(
                "expected 2 embeddings, got {}",
                vectors.len()
            )));
        };

        let score = to_percentage(cosine_similarity(first, second));
        debug!(
            "Similarity {score} ({} chars vs {} chars)",
            text_a.chars().count(),
            text_b.chars().count()
        );
        Ok(score)
    }
}

/// Locks the model even if a previous inference panicked while holding it.
/// The poison flag is ignored; the ONNX session holds no per-call state.
fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Resolves a configured model code to a fastembed model.
///
/// Accepts the full code (`Xenova/all-mpnet-base-v2`) or just the name after
/// the last `/` (`all-mpnet-base-v2`, `sentence-transformers/all-mpnet-base-v2`).
pub fn resolve_model(code: &str) -> Option<EmbeddingModel> {
    let code = code.trim();
    let supported = TextEmbedding::list_supported_models();

    supported
        .iter()
        .find(|info| info.model_code.eq_ignore_ascii_case(code))
        .or_else(|| {
            let wanted = short_name(code);
            supported
                .iter()
                .find(|info| short_name(&info.model_code).eq_ignore_ascii_case(wanted))
        })
        .map(|info| info.model.clone())
}

fn short_name(code: &str) -> &str {
    code.rsplit('/').next().unwrap_or(code)
}

// ────────────────────────────────────────────────────────────────────────────
// Vector math
// ────────────────────────────────────────────────────────────────────────────

/// Cosine similarity in `[-1, 1]`. Zero-norm or mismatched vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Scales a cosine to a percentage clamped to `[0, 100]`, two decimals.
pub fn to_percentage(cosine: f64) -> f64 {
    round2((cosine * 100.0).clamp(0.0, 100.0))
}

/// Two-decimal rounding, ties away from zero (`0.125` → `0.13`).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
