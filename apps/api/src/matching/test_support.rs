//! Deterministic scorers for tests that must not download a model.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::matching::similarity::{round2, EmbeddingError, SimilarityScorer};

/// Always returns the same score and records what it was asked to compare.
pub struct FixedScorer {
    pub score: f64,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FixedScorer {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SimilarityScorer for FixedScorer {
    async fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64, EmbeddingError> {
        self.calls
            .lock()
            .unwrap()
            .push((text_a.to_string(), text_b.to_string()));
        Ok(self.score)
    }
}

/// Jaccard overlap of lowercase words, as a percentage.
pub struct WordOverlapScorer;

#[async_trait]
impl SimilarityScorer for WordOverlapScorer {
    async fn similarity(&self, text_a: &str, text_b: &str) -> Result<f64, EmbeddingError> {
        let words = |text: &str| -> HashSet<String> {
            text.split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
                .map(str::to_lowercase)
                .collect()
        };
        let (a, b) = (words(text_a), words(text_b));
        let union = a.union(&b).count();
        if union == 0 {
            return Ok(0.0);
        }
        let shared = a.intersection(&b).count();
        Ok(round2(shared as f64 / union as f64 * 100.0))
    }
}

/// Fails every call, standing in for a broken model.
pub struct FailingScorer;

#[async_trait]
impl SimilarityScorer for FailingScorer {
    async fn similarity(&self, _text_a: &str, _text_b: &str) -> Result<f64, EmbeddingError> {
        Err(EmbeddingError::Inference("model unavailable".to_string()))
    }
}
