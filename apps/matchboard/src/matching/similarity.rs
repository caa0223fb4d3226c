//! Similarity Providers: pluggable, trait-based text similarity in [0, 1].
//!
//! Default: `LexicalSimilarity` (term-frequency cosine, offline and deterministic).
//! Optional: `EmbeddingSimilarity` (sentence embeddings from a remote endpoint).
//!
//! `AppState` holds an `Arc<dyn SimilarityProvider>` built once at startup.
//! A batch run wraps it in `BatchSimilarityCache` so repeated pairs are computed once.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::embedding_client::{EmbeddingClient, EmbeddingError};

#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("embedding request failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("embedding dimensions differ ({left} vs {right})")]
    DimensionMismatch { left: usize, right: usize },
}

/// Maps a pair of texts to a similarity in [0, 1].
///
/// Implementations must be symmetric (`similarity(a, b) == similarity(b, a)`)
/// and deterministic for a fixed backend. Blank input scores 0.0.
#[async_trait]
pub trait SimilarityProvider: Send + Sync {
    async fn similarity(&self, a: &str, b: &str) -> Result<f64, SimilarityError>;

    /// Short backend label reported alongside results.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// LexicalSimilarity: default backend
// ────────────────────────────────────────────────────────────────────────────

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9+#]+").expect("token pattern is a valid regex"));

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "is", "it", "of", "on",
    "or", "our", "that", "the", "to", "we", "will", "with", "you", "your",
];

/// Cosine similarity over lowercase term-frequency vectors, stop words removed.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalSimilarity;

impl LexicalSimilarity {
    /// Sorted map so the dot product is summed in the same order for (a, b) and (b, a).
    fn term_frequencies(text: &str) -> BTreeMap<String, f64> {
        let lowered = text.to_lowercase();
        let mut tf = BTreeMap::new();
        for token in TOKEN.find_iter(&lowered) {
            let token = token.as_str();
            if STOP_WORDS.contains(&token) {
                continue;
            }
            *tf.entry(token.to_string()).or_insert(0.0) += 1.0;
        }
        tf
    }

    pub fn score(a: &str, b: &str) -> f64 {
        let tf_a = Self::term_frequencies(a);
        let tf_b = Self::term_frequencies(b);
        if tf_a.is_empty() || tf_b.is_empty() {
            return 0.0;
        }

        let dot: f64 = tf_a
            .iter()
            .filter_map(|(term, wa)| tf_b.get(term).map(|wb| wa * wb))
            .sum();
        let norm_a = tf_a.values().map(|w| w * w).sum::<f64>().sqrt();
        let norm_b = tf_b.values().map(|w| w * w).sum::<f64>().sqrt();

        (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
    }
}

#[async_trait]
impl SimilarityProvider for LexicalSimilarity {
    async fn similarity(&self, a: &str, b: &str) -> Result<f64, SimilarityError> {
        Ok(Self::score(a, b))
    }

    fn backend(&self) -> &'static str {
        "lexical"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// EmbeddingSimilarity: sentence-embedding backend
// ────────────────────────────────────────────────────────────────────────────

/// Cosine similarity of remote sentence embeddings, clamped to [0, 1].
pub struct EmbeddingSimilarity {
    client: EmbeddingClient,
}

impl EmbeddingSimilarity {
    pub fn new(client: EmbeddingClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SimilarityProvider for EmbeddingSimilarity {
    async fn similarity(&self, a: &str, b: &str) -> Result<f64, SimilarityError> {
        if a.trim().is_empty() || b.trim().is_empty() {
            return Ok(0.0);
        }

        let vectors = self.client.embed(&[a, b]).await?;
        match vectors.as_slice() {
            [left, right] => cosine_similarity(left, right),
            other => Err(SimilarityError::Embedding(EmbeddingError::Malformed(format!(
                "expected 2 embeddings, got {}",
                other.len()
            )))),
        }
    }

    fn backend(&self) -> &'static str {
        "embedding"
    }
}

/// Cosine of two dense vectors clamped to [0, 1]. Zero vectors score 0.0.
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> Result<f64, SimilarityError> {
    if left.len() != right.len() {
        return Err(SimilarityError::DimensionMismatch {
            left: left.len(),
            right: right.len(),
        });
    }

    let mut dot = 0.0_f64;
    let mut norm_l = 0.0_f64;
    let mut norm_r = 0.0_f64;
    for (l, r) in left.iter().zip(right) {
        let (l, r) = (*l as f64, *r as f64);
        dot += l * r;
        norm_l += l * l;
        norm_r += r * r;
    }

    if norm_l == 0.0 || norm_r == 0.0 {
        return Ok(0.0);
    }
    Ok((dot / (norm_l.sqrt() * norm_r.sqrt())).clamp(0.0, 1.0))
}

// ────────────────────────────────────────────────────────────────────────────
// BatchSimilarityCache: per-run memo
// ────────────────────────────────────────────────────────────────────────────

/// Memoizes similarities for one batch run, keyed on the unordered text pair.
/// Dropped with the batch; nothing is shared across runs.
pub struct BatchSimilarityCache<'a> {
    inner: &'a dyn SimilarityProvider,
    memo: Mutex<HashMap<(String, String), f64>>,
}

impl<'a> BatchSimilarityCache<'a> {
    pub fn new(inner: &'a dyn SimilarityProvider) -> Self {
        Self {
            inner,
            memo: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.memo.lock().map(|m| m.len()).unwrap_or(0)
    }

    fn key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }
}

#[async_trait]
impl SimilarityProvider for BatchSimilarityCache<'_> {
    async fn similarity(&self, a: &str, b: &str) -> Result<f64, SimilarityError> {
        let key = Self::key(a, b);
        // A poisoned lock only means another task panicked mid-insert; skip the cache.
        let cached = match self.memo.lock() {
            Ok(memo) => memo.get(&key).copied(),
            Err(_) => None,
        };
        if let Some(hit) = cached {
            debug!("Similarity cache hit");
            return Ok(hit);
        }

        let value = self.inner.similarity(a, b).await?;
        if let Ok(mut memo) = self.memo.lock() {
            memo.insert(key, value);
        }
        Ok(value)
    }

    fn backend(&self) -> &'static str {
        self.inner.backend()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const RESUME: &str = "Rust engineer building distributed systems with Tokio and Kafka.";
    const JOB: &str = "We need a Rust engineer for distributed systems and Kubernetes.";

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SimilarityProvider for CountingProvider {
        async fn similarity(&self, a: &str, b: &str) -> Result<f64, SimilarityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(LexicalSimilarity::score(a, b))
        }

        fn backend(&self) -> &'static str {
            "counting"
        }
    }

    #[test]
    fn test_lexical_identical_texts_score_one() {
        let score = LexicalSimilarity::score(RESUME, RESUME);
        assert!((score - 1.0).abs() < 1e-9, "Score was {score}");
    }

    #[test]
    fn test_lexical_disjoint_texts_score_zero() {
        assert_eq!(LexicalSimilarity::score("rust tokio", "watercolor painting"), 0.0);
    }

    #[test]
    fn test_lexical_blank_input_scores_zero() {
        assert_eq!(LexicalSimilarity::score("", JOB), 0.0);
        assert_eq!(LexicalSimilarity::score("the and of", JOB), 0.0);
    }

    #[test]
    fn test_lexical_is_symmetric_and_bounded() {
        let ab = LexicalSimilarity::score(RESUME, JOB);
        let ba = LexicalSimilarity::score(JOB, RESUME);
        assert_eq!(ab, ba);
        assert!(ab > 0.0 && ab < 1.0, "Score was {ab}");
    }

    #[test]
    fn test_lexical_keeps_symbolic_tech_names() {
        let score = LexicalSimilarity::score("C++ and C#", "c++ c#");
        assert!((score - 1.0).abs() < 1e-9, "Score was {score}");
    }

    #[test]
    fn test_cosine_similarity_bounds() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]).unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
        // Opposite vectors clamp to zero rather than going negative.
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_similarity_dimension_mismatch() {
        let err = cosine_similarity(&[1.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            SimilarityError::DimensionMismatch { left: 1, right: 2 }
        ));
    }

    #[tokio::test]
    async fn test_cache_computes_each_unordered_pair_once() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
        };
        let cache = BatchSimilarityCache::new(&provider);

        let first = cache.similarity(RESUME, JOB).await.unwrap();
        let second = cache.similarity(JOB, RESUME).await.unwrap();
        let third = cache.similarity(RESUME, JOB).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, third);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.backend(), "counting");
    }

    fn embedding_similarity(url: &str) -> EmbeddingSimilarity {
        EmbeddingSimilarity::new(
            EmbeddingClient::new(url.to_string(), None, "all-MiniLM-L6-v2".to_string()).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_embedding_blank_input_skips_endpoint() {
        let endpoint = crate::embedding_client::stub::spawn(vec![(
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({}),
        )])
        .await;
        let provider = embedding_similarity(&endpoint.url);

        assert_eq!(provider.similarity("   ", JOB).await.unwrap(), 0.0);
        assert_eq!(provider.similarity(RESUME, "").await.unwrap(), 0.0);
        assert_eq!(endpoint.hits(), 0);
    }

    #[tokio::test]
    async fn test_embedding_cosine_of_returned_vectors() {
        let endpoint = crate::embedding_client::stub::spawn(vec![(
            axum::http::StatusCode::OK,
            serde_json::json!({"data": [
                {"index": 0, "embedding": [3.0, 4.0]},
                {"index": 1, "embedding": [4.0, 3.0]}
            ]}),
        )])
        .await;
        let provider = embedding_similarity(&endpoint.url);

        let score = provider.similarity(RESUME, JOB).await.unwrap();
        assert!((score - 0.96).abs() < 1e-6, "Score was {score}");
        assert_eq!(provider.backend(), "embedding");
        assert_eq!(endpoint.hits(), 1);
    }
}
