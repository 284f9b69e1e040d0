//! # Hybrid Semantic Search
//!
//! The semantic index embeds each article's title and summary once, then
//! answers queries by cosine similarity with two adjustments on top:
//!
//! 1. **Multi-query max-pooling**: an all-lower-case query also runs as a
//!    title-cased variant, and each article keeps its best similarity
//!    across variants. Short proper-noun queries ("kast") embed poorly in
//!    lower case.
//! 2. **Keyword boosting**: when the raw query appears verbatim inside an
//!    article's title or summary, a fixed boost is added to its score.
//!
//! The index is a wholesale snapshot: `index()` replaces everything, there
//! is no incremental update.

use crate::{
    config::SearchTunables,
    providers::ai::embedding::EmbeddingProvider,
    types::{Article, SearchHit},
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Custom error types for the indexing and search processes.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Embedding generation failed: {0}")]
    Embedding(#[from] crate::errors::ProviderError),
    #[error("Embeddings API returned {got} vectors for {expected} texts")]
    BatchShape { expected: usize, got: usize },
}

/// One indexed article and its vector, snapshotted at indexing time.
#[derive(Debug, Clone)]
struct EmbeddingRecord {
    article: Article,
    vector: Vec<f32>,
}

/// The in-memory semantic index.
///
/// Clones share the same records; the embedding provider is shared
/// read-only across all queries.
#[derive(Clone)]
pub struct SemanticIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    tunables: SearchTunables,
    records: Arc<RwLock<Vec<EmbeddingRecord>>>,
}

impl SemanticIndex {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, tunables: SearchTunables) -> Self {
        Self {
            embedder,
            tunables,
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Number of articles currently indexed.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Replaces the entire index with embeddings for the given articles.
    ///
    /// Embeds `"{title}. {summary}"` per article in a single batch call.
    pub async fn index(&self, articles: &[Article]) -> Result<(), SearchError> {
        if articles.is_empty() {
            self.records.write().await.clear();
            return Ok(());
        }

        let texts: Vec<String> = articles
            .iter()
            .map(|a| format!("{}. {}", a.title, a.summary))
            .collect();

        info!("Generating embeddings for {} articles", texts.len());
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != articles.len() {
            return Err(SearchError::BatchShape {
                expected: articles.len(),
                got: vectors.len(),
            });
        }

        let records = articles
            .iter()
            .cloned()
            .zip(vectors)
            .map(|(article, vector)| EmbeddingRecord { article, vector })
            .collect();
        *self.records.write().await = records;
        Ok(())
    }

    /// Searches the index, returning at most `top_k` hits scoring above the
    /// relevance threshold, best first.
    ///
    /// An empty index short-circuits to an empty result without calling the
    /// embedding backend.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, SearchError> {
        if self.is_empty().await {
            return Ok(Vec::new());
        }

        let variants = query_variants(query);
        debug!(?variants, "Embedding query variants");
        let query_vectors = self.embedder.embed(&variants).await?;

        let query_lower = query.to_lowercase();
        let records = self.records.read().await;

        let mut scored: Vec<(usize, f32)> = records
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                let semantic = query_vectors
                    .iter()
                    .map(|qv| cosine_similarity(qv, &record.vector))
                    .fold(f32::MIN, f32::max);

                let haystack =
                    format!("{} {}", record.article.title, record.article.summary).to_lowercase();
                let score = if haystack.contains(&query_lower) {
                    semantic + self.tunables.keyword_boost
                } else {
                    semantic
                };
                (idx, score)
            })
            .collect();

        // Stable sort keeps the original article order on score ties.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .filter(|(_, score)| *score > self.tunables.relevance_threshold)
            .map(|(idx, score)| SearchHit {
                article: records[idx].article.clone(),
                score,
            })
            .collect())
    }
}

/// The query plus, for an entirely lower-case query, a title-cased variant.
fn query_variants(query: &str) -> Vec<String> {
    let mut variants = vec![query.to_string()];
    let has_lower = query.chars().any(|c| c.is_lowercase());
    let has_upper = query.chars().any(|c| c.is_uppercase());
    if has_lower && !has_upper {
        variants.push(title_case(query));
    }
    variants
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cosine similarity between two vectors; 0.0 when either has zero norm or
/// the dimensions disagree.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
