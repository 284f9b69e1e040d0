//! # Article Collection Boundary
//!
//! The pipeline does not scrape anything itself; an [`ArticleCollector`]
//! delivers ready-made article records. Collectors are expected to isolate
//! per-item failures (a page that fails to fetch or parse is simply
//! omitted) and only return an error when the whole batch is unusable.

use crate::progress::ProgressSink;
use crate::types::Article;
use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

/// A generic error type for article collectors.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("The configured source could not be found: {0}")]
    SourceNotFound(String),
    #[error("Failed to fetch content from the source: {0}")]
    Fetch(String),
    #[error("Failed to parse content from the source: {0}")]
    Parse(String),
    #[error("An unexpected internal error occurred: {0}")]
    Internal(#[from] anyhow::Error),
}

/// The contract for anything that can deliver a batch of articles.
///
/// Implementations report their own progress through the sink (collection
/// owns the 0–45% span of the overall pipeline).
#[async_trait]
pub trait ArticleCollector: Send + Sync {
    async fn collect(&self, progress: &dyn ProgressSink) -> Result<Vec<Article>, CollectError>;
}

/// Derives a summary from an article body: the first 200 characters plus an
/// ellipsis. Splits on a character boundary, never mid-codepoint.
pub fn summarize(body: &str) -> String {
    const SUMMARY_CHARS: usize = 200;
    let mut summary: String = body.chars().take(SUMMARY_CHARS).collect();
    if body.chars().count() > SUMMARY_CHARS {
        summary.push_str("...");
    }
    summary
}

/// Removes duplicate URLs from a batch, keeping the first occurrence, and
/// fills in missing summaries. Every collector result passes through here
/// before it reaches the store.
pub fn normalize(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = std::collections::HashSet::new();
    let mut normalized = Vec::with_capacity(articles.len());
    for mut article in articles {
        if !seen.insert(article.url.clone()) {
            warn!("Skipping duplicate article: {}", article.url);
            continue;
        }
        if article.summary.is_empty() {
            article.summary = summarize(&article.body);
        }
        normalized.push(article);
    }
    normalized
}

/// A collector over a fixed article set, for demos and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCollector {
    articles: Vec<Article>,
}

impl StaticCollector {
    pub fn new(articles: Vec<Article>) -> Self {
        Self { articles }
    }
}

#[async_trait]
impl ArticleCollector for StaticCollector {
    async fn collect(&self, progress: &dyn ProgressSink) -> Result<Vec<Article>, CollectError> {
        let articles = normalize(self.articles.clone());
        progress.report(&crate::progress::ProgressUpdate::collecting(
            "Cargando noticias...",
            1,
            1,
            articles.len(),
        ));
        Ok(articles)
    }
}
