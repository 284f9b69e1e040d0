//! # Progress Reporting & Bot Status
//!
//! The initialization pipeline reports its milestones through the
//! [`ProgressSink`] trait, and the bot tracks its lifecycle in a typed,
//! thread-safe [`BotStatus`] object with explicit accessors. External
//! surfaces (a status endpoint, a terminal spinner) read snapshots; nothing
//! in the core reads ambient global state.

use serde::Serialize;
use std::sync::{Arc, RwLock};
use tracing::info;

/// The overall progress split across pipeline stages: collection runs from
/// 0 to 45 percent, sentiment enrichment from 45 to 85, indexing from 85 to
/// 100.
const COLLECT_SPAN: (u8, u8) = (0, 45);
const ENRICH_SPAN: (u8, u8) = (45, 85);
const INDEX_START: u8 = 85;

fn scale(span: (u8, u8), done: usize, total: usize) -> u8 {
    if total == 0 {
        return span.1;
    }
    let width = (span.1 - span.0) as usize;
    span.0 + (done.min(total) * width / total) as u8
}

/// A single milestone emitted by the initialization pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressUpdate {
    pub current_action: String,
    /// Overall pipeline progress, 0–100.
    pub progress: u8,
    /// Number of articles collected so far.
    pub news_count: usize,
    /// Number of articles with sentiment assigned so far.
    pub analyzed_count: usize,
}

impl ProgressUpdate {
    pub fn collecting(action: impl Into<String>, done: usize, total: usize, news_count: usize) -> Self {
        Self {
            current_action: action.into(),
            progress: scale(COLLECT_SPAN, done, total),
            news_count,
            analyzed_count: 0,
        }
    }

    pub fn enriching(analyzed: usize, total: usize) -> Self {
        Self {
            current_action: format!("Analizando sentimientos ({analyzed}/{total})..."),
            progress: scale(ENRICH_SPAN, analyzed, total),
            news_count: total,
            analyzed_count: analyzed,
        }
    }

    pub fn indexing(news_count: usize) -> Self {
        Self {
            current_action: format!("Generando embeddings para {news_count} noticias..."),
            progress: INDEX_START,
            news_count,
            analyzed_count: news_count,
        }
    }

    pub fn ready(news_count: usize) -> Self {
        Self {
            current_action: "Listo".to_string(),
            progress: 100,
            news_count,
            analyzed_count: news_count,
        }
    }
}

/// A write-only sink for pipeline milestones.
///
/// Implementations must be cheap and non-blocking; the pipeline calls them
/// inline between items.
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: &ProgressUpdate);
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _update: &ProgressUpdate) {}
}

/// Logs every update at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn report(&self, update: &ProgressUpdate) {
        info!(
            action = %update.current_action,
            progress = update.progress,
            news_count = update.news_count,
            "initialization progress"
        );
    }
}

/// Where the bot is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BotPhase {
    /// Never successfully initialized (or the last attempt failed).
    Uninitialized,
    /// The background pipeline is running.
    Initializing,
    /// Articles are collected, enriched and indexed; questions are served.
    Ready,
}

/// A point-in-time copy of the bot's status, safe to hand to any consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub phase: BotPhase,
    pub current_action: String,
    pub progress: u8,
    pub news_count: usize,
    pub analyzed_count: usize,
}

/// Shared, mutable bot status. Clones share the same underlying state.
#[derive(Clone)]
pub struct BotStatus {
    inner: Arc<RwLock<StatusSnapshot>>,
}

impl BotStatus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StatusSnapshot {
                phase: BotPhase::Uninitialized,
                current_action: "Sin iniciar".to_string(),
                progress: 0,
                news_count: 0,
                analyzed_count: 0,
            })),
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.inner.read().expect("status lock poisoned").clone()
    }

    pub fn phase(&self) -> BotPhase {
        self.inner.read().expect("status lock poisoned").phase
    }

    pub(crate) fn set_phase(&self, phase: BotPhase) {
        let mut inner = self.inner.write().expect("status lock poisoned");
        inner.phase = phase;
        if phase == BotPhase::Initializing {
            inner.progress = 0;
            inner.current_action = "Inicializando...".to_string();
        }
    }

    pub(crate) fn apply(&self, update: &ProgressUpdate) {
        let mut inner = self.inner.write().expect("status lock poisoned");
        inner.current_action = update.current_action.clone();
        inner.progress = update.progress;
        inner.news_count = update.news_count;
        inner.analyzed_count = update.analyzed_count;
    }
}

impl Default for BotStatus {
    fn default() -> Self {
        Self::new()
    }
}
