//! # Bot Configuration
//!
//! Typed tunables for the retrieval pipeline. Every knob here started life
//! as a hard-coded constant in an earlier iteration; they are kept as
//! configuration because none of them has a derivation beyond hand-tuning
//! on the original news corpus, and a different corpus or language will
//! likely need different values.

use serde::Deserialize;
use std::env;

/// Scoring parameters for the hybrid semantic + keyword search.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchTunables {
    /// Additive boost applied when the raw query appears verbatim in an
    /// article's title or summary. Compensates for embedding models
    /// under-weighting short proper nouns.
    #[serde(default = "default_keyword_boost")]
    pub keyword_boost: f32,
    /// Hits scoring at or below this (after boosting) are discarded.
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f32,
}

fn default_keyword_boost() -> f32 {
    0.3
}

fn default_relevance_threshold() -> f32 {
    0.12
}

impl Default for SearchTunables {
    fn default() -> Self {
        Self {
            keyword_boost: default_keyword_boost(),
            relevance_threshold: default_relevance_threshold(),
        }
    }
}

/// Top-level configuration for a `NewsBot`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BotConfig {
    /// How many articles a semantic search returns at most.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub search: SearchTunables,
    /// Maximum number of history entries kept per session (a question and
    /// its answer are two entries).
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    /// How many of the most recent history entries are included in the
    /// generative prompt.
    #[serde(default = "default_prompt_history_turns")]
    pub prompt_history_turns: usize,
    /// Least-recently-used cap on the number of live sessions.
    #[serde(default = "default_session_cap")]
    pub session_cap: usize,
    /// Maximum number of articles shown in a sentiment-filter listing.
    #[serde(default = "default_filter_listing_cap")]
    pub filter_listing_cap: usize,
}

fn default_top_k() -> usize {
    5
}

fn default_history_cap() -> usize {
    10
}

fn default_prompt_history_turns() -> usize {
    4
}

fn default_session_cap() -> usize {
    256
}

fn default_filter_listing_cap() -> usize {
    5
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            search: SearchTunables::default(),
            history_cap: default_history_cap(),
            prompt_history_turns: default_prompt_history_turns(),
            session_cap: default_session_cap(),
            filter_listing_cap: default_filter_listing_cap(),
        }
    }
}

impl BotConfig {
    /// Loads the defaults, then applies `NOTICIERO_*` environment overrides.
    ///
    /// Reads a `.env` file first when one is present. Unparseable values are
    /// ignored in favor of the default rather than failing startup.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::default();

        if let Some(v) = parse_var("NOTICIERO_TOP_K") {
            config.top_k = v;
        }
        if let Some(v) = parse_var("NOTICIERO_KEYWORD_BOOST") {
            config.search.keyword_boost = v;
        }
        if let Some(v) = parse_var("NOTICIERO_RELEVANCE_THRESHOLD") {
            config.search.relevance_threshold = v;
        }
        if let Some(v) = parse_var("NOTICIERO_HISTORY_CAP") {
            config.history_cap = v;
        }
        if let Some(v) = parse_var("NOTICIERO_SESSION_CAP") {
            config.session_cap = v;
        }

        config
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|raw| raw.parse().ok())
}
