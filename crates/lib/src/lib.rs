//! # Noticiero
//!
//! A news-retrieval chat assistant. An external collector delivers
//! articles; the bot enriches them with sentiment labels, indexes them for
//! semantic lookup, and answers natural-language questions by retrieving
//! the relevant articles and composing a response — generatively through a
//! configured AI provider, or with a deterministic template when none is
//! available.
//!
//! The entry point is [`NewsBot`], built through [`NewsBotBuilder`]:
//! initialization (collect → enrich → index) runs on a background task
//! while questions are served immediately, and every question is routed
//! through sentiment-filter detection, follow-up resolution and hybrid
//! semantic search before composition.

pub mod compose;
pub mod config;
pub mod errors;
pub mod ingest;
pub mod progress;
pub mod prompts;
pub mod providers;
pub mod search;
pub mod sentiment;
pub mod session;
pub mod types;

pub use config::{BotConfig, SearchTunables};
pub use errors::{BuildError, InitError, ProviderError};
pub use progress::{BotPhase, StatusSnapshot};
pub use types::{Article, Confidence, NewsBot, NewsBotBuilder, SearchHit, Sentiment, SentimentInfo};

use crate::{
    compose::{sources_footer, weather_hit, ComposeRequest},
    progress::{BotStatus, ProgressSink, ProgressUpdate},
    search::SearchError,
    sentiment::{filter_by, SentimentTally},
};
use std::sync::{atomic::Ordering, Arc};
use tracing::{error, info};

const BLANK_QUESTION_MESSAGE: &str = "Por favor, escribe una pregunta.";
const INITIALIZING_MESSAGE: &str =
    "⏳ El bot se está inicializando, por favor espera unos segundos y vuelve a preguntar...";
const NOT_READY_MESSAGE: &str = "❌ El bot no está inicializado. Recarga la página.";

/// Forwards every pipeline milestone both into the bot's own status object
/// and to the externally supplied sink.
struct StatusForward {
    status: BotStatus,
    sink: Arc<dyn ProgressSink>,
}

impl ProgressSink for StatusForward {
    fn report(&self, update: &ProgressUpdate) {
        self.status.apply(update);
        self.sink.report(update);
    }
}

impl NewsBot {
    pub fn builder() -> NewsBotBuilder {
        NewsBotBuilder::new()
    }

    /// A point-in-time copy of the bot's lifecycle status.
    pub fn status(&self) -> StatusSnapshot {
        self.status.snapshot()
    }

    /// Whether a generative AI provider is configured. Without one every
    /// answer is rendered from the deterministic template.
    pub fn generative_enabled(&self) -> bool {
        self.composer.generative_enabled()
    }

    /// Starts the collect → enrich → index pipeline on a background task.
    ///
    /// Requests are coalesced: while a worker is running, further calls are
    /// no-ops. On failure the pipeline logs the error and the bot reverts
    /// to not-ready; there is no automatic retry.
    pub fn initialize(self: &Arc<Self>) {
        if self
            .initializing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("Initialization already in progress, ignoring re-trigger");
            return;
        }

        self.status.set_phase(BotPhase::Initializing);
        let bot = Arc::clone(self);
        tokio::spawn(async move {
            match bot.run_pipeline().await {
                Ok(count) => {
                    bot.status.set_phase(BotPhase::Ready);
                    info!("Bot ready: {count} articles collected, enriched and indexed");
                }
                Err(e) => {
                    error!("Initialization failed: {e}");
                    bot.status.set_phase(BotPhase::Uninitialized);
                }
            }
            bot.initializing.store(false, Ordering::SeqCst);
        });
    }

    async fn run_pipeline(&self) -> Result<usize, InitError> {
        let sink = StatusForward {
            status: self.status.clone(),
            sink: Arc::clone(&self.progress),
        };

        let mut articles = self.collector.collect(&sink).await?;
        let count = articles.len();

        sink.report(&ProgressUpdate::enriching(0, count));
        self.analyzer.enrich_all(&mut articles, &sink).await;

        sink.report(&ProgressUpdate::indexing(count));
        self.index.index(&articles).await?;

        *self.articles.write().await = articles;
        sink.report(&ProgressUpdate::ready(count));
        Ok(count)
    }

    /// Answers a question for one session.
    ///
    /// Never returns an error: blank input, a not-ready bot and internal
    /// failures all come back as natural-language messages.
    pub async fn answer(&self, question: &str, session_id: &str) -> String {
        let question = question.trim();
        if question.is_empty() {
            return BLANK_QUESTION_MESSAGE.to_string();
        }

        match self.status.phase() {
            BotPhase::Initializing => return INITIALIZING_MESSAGE.to_string(),
            BotPhase::Uninitialized => return NOT_READY_MESSAGE.to_string(),
            BotPhase::Ready => {}
        }

        info!("Question from session '{session_id}': {question}");
        match self.answer_ready(question, session_id).await {
            Ok(text) => text,
            Err(e) => {
                error!("Error while answering: {e}");
                format!("❌ Error al procesar la pregunta: {e}")
            }
        }
    }

    async fn answer_ready(
        &self,
        question: &str,
        session_id: &str,
    ) -> Result<String, SearchError> {
        // Explicit sentiment-filter queries ("noticias positivas") bypass
        // retrieval entirely and list from the store in collection order.
        if let Some(label) = self.sentiment_query_rules.detect(question) {
            let articles = self.articles.read().await;
            let listing =
                render_sentiment_listing(&articles, label, self.config.filter_listing_cap);
            drop(articles);
            self.sessions
                .update(session_id, question, &listing, Vec::new());
            return Ok(listing);
        }

        // Follow-up questions reuse the stored context instead of searching.
        let stored = self.sessions.last_context(session_id);
        let is_follow_up = self.follow_up_rules.is_follow_up(question);
        let (mut working, from_stored) = if is_follow_up && !stored.is_empty() {
            info!("Follow-up question, reusing stored context ({} articles)", stored.len());
            (stored.clone(), true)
        } else {
            let hits = self.index.search(question, self.config.top_k).await?;
            (hits, false)
        };

        // Weather questions get the current report spliced in front of the
        // working set, outranking every real article.
        let mut auxiliary = None;
        if self.weather_rules.matches(question) {
            if let Some(provider) = &self.weather {
                let city = providers::weather::city_in(question)
                    .unwrap_or(providers::weather::CITIES[0]);
                if let Some(report) = provider.current(city).await {
                    auxiliary = Some(report.summary_es());
                    working.insert(0, weather_hit(&report));
                }
            }
        }

        let history = self.sessions.history(session_id);
        let stats = SentimentTally::count(&self.articles.read().await);

        let composed = self
            .composer
            .compose(&ComposeRequest {
                question,
                articles: &working,
                history: &history,
                prior_context: &stored,
                from_stored_context: from_stored,
                stats: Some(&stats),
                auxiliary: auxiliary.as_deref(),
            })
            .await;

        let mut text = composed.text;
        if !working.is_empty() {
            text.push_str(&sources_footer(&working));
        }

        self.sessions.update(session_id, question, &text, working);
        Ok(text)
    }
}

/// Renders the listing for an explicit sentiment-filter query: the first
/// `cap` matching articles in store order, each with its link and the
/// classifier's rationale, plus a "N más" note when truncated.
fn render_sentiment_listing(articles: &[Article], label: Sentiment, cap: usize) -> String {
    let matching = filter_by(articles, label);
    let adjective = match label {
        Sentiment::Positive => "positivas",
        Sentiment::Negative => "negativas",
        Sentiment::Neutral => "neutrales",
    };

    if matching.is_empty() {
        return format!("{} No encontré noticias {adjective} en este momento.", label.emoji());
    }

    let total = matching.len();
    let mut text = format!("{} Noticias {adjective} ({total} en total):\n\n", label.emoji());
    for (i, article) in matching.iter().take(cap).enumerate() {
        text.push_str(&format!("{}. {}\n   🔗 {}\n", i + 1, article.title, article.url));
        if let Some(sentiment) = &article.sentiment {
            text.push_str(&format!("   {}\n", sentiment.rationale));
        }
        text.push('\n');
    }
    if total > cap {
        text.push_str(&format!("… y {} más.", total - cap));
    }
    text
}
