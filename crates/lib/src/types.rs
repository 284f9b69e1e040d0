use crate::{
    compose::{AnswerComposer, WeatherQueryRules},
    config::BotConfig,
    errors::BuildError,
    ingest::ArticleCollector,
    progress::{BotStatus, NullSink, ProgressSink},
    providers::{
        ai::{embedding::EmbeddingProvider, sentiment::SentimentModel, AiProvider},
        weather::WeatherProvider,
    },
    search::SemanticIndex,
    sentiment::{SentimentAnalyzer, SentimentLexicon, SentimentQueryRules},
    session::{FollowUpRules, SessionStore},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{atomic::AtomicBool, Arc};
use tokio::sync::RwLock;

/// The sentiment label assigned to an article after enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// The Spanish display label, as rendered in user-facing listings.
    pub fn label_es(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positivo",
            Sentiment::Negative => "Negativo",
            Sentiment::Neutral => "Neutral",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Sentiment::Positive => "😊",
            Sentiment::Negative => "😞",
            Sentiment::Neutral => "😐",
        }
    }
}

/// How certain the classifier is about a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn label_es(&self) -> &'static str {
        match self {
            Confidence::High => "Alto",
            Confidence::Medium => "Medio",
            Confidence::Low => "Bajo",
        }
    }
}

/// The full classification attached to an article: label, confidence tier,
/// and a short human-readable rationale (matched-term count or model score).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentInfo {
    pub label: Sentiment,
    pub confidence: Confidence,
    pub rationale: String,
}

/// A single collected news item.
///
/// The collector populates `title`, `url` and `body`; `summary` is derived
/// from the body when the source does not provide one. The `sentiment` field
/// stays `None` until the enrichment pass runs. The URL is the article's
/// identity: the store never holds two articles with the same URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentInfo>,
}

/// An article annotated with its relevance score for one query.
///
/// Scores are cosine similarities plus any keyword boost, so values above
/// 1.0 are possible.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub article: Article,
    pub score: f32,
}

/// The news chatbot: orchestrates collection, sentiment enrichment,
/// semantic indexing, and per-session question answering.
///
/// A `NewsBot` is built once via [`NewsBotBuilder`], wrapped in an [`Arc`],
/// and shared across all sessions; every method takes `&self`.
pub struct NewsBot {
    pub(crate) collector: Arc<dyn ArticleCollector>,
    pub(crate) index: SemanticIndex,
    pub(crate) analyzer: SentimentAnalyzer,
    pub(crate) composer: AnswerComposer,
    pub(crate) sessions: SessionStore,
    pub(crate) weather: Option<Arc<dyn WeatherProvider>>,
    pub(crate) progress: Arc<dyn ProgressSink>,
    pub(crate) status: BotStatus,
    pub(crate) articles: RwLock<Vec<Article>>,
    pub(crate) initializing: AtomicBool,
    pub(crate) config: BotConfig,
    pub(crate) follow_up_rules: FollowUpRules,
    pub(crate) sentiment_query_rules: SentimentQueryRules,
    pub(crate) weather_rules: WeatherQueryRules,
}

impl fmt::Debug for NewsBot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsBot")
            .field("status", &self.status.snapshot())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A builder for [`NewsBot`] instances.
///
/// The collector, embedding provider and sentiment model are required; the
/// generative AI provider and the weather provider are optional (without an
/// AI provider the composer always renders the templated answer). All rule
/// tables default to the Spanish rule sets but can be swapped for another
/// locale.
#[derive(Default)]
pub struct NewsBotBuilder {
    collector: Option<Arc<dyn ArticleCollector>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    sentiment_model: Option<Arc<dyn SentimentModel>>,
    ai_provider: Option<Arc<dyn AiProvider>>,
    weather: Option<Arc<dyn WeatherProvider>>,
    progress: Option<Arc<dyn ProgressSink>>,
    config: Option<BotConfig>,
    lexicon: Option<SentimentLexicon>,
    follow_up_rules: Option<FollowUpRules>,
    sentiment_query_rules: Option<SentimentQueryRules>,
    weather_rules: Option<WeatherQueryRules>,
}

impl NewsBotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the article collector that feeds the store.
    pub fn collector(mut self, collector: Arc<dyn ArticleCollector>) -> Self {
        self.collector = Some(collector);
        self
    }

    /// Sets the embedding backend used by the semantic index.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Sets the star-rating model backing the sentiment classifier.
    pub fn sentiment_model(mut self, model: Arc<dyn SentimentModel>) -> Self {
        self.sentiment_model = Some(model);
        self
    }

    /// Enables generative answers through the given AI provider.
    pub fn ai_provider(mut self, provider: Arc<dyn AiProvider>) -> Self {
        self.ai_provider = Some(provider);
        self
    }

    /// Enables weather augmentation through the given provider.
    pub fn weather_provider(mut self, provider: Arc<dyn WeatherProvider>) -> Self {
        self.weather = Some(provider);
        self
    }

    /// Sets the sink that receives initialization progress updates.
    pub fn progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn config(mut self, config: BotConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the default Spanish sentiment keyword sets.
    pub fn lexicon(mut self, lexicon: SentimentLexicon) -> Self {
        self.lexicon = Some(lexicon);
        self
    }

    /// Replaces the default follow-up detection rule table.
    pub fn follow_up_rules(mut self, rules: FollowUpRules) -> Self {
        self.follow_up_rules = Some(rules);
        self
    }

    /// Replaces the default sentiment-query detection rule table.
    pub fn sentiment_query_rules(mut self, rules: SentimentQueryRules) -> Self {
        self.sentiment_query_rules = Some(rules);
        self
    }

    /// Replaces the default weather keyword table.
    pub fn weather_rules(mut self, rules: WeatherQueryRules) -> Self {
        self.weather_rules = Some(rules);
        self
    }

    /// Builds the [`NewsBot`].
    ///
    /// Fails when one of the required backends was not provided.
    pub fn build(self) -> Result<NewsBot, BuildError> {
        let collector = self.collector.ok_or(BuildError::MissingCollector)?;
        let embedder = self.embedder.ok_or(BuildError::MissingEmbedder)?;
        let sentiment_model = self.sentiment_model.ok_or(BuildError::MissingSentimentModel)?;

        let config = self.config.unwrap_or_default();
        let lexicon = self.lexicon.unwrap_or_default();

        Ok(NewsBot {
            collector,
            index: SemanticIndex::new(embedder, config.search.clone()),
            analyzer: SentimentAnalyzer::new(sentiment_model, lexicon),
            composer: AnswerComposer::new(self.ai_provider, config.prompt_history_turns),
            sessions: SessionStore::new(config.history_cap, config.session_cap),
            weather: self.weather,
            progress: self.progress.unwrap_or_else(|| Arc::new(NullSink)),
            status: BotStatus::new(),
            articles: RwLock::new(Vec::new()),
            initializing: AtomicBool::new(false),
            config,
            follow_up_rules: self.follow_up_rules.unwrap_or_default(),
            sentiment_query_rules: self.sentiment_query_rules.unwrap_or_default(),
            weather_rules: self.weather_rules.unwrap_or_default(),
        })
    }
}
