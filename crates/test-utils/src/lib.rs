//! # Shared Test Utilities
//!
//! Mock providers and fixtures used by the `noticiero` integration tests.
//! Every mock records its calls so tests can assert not only on outputs
//! but on whether a backend was consulted at all (e.g. that a follow-up
//! question never reaches the embedding provider).

use async_trait::async_trait;
use noticiero::{
    errors::ProviderError,
    ingest::{ArticleCollector, CollectError},
    progress::ProgressSink,
    providers::{
        ai::{
            embedding::EmbeddingProvider,
            sentiment::{SentimentModel, StarRating},
            AiProvider,
        },
        weather::{WeatherProvider, WeatherReport},
    },
    Article,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

// --- Mock AI Provider ---

/// A generative provider with pre-programmed responses.
///
/// Responses are keyed by a substring of the user prompt; the first key
/// found wins. Without a matching key the default response is returned.
#[derive(Clone, Debug, Default)]
pub struct MockAiProvider {
    responses: Arc<Mutex<Vec<(String, String)>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    default_response: String,
}

impl MockAiProvider {
    pub fn new(default_response: &str) -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            default_response: default_response.to_string(),
        }
    }

    /// Pre-programs a response for prompts containing `key`.
    pub fn add_response(&self, key: &str, response: &str) {
        self.responses
            .lock()
            .unwrap()
            .push((key.to_string(), response.to_string()));
    }

    /// The recorded `(system_prompt, user_prompt)` pairs, for assertions.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        let responses = self.responses.lock().unwrap();
        for (key, response) in responses.iter() {
            if user_prompt.contains(key) {
                return Ok(response.clone());
            }
        }
        Ok(self.default_response.clone())
    }
}

/// A generative provider whose every call fails, for fallback tests.
#[derive(Clone, Debug)]
pub struct FailingAiProvider;

#[async_trait]
impl AiProvider for FailingAiProvider {
    async fn generate(&self, _system: &str, _user: &str) -> Result<String, ProviderError> {
        Err(ProviderError::Api("simulated backend outage".to_string()))
    }
}

// --- Mock Embedding Provider ---

/// A deterministic embedding provider.
///
/// Each programmed `(key, vector)` pair assigns its vector to any text
/// containing the key. Matching is case-sensitive on purpose: it lets
/// tests distinguish a raw lower-case query from its title-cased variant.
/// Unmatched texts embed to the zero vector, which is orthogonal to
/// everything.
#[derive(Clone, Debug)]
pub struct MockEmbeddingProvider {
    patterns: Arc<Mutex<Vec<(String, Vec<f32>)>>>,
    batches: Arc<Mutex<Vec<Vec<String>>>>,
    dimension: usize,
}

impl MockEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            patterns: Arc::new(Mutex::new(Vec::new())),
            batches: Arc::new(Mutex::new(Vec::new())),
            dimension,
        }
    }

    pub fn add_pattern(&self, key: &str, vector: Vec<f32>) {
        assert_eq!(vector.len(), self.dimension, "pattern dimension mismatch");
        self.patterns
            .lock()
            .unwrap()
            .push((key.to_string(), vector));
    }

    /// Number of `embed` calls so far (one per batch, not per text).
    pub fn call_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    /// The recorded input batches, for assertions on query variants.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.batches.lock().unwrap().push(texts.to_vec());
        let patterns = self.patterns.lock().unwrap();
        Ok(texts
            .iter()
            .map(|text| {
                patterns
                    .iter()
                    .find(|(key, _)| text.contains(key))
                    .map(|(_, vector)| vector.clone())
                    .unwrap_or_else(|| vec![0.0; self.dimension])
            })
            .collect())
    }
}

// --- Mock Sentiment Model ---

/// A star-rating model returning one fixed rating for every input.
#[derive(Clone, Debug)]
pub struct MockSentimentModel {
    pub rating: StarRating,
}

impl MockSentimentModel {
    pub fn new(stars: u8, score: f32) -> Self {
        Self {
            rating: StarRating { stars, score },
        }
    }
}

#[async_trait]
impl SentimentModel for MockSentimentModel {
    async fn rate(&self, _text: &str) -> Result<StarRating, ProviderError> {
        Ok(self.rating)
    }
}

/// A star-rating model whose every call fails.
#[derive(Clone, Debug)]
pub struct FailingSentimentModel;

#[async_trait]
impl SentimentModel for FailingSentimentModel {
    async fn rate(&self, _text: &str) -> Result<StarRating, ProviderError> {
        Err(ProviderError::Api("simulated model outage".to_string()))
    }
}

// --- Mock Weather Provider ---

/// A weather provider returning one fixed report; records requested cities.
#[derive(Clone, Debug)]
pub struct MockWeatherProvider {
    report: WeatherReport,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockWeatherProvider {
    pub fn new(report: WeatherReport) -> Self {
        Self {
            report,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requested_cities(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherProvider for MockWeatherProvider {
    async fn current(&self, city: &str) -> Option<WeatherReport> {
        self.requests.lock().unwrap().push(city.to_string());
        Some(self.report.clone())
    }
}

// --- Mock Collector ---

/// A collector over a fixed article set, with optional delay and failure
/// injection. Counts invocations so re-entrancy tests can assert that a
/// coalesced initialization only collected once.
pub struct MockCollector {
    articles: Vec<Article>,
    calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
    fail: bool,
}

impl MockCollector {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            articles,
            calls: Arc::new(AtomicUsize::new(0)),
            delay: None,
            fail: false,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing() -> Self {
        Self {
            articles: Vec::new(),
            calls: Arc::new(AtomicUsize::new(0)),
            delay: None,
            fail: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// A handle to the call counter that stays valid after the collector
    /// moves into the bot.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ArticleCollector for MockCollector {
    async fn collect(&self, _progress: &dyn ProgressSink) -> Result<Vec<Article>, CollectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(CollectError::Fetch("simulated source outage".to_string()));
        }
        Ok(self.articles.clone())
    }
}

// --- Fixtures ---

/// Builds an article with a derived summary and no sentiment.
pub fn article(title: &str, url: &str, body: &str) -> Article {
    Article {
        title: title.to_string(),
        url: url.to_string(),
        summary: noticiero::ingest::summarize(body),
        body: body.to_string(),
        sentiment: None,
    }
}

/// A small fixture set of Bolivian news articles covering distinct topics
/// and all three sentiment polarities.
pub fn sample_articles() -> Vec<Article> {
    vec![
        article(
            "Bolivia clasificó al mundial tras vencer 3-0 en un partido histórico",
            "https://noticias.test/deportes/clasificacion",
            "La selección boliviana logró una victoria histórica y clasificó al mundial. \
             Miles de aficionados celebraron en las calles de todo el país.",
        ),
        article(
            "Tragedia en la carretera: accidente deja cinco heridos",
            "https://noticias.test/pais/accidente-carretera",
            "Un accidente de tránsito en la ruta a los valles dejó cinco personas heridas. \
             Las autoridades investigan las causas del hecho.",
        ),
        article(
            "El gobierno presenta los resultados preliminares del censo",
            "https://noticias.test/pais/censo-resultados",
            "El instituto de estadística presentó los resultados preliminares del censo \
             nacional de población y vivienda ante las autoridades departamentales.",
        ),
        article(
            "Inauguración de nuevo hospital beneficiará a miles de familias",
            "https://noticias.test/sociedad/hospital-inauguracion",
            "La inauguración del nuevo hospital de tercer nivel fue celebrada por los \
             vecinos. El centro beneficiará a miles de familias de la zona.",
        ),
        article(
            "La exportación de soya registra cifras estables este trimestre",
            "https://noticias.test/economia/soya-exportacion",
            "Los datos del sector agroindustrial muestran cifras estables en la \
             exportación de soya durante el último trimestre del año.",
        ),
    ]
}
