//! # Orchestrator Tests
//!
//! End-to-end coverage of the bot lifecycle and question routing against
//! mock backends: initialization coalescing and failure, the status-gated
//! answers, sentiment-filter listings, follow-up context reuse, weather
//! injection and the sources footer.

use noticiero::providers::weather::WeatherReport;
use noticiero::{Article, BotPhase, NewsBot};
use noticiero_test_utils::{
    article, sample_articles, MockAiProvider, MockCollector, MockEmbeddingProvider,
    MockSentimentModel, MockWeatherProvider,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct TestSetup {
    bot: Arc<NewsBot>,
    embedder: MockEmbeddingProvider,
    collector_calls: Arc<AtomicUsize>,
    ai: Option<MockAiProvider>,
    weather: Option<MockWeatherProvider>,
}

struct TestSetupOptions {
    articles: Vec<Article>,
    collector_delay: Option<Duration>,
    collector_fails: bool,
    with_ai: bool,
    with_weather: bool,
}

impl Default for TestSetupOptions {
    fn default() -> Self {
        Self {
            articles: sample_articles(),
            collector_delay: None,
            collector_fails: false,
            with_ai: false,
            with_weather: false,
        }
    }
}

fn build_bot(options: TestSetupOptions) -> TestSetup {
    let embedder = MockEmbeddingProvider::new(4);
    embedder.add_pattern("censo", vec![1.0, 0.0, 0.0, 0.0]);

    let mut collector = if options.collector_fails {
        MockCollector::failing()
    } else {
        MockCollector::new(options.articles)
    };
    if let Some(delay) = options.collector_delay {
        collector = collector.with_delay(delay);
    }
    let collector_calls = collector.call_counter();

    let mut builder = NewsBot::builder()
        .collector(Arc::new(collector))
        .embedder(Arc::new(embedder.clone()))
        .sentiment_model(Arc::new(MockSentimentModel::new(3, 0.5)));

    let ai = if options.with_ai {
        let ai = MockAiProvider::new("Respuesta generada a partir de las noticias.");
        builder = builder.ai_provider(Arc::new(ai.clone()));
        Some(ai)
    } else {
        None
    };

    let weather = if options.with_weather {
        let provider = MockWeatherProvider::new(WeatherReport {
            temperature: 18.0,
            condition: "Parcialmente nublado".to_string(),
            icon: "⛅".to_string(),
            city: "La Paz".to_string(),
        });
        builder = builder.weather_provider(Arc::new(provider.clone()));
        Some(provider)
    } else {
        None
    };

    let bot = builder.build().expect("bot must build");
    TestSetup {
        bot: Arc::new(bot),
        embedder,
        collector_calls,
        ai,
        weather,
    }
}

async fn wait_until_ready(bot: &Arc<NewsBot>) {
    for _ in 0..500 {
        if bot.status().phase == BotPhase::Ready {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("bot did not become ready in time");
}

async fn wait_until_settled(bot: &Arc<NewsBot>) -> BotPhase {
    for _ in 0..500 {
        let phase = bot.status().phase;
        if phase != BotPhase::Initializing {
            return phase;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("initialization did not settle in time");
}

#[tokio::test]
async fn uninitialized_bot_asks_for_a_reload() {
    let setup = build_bot(TestSetupOptions::default());

    let answer = setup.bot.answer("¿qué pasó hoy?", "s1").await;

    assert!(answer.contains("no está inicializado"));
}

#[tokio::test]
async fn initializing_bot_asks_to_wait() {
    let setup = build_bot(TestSetupOptions {
        collector_delay: Some(Duration::from_millis(300)),
        ..TestSetupOptions::default()
    });

    setup.bot.initialize();
    let answer = setup.bot.answer("¿qué pasó hoy?", "s1").await;

    assert!(answer.contains("se está inicializando"));
    wait_until_ready(&setup.bot).await;
}

#[tokio::test]
async fn blank_question_prompts_for_input() {
    let setup = build_bot(TestSetupOptions::default());
    setup.bot.initialize();
    wait_until_ready(&setup.bot).await;

    assert_eq!(
        setup.bot.answer("   ", "s1").await,
        "Por favor, escribe una pregunta."
    );
}

#[tokio::test]
async fn reinitialization_requests_are_coalesced() {
    let setup = build_bot(TestSetupOptions {
        collector_delay: Some(Duration::from_millis(100)),
        ..TestSetupOptions::default()
    });

    setup.bot.initialize();
    setup.bot.initialize();
    setup.bot.initialize();
    wait_until_ready(&setup.bot).await;

    assert_eq!(
        setup.collector_calls.load(Ordering::SeqCst),
        1,
        "concurrent initialize calls must share one worker"
    );
}

#[tokio::test]
async fn failed_initialization_reverts_to_not_ready() {
    let setup = build_bot(TestSetupOptions {
        collector_fails: true,
        ..TestSetupOptions::default()
    });

    setup.bot.initialize();
    let phase = wait_until_settled(&setup.bot).await;

    assert_eq!(phase, BotPhase::Uninitialized);
    let answer = setup.bot.answer("¿qué pasó hoy?", "s1").await;
    assert!(answer.contains("no está inicializado"));
}

#[tokio::test]
async fn templated_answer_with_sources_for_a_topic_question() {
    let setup = build_bot(TestSetupOptions::default());
    setup.bot.initialize();
    wait_until_ready(&setup.bot).await;

    let answer = setup.bot.answer("censo", "s1").await;

    assert!(answer.contains("📰 Encontré"));
    assert!(answer.contains("resultados preliminares del censo"));
    assert!(answer.contains("📚 **Fuentes:**"));
    // The census article carries the model-backed neutral label.
    assert!(answer.contains("😐 Neutral (Medio)"));
}

#[tokio::test]
async fn generative_answer_keeps_the_sources_footer() {
    let setup = build_bot(TestSetupOptions {
        with_ai: true,
        ..TestSetupOptions::default()
    });
    setup.bot.initialize();
    wait_until_ready(&setup.bot).await;

    let answer = setup.bot.answer("censo", "s1").await;

    assert!(answer.starts_with("Respuesta generada a partir de las noticias."));
    assert!(answer.contains("📚 **Fuentes:**"));

    let ai = setup.ai.expect("ai configured");
    let calls = ai.get_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].1.contains("Resumen de sentimientos"));
}

#[tokio::test]
async fn unrelated_question_gets_the_no_results_message() {
    let setup = build_bot(TestSetupOptions::default());
    setup.bot.initialize();
    wait_until_ready(&setup.bot).await;

    let answer = setup.bot.answer("criptomonedas en marte", "s1").await;

    assert!(answer.contains("No encontré noticias relacionadas"));
    assert!(!answer.contains("Fuentes"));
}

#[tokio::test]
async fn sentiment_filter_lists_five_and_notes_the_rest() {
    let mut articles: Vec<Article> = (1..=7)
        .map(|i| {
            article(
                &format!("Triunfo número {i} para el deporte nacional"),
                &format!("https://noticias.test/triunfo-{i}"),
                "Crónica de la jornada.",
            )
        })
        .collect();
    articles.push(article(
        "Accidente en la autopista",
        "https://noticias.test/accidente",
        "Dos vehículos colisionaron esta mañana.",
    ));

    let setup = build_bot(TestSetupOptions {
        articles,
        ..TestSetupOptions::default()
    });
    setup.bot.initialize();
    wait_until_ready(&setup.bot).await;

    let answer = setup.bot.answer("noticias positivas", "s1").await;

    assert!(answer.contains("😊 Noticias positivas (7 en total):"));
    assert_eq!(answer.matches("🔗").count(), 5, "listing caps at five articles");
    assert!(answer.contains("Triunfo número 1"));
    assert!(answer.contains("Triunfo número 5"));
    assert!(!answer.contains("Triunfo número 6"));
    assert!(answer.contains("… y 2 más."));
    assert!(!answer.contains("Accidente"));
}

#[tokio::test]
async fn sentiment_filter_without_matches_says_so() {
    let setup = build_bot(TestSetupOptions {
        articles: vec![article(
            "Accidente en la autopista",
            "https://noticias.test/accidente",
            "Dos vehículos colisionaron esta mañana.",
        )],
        ..TestSetupOptions::default()
    });
    setup.bot.initialize();
    wait_until_ready(&setup.bot).await;

    let answer = setup.bot.answer("noticias positivas", "s1").await;

    assert!(answer.contains("No encontré noticias positivas"));
}

#[tokio::test]
async fn follow_up_reuses_the_stored_context_without_searching() {
    let setup = build_bot(TestSetupOptions::default());
    setup.bot.initialize();
    wait_until_ready(&setup.bot).await;

    let first = setup.bot.answer("censo", "s1").await;
    assert!(first.contains("censo"));
    let calls_after_search = setup.embedder.call_count();

    let second = setup.bot.answer("profundiza en la primera", "s1").await;

    assert_eq!(
        setup.embedder.call_count(),
        calls_after_search,
        "a follow-up must not trigger a new embedding call"
    );
    assert!(second.contains("resultados preliminares del censo"));
}

#[tokio::test]
async fn follow_up_without_stored_context_searches_normally() {
    let setup = build_bot(TestSetupOptions::default());
    setup.bot.initialize();
    wait_until_ready(&setup.bot).await;

    let calls_before = setup.embedder.call_count();
    let answer = setup.bot.answer("profundiza en la primera", "fresh").await;

    assert_eq!(setup.embedder.call_count(), calls_before + 1);
    // Nothing matches the cue words, so the fresh search comes up empty.
    assert!(answer.contains("No encontré noticias relacionadas"));
}

#[tokio::test]
async fn weather_question_injects_the_report_up_front() {
    let setup = build_bot(TestSetupOptions {
        with_weather: true,
        ..TestSetupOptions::default()
    });
    setup.bot.initialize();
    wait_until_ready(&setup.bot).await;

    let answer = setup.bot.answer("¿Qué clima hay en La Paz?", "s1").await;

    assert!(answer.contains("📌 1. ⛅ Clima en La Paz"));
    assert!(answer.contains("18"));
    assert!(answer.contains("Parcialmente nublado"));

    let weather = setup.weather.expect("weather configured");
    assert_eq!(weather.requested_cities(), vec!["La Paz".to_string()]);
}

#[tokio::test]
async fn non_weather_question_never_consults_the_provider() {
    let setup = build_bot(TestSetupOptions {
        with_weather: true,
        ..TestSetupOptions::default()
    });
    setup.bot.initialize();
    wait_until_ready(&setup.bot).await;

    setup.bot.answer("censo", "s1").await;

    let weather = setup.weather.expect("weather configured");
    assert!(weather.requested_cities().is_empty());
}
