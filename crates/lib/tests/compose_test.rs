//! # Answer Composer Tests
//!
//! Covers the templated rendering (bars, truncation, no-results), the
//! generative prompt assembly, the fallback result on provider failure,
//! the sources footer and the weather pseudo-article.

use noticiero::compose::{
    render_templated, sources_footer, weather_hit, AnswerComposer, ComposeMode, ComposeRequest,
    WeatherQueryRules, NO_RESULTS_MESSAGE,
};
use noticiero::providers::weather::WeatherReport;
use noticiero::sentiment::SentimentTally;
use noticiero::session::{HistoryEntry, Role};
use noticiero::types::{Confidence, SearchHit, Sentiment, SentimentInfo};
use noticiero_test_utils::{article, FailingAiProvider, MockAiProvider};
use std::sync::Arc;

fn hit(title: &str, url: &str, body: &str, score: f32) -> SearchHit {
    SearchHit {
        article: article(title, url, body),
        score,
    }
}

fn request<'a>(question: &'a str, articles: &'a [SearchHit]) -> ComposeRequest<'a> {
    ComposeRequest {
        question,
        articles,
        history: &[],
        prior_context: &[],
        from_stored_context: false,
        stats: None,
        auxiliary: None,
    }
}

#[test]
fn templated_answer_renders_bars_and_links() {
    let hits = vec![
        hit(
            "El censo nacional avanza",
            "https://noticias.test/censo",
            "El operativo del censo nacional se desarrolla sin contratiempos en todos los \
             departamentos del país, según el reporte oficial difundido esta mañana.",
            0.85,
        ),
        hit(
            "Lluvias en el altiplano",
            "https://noticias.test/lluvias",
            "Pronóstico extendido de precipitaciones para los próximos días en la región.",
            0.41,
        ),
    ];

    let text = render_templated(&hits);

    assert!(text.contains("📰 Encontré 2 noticias relevantes:"));
    assert!(text.contains("📌 1. El censo nacional avanza"));
    assert!(text.contains("📊 Relevancia: ████ 85%"));
    assert!(text.contains("📊 Relevancia: ██ 41%"));
    assert!(text.contains("🔗 https://noticias.test/censo"));
}

#[test]
fn templated_answer_truncates_long_summaries() {
    let long_body = "palabra ".repeat(60);
    let hits = vec![hit("Título", "https://noticias.test/x", &long_body, 0.5)];

    let text = render_templated(&hits);

    let summary_line = text
        .lines()
        .find(|l| l.contains("📝"))
        .expect("summary line expected");
    assert!(summary_line.ends_with("..."));
    // 150 characters of summary plus the marker and ellipsis.
    assert!(summary_line.chars().count() < 165);
}

#[test]
fn templated_answer_skips_short_summaries() {
    let hits = vec![hit("Título breve", "https://noticias.test/x", "Muy corto.", 0.5)];

    let text = render_templated(&hits);

    assert!(!text.contains("📝"));
    assert!(text.contains("🔗 https://noticias.test/x"));
}

#[test]
fn templated_answer_shows_at_most_three_articles() {
    let hits: Vec<SearchHit> = (0..5)
        .map(|i| {
            hit(
                &format!("Noticia {i}"),
                &format!("https://noticias.test/{i}"),
                "Cuerpo.",
                0.9,
            )
        })
        .collect();

    let text = render_templated(&hits);

    assert!(text.contains("📌 3."));
    assert!(!text.contains("📌 4."));
}

#[test]
fn empty_set_renders_the_no_results_message() {
    assert_eq!(render_templated(&[]), NO_RESULTS_MESSAGE);
}

#[tokio::test]
async fn composer_without_provider_uses_the_template() {
    let composer = AnswerComposer::new(None, 4);
    let hits = vec![hit("Noticia", "https://noticias.test/n", "Cuerpo.", 0.6)];

    let answer = composer.compose(&request("¿qué pasó?", &hits)).await;

    assert_eq!(answer.mode, ComposeMode::Templated);
    assert!(answer.fallback_reason.is_none());
    assert!(answer.text.contains("📰 Encontré 1 noticia relevante:"));
}

#[tokio::test]
async fn composer_with_empty_set_returns_no_results() {
    let ai = MockAiProvider::new("nunca debería llamarse");
    let composer = AnswerComposer::new(Some(Arc::new(ai.clone())), 4);

    let answer = composer.compose(&request("¿qué pasó?", &[])).await;

    assert_eq!(answer.text, NO_RESULTS_MESSAGE);
    assert_eq!(answer.mode, ComposeMode::Templated);
    assert!(ai.get_calls().is_empty(), "no articles, no generative call");
}

#[tokio::test]
async fn generative_prompt_carries_articles_history_and_extras() {
    let ai = MockAiProvider::new("Según las noticias, el censo avanza.");
    let composer = AnswerComposer::new(Some(Arc::new(ai.clone())), 4);

    let hits = vec![hit(
        "El censo nacional avanza",
        "https://noticias.test/censo",
        "Cuerpo de la noticia sobre el censo.",
        0.85,
    )];
    let history = vec![
        HistoryEntry {
            role: Role::User,
            text: "hola".to_string(),
        },
        HistoryEntry {
            role: Role::Assistant,
            text: "¡Hola! ¿Sobre qué quieres saber?".to_string(),
        },
    ];
    let stats = SentimentTally {
        positive: 2,
        negative: 1,
        neutral: 2,
    };

    let answer = composer
        .compose(&ComposeRequest {
            question: "¿cómo va el censo?",
            articles: &hits,
            history: &history,
            prior_context: &[],
            from_stored_context: false,
            stats: Some(&stats),
            auxiliary: Some("☀️ Cielo despejado en Santa Cruz. Temperatura actual: 28°C."),
        })
        .await;

    assert_eq!(answer.mode, ComposeMode::Generative);
    assert_eq!(answer.text, "Según las noticias, el censo avanza.");

    let calls = ai.get_calls();
    assert_eq!(calls.len(), 1);
    let (system, user) = &calls[0];
    assert!(system.contains("asistente de noticias"));
    assert!(user.contains("El censo nacional avanza"));
    assert!(user.contains("PREGUNTA: ¿cómo va el censo?"));
    assert!(user.contains("Usuario: hola"));
    assert!(user.contains("Resumen de sentimientos"));
    assert!(user.contains("CONTEXTO ADICIONAL: ☀️ Cielo despejado"));
}

#[tokio::test]
async fn follow_up_prompt_marks_the_stored_context() {
    let ai = MockAiProvider::new("Claro, te cuento más.");
    let composer = AnswerComposer::new(Some(Arc::new(ai.clone())), 4);

    let stored = vec![hit(
        "Noticia guardada",
        "https://noticias.test/guardada",
        "Cuerpo.",
        0.7,
    )];

    composer
        .compose(&ComposeRequest {
            question: "profundiza en la primera",
            articles: &stored,
            history: &[],
            prior_context: &stored,
            from_stored_context: true,
            stats: None,
            auxiliary: None,
        })
        .await;

    let (_, user) = &ai.get_calls()[0];
    assert!(user.contains("Ninguno (pregunta de seguimiento)."));
    let previous_section = user
        .split("NOTICIAS VISTAS ANTERIORMENTE:")
        .nth(1)
        .expect("previous section present");
    assert!(previous_section.contains("Noticia guardada"));
}

#[tokio::test]
async fn provider_failure_falls_back_to_the_template() {
    let composer = AnswerComposer::new(Some(Arc::new(FailingAiProvider)), 4);
    let hits = vec![hit("Noticia", "https://noticias.test/n", "Cuerpo.", 0.6)];

    let answer = composer.compose(&request("¿qué pasó?", &hits)).await;

    assert_eq!(answer.mode, ComposeMode::Templated);
    let reason = answer.fallback_reason.expect("fallback reason recorded");
    assert!(reason.contains("simulated backend outage"));
    assert!(answer.text.contains("📰 Encontré 1 noticia relevante:"));
}

#[test]
fn sources_footer_lists_links_with_sentiment() {
    let mut enriched = article(
        "Inauguración del hospital celebrada por los vecinos de toda la zona norte",
        "https://noticias.test/hospital",
        "Cuerpo.",
    );
    enriched.sentiment = Some(SentimentInfo {
        label: Sentiment::Positive,
        confidence: Confidence::High,
        rationale: "1 término positivo".to_string(),
    });
    let hits = vec![
        SearchHit {
            article: enriched,
            score: 0.9,
        },
        hit("Sin sentimiento", "https://noticias.test/raw", "Cuerpo.", 0.5),
    ];

    let footer = sources_footer(&hits);

    assert!(footer.contains("📚 **Fuentes:**"));
    assert!(footer.contains("](https://noticias.test/hospital) 😊 Positivo (Alto)"));
    // Titles longer than 50 characters are shortened.
    assert!(footer.contains("..."));
    assert!(footer.contains("](https://noticias.test/raw)\n"));
}

#[test]
fn weather_rules_and_pseudo_article() {
    let rules = WeatherQueryRules::default();
    assert!(rules.matches("¿Qué clima hay hoy?"));
    assert!(rules.matches("¿va a haber LLUVIA mañana?"));
    assert!(!rules.matches("noticias de economía"));

    let report = WeatherReport {
        temperature: 18.0,
        condition: "Parcialmente nublado".to_string(),
        icon: "⛅".to_string(),
        city: "La Paz".to_string(),
    };
    let hit = weather_hit(&report);

    assert!((hit.score - 0.99).abs() < f32::EPSILON);
    assert!(hit.article.title.contains("La Paz"));
    assert!(hit.article.summary.contains("18"));
    assert!(hit.article.summary.contains("Parcialmente nublado"));
}
