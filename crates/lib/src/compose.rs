//! # Answer Composition
//!
//! Turns a ranked article set into the user-facing answer text. Two
//! mutually exclusive modes: a generative mode that delegates to an
//! [`AiProvider`], and a deterministic templated mode used when no provider
//! is configured or the provider call fails. The outcome is an explicit
//! [`ComposedAnswer`] carrying the mode and any fallback reason, so the
//! fallback path is observable and testable without a live backend.

use crate::{
    errors::ProviderError,
    prompts::{ANSWER_SYSTEM_PROMPT, ANSWER_USER_PROMPT},
    providers::{ai::AiProvider, weather::WeatherReport},
    sentiment::SentimentTally,
    session::{HistoryEntry, Role},
    types::{Article, SearchHit},
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Articles rendered in an answer (templated body, prompt context, sources).
const RENDERED_ARTICLES: usize = 3;

/// Characters of summary shown per article in the templated answer.
const SUMMARY_DISPLAY_CHARS: usize = 150;

/// Characters of body handed to the generative prompt per article.
const PROMPT_BODY_CHARS: usize = 500;

/// Score assigned to the injected weather pseudo-article. Close to the
/// cosine ceiling so it outranks every real hit.
const WEATHER_SCORE: f32 = 0.99;

/// The fixed reply for an empty article set.
pub const NO_RESULTS_MESSAGE: &str = "🔍 No encontré noticias relacionadas con tu pregunta.\n\n\
💡 **Sugerencias:**\n\
• Usa palabras clave más específicas\n\
• Pregunta sobre temas de actualidad boliviana";

/// Which path produced the answer text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeMode {
    Generative,
    Templated,
}

/// The composed answer plus how it was produced. `fallback_reason` is set
/// only when a generative attempt failed and the templated path took over.
#[derive(Debug, Clone)]
pub struct ComposedAnswer {
    pub text: String,
    pub mode: ComposeMode,
    pub fallback_reason: Option<String>,
}

/// Everything the composer needs for one turn.
#[derive(Debug)]
pub struct ComposeRequest<'a> {
    pub question: &'a str,
    /// The working article set for this turn (fresh search results, or the
    /// stored context when the question is a follow-up).
    pub articles: &'a [SearchHit],
    pub history: &'a [HistoryEntry],
    /// The previous turn's article set, rendered as its own prompt section.
    pub prior_context: &'a [SearchHit],
    /// True when `articles` is the stored context rather than fresh results.
    pub from_stored_context: bool,
    pub stats: Option<&'a SentimentTally>,
    /// Auxiliary context line (e.g. a weather summary) to weave in.
    pub auxiliary: Option<&'a str>,
}

pub struct AnswerComposer {
    ai: Option<Arc<dyn AiProvider>>,
    prompt_history_turns: usize,
}

impl AnswerComposer {
    pub fn new(ai: Option<Arc<dyn AiProvider>>, prompt_history_turns: usize) -> Self {
        Self {
            ai,
            prompt_history_turns,
        }
    }

    /// Whether a generative backend is configured.
    pub fn generative_enabled(&self) -> bool {
        self.ai.is_some()
    }

    /// Composes the answer for one turn.
    ///
    /// An empty working set always yields the fixed no-results message. A
    /// generative failure never reaches the caller as an error: the
    /// templated answer is returned with the reason recorded.
    pub async fn compose(&self, request: &ComposeRequest<'_>) -> ComposedAnswer {
        if request.articles.is_empty() {
            return ComposedAnswer {
                text: NO_RESULTS_MESSAGE.to_string(),
                mode: ComposeMode::Templated,
                fallback_reason: None,
            };
        }

        let mut fallback_reason = None;
        if let Some(ai) = &self.ai {
            match self.generate(ai.as_ref(), request).await {
                Ok(text) => {
                    return ComposedAnswer {
                        text,
                        mode: ComposeMode::Generative,
                        fallback_reason: None,
                    }
                }
                Err(e) => {
                    warn!("Generative call failed, falling back to template: {e}");
                    fallback_reason = Some(e.to_string());
                }
            }
        }

        ComposedAnswer {
            text: render_templated(request.articles),
            mode: ComposeMode::Templated,
            fallback_reason,
        }
    }

    async fn generate(
        &self,
        ai: &dyn AiProvider,
        request: &ComposeRequest<'_>,
    ) -> Result<String, ProviderError> {
        let history_block = render_history(request.history, self.prompt_history_turns);

        // On a follow-up the working set is the stored context, so the
        // "previously viewed" section carries it and the current section is
        // explicitly empty.
        let (current_block, previous_block) = if request.from_stored_context {
            (
                "Ninguno (pregunta de seguimiento).\n".to_string(),
                render_article_block(request.articles),
            )
        } else {
            (
                render_article_block(request.articles),
                if request.prior_context.is_empty() {
                    "Ninguna.\n".to_string()
                } else {
                    render_article_block(request.prior_context)
                },
            )
        };

        let mut extra = String::new();
        if let Some(stats) = request.stats {
            extra.push_str(&stats.summary_es());
            extra.push('\n');
        }
        if let Some(auxiliary) = request.auxiliary {
            extra.push_str("CONTEXTO ADICIONAL: ");
            extra.push_str(auxiliary);
            extra.push('\n');
        }
        if !extra.is_empty() {
            extra.push('\n');
        }

        let user_prompt = ANSWER_USER_PROMPT
            .replace("{history}", &history_block)
            .replace("{current}", &current_block)
            .replace("{previous}", &previous_block)
            .replace("{extra}", &extra)
            .replace("{question}", request.question);

        debug!(system_prompt = %ANSWER_SYSTEM_PROMPT, user_prompt = %user_prompt, "--> Sending prompts to AI provider");
        ai.generate(ANSWER_SYSTEM_PROMPT, &user_prompt).await
    }
}

fn render_history(history: &[HistoryEntry], turns: usize) -> String {
    if history.is_empty() || turns == 0 {
        return String::new();
    }
    let start = history.len().saturating_sub(turns);
    let mut block = String::from("CONVERSACIÓN PREVIA:\n");
    for entry in &history[start..] {
        let speaker = match entry.role {
            Role::User => "Usuario",
            Role::Assistant => "Asistente",
        };
        block.push_str(&format!("{speaker}: {}\n", entry.text));
    }
    block.push('\n');
    block
}

fn render_article_block(hits: &[SearchHit]) -> String {
    let mut block = String::new();
    for (i, hit) in hits.iter().take(RENDERED_ARTICLES).enumerate() {
        block.push_str(&format!(
            "NOTICIA {n}:\nTítulo: {title}\nContenido: {body}\n",
            n = i + 1,
            title = hit.article.title,
            body = truncate_chars(&hit.article.body, PROMPT_BODY_CHARS),
        ));
    }
    block
}

/// Renders the deterministic answer: per article a title, a relevance bar
/// (one '█' per 20 points of `score × 100`), a truncated summary and the
/// link.
pub fn render_templated(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return NO_RESULTS_MESSAGE.to_string();
    }

    let shown = hits.len().min(RENDERED_ARTICLES);
    let plural = if shown > 1 { "s" } else { "" };
    let mut text = format!("📰 Encontré {shown} noticia{plural} relevante{plural}:\n\n");

    let separator = "─".repeat(60);
    for (i, hit) in hits.iter().take(RENDERED_ARTICLES).enumerate() {
        let percent = (hit.score * 100.0).round() as i32;
        let bars = "█".repeat((percent.max(0) / 20) as usize);

        text.push_str(&format!("{separator}\n📌 {}. {}\n\n", i + 1, hit.article.title));
        text.push_str(&format!("   📊 Relevancia: {bars} {percent}%\n"));
        if hit.article.summary.chars().count() > 50 {
            text.push_str(&format!(
                "   📝 {}\n",
                truncate_with_ellipsis(&hit.article.summary, SUMMARY_DISPLAY_CHARS)
            ));
        }
        text.push_str(&format!("   🔗 {}\n\n", hit.article.url));
    }

    text.push_str(&format!("{separator}\n"));
    text.push_str("💡 Activa el modo generativo para obtener respuestas más elaboradas y contextualizadas.");
    text
}

/// The "Fuentes" footer appended to every retrieval answer: up to three
/// articles as markdown links, each tagged with its sentiment when the
/// article has been enriched.
pub fn sources_footer(hits: &[SearchHit]) -> String {
    let mut footer = String::from("\n\n---\n📚 **Fuentes:**\n");
    for hit in hits.iter().take(RENDERED_ARTICLES) {
        let title = truncate_with_ellipsis(&hit.article.title, 50);
        footer.push_str(&format!("• [{title}]({url})", url = hit.article.url));
        if let Some(sentiment) = &hit.article.sentiment {
            footer.push_str(&format!(
                " {} {} ({})",
                sentiment.label.emoji(),
                sentiment.label.label_es(),
                sentiment.confidence.label_es()
            ));
        }
        footer.push('\n');
    }
    footer
}

/// Keyword table deciding when a question asks about the weather. Substring
/// matching over the lower-cased question, swappable for other locales.
#[derive(Debug, Clone)]
pub struct WeatherQueryRules {
    keywords: Vec<String>,
}

impl WeatherQueryRules {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn matches(&self, question: &str) -> bool {
        let question = question.to_lowercase();
        self.keywords.iter().any(|k| question.contains(k.as_str()))
    }
}

impl Default for WeatherQueryRules {
    fn default() -> Self {
        Self::new(&[
            "clima",
            "tiempo",
            "temperatura",
            "lluvia",
            "llueve",
            "calor",
            "frío",
            "pronóstico",
        ])
    }
}

/// Builds the synthetic article injected at the front of the working set
/// when a weather question has a report available. The near-ceiling score
/// makes it dominate both the templated rendering and the prompt context.
pub fn weather_hit(report: &WeatherReport) -> SearchHit {
    let summary = report.summary_es();
    SearchHit {
        article: Article {
            title: format!("{} Clima en {}", report.icon, report.city),
            url: "https://open-meteo.com/".to_string(),
            summary: summary.clone(),
            body: summary,
            sentiment: None,
        },
        score: WEATHER_SCORE,
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut truncated: String = text.chars().take(max).collect();
        truncated.push_str("...");
        truncated
    } else {
        text.to_string()
    }
}
