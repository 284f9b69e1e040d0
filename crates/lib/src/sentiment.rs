//! # Hybrid Sentiment Classification
//!
//! Articles are labeled by a two-stage policy: a domain-specific keyword
//! pass first (whole-word matches against fixed Spanish term sets, with
//! negative terms taking absolute priority), then a pretrained multilingual
//! star-rating model as the fallback for anything the keywords do not
//! decide. The keyword stage exists because the news domain has terms
//! ("bloqueo", "feminicidio") whose polarity a generic star model gets
//! wrong.

use crate::{
    progress::{ProgressSink, ProgressUpdate},
    providers::ai::sentiment::SentimentModel,
    types::{Article, Confidence, Sentiment, SentimentInfo},
};
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// Classifier input is truncated to this many characters before it reaches
/// the star-rating model.
const MODEL_INPUT_CHARS: usize = 512;

/// Model scores above this cut are reported as high confidence.
const HIGH_CONFIDENCE_SCORE: f32 = 0.7;

const NEGATIVE_TERMS: &[&str] = &[
    "muerte",
    "falleció",
    "fallecimiento",
    "accidente",
    "tragedia",
    "bloqueo",
    "protesta",
    "enfrentamiento",
    "represión",
    "huelga",
    "inundación",
    "desastre",
    "crisis",
    "delincuencia",
    "corrupción",
    "violencia",
    "robo",
    "asesinato",
    "homicidio",
    "secuestro",
    "pandemia",
    "fallece",
    "se accidentó",
    "muerto",
    "herido",
    "víctima",
    "victimas",
    "víctimas",
    "ataque",
    "amenaza",
    "denuncia",
    "conflicto",
    "feminicidio",
    "abuso",
    "abuso sexual",
    "violencia de género",
];

const POSITIVE_TERMS: &[&str] = &[
    "ganó",
    "triunfo",
    "campeón",
    "clasificó",
    "acuerdo",
    "celebración",
    "inauguración",
    "construcción",
    "crecimiento",
    "paz",
    "seguridad",
    "desarrollo",
    "progreso",
    "mejora",
    "éxito",
    "victoria",
    "inauguró",
    "concluyó",
    "completó",
    "superó",
    "logro",
    "récord",
    "premio",
    "reconocimiento",
    "avance",
    "beneficio",
    "esperanza",
    "solución",
];

/// The keyword sets driving the override stage, compiled to whole-word
/// matchers. The defaults are the Bolivian news term sets; a different
/// domain or language supplies its own via [`SentimentLexicon::new`].
#[derive(Debug, Clone)]
pub struct SentimentLexicon {
    negative: Vec<Regex>,
    positive: Vec<Regex>,
}

impl SentimentLexicon {
    /// Compiles a lexicon from raw term lists. Terms may contain spaces
    /// ("abuso sexual"); each is matched as a whole word or phrase.
    pub fn new(negative: &[&str], positive: &[&str]) -> Result<Self, regex::Error> {
        let compile = |terms: &[&str]| -> Result<Vec<Regex>, regex::Error> {
            terms
                .iter()
                .map(|term| Regex::new(&format!(r"\b{}\b", regex::escape(term))))
                .collect()
        };
        Ok(Self {
            negative: compile(negative)?,
            positive: compile(positive)?,
        })
    }

    /// Number of distinct negative terms present in the (lower-cased) text.
    fn negative_matches(&self, text: &str) -> usize {
        self.negative.iter().filter(|re| re.is_match(text)).count()
    }

    fn positive_matches(&self, text: &str) -> usize {
        self.positive.iter().filter(|re| re.is_match(text)).count()
    }
}

impl Default for SentimentLexicon {
    fn default() -> Self {
        // The built-in term lists are valid patterns once escaped.
        Self::new(NEGATIVE_TERMS, POSITIVE_TERMS).expect("built-in lexicon must compile")
    }
}

fn term_count_rationale(count: usize, polarity: &str) -> String {
    let plural = if count > 1 { "s" } else { "" };
    format!("{count} término{plural} {polarity}{plural}")
}

/// The hybrid classifier. Pure over its input text: classifying the same
/// text twice yields the same label.
#[derive(Clone, Debug)]
pub struct SentimentAnalyzer {
    model: Arc<dyn SentimentModel>,
    lexicon: SentimentLexicon,
}

impl SentimentAnalyzer {
    pub fn new(model: Arc<dyn SentimentModel>, lexicon: SentimentLexicon) -> Self {
        Self { model, lexicon }
    }

    /// Classifies a text.
    ///
    /// Priority order: negative keywords, then positive keywords, then the
    /// star-rating model (1–2 stars negative, 3 neutral, 4–5 positive).
    /// Empty input and model failures both degrade to Neutral/Low.
    pub async fn classify(&self, text: &str) -> SentimentInfo {
        if text.trim().is_empty() {
            return SentimentInfo {
                label: Sentiment::Neutral,
                confidence: Confidence::Low,
                rationale: "Sin contenido".to_string(),
            };
        }

        let lower = text.to_lowercase();

        let negative = self.lexicon.negative_matches(&lower);
        if negative > 0 {
            return SentimentInfo {
                label: Sentiment::Negative,
                confidence: Confidence::High,
                rationale: term_count_rationale(negative, "negativo"),
            };
        }

        let positive = self.lexicon.positive_matches(&lower);
        if positive > 0 {
            return SentimentInfo {
                label: Sentiment::Positive,
                confidence: Confidence::High,
                rationale: term_count_rationale(positive, "positivo"),
            };
        }

        let truncated: String = text.chars().take(MODEL_INPUT_CHARS).collect();
        match self.model.rate(&truncated).await {
            Ok(rating) => {
                let label = match rating.stars {
                    0..=2 => Sentiment::Negative,
                    3 => Sentiment::Neutral,
                    _ => Sentiment::Positive,
                };
                let confidence = if rating.score > HIGH_CONFIDENCE_SCORE {
                    Confidence::High
                } else {
                    Confidence::Medium
                };
                SentimentInfo {
                    label,
                    confidence,
                    rationale: format!(
                        "Modelo: {}★ (confianza: {:.2})",
                        rating.stars, rating.score
                    ),
                }
            }
            Err(e) => {
                warn!("Sentiment model call failed, defaulting to neutral: {e}");
                SentimentInfo {
                    label: Sentiment::Neutral,
                    confidence: Confidence::Low,
                    rationale: "Error en análisis".to_string(),
                }
            }
        }
    }

    /// Annotates every article in place (title + body as classifier input)
    /// and reports the running count to the progress sink. Idempotent:
    /// re-running over already-labeled articles reproduces the same labels.
    pub async fn enrich_all(&self, articles: &mut [Article], progress: &dyn ProgressSink) {
        let total = articles.len();
        for (i, article) in articles.iter_mut().enumerate() {
            let text = format!("{} {}", article.title, article.body);
            article.sentiment = Some(self.classify(&text).await);
            progress.report(&ProgressUpdate::enriching(i + 1, total));
        }
    }
}

/// Per-label counts over an article set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentTally {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentTally {
    /// Counts labels across a set. Unlabeled articles count as neutral.
    pub fn count(articles: &[Article]) -> Self {
        let mut tally = Self::default();
        for article in articles {
            match article.sentiment.as_ref().map(|s| s.label) {
                Some(Sentiment::Positive) => tally.positive += 1,
                Some(Sentiment::Negative) => tally.negative += 1,
                Some(Sentiment::Neutral) | None => tally.neutral += 1,
            }
        }
        tally
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    pub fn get(&self, label: Sentiment) -> usize {
        match label {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }

    /// Share of a label in the set, 0–100. Zero for an empty set.
    pub fn percentage(&self, label: Sentiment) -> f32 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.get(label) as f32 * 100.0 / total as f32
    }

    /// Renders the aggregate stats line handed to the answer composer.
    pub fn summary_es(&self) -> String {
        format!(
            "📊 Resumen de sentimientos ({} noticias): 😊 positivas {} ({:.1}%), 😐 neutrales {} ({:.1}%), 😞 negativas {} ({:.1}%)",
            self.total(),
            self.positive,
            self.percentage(Sentiment::Positive),
            self.neutral,
            self.percentage(Sentiment::Neutral),
            self.negative,
            self.percentage(Sentiment::Negative),
        )
    }
}

/// Returns the articles carrying the given label, preserving their original
/// relative order.
pub fn filter_by(articles: &[Article], label: Sentiment) -> Vec<Article> {
    articles
        .iter()
        .filter(|a| a.sentiment.as_ref().is_some_and(|s| s.label == label))
        .cloned()
        .collect()
}

/// Detects questions that ask for news of one sentiment ("noticias
/// positivas", "algo bueno") rather than news about a topic. Plain
/// substring matching over the lower-cased question, one keyword list per
/// label; the table is swappable for other locales.
#[derive(Debug, Clone)]
pub struct SentimentQueryRules {
    rules: Vec<(Vec<String>, Sentiment)>,
}

impl SentimentQueryRules {
    pub fn new(rules: Vec<(Vec<String>, Sentiment)>) -> Self {
        Self { rules }
    }

    /// The label the question asks for, if any. Earlier rules win.
    pub fn detect(&self, question: &str) -> Option<Sentiment> {
        let question = question.to_lowercase();
        self.rules
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| question.contains(k.as_str())))
            .map(|(_, label)| *label)
    }
}

impl Default for SentimentQueryRules {
    fn default() -> Self {
        let owned = |terms: &[&str]| terms.iter().map(|t| t.to_string()).collect::<Vec<_>>();
        Self::new(vec![
            (
                owned(&["positiva", "positivas", "buena", "buenas", "alegre", "alegres"]),
                Sentiment::Positive,
            ),
            (
                owned(&["negativa", "negativas", "mala", "malas", "triste", "tristes"]),
                Sentiment::Negative,
            ),
            (
                owned(&["neutral", "neutrales", "normal", "normales"]),
                Sentiment::Neutral,
            ),
        ])
    }
}
