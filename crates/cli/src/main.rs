//! # noticiero-cli: A terminal chat driver for `noticiero`
//!
//! Wires the HTTP backend providers and a demo article set into a
//! [`NewsBot`] and runs an interactive question loop on stdin. Real
//! deployments replace the demo collector with one backed by a news
//! source; this binary exists to exercise the full pipeline end to end.

use anyhow::{Context, Result};
use clap::Parser;
use noticiero::{
    ingest::StaticCollector,
    progress::LogSink,
    providers::ai::{
        embedding::ApiEmbeddingProvider, local::LocalAiProvider, sentiment::ApiSentimentModel,
    },
    Article, BotConfig, BotPhase, NewsBot,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// OpenAI-compatible embeddings endpoint
    #[arg(long, env = "EMBEDDINGS_API_URL")]
    embeddings_api_url: String,

    /// Embedding model name
    #[arg(long, env = "EMBEDDINGS_MODEL", default_value = "paraphrase-multilingual-minilm-l12-v2")]
    embeddings_model: String,

    #[arg(long, env = "EMBEDDINGS_API_KEY")]
    embeddings_api_key: Option<String>,

    /// Star-rating sentiment inference endpoint
    #[arg(long, env = "SENTIMENT_API_URL")]
    sentiment_api_url: String,

    #[arg(long, env = "SENTIMENT_API_KEY")]
    sentiment_api_key: Option<String>,

    /// OpenAI-compatible chat completions endpoint; without it the bot
    /// answers with the deterministic template
    #[arg(long, env = "AI_API_URL")]
    ai_api_url: Option<String>,

    #[arg(long, env = "AI_API_KEY")]
    ai_api_key: Option<String>,

    #[arg(long, env = "AI_MODEL")]
    ai_model: Option<String>,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let embedder = ApiEmbeddingProvider::new(
        cli.embeddings_api_url,
        cli.embeddings_model,
        cli.embeddings_api_key,
    )
    .context("failed to construct embedding provider")?;

    let sentiment_model = ApiSentimentModel::new(cli.sentiment_api_url, cli.sentiment_api_key)
        .context("failed to construct sentiment model")?;

    let mut builder = NewsBot::builder()
        .collector(Arc::new(StaticCollector::new(demo_articles())))
        .embedder(Arc::new(embedder))
        .sentiment_model(Arc::new(sentiment_model))
        .progress_sink(Arc::new(LogSink))
        .config(BotConfig::from_env());

    if let Some(ai_api_url) = cli.ai_api_url {
        let provider = LocalAiProvider::new(ai_api_url, cli.ai_api_key, cli.ai_model)
            .context("failed to construct AI provider")?;
        builder = builder.ai_provider(Arc::new(provider));
    }

    let bot = Arc::new(builder.build()?);

    println!("🇧🇴 Noticiero — asistente de noticias");
    if bot.generative_enabled() {
        println!("🤖 Modo generativo activado.");
    } else {
        println!("📋 Sin proveedor de IA: respuestas en modo plantilla.");
    }
    println!("Inicializando en segundo plano; escribe tu pregunta y presiona Enter.");
    println!("Escribe 'salir' para terminar.\n");

    bot.initialize();
    wait_until_settled(&bot).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.eq_ignore_ascii_case("salir") || question.eq_ignore_ascii_case("exit") {
            break;
        }

        let answer = bot.answer(question, "cli").await;
        println!("\n{answer}\n");
    }

    println!("¡Hasta luego!");
    Ok(())
}

/// Polls the bot status until initialization finishes one way or the other,
/// echoing progress to the terminal.
async fn wait_until_settled(bot: &Arc<NewsBot>) {
    let mut last_action = String::new();
    loop {
        let status = bot.status();
        match status.phase {
            BotPhase::Ready => {
                println!("✅ Listo: {} noticias indexadas.\n", status.news_count);
                return;
            }
            BotPhase::Uninitialized => {
                println!("❌ La inicialización falló; revisa los logs.\n");
                return;
            }
            BotPhase::Initializing => {
                if status.current_action != last_action {
                    println!("   [{:>3}%] {}", status.progress, status.current_action);
                    last_action = status.current_action;
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

/// A small built-in article set so the binary runs without a live news
/// source.
fn demo_articles() -> Vec<Article> {
    let article = |title: &str, url: &str, body: &str| Article {
        title: title.to_string(),
        url: url.to_string(),
        summary: String::new(),
        body: body.to_string(),
        sentiment: None,
    };

    vec![
        article(
            "Bolivia clasificó al mundial tras vencer 3-0 en un partido histórico",
            "https://eldeber.com.bo/deportes/clasificacion-historica",
            "La selección boliviana logró una victoria histórica y clasificó al mundial \
             tras vencer 3-0. Miles de aficionados celebraron en las calles de Santa Cruz \
             y La Paz hasta la madrugada.",
        ),
        article(
            "Bloqueo de carreteras afecta el transporte en el eje troncal",
            "https://eldeber.com.bo/pais/bloqueo-carreteras",
            "El bloqueo de carreteras iniciado este lunes afecta el transporte de carga y \
             pasajeros en el eje troncal. Los transportistas piden diálogo para levantar \
             la medida.",
        ),
        article(
            "El gobierno presenta los resultados preliminares del censo",
            "https://eldeber.com.bo/pais/censo-resultados",
            "El instituto de estadística presentó los resultados preliminares del censo \
             nacional de población y vivienda. Las cifras serán la base para la \
             redistribución de recursos entre departamentos.",
        ),
        article(
            "Inauguración de nuevo hospital beneficiará a miles de familias",
            "https://eldeber.com.bo/sociedad/hospital-inauguracion",
            "La inauguración del nuevo hospital de tercer nivel fue celebrada por los \
             vecinos de la zona norte. El centro médico beneficiará a miles de familias \
             con atención especializada.",
        ),
    ]
}
