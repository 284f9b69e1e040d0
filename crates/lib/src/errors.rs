use thiserror::Error;

/// Errors produced by the HTTP backend providers (generative, embedding,
/// sentiment). Callers are expected to catch these at the call site and fall
/// back rather than surface them to the user.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to build Reqwest client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("Failed to send request to backend: {0}")]
    Request(reqwest::Error),
    #[error("Failed to deserialize backend response: {0}")]
    Deserialization(reqwest::Error),
    #[error("Backend returned an error: {0}")]
    Api(String),
    #[error("Backend returned an empty response")]
    EmptyResponse,
}

/// Validation errors raised by `NewsBotBuilder::build`.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("An article collector is required")]
    MissingCollector,
    #[error("An embedding provider is required")]
    MissingEmbedder,
    #[error("A sentiment model is required")]
    MissingSentimentModel,
}

/// Errors from the collect → enrich → index initialization pipeline.
///
/// Any of these halts initialization; the bot stays not-ready until an
/// explicit re-trigger.
#[derive(Error, Debug)]
pub enum InitError {
    #[error("Article collection failed: {0}")]
    Collect(#[from] crate::ingest::CollectError),
    #[error("Index build failed: {0}")]
    Index(#[from] crate::search::SearchError),
}
