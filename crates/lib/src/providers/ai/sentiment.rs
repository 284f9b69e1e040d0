//! # Star-Rating Sentiment Backend
//!
//! The fallback stage of the sentiment classifier delegates to a
//! pretrained multilingual star-rating model served over HTTP (the
//! HuggingFace inference protocol: a text in, a list of `label`/`score`
//! candidates out, labels shaped like `"4 stars"`).

use crate::errors::ProviderError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A star rating produced by the model: 1–5 stars plus the model's own
/// confidence in that rating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarRating {
    pub stars: u8,
    pub score: f32,
}

/// A trait for the star-rating sentiment model.
///
/// Inputs are expected to be pre-truncated by the caller; the classifier
/// never sends more than 512 characters.
#[async_trait]
pub trait SentimentModel: Send + Sync + Debug + DynClone {
    async fn rate(&self, text: &str) -> Result<StarRating, ProviderError>;
}

dyn_clone::clone_trait_object!(SentimentModel);

// --- Inference API request and response structures ---

#[derive(Serialize, Debug)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize, Debug)]
struct LabelScore {
    label: String,
    score: f32,
}

/// A [`SentimentModel`] backed by an HTTP inference endpoint.
#[derive(Clone, Debug)]
pub struct ApiSentimentModel {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
}

impl ApiSentimentModel {
    pub fn new(api_url: String, api_key: Option<String>) -> Result<Self, ProviderError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(ProviderError::ClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl SentimentModel for ApiSentimentModel {
    async fn rate(&self, text: &str) -> Result<StarRating, ProviderError> {
        let mut request_builder = self.client.post(&self.api_url);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        let response = request_builder
            .json(&InferenceRequest { inputs: text })
            .send()
            .await
            .map_err(ProviderError::Request)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(error_text));
        }

        // The endpoint answers with one candidate list per input; we only
        // ever send one input.
        let candidates: Vec<Vec<LabelScore>> = response
            .json()
            .await
            .map_err(ProviderError::Deserialization)?;

        let best = candidates
            .into_iter()
            .next()
            .and_then(|row| {
                row.into_iter().max_by(|a, b| {
                    a.score
                        .partial_cmp(&b.score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
            })
            .ok_or(ProviderError::EmptyResponse)?;

        let stars: u8 = best
            .label
            .split_whitespace()
            .next()
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| {
                ProviderError::Api(format!("unexpected rating label: '{}'", best.label))
            })?;

        Ok(StarRating {
            stars,
            score: best.score,
        })
    }
}
