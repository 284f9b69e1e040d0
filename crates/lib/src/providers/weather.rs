//! # Auxiliary Weather Context
//!
//! The boundary to the weather collaborator. The core only knows the
//! [`WeatherProvider`] trait and the [`WeatherReport`] record it yields;
//! the actual lookup (geocoding, forecast API) lives outside this crate.

use async_trait::async_trait;
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Current conditions for one city, as delivered by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature: f64,
    pub condition: String,
    /// A locale-appropriate icon (the providers use weather emoji).
    pub icon: String,
    /// The resolved place name, which may differ from the requested key.
    pub city: String,
}

impl WeatherReport {
    /// One-line Spanish summary, used both as auxiliary prompt context and
    /// as the body of the injected pseudo-article.
    pub fn summary_es(&self) -> String {
        format!(
            "{} {} en {}. Temperatura actual: {}°C.",
            self.icon, self.condition, self.city, self.temperature
        )
    }
}

/// A provider of current weather for a named place.
///
/// Lookup failures are reported as `None`: weather is auxiliary context and
/// its absence must never surface as an error to the user.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug + DynClone {
    async fn current(&self, city: &str) -> Option<WeatherReport>;
}

dyn_clone::clone_trait_object!(WeatherProvider);

/// Department capitals recognized in questions. The first entry is the
/// fallback when no city is mentioned.
pub const CITIES: &[&str] = &[
    "Santa Cruz",
    "La Paz",
    "Cochabamba",
    "Sucre",
    "Tarija",
    "Oruro",
    "Potosí",
    "Trinidad",
    "Cobija",
];

/// Finds the first known city mentioned in a question, ignoring case.
pub fn city_in(question: &str) -> Option<&'static str> {
    let question = question.to_lowercase();
    CITIES
        .iter()
        .find(|city| question.contains(&city.to_lowercase()))
        .copied()
}
