//! Dependencies injected into route modules.

use std::sync::Arc;

use crate::config::{AppConfig, GenerationConfig};
use crate::services::ai::{GenerationClient, GenerationError, GenerationSettings, OpenAiClient};
use crate::services::{HealthProbe, ProcessProbe};

/// Shared services handed to every route module when it is loaded.
#[derive(Clone)]
pub struct AppContext {
    pub generation: Arc<dyn GenerationClient>,
    pub settings: GenerationSettings,
    pub health: Arc<dyn HealthProbe>,
}

impl AppContext {
    pub fn new(
        generation: Arc<dyn GenerationClient>,
        settings: GenerationSettings,
        health: Arc<dyn HealthProbe>,
    ) -> Self {
        Self {
            generation,
            settings,
            health,
        }
    }

    /// Build the production context: the configured generation client and
    /// the process health probe.
    pub fn from_config(config: &AppConfig) -> Result<Self, GenerationError> {
        let client = OpenAiClient::from_env(&config.generation)?;
        Ok(Self::new(
            Arc::new(client),
            GenerationSettings::from(&config.generation),
            Arc::new(ProcessProbe),
        ))
    }

    /// A context whose generation client has no credentials. Lookups work;
    /// AI routes fail with an upstream error.
    pub fn offline() -> Self {
        let config = GenerationConfig::default();
        let client = OpenAiClient::with_http(&config, reqwest::Client::new(), None);
        Self::new(
            Arc::new(client),
            GenerationSettings::from(&config),
            Arc::new(ProcessProbe),
        )
    }

    pub fn with_generation(mut self, generation: Arc<dyn GenerationClient>) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_health(mut self, health: Arc<dyn HealthProbe>) -> Self {
        self.health = health;
        self
    }
}
