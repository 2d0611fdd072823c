//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the backend.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the backend.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// File-based route tree settings.
    pub routes: RoutesConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Structured generation service settings.
    pub generation: GenerationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Route tree configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Root directory scanned for route files.
    pub dir: PathBuf,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("routes"),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    /// Must cover the longest chain of generation calls a route makes.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 200 }
    }
}

/// Structured generation (language model) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base URL of an OpenAI-compatible API (e.g., "https://api.openai.com/v1/").
    pub base_url: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// Sampling temperature (0.0 - 2.0).
    pub temperature: f32,

    /// Maximum number of output tokens.
    pub max_tokens: u32,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1/".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.75,
            max_tokens: 4000,
            timeout_secs: 90,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
