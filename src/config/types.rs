use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::providers::GEMINI_BASE_URL;

// ============================================================================
// Server Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Directory the index page is served from.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_port() -> u16 {
    5000
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

// ============================================================================
// Upstream Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for a single catalog page fetch, in seconds.
    #[serde(default = "default_list_timeout")]
    pub list_timeout_secs: u64,
    /// Timeout for a single generateContent call, in seconds.
    #[serde(default = "default_generate_timeout")]
    pub generate_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            list_timeout_secs: default_list_timeout(),
            generate_timeout_secs: default_generate_timeout(),
        }
    }
}

fn default_base_url() -> String {
    GEMINI_BASE_URL.to_string()
}

fn default_list_timeout() -> u64 {
    15
}

fn default_generate_timeout() -> u64 {
    120
}
