use serde::{Deserialize, Serialize};

/// Application configuration loaded from `config.toml`.
/// Environment variables override individual fields at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Directory uploaded chat attachments and documents land in.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
    /// Max requests per client per minute; 0 disables rate limiting.
    #[serde(default)]
    pub rate_limit_per_minute: u32,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_uploads_dir() -> String {
    "uploads/documents".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            uploads_dir: default_uploads_dir(),
            rate_limit_per_minute: 0,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
        }
    }
}
