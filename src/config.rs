//! Application configuration module
//!
//! Manages application configuration loaded from config.json.
//! Creates a default config file on first run.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Chatbot configuration
    pub chatbot: ChatbotConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Data directory path
    pub data_dir: String,
    /// Main database file path (relative to data_dir)
    pub db_file: String,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign access tokens; generated on first run
    pub token_secret: String,
    /// Access token lifetime in minutes
    pub token_ttl_minutes: i64,
}

/// Chatbot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotConfig {
    /// Q&A dataset file path
    pub dataset_file: String,
    /// Embedding model cache directory; empty means platform cache dir
    pub model_cache_dir: String,
    /// Minimum score for a dataset answer to be returned
    pub similarity_threshold: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            chatbot: ChatbotConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            db_file: "bizbuddy.db".to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: generate_token_secret(48),
            token_ttl_minutes: 30,
        }
    }
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            dataset_file: "data/qa_dataset.json".to_string(),
            model_cache_dir: String::new(),
            similarity_threshold: 0.45,
        }
    }
}

/// Generate a random token signing secret
fn generate_token_secret(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz23456789";
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

impl AppConfig {
    /// Get the full database URL
    pub fn get_database_url(&self) -> String {
        let db_path = Path::new(&self.database.data_dir).join(&self.database.db_file);
        format!("sqlite:{}?mode=rwc", db_path.to_string_lossy())
    }

    /// Get the full data directory path
    pub fn get_data_dir(&self) -> PathBuf {
        PathBuf::from(&self.database.data_dir)
    }

    /// Get the embedding model cache directory
    pub fn get_model_cache_dir(&self) -> PathBuf {
        if self.chatbot.model_cache_dir.is_empty() {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join("bizbuddy")
                .join("models")
        } else {
            PathBuf::from(&self.chatbot.model_cache_dir)
        }
    }

    /// Get the server bind address
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Get the config file path
fn get_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.json")
}

/// Load configuration from file, or create default if not exists
pub fn load_config() -> Result<AppConfig, String> {
    let config_path = get_config_path();

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    } else {
        let config = AppConfig::default();
        save_config(&config)?;
        tracing::info!("Created default configuration at {:?}", config_path);
        Ok(config)
    }
}

/// Save configuration to file
pub fn save_config(config: &AppConfig) -> Result<(), String> {
    let config_path = get_config_path();

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    std::fs::write(&config_path, content)
        .map_err(|e| format!("Failed to write config file: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.auth.token_ttl_minutes, 30);
        assert!((config.chatbot.similarity_threshold - 0.45).abs() < f32::EPSILON);
        assert_eq!(config.get_bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_token_secret_generated() {
        let a = AppConfig::default();
        let b = AppConfig::default();
        assert_eq!(a.auth.token_secret.len(), 48);
        // Two fresh configs must not share a secret
        assert_ne!(a.auth.token_secret, b.auth.token_secret);
    }

    #[test]
    fn test_database_url() {
        let config = AppConfig::default();
        assert_eq!(config.get_database_url(), "sqlite:data/bizbuddy.db?mode=rwc");
    }

    #[test]
    fn test_config_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.auth.token_secret, config.auth.token_secret);
        assert_eq!(parsed.chatbot.dataset_file, config.chatbot.dataset_file);
    }
}
