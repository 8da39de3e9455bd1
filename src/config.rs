/// Configuration management for the review service
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub cors: CorsConfig,
    pub ai: AiConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub database_path: PathBuf,
    pub max_connections: u32,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Access token lifetime in minutes
    pub token_ttl_minutes: i64,
    /// Argon2 memory cost in KiB
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
}

/// Cross-origin configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any origin
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Language model proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub requests_per_minute: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8001".to_string())
            .parse()
            .map_err(|_| AppError::Validation("Invalid port number".to_string()))?;
        let version = env!("CARGO_PKG_VERSION").to_string();

        let database_path = env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/reviews.sqlite"));
        let max_connections = env_or("DATABASE_MAX_CONNECTIONS", 10);

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::Validation("JWT secret required".to_string()))?;
        let token_ttl_minutes = env_or("ACCESS_TOKEN_EXPIRE_MINUTES", 10080);
        let argon2_memory_kib = env_or("ARGON2_MEMORY_KIB", 19 * 1024);
        let argon2_iterations = env_or("ARGON2_ITERATIONS", 2);

        let allowed_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let api_key = env::var("LLM_API_KEY").ok().filter(|k| !k.trim().is_empty());
        let base_url = env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model = env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let level = env::var("RUST_LOG")
            .unwrap_or_else(|_| "game_review_hub=debug,tower_http=debug".to_string());
        let json = env::var("LOG_FORMAT")
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version,
            },
            storage: StorageConfig {
                database_path,
                max_connections,
            },
            authentication: AuthConfig {
                jwt_secret,
                token_ttl_minutes,
                argon2_memory_kib,
                argon2_iterations,
            },
            cors: CorsConfig { allowed_origins },
            ai: AiConfig {
                api_key,
                base_url,
                model,
                timeout_secs: env_or("LLM_TIMEOUT_SECS", 30),
                max_tokens: env_or("LLM_MAX_TOKENS", 400),
                requests_per_minute: env_or("AI_REQUESTS_PER_MINUTE", 30),
            },
            logging: LoggingConfig { level, json },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.service.hostname.is_empty() {
            return Err(AppError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.authentication.jwt_secret.len() < 32 {
            return Err(AppError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.authentication.token_ttl_minutes <= 0 {
            return Err(AppError::Validation(
                "Token lifetime must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
pub fn test_config() -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "localhost".to_string(),
            port: 8001,
            version: "0.1.0".to_string(),
        },
        storage: StorageConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
        },
        authentication: AuthConfig {
            jwt_secret: "test-secret-key-for-testing-only-0123456789".to_string(),
            token_ttl_minutes: 10080,
            argon2_memory_kib: 8,
            argon2_iterations: 1,
        },
        cors: CorsConfig {
            allowed_origins: vec!["*".to_string()],
        },
        ai: AiConfig {
            api_key: None,
            base_url: "http://127.0.0.1:9".to_string(),
            model: "test-model".to_string(),
            timeout_secs: 1,
            max_tokens: 64,
            requests_per_minute: 1000,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            json: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_short_secret() {
        let mut config = test_config();
        config.authentication.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let mut config = test_config();
        config.authentication.token_ttl_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cors_any() {
        let mut cors = CorsConfig {
            allowed_origins: vec!["https://a.example".to_string()],
        };
        assert!(!cors.allows_any());

        cors.allowed_origins.push("*".to_string());
        assert!(cors.allows_any());
    }
}
