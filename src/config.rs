use crate::errors::{AppError, Result};
use crate::rate_limit::{Algorithm, FailurePolicy, Language, RateLimitPolicy};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub rate_limit: RateLimitConfig,
    pub security_headers: SecurityHeadersConfig,
    pub observability: ObservabilityConfig,
    pub i18n: I18nConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Exported site pages, served for every path not matched elsewhere
    pub public_dir: PathBuf,
    pub static_dir: PathBuf,
    pub media_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            public_dir: PathBuf::from("public"),
            static_dir: PathBuf::from("staticfiles"),
            media_dir: PathBuf::from("media"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// When disabled, rate windows live in process memory
    pub enabled: bool,
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodQuotaConfig {
    pub max_requests: u64,
    pub window_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Keyed by HTTP method name, matched case-insensitively
    pub methods: HashMap<String, MethodQuotaConfig>,
    pub exempt_prefixes: Vec<String>,
    pub trust_forwarded_header: bool,
    pub on_cache_error: FailurePolicy,
    pub key_prefix: String,
    pub emit_retry_after: bool,
    pub algorithm: Algorithm,
    pub purge_interval_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        let mut methods = HashMap::new();
        methods.insert(
            "POST".to_string(),
            MethodQuotaConfig {
                max_requests: 10,
                window_seconds: 60,
            },
        );
        methods.insert(
            "GET".to_string(),
            MethodQuotaConfig {
                max_requests: 100,
                window_seconds: 60,
            },
        );

        Self {
            methods,
            exempt_prefixes: vec![
                "/admin/".to_string(),
                "/static/".to_string(),
                "/media/".to_string(),
            ],
            trust_forwarded_header: false,
            on_cache_error: FailurePolicy::Open,
            key_prefix: "ratelimit".to_string(),
            emit_retry_after: false,
            algorithm: Algorithm::SlidingLog,
            purge_interval_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityHeadersConfig {
    pub frame_options: String,
    pub content_security_policy: Option<String>,
    pub strict_transport_security: Option<String>,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            frame_options: "SAMEORIGIN".to_string(),
            content_security_policy: None,
            strict_transport_security: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_format: String,
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    pub default_language: Language,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let environment =
            env::var("PARCO_SHIELD_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(
                config::File::with_name(&format!("config/{}", environment)).required(false),
            )
            // e.g., PARCO_SHIELD__SERVER__PORT=8080
            .add_source(
                config::Environment::with_prefix("PARCO_SHIELD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Configuration(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Configuration("Invalid port number".to_string()));
        }

        if self.redis.enabled && self.redis.url.is_empty() {
            return Err(AppError::Configuration(
                "Redis URL is required when Redis is enabled".to_string(),
            ));
        }

        if !self.redis.enabled && self.rate_limit.algorithm == Algorithm::AtomicSortedSet {
            return Err(AppError::Configuration(
                "The atomic_sorted_set algorithm requires Redis".to_string(),
            ));
        }

        if self.security_headers.frame_options.is_empty() {
            return Err(AppError::Configuration(
                "X-Frame-Options value must not be empty".to_string(),
            ));
        }

        RateLimitPolicy::from_config(&self.rate_limit)?;

        Ok(())
    }
}
