use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub catalog: CatalogSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub swipes: SwipeSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Profile/catalog/identity service
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

fn default_backend() -> StorageBackend { StorageBackend::Postgres }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            redis_url: default_redis_url(),
            ttl_secs: None,
            l1_cache_size: None,
        }
    }
}

fn default_cache_enabled() -> bool { true }
fn default_redis_url() -> String { "redis://127.0.0.1:6379".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_match_ttl_days")]
    pub match_ttl_days: i64,
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_page_limit")]
    pub default_limit: u32,
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            match_ttl_days: default_match_ttl_days(),
            default_radius_km: default_radius_km(),
            sweep_interval_secs: default_sweep_interval_secs(),
            default_limit: default_page_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_match_ttl_days() -> i64 { 30 }
fn default_radius_km() -> f64 { 50.0 }
fn default_sweep_interval_secs() -> u64 { 3600 }
fn default_page_limit() -> u32 { 20 }
fn default_max_limit() -> u32 { 100 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SwipeSettings {
    /// Per-actor swipes per minute; 0 disables the throttle
    #[serde(default)]
    pub max_per_minute: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_location_weight")]
    pub location: f64,
    #[serde(default = "default_specialization_weight")]
    pub specialization: f64,
    #[serde(default = "default_price_weight")]
    pub price: f64,
    #[serde(default = "default_rating_weight")]
    pub rating: f64,
    #[serde(default = "default_availability_weight")]
    pub availability: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            location: default_location_weight(),
            specialization: default_specialization_weight(),
            price: default_price_weight(),
            rating: default_rating_weight(),
            availability: default_availability_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(w: &WeightsConfig) -> Self {
        ScoringWeights {
            location: w.location,
            specialization: w.specialization,
            price: w.price,
            rating: w.rating,
            availability: w.availability,
        }
    }
}

fn default_location_weight() -> f64 { 0.25 }
fn default_specialization_weight() -> f64 { 0.30 }
fn default_price_weight() -> f64 { 0.20 }
fn default_rating_weight() -> f64 { 0.15 }
fn default_availability_weight() -> f64 { 0.10 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default.toml, config/local.toml)
    /// 3. Environment variables (prefixed with MATCH__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Development overrides
            .add_source(File::with_name("config/local").required(false))
            // e.g., MATCH__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        settings.try_deserialize()
    }

    pub fn scoring_weights(&self) -> ScoringWeights {
        ScoringWeights::from(&self.scoring.weights)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("MATCH")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply well-known unprefixed environment variables
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    // DATABASE_URL is what sqlx tooling reads too
    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(redis_url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", redis_url)?;
    }
    if let Ok(api_key) = env::var("CATALOG_API_KEY") {
        builder = builder.set_override("catalog.api_key", api_key)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.location, 0.25);
        assert_eq!(weights.specialization, 0.30);
        assert_eq!(weights.price, 0.20);
        assert_eq!(weights.rating, 0.15);
        assert_eq!(weights.availability, 0.10);
        assert_eq!(ScoringWeights::from(&weights), ScoringWeights::default());
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "json");
    }

    #[test]
    fn test_load_from_minimal_file() {
        let path = std::env::temp_dir().join(format!("swipe-match-{}.toml", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
host = "127.0.0.1"
port = 8080

[catalog]
endpoint = "http://localhost:9000"
api_key = "test"

[database]
backend = "memory"
url = ""

[swipes]
max_per_minute = 30
"#
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.database.backend, StorageBackend::Memory);
        assert_eq!(settings.matching.match_ttl_days, 30);
        assert_eq!(settings.matching.sweep_interval_secs, 3600);
        assert_eq!(settings.swipes.max_per_minute, 30);
        assert!(settings.cache.enabled);
        assert_eq!(settings.scoring_weights(), ScoringWeights::default());
    }
}
