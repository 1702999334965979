//! Configuration management for Text Analyzer Server

use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// How long to wait for in-flight requests after a shutdown signal
    pub shutdown_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Static key expected from callers. `None` disables the check.
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub window: Duration,
    pub create_max: u32,
    pub read_max: u32,
}

/// Analyzer read-through cache settings
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub ttl: Duration,
    /// Minimum interval between sweeps of expired entries
    pub check_period: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            url: "sqlite:./text-analyzer.db".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            enabled: true,
            window: Duration::from_secs(60),
            create_max: 5,
            read_max: 10,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl: Duration::from_secs(15 * 60),
            check_period: Duration::from_secs(60),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Read configuration from the environment, falling back to defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let port = env::var("APPLICATION_SERVER_PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.server.port);

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port,
                shutdown_timeout: Duration::from_secs(parse_var(
                    "APP_FORCE_SHUTDOWN_SECOND",
                    defaults.server.shutdown_timeout.as_secs(),
                )),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                max_connections: parse_var(
                    "DATABASE_MAX_CONNECTIONS",
                    defaults.database.max_connections,
                ),
            },
            auth: AuthConfig {
                api_key: env::var("API_KEY").ok().filter(|key| !key.is_empty()),
            },
            rate_limit: RateLimitConfig {
                enabled: parse_var("RATE_LIMIT_ENABLED", defaults.rate_limit.enabled),
                window: Duration::from_secs(parse_var(
                    "RATE_LIMIT_WINDOW_SECONDS",
                    defaults.rate_limit.window.as_secs(),
                )),
                create_max: parse_var("RATE_LIMIT_CREATE_MAX", defaults.rate_limit.create_max),
                read_max: parse_var("RATE_LIMIT_READ_MAX", defaults.rate_limit.read_max),
            },
            cache: CacheConfig {
                ttl: Duration::from_secs(parse_var(
                    "CACHE_TTL_SECONDS",
                    defaults.cache.ttl.as_secs(),
                )),
                check_period: Duration::from_secs(parse_var(
                    "CACHE_CHECK_PERIOD_SECONDS",
                    defaults.cache.check_period.as_secs(),
                )),
            },
        }
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.shutdown_timeout, Duration::from_secs(10));
        assert!(config.auth.api_key.is_none());
        assert!(config.rate_limit.enabled);
        assert_eq!(config.rate_limit.create_max, 5);
        assert_eq!(config.rate_limit.read_max, 10);
        assert_eq!(config.cache.ttl, Duration::from_secs(900));
        assert_eq!(config.cache.check_period, Duration::from_secs(60));
    }

    #[test]
    fn test_parse_var_falls_back_on_garbage() {
        env::set_var("TEXT_ANALYZER_TEST_GARBAGE", "not-a-number");
        assert_eq!(parse_var("TEXT_ANALYZER_TEST_GARBAGE", 7u32), 7);

        env::set_var("TEXT_ANALYZER_TEST_NUMBER", " 42 ");
        assert_eq!(parse_var("TEXT_ANALYZER_TEST_NUMBER", 7u32), 42);

        assert!(parse_var("TEXT_ANALYZER_TEST_UNSET", true));
    }
}
