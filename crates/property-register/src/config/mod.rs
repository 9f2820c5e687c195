use rust_decimal::Decimal;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub register: RegisterConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            register: RegisterConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Debt engine knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterConfig {
    /// Channel topic debtor e-mail events are published to.
    pub email_topic: String,
    /// Late-payment surcharge applied to existing debtors, in percent.
    pub surcharge_percent: Decimal,
    /// Period of the background recount; `None` disables it.
    pub recount_interval: Option<Duration>,
    pub seed_demo: bool,
}

impl RegisterConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let email_topic =
            env::var("REGISTER_EMAIL_TOPIC").unwrap_or_else(|_| DEFAULT_EMAIL_TOPIC.to_string());

        let surcharge_percent = match env::var("REGISTER_SURCHARGE_PERCENT") {
            Ok(raw) => {
                let parsed = raw
                    .trim()
                    .parse::<Decimal>()
                    .ok()
                    .filter(|value| !value.is_sign_negative());
                parsed.ok_or(ConfigError::InvalidSurcharge(raw))?
            }
            Err(_) => Decimal::from(DEFAULT_SURCHARGE_PERCENT),
        };

        let recount_interval = match env::var("REGISTER_RECOUNT_INTERVAL_SECS") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => return Err(ConfigError::InvalidRecountInterval(raw)),
            },
            Err(_) => None,
        };

        let seed_demo = env::var("REGISTER_SEED_DEMO")
            .map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            email_topic,
            surcharge_percent,
            recount_interval,
            seed_demo,
        })
    }
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            email_topic: DEFAULT_EMAIL_TOPIC.to_string(),
            surcharge_percent: Decimal::from(DEFAULT_SURCHARGE_PERCENT),
            recount_interval: None,
            seed_demo: false,
        }
    }
}

pub const DEFAULT_EMAIL_TOPIC: &str = "email_topic";
pub const DEFAULT_SURCHARGE_PERCENT: u32 = 5;

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSurcharge(String),
    InvalidRecountInterval(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSurcharge(raw) => write!(
                f,
                "REGISTER_SURCHARGE_PERCENT must be a non-negative decimal, got '{raw}'"
            ),
            ConfigError::InvalidRecountInterval(raw) => write!(
                f,
                "REGISTER_RECOUNT_INTERVAL_SECS must be a whole number of seconds, got '{raw}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidSurcharge(_)
            | ConfigError::InvalidRecountInterval(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "REGISTER_EMAIL_TOPIC",
            "REGISTER_SURCHARGE_PERCENT",
            "REGISTER_RECOUNT_INTERVAL_SECS",
            "REGISTER_SEED_DEMO",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.register, RegisterConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_register_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("REGISTER_EMAIL_TOPIC", "debtors");
        env::set_var("REGISTER_SURCHARGE_PERCENT", "2.5");
        env::set_var("REGISTER_RECOUNT_INTERVAL_SECS", "3600");
        env::set_var("REGISTER_SEED_DEMO", "true");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.register.email_topic, "debtors");
        assert_eq!(config.register.surcharge_percent, Decimal::new(25, 1));
        assert_eq!(
            config.register.recount_interval,
            Some(Duration::from_secs(3600))
        );
        assert!(config.register.seed_demo);
        reset_env();
    }

    #[test]
    fn rejects_negative_surcharge() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("REGISTER_SURCHARGE_PERCENT", "-1");
        let result = AppConfig::load();
        reset_env();
        assert!(matches!(result, Err(ConfigError::InvalidSurcharge(_))));
    }
}
