use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

use dotenvy::dotenv;

/// Signing keys are derived from the session secret, which requires a
/// minimum amount of entropy to be worth anything.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub addr: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Cookie signing secret, expected from `APP_SESSION__SECRET`.
    pub secret: String,
    pub cookie_name: String,
    pub expiry_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub web: WebConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    /// Loads `Config.toml` defaults and merges `APP_`-prefixed environment
    /// variables on top, e.g. `APP_WEB__PORT` or `APP_SESSION__SECRET`.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();

        let config: AppConfig = Figment::new()
            .merge(Toml::file("Config.toml"))
            .merge(Env::prefixed("APP_").split("__"))
            .extract()?;

        config.validate()?;

        tracing::info!(
            addr = %config.web.addr,
            port = config.web.port,
            "configuration loaded"
        );

        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.session.secret.len() < MIN_SESSION_SECRET_LEN {
            anyhow::bail!(
                "session secret must be at least {MIN_SESSION_SECRET_LEN} bytes \
                 (set APP_SESSION__SECRET)"
            );
        }
        if self.session.expiry_days <= 0 {
            anyhow::bail!("session expiry_days must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            web: WebConfig {
                addr: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
            },
            session: SessionConfig {
                secret: "0123456789abcdef0123456789abcdef".to_string(),
                cookie_name: "qb.sid".to_string(),
                expiry_days: 7,
            },
        }
    }

    #[test]
    fn accepts_a_32_byte_secret() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn rejects_a_short_secret() {
        let mut config = base_config();
        config.session.secret = "too-short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_expiry() {
        let mut config = base_config();
        config.session.expiry_days = 0;
        assert!(config.validate().is_err());
    }
}
