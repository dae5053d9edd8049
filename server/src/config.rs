use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::info;

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    /// Prefix for absolute URLs handed to clients (images, short links).
    pub public_base_url: String,
    pub db_pool_size: u32,
    pub session_ttl_days: i64,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            bind_addr: try_load(&lookup, "BIND_ADDR", "0.0.0.0:3000")?,
            public_base_url: try_load::<String, _>(
                &lookup,
                "PUBLIC_BASE_URL",
                "http://localhost:3000",
            )?
            .trim_end_matches('/')
            .to_string(),
            db_pool_size: try_load(&lookup, "DB_POOL_SIZE", "10")?,
            session_ttl_days: try_load(&lookup, "SESSION_TTL_DAYS", "30")?,
        })
    }

    pub fn photo_url(&self, photo_id: uuid::Uuid) -> String {
        format!("{}/api/photos/{}", self.public_base_url, photo_id)
    }

    pub fn short_link(&self, recipe_id: uuid::Uuid) -> String {
        format!("{}/s/{}", self.public_base_url, recipe_id)
    }
}

fn try_load<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value,
        reason: e.to_string(),
    })
}
