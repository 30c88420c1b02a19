use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::{API_URL, DEFAULT_TIMEOUT_SECS};

pub const TOKEN_KEY: &str = "ZEXUM_TOKEN";

pub struct Config {
    pub port: u16,
    pub token: Option<String>,
    pub api_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn load() -> Self {
        let mut config = Self::from_lookup(|key| env::var(key).ok());
        if config.token.is_none() {
            config.token = read_secret(TOKEN_KEY);
        }
        config
    }

    /// Builds the config from any key lookup, environment or otherwise.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_KEY).filter(|t| !t.is_empty());
        if token.is_none() {
            warn!("{TOKEN_KEY} not set, survey requests will fail until it is configured");
        }

        Self {
            port: try_load(&lookup, "PORT", 5000),
            token,
            api_url: lookup("ZEXUM_API_URL").unwrap_or_else(|| API_URL.to_string()),
            timeout: load_timeout(&lookup),
        }
    }
}

fn load_timeout<F>(lookup: &F) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    let secs = try_load(lookup, "ZEXUM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
    if secs == 0 {
        warn!("ZEXUM_TIMEOUT_SECS must be positive, using default: {DEFAULT_TIMEOUT_SECS}");
        return Duration::from_secs(DEFAULT_TIMEOUT_SECS);
    }

    Duration::from_secs(secs)
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    let value = match lookup(key) {
        Some(value) => value,
        None => {
            info!("{key} not set, using default: {default}");
            return default;
        }
    };

    value.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {value:?} ({e}), using default: {default}");
        default
    })
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            info!("No {secret_name} secret at {path}: {e}");
        })
        .ok()
        .filter(|s| !s.is_empty())
}
