use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    pub outbox_capacity: usize,
    pub send_timeout_ms: u64,
}

impl RelayConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            outbox_capacity: 64,
            send_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub relay: RelayConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let defaults = RelayConfig::default();
        let relay = RelayConfig {
            outbox_capacity: env_or("RELAY_OUTBOX_CAPACITY", defaults.outbox_capacity).max(1),
            send_timeout_ms: env_or("RELAY_SEND_TIMEOUT_MS", defaults.send_timeout_ms),
        };
        Ok(Self {
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            db_acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", 5),
            relay,
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_on_missing_or_garbage() {
        assert_eq!(env_or::<u64>("TEAMFORGE_TEST_UNSET_KEY", 7), 7);
        std::env::set_var("TEAMFORGE_TEST_GARBAGE_KEY", "not-a-number");
        assert_eq!(env_or::<usize>("TEAMFORGE_TEST_GARBAGE_KEY", 64), 64);
        std::env::set_var("TEAMFORGE_TEST_NUMERIC_KEY", "128");
        assert_eq!(env_or::<usize>("TEAMFORGE_TEST_NUMERIC_KEY", 64), 128);
    }

    #[test]
    fn relay_defaults() {
        let relay = RelayConfig::default();
        assert_eq!(relay.outbox_capacity, 64);
        assert_eq!(relay.send_timeout(), Duration::from_secs(5));
    }
}
