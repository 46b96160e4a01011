//! Purge engine configuration.
//!
//! Resolved from the `[purge]` section of `purgewire.toml`.

use std::time::Duration;

use crate::config::{DEFAULT_PURGE_TIMEOUT_MS, DEFAULT_STATUS_TIMEOUT_MS, PurgeSettings};
use crate::domain::ids::NegativeIdPolicy;

#[derive(Debug, Clone)]
pub struct PurgeConfig {
    /// Issue purges at all; when false every transition is suppressed.
    pub enabled: bool,
    /// Upper bound (ms) on one purge API call.
    pub purge_timeout_ms: u64,
    /// Upper bound (ms) on content/comment store lookups.
    pub status_timeout_ms: u64,
    /// Treatment of negative content ids.
    pub negative_ids: NegativeIdPolicy,
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            purge_timeout_ms: DEFAULT_PURGE_TIMEOUT_MS,
            status_timeout_ms: DEFAULT_STATUS_TIMEOUT_MS,
            negative_ids: NegativeIdPolicy::default(),
        }
    }
}

impl From<&PurgeSettings> for PurgeConfig {
    fn from(settings: &PurgeSettings) -> Self {
        Self {
            enabled: settings.enabled,
            purge_timeout_ms: settings.purge_timeout.as_millis() as u64,
            status_timeout_ms: settings.status_timeout.as_millis() as u64,
            negative_ids: settings.negative_ids,
        }
    }
}

impl PurgeConfig {
    pub fn purge_timeout(&self) -> Duration {
        Duration::from_millis(self.purge_timeout_ms)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_millis(self.status_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = PurgeConfig::default();
        assert!(config.enabled);
        assert_eq!(config.purge_timeout(), Duration::from_millis(3000));
        assert_eq!(config.status_timeout(), Duration::from_millis(2000));
        assert_eq!(config.negative_ids, NegativeIdPolicy::Reject);
    }

    #[test]
    fn converts_validated_settings() {
        let settings = PurgeSettings {
            enabled: false,
            purge_timeout: Duration::from_millis(750),
            status_timeout: Duration::from_secs(1),
            negative_ids: NegativeIdPolicy::Absolute,
        };

        let config = PurgeConfig::from(&settings);

        assert!(!config.enabled);
        assert_eq!(config.purge_timeout(), Duration::from_millis(750));
        assert_eq!(config.status_timeout(), Duration::from_millis(1000));
        assert_eq!(config.negative_ids, NegativeIdPolicy::Absolute);
    }
}
