// Process configuration read from the environment
//
// Binaries load `.env` first; every variable is optional and falls back to
// a logged default.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::agents::{AgentError, AgentResult, AgentSettings, DEFAULT_MAX_HOPS};
use crate::domain::region::{map_region, DEFAULT_REGION};
use crate::intent::perplexity::{DEFAULT_MODEL, INTENT_TIMEOUT_SECS_DEFAULT, PERPLEXITY_API_URL};
use crate::intent::{
    IntentCache, IntentService, OfflineIntentService, PerplexityClient, PerplexityConfig,
};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const INTENT_CACHE_CAPACITY_DEFAULT: usize = 256;
pub const INTENT_CACHE_TTL_SECS_DEFAULT: u64 = 300;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` runs the offline classifier only
    pub perplexity: Option<PerplexityConfig>,
    pub intent_cache_capacity: usize,
    pub intent_cache_ttl: Duration,
    pub max_hops: usize,
    pub history_capacity: Option<usize>,
    pub home_region: String,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> AgentResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> AgentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let timeout = Duration::from_secs(parsed(
            &get,
            "INTENT_TIMEOUT_SECS",
            INTENT_TIMEOUT_SECS_DEFAULT,
        )?);
        let perplexity = match get("PERPLEXITY_API_KEY") {
            Some(api_key) => Some(
                PerplexityConfig::new(api_key)
                    .with_model(
                        get("PERPLEXITY_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                    )
                    .with_base_url(
                        get("PERPLEXITY_BASE_URL")
                            .unwrap_or_else(|| PERPLEXITY_API_URL.to_string()),
                    )
                    .with_timeout(timeout),
            ),
            None => {
                warn!("PERPLEXITY_API_KEY not set, using offline intent classification");
                None
            }
        };

        let history_capacity = match get("HISTORY_CAPACITY") {
            Some(raw) => Some(parse_value("HISTORY_CAPACITY", &raw)?),
            None => None,
        };

        let home_region = match get("HOME_REGION") {
            Some(raw) => map_region(Some(&raw)).to_string(),
            None => {
                debug!("HOME_REGION not set, using {}", DEFAULT_REGION);
                DEFAULT_REGION.to_string()
            }
        };

        Ok(Self {
            perplexity,
            intent_cache_capacity: parsed(
                &get,
                "INTENT_CACHE_CAPACITY",
                INTENT_CACHE_CAPACITY_DEFAULT,
            )?,
            intent_cache_ttl: Duration::from_secs(parsed(
                &get,
                "INTENT_CACHE_TTL_SECS",
                INTENT_CACHE_TTL_SECS_DEFAULT,
            )?),
            max_hops: parsed(&get, "A2A_MAX_HOPS", DEFAULT_MAX_HOPS)?,
            history_capacity,
            home_region,
            bind_addr: parsed(&get, "BIND_ADDR", parse_value("BIND_ADDR", DEFAULT_BIND_ADDR)?)?,
        })
    }

    pub fn agent_settings(&self) -> AgentSettings {
        AgentSettings {
            max_hops: self.max_hops,
            history_capacity: self.history_capacity,
        }
    }

    /// Remote client when a key is configured, offline classifier otherwise
    pub fn intent_service(&self) -> AgentResult<Arc<dyn IntentService>> {
        match &self.perplexity {
            Some(config) => {
                let cache = IntentCache::new(self.intent_cache_capacity, self.intent_cache_ttl);
                Ok(Arc::new(PerplexityClient::new(config.clone(), cache)?))
            }
            None => Ok(Arc::new(OfflineIntentService)),
        }
    }
}

fn parsed<T, G>(get: &G, key: &str, default: T) -> AgentResult<T>
where
    T: FromStr + Display,
    T::Err: Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => parse_value(key, &raw),
        None => {
            debug!("{} not set, using {}", key, default);
            Ok(default)
        }
    }
}

fn parse_value<T>(key: &str, raw: &str) -> AgentResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AgentError::ConfigError(format!("{} = {:?}: {}", key, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AgentResult<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config(&[]).unwrap();

        assert!(config.perplexity.is_none());
        assert_eq!(config.home_region, "us-east-2");
        assert_eq!(config.max_hops, 8);
        assert_eq!(config.history_capacity, None);
        assert_eq!(config.intent_cache_capacity, 256);
        assert_eq!(config.intent_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.intent_service().unwrap().name(), "offline");
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("PERPLEXITY_API_KEY", "pplx-0123456789"),
            ("PERPLEXITY_MODEL", "sonar-pro"),
            ("INTENT_TIMEOUT_SECS", "3"),
            ("A2A_MAX_HOPS", "4"),
            ("HISTORY_CAPACITY", "100"),
            ("HOME_REGION", "Oregon"),
            ("BIND_ADDR", "127.0.0.1:9000"),
        ])
        .unwrap();

        let perplexity = config.perplexity.clone().unwrap();
        assert_eq!(perplexity.model, "sonar-pro");
        assert_eq!(perplexity.timeout, Duration::from_secs(3));
        assert_eq!(config.home_region, "us-west-2");
        assert_eq!(
            config.agent_settings(),
            AgentSettings {
                max_hops: 4,
                history_capacity: Some(100)
            }
        );
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.intent_service().unwrap().name(), "perplexity");
    }

    #[test]
    fn blank_key_means_offline() {
        let config = config(&[("PERPLEXITY_API_KEY", "  ")]).unwrap();
        assert!(config.perplexity.is_none());
    }

    #[test]
    fn malformed_number_is_a_config_error() {
        let error = config(&[("A2A_MAX_HOPS", "lots")]).unwrap_err();
        assert!(matches!(
            error,
            AgentError::ConfigError(ref message) if message.starts_with("A2A_MAX_HOPS")
        ));
    }
}
