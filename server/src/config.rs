use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub jikan_base_url: String,
    pub jikan_anime_path: String,
    pub bind_addr: String,
    pub cache_ttl_secs: u64,
    pub proxy_cache_ttl_secs: u64,
    pub upstream_timeout_secs: Option<u64>,
    pub min_score: f64,
    pub upstream_limit: u32,
    pub max_results: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jikan_base_url: "https://api.jikan.moe".to_string(),
            jikan_anime_path: "/v4/anime".to_string(),
            bind_addr: "0.0.0.0:8080".to_string(),
            cache_ttl_secs: 60 * 60,
            proxy_cache_ttl_secs: 60,
            upstream_timeout_secs: None,
            min_score: 6.0,
            upstream_limit: 25,
            max_results: 20,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();

        let config = Config {
            jikan_base_url: env::var("JIKAN_BASE_URL").unwrap_or(defaults.jikan_base_url),
            jikan_anime_path: env::var("JIKAN_ANIME_PATH").unwrap_or(defaults.jikan_anime_path),
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            cache_ttl_secs: parse_var("CACHE_TTL_SECS")?.unwrap_or(defaults.cache_ttl_secs),
            proxy_cache_ttl_secs: parse_var("PROXY_CACHE_TTL_SECS")?
                .unwrap_or(defaults.proxy_cache_ttl_secs),
            upstream_timeout_secs: parse_var("UPSTREAM_TIMEOUT_SECS")?,
            min_score: parse_var("MIN_SCORE")?.unwrap_or(defaults.min_score),
            upstream_limit: parse_var("UPSTREAM_LIMIT")?.unwrap_or(defaults.upstream_limit),
            max_results: parse_var("MAX_RESULTS")?.unwrap_or(defaults.max_results),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cache_ttl_secs == 0 {
            anyhow::bail!("CACHE_TTL_SECS must be greater than zero");
        }
        if self.max_results == 0 {
            anyhow::bail!("MAX_RESULTS must be greater than zero");
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn proxy_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.proxy_cache_ttl_secs)
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_secs.map(Duration::from_secs)
    }
}

fn parse_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} is not valid ({}): {}", name, raw, e)),
        Err(_) => Ok(None),
    }
}
