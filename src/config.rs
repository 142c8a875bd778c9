use std::str::FromStr;

use anyhow::{bail, Context};

/// Which built-in item set the store starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedProfile {
    Default,
    Testing,
    Empty,
}

impl FromStr for SeedProfile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "" => Ok(SeedProfile::Default),
            "testing" => Ok(SeedProfile::Testing),
            "empty" => Ok(SeedProfile::Empty),
            other => bail!("unknown seed profile '{}' (expected default, testing or empty)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Route prefix for the produce API, e.g. `/api`. Empty means mounted at root.
    pub api_prefix: String,
    pub seed_profile: SeedProfile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            api_prefix: "/api".to_string(),
            seed_profile: SeedProfile::Default,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: match var("PORT") {
                Some(p) => p.parse().context("PORT must be a valid number")?,
                None => defaults.port,
            },
            api_prefix: match var("API_PREFIX") {
                Some(p) => normalize_prefix(&p).context("API_PREFIX is invalid")?,
                None => defaults.api_prefix,
            },
            seed_profile: match var("SEED_PROFILE") {
                Some(s) => s.parse().context("SEED_PROFILE is invalid")?,
                None => defaults.seed_profile,
            },
        })
    }
}

/// Accepts `api`, `/api` or `/api/` and yields `/api`; `/` or blank yields "".
fn normalize_prefix(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if trimmed.contains(|c: char| c.is_whitespace() || c == ':' || c == '{' || c == '*') {
        bail!("'{}' is not a plain path prefix", raw);
    }
    Ok(format!("/{}", trimmed))
}
