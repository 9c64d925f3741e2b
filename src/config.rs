//! Runtime settings for talking to the GitHub REST API.
//!
//! Values come from CLI flags first, then the environment (optionally
//! seeded from a `.env` file), then the defaults below.

use std::time::Duration;

use crate::github::Credential;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct Config {
    /// REST API root, without a trailing slash.
    pub api_base: String,

    /// GitHub rejects requests that carry no User-Agent.
    pub user_agent: String,

    /// Token used for every request; `None` means anonymous access.
    pub credential: Option<Credential>,

    /// Outer deadline for a whole snapshot fetch.
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: default_user_agent(),
            credential: None,
            timeout: None,
        }
    }
}

fn default_user_agent() -> String {
    format!("ghstats/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    pub fn new(
        api_base: Option<String>,
        token: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Self {
        let api_base = api_base
            .map(|b| b.trim().trim_end_matches('/').to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Self {
            api_base,
            credential: token.and_then(Credential::new),
            timeout: timeout_secs.filter(|s| *s > 0).map(Duration::from_secs),
            ..Self::default()
        }
    }
}
