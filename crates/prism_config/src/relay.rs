//! Cross-origin relay settings.
//!
//! Audio sources and image fetches are routed through a URL-rewriting proxy:
//! the target URL is passed as a single query parameter of the relay endpoint.

use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "crate::defaults::default_true")]
    pub enabled: bool,
    #[serde(default = "crate::defaults::default_relay_url")]
    pub base_url: Url,
    /// Query parameter carrying the target URL
    #[serde(default = "crate::defaults::default_relay_param")]
    pub param: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: crate::defaults::default_relay_url(),
            param: crate::defaults::default_relay_param(),
        }
    }
}

impl RelayConfig {
    /// A relay that passes target URLs through untouched
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Rewrites `target` so it is fetched through the relay.
    ///
    /// The target is not validated here, a malformed target simply fails at fetch time.
    pub fn rewrite(&self, target: &str) -> String {
        if !self.enabled {
            return target.to_string();
        }

        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair(&self.param, target);
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_encodes_target() {
        let relay = RelayConfig::default();
        let rewritten = relay.rewrite("https://example.com/a b.png?x=1&y=2");

        let parsed = Url::parse(&rewritten).unwrap();
        assert_eq!(parsed.host_str(), Some("api.allorigins.win"));
        assert_eq!(parsed.path(), "/raw");
        let (key, value) = parsed.query_pairs().next().unwrap();
        assert_eq!(key, "url");
        assert_eq!(value, "https://example.com/a b.png?x=1&y=2");
    }

    #[test]
    fn test_disabled_relay_passthrough() {
        let relay = RelayConfig::disabled();
        assert_eq!(relay.rewrite("https://example.com/x"), "https://example.com/x");
    }
}
