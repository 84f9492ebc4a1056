//! Client configuration and the injected token capability.

use std::fmt;
use std::sync::Arc;

/// Supplies the current bearer token.
///
/// Queried once per request, so implementations should be cheap and must not
/// block. An empty string means "no token right now".
pub trait TokenSource: Send + Sync {
    fn token(&self) -> String;
}

impl<F> TokenSource for F
where
    F: Fn() -> String + Send + Sync,
{
    fn token(&self) -> String {
        self()
    }
}

/// A token source that never has a token.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoToken;

impl TokenSource for NoToken {
    fn token(&self) -> String {
        String::new()
    }
}

/// A token source that always returns the same token.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(***)")
    }
}

impl TokenSource for StaticToken {
    fn token(&self) -> String {
        self.0.clone()
    }
}

/// Immutable configuration for an `ApiClient`.
#[derive(Clone)]
pub struct ClientConfig {
    base_url: String,
    default_token: String,
    token_source: Arc<dyn TokenSource>,
}

impl ClientConfig {
    /// `base_url` is prepended verbatim to every endpoint.
    pub fn new(base_url: impl Into<String>, token_source: impl TokenSource + 'static) -> Self {
        Self {
            base_url: base_url.into(),
            default_token: String::new(),
            token_source: Arc::new(token_source),
        }
    }

    /// Fallback bearer token, used when neither the token source nor the
    /// call supplies one.
    pub fn with_default_token(mut self, token: impl Into<String>) -> Self {
        self.default_token = token.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_token(&self) -> &str {
        &self.default_token
    }

    /// Ask the token source for the current token.
    pub fn retrieve_auth_token(&self) -> String {
        self.token_source.token()
    }

    /// Pick the bearer token for one request: the token source first, then
    /// the per-call token, then the default. Empty strings count as absent.
    pub fn resolve_token(&self, access_token: Option<&str>) -> Option<String> {
        let retrieved = self.retrieve_auth_token();
        if !retrieved.is_empty() {
            return Some(retrieved);
        }
        if let Some(token) = access_token.filter(|t| !t.is_empty()) {
            return Some(token.to_string());
        }
        if !self.default_token.is_empty() {
            return Some(self.default_token.clone());
        }
        None
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("has_default_token", &!self.default_token.is_empty())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_source_wins_over_everything() {
        let config = ClientConfig::new("http://api", || "live".to_string())
            .with_default_token("fallback");
        assert_eq!(config.resolve_token(Some("per-call")).as_deref(), Some("live"));
    }

    #[test]
    fn per_call_token_beats_default() {
        let config = ClientConfig::new("http://api", NoToken).with_default_token("fallback");
        assert_eq!(config.resolve_token(Some("per-call")).as_deref(), Some("per-call"));
    }

    #[test]
    fn empty_tokens_fall_through_to_default() {
        let config = ClientConfig::new("http://api", String::new).with_default_token("fallback");
        assert_eq!(config.resolve_token(Some("")).as_deref(), Some("fallback"));
        assert_eq!(config.resolve_token(None).as_deref(), Some("fallback"));
    }

    #[test]
    fn no_token_anywhere() {
        let config = ClientConfig::new("http://api", NoToken);
        assert_eq!(config.resolve_token(None), None);
        assert_eq!(config.default_token(), "");
    }

    #[test]
    fn static_token_is_redacted_in_debug() {
        let config = ClientConfig::new("http://api", StaticToken::new("secret"))
            .with_default_token("also-secret");
        assert_eq!(config.retrieve_auth_token(), "secret");
        let rendered = format!("{config:?} {:?}", StaticToken::new("secret"));
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("http://api"));
    }
}
