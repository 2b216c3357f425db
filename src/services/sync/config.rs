use std::sync::Arc;

use crate::error::SyncError;
use crate::namespaces::NamespaceSet;

/// Header that marks requests as issued by script rather than navigation.
pub const REQUESTED_WITH_HEADER: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");
/// Header carrying the anti-forgery token.
pub const REQUEST_TOKEN_HEADER: &str = "requesttoken";

/// Supplies the current anti-forgery token, called once per outgoing request
/// so that token rotation is picked up without reconstructing the service.
pub type TokenProvider = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Construction-time configuration of the sync facade: fixed baseline
/// headers, the anti-forgery token provider and the namespace registry for
/// property XML. Explicit configuration instead of hidden global lookups.
#[derive(Clone, Default)]
pub struct SyncConfig {
    /// Headers attached to every outgoing request after the baseline pair;
    /// per-call headers still win over these.
    pub default_headers: Vec<(String, String)>,
    pub request_token: Option<TokenProvider>,
    pub namespaces: NamespaceSet,
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers
            .push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_request_token<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.request_token = Some(Arc::new(provider));
        self
    }

    pub fn with_namespace(mut self, prefix: &str, uri: &str) -> Result<Self, SyncError> {
        self.namespaces.register(prefix, uri)?;
        Ok(self)
    }

    /// Validates the configuration; called by the facade constructor.
    pub fn validate(&self) -> Result<(), SyncError> {
        for (name, _) in &self.default_headers {
            if name.trim().is_empty() {
                return Err(SyncError::Config(
                    "default header with empty name".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// The fixed baseline every request starts from: the requested-via-script
    /// marker, the anti-forgery token if a provider is configured, then the
    /// configured default headers.
    pub fn baseline_headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![(
            REQUESTED_WITH_HEADER.0.to_string(),
            REQUESTED_WITH_HEADER.1.to_string(),
        )];
        if let Some(provider) = &self.request_token {
            if let Some(token) = provider() {
                headers.push((REQUEST_TOKEN_HEADER.to_string(), token));
            }
        }
        headers.extend(self.default_headers.iter().cloned());
        headers
    }
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("default_headers", &self.default_headers)
            .field("request_token", &self.request_token.is_some())
            .field("namespaces", &self.namespaces)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_headers_carry_script_marker() {
        let config = SyncConfig::new();
        let headers = config.baseline_headers();
        assert_eq!(
            headers,
            vec![("X-Requested-With".to_string(), "XMLHttpRequest".to_string())]
        );
    }

    #[test]
    fn test_token_provider_is_consulted_per_call() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let config = SyncConfig::new().with_request_token(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Some("tok123".to_string())
        });

        let headers = config.baseline_headers();
        assert!(headers.contains(&("requesttoken".to_string(), "tok123".to_string())));
        config.baseline_headers();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_validate_rejects_empty_header_name() {
        let config = SyncConfig::new().with_header("", "x");
        assert!(matches!(config.validate(), Err(SyncError::Config(_))));
    }
}
