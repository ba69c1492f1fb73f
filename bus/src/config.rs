//! Connection parameters for a HiveMind hub

use crate::error::BusError;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;
use url::Url;

/// Everything needed to open (or reopen) a hub connection
///
/// Built fresh from the connect form on every attempt; never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Hub host, optionally prefixed with `ws://` or `wss://`
    pub host: String,
    /// Hub port
    pub port: u16,
    /// Access key used for authorization
    pub access_key: String,
    /// Optional key enabling payload encryption
    pub crypto_key: Option<String>,
    /// Accept self-signed TLS certificates
    pub accept_self_signed: bool,
}

impl ConnectionConfig {
    /// Create a config; an empty crypto key means no encryption
    pub fn new(
        host: impl Into<String>,
        port: u16,
        access_key: impl Into<String>,
        crypto_key: Option<String>,
        accept_self_signed: bool,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            access_key: access_key.into(),
            crypto_key: crypto_key.filter(|k| !k.is_empty()),
            accept_self_signed,
        }
    }

    /// Transport security is selected by the host scheme
    pub fn is_secure(&self) -> bool {
        self.host.starts_with("wss:")
    }

    /// Host with scheme and trailing slashes removed
    pub fn bare_host(&self) -> &str {
        let host = self.host.trim();
        let host = host
            .strip_prefix("wss://")
            .or_else(|| host.strip_prefix("ws://"))
            .unwrap_or(host);
        host.trim_end_matches('/')
    }

    /// Display form of the hub address, without credentials
    pub fn display_url(&self) -> String {
        let scheme = if self.is_secure() { "wss" } else { "ws" };
        format!("{}://{}:{}", scheme, self.bare_host(), self.port)
    }

    /// Websocket URL including the `authorization` query parameter
    ///
    /// The token is `base64("{useragent}:{access_key}")`.
    pub fn endpoint(&self, useragent: &str) -> Result<Url, BusError> {
        let host = self.bare_host();
        if host.is_empty() {
            return Err(BusError::InvalidEndpoint("host is empty".to_string()));
        }
        // The port is appended after the host, so a path here would swallow it
        if host.contains(['/', '?', '#']) {
            return Err(BusError::InvalidEndpoint(format!(
                "{}: host must not carry a path or query",
                self.host
            )));
        }

        let mut url = Url::parse(&format!("{}/", self.display_url()))
            .map_err(|e| BusError::InvalidEndpoint(format!("{}: {}", self.host, e)))?;
        let token = STANDARD.encode(format!("{}:{}", useragent, self.access_key));
        url.query_pairs_mut().append_pair("authorization", &token);
        Ok(url)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("access_key", &"<redacted>")
            .field("crypto_key", &self.crypto_key.as_ref().map(|_| "<redacted>"))
            .field("accept_self_signed", &self.accept_self_signed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: &str) -> ConnectionConfig {
        ConnectionConfig::new(host, 5678, "secret", None, false)
    }

    #[test]
    fn test_scheme_selects_tls() {
        assert!(config("wss://hub.local").is_secure());
        assert!(!config("ws://hub.local").is_secure());
        assert!(!config("hub.local").is_secure());
    }

    #[test]
    fn test_bare_host_strips_scheme() {
        assert_eq!(config("ws://0.0.0.0").bare_host(), "0.0.0.0");
        assert_eq!(config("wss://hub.local/").bare_host(), "hub.local");
        assert_eq!(config("hub.local").bare_host(), "hub.local");
    }

    #[test]
    fn test_empty_crypto_key_disables_encryption() {
        let config = ConnectionConfig::new("ws://a", 1, "k", Some(String::new()), false);
        assert!(config.crypto_key.is_none());
    }

    #[test]
    fn test_endpoint_carries_authorization() {
        let url = config("wss://hub.local").endpoint("TestAgent").unwrap();
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.host_str(), Some("hub.local"));
        assert_eq!(url.port(), Some(5678));

        let token = url
            .query_pairs()
            .find(|(k, _)| k == "authorization")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        let decoded = String::from_utf8(STANDARD.decode(token).unwrap()).unwrap();
        assert_eq!(decoded, "TestAgent:secret");
    }

    #[test]
    fn test_endpoint_rejects_empty_host() {
        assert!(matches!(
            config("ws://").endpoint("TestAgent"),
            Err(BusError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_endpoint_rejects_host_with_path() {
        for host in ["ws://hub.local/hive", "wss://hub.local/a/b/", "hub.local?x=1", "hub.local#top"] {
            assert!(
                matches!(config(host).endpoint("TestAgent"), Err(BusError::InvalidEndpoint(_))),
                "{host} should be rejected"
            );
        }
        // A trailing slash alone is still a bare host
        assert!(config("ws://hub.local/").endpoint("TestAgent").is_ok());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = ConnectionConfig::new("ws://a", 1, "topsecret", Some("cryptokey12345678".into()), false);
        let debug = format!("{:?}", config);
        assert!(!debug.contains("topsecret"));
        assert!(!debug.contains("cryptokey"));
    }
}
