// Application configuration
// Environment-driven defaults for the connect form and session

use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Initial values for the connect form
    pub form: FormDefaults,
    /// Session manager configuration
    pub session: SessionConfig,
}

/// Initial connect form values
#[derive(Clone)]
pub struct FormDefaults {
    /// Hub host; the scheme selects plaintext or TLS
    pub host: String,
    /// Hub port, kept as text like the form field
    pub port: String,
    /// Access key
    pub access_key: String,
    /// Crypto key (empty = no encryption)
    pub crypto_key: String,
    /// Language code sent with utterances
    pub lang: String,
    /// Accept self-signed certificates
    pub accept_self_signed: bool,
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a first connect blocks waiting for the hub
    pub connect_timeout_secs: u64,
    /// User agent announced to the hub
    pub useragent: String,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            host: "ws://0.0.0.0".to_string(),
            port: "5678".to_string(),
            access_key: String::new(),
            crypto_key: String::new(),
            lang: "en-us".to_string(),
            accept_self_signed: false,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            useragent: "HiveMindEguiV0.1".to_string(),
        }
    }
}

// Keys stay out of logs
impl std::fmt::Debug for FormDefaults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormDefaults")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("lang", &self.lang)
            .field("accept_self_signed", &self.accept_self_signed)
            .finish_non_exhaustive()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let form_defaults = FormDefaults::default();
        let session_defaults = SessionConfig::default();

        Self {
            form: FormDefaults {
                host: env::var("HIVEMIND_HOST").unwrap_or(form_defaults.host),
                port: env::var("HIVEMIND_PORT").unwrap_or(form_defaults.port),
                access_key: env::var("HIVEMIND_ACCESS_KEY").unwrap_or(form_defaults.access_key),
                crypto_key: env::var("HIVEMIND_CRYPTO_KEY").unwrap_or(form_defaults.crypto_key),
                lang: env::var("HIVEMIND_LANG").unwrap_or(form_defaults.lang),
                accept_self_signed: env::var("HIVEMIND_SELF_SIGNED")
                    .ok()
                    .and_then(|v| parse_flag(&v))
                    .unwrap_or(form_defaults.accept_self_signed),
            },
            session: SessionConfig {
                connect_timeout_secs: env::var("HIVEMIND_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(session_defaults.connect_timeout_secs),
                useragent: env::var("HIVEMIND_USERAGENT").unwrap_or(session_defaults.useragent),
            },
        }
    }
}

impl SessionConfig {
    /// Connect timeout as a `Duration`
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 8] = [
        "HIVEMIND_HOST",
        "HIVEMIND_PORT",
        "HIVEMIND_ACCESS_KEY",
        "HIVEMIND_CRYPTO_KEY",
        "HIVEMIND_LANG",
        "HIVEMIND_SELF_SIGNED",
        "HIVEMIND_CONNECT_TIMEOUT_SECS",
        "HIVEMIND_USERAGENT",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env();

        assert_eq!(config.form.host, "ws://0.0.0.0");
        assert_eq!(config.form.port, "5678");
        assert_eq!(config.form.lang, "en-us");
        assert!(config.form.access_key.is_empty());
        assert!(!config.form.accept_self_signed);
        assert_eq!(config.session.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        env::set_var("HIVEMIND_HOST", "wss://hub.example");
        env::set_var("HIVEMIND_PORT", "443");
        env::set_var("HIVEMIND_LANG", "pt-pt");
        env::set_var("HIVEMIND_SELF_SIGNED", "yes");
        env::set_var("HIVEMIND_CONNECT_TIMEOUT_SECS", "3");

        let config = Config::from_env();
        clear_env();

        assert_eq!(config.form.host, "wss://hub.example");
        assert_eq!(config.form.port, "443");
        assert_eq!(config.form.lang, "pt-pt");
        assert!(config.form.accept_self_signed);
        assert_eq!(config.session.connect_timeout_secs, 3);
    }

    #[test]
    #[serial]
    fn test_invalid_values_fall_back() {
        clear_env();
        env::set_var("HIVEMIND_SELF_SIGNED", "maybe");
        env::set_var("HIVEMIND_CONNECT_TIMEOUT_SECS", "soon");

        let config = Config::from_env();
        clear_env();

        assert!(!config.form.accept_self_signed);
        assert_eq!(config.session.connect_timeout_secs, 10);
    }

    #[test]
    fn test_debug_hides_keys() {
        let defaults = FormDefaults {
            access_key: "supersecret".to_string(),
            ..FormDefaults::default()
        };
        assert!(!format!("{:?}", defaults).contains("supersecret"));
    }
}
