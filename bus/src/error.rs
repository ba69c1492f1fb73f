//! Bus client error types

use thiserror::Error;

/// Errors raised by the HiveMind bus client
#[derive(Error, Debug)]
pub enum BusError {
    /// Host/port could not be turned into a websocket URL
    #[error("Invalid hub endpoint: {0}")]
    InvalidEndpoint(String),

    /// Crypto key is too short for AES-128
    #[error("Crypto key must be at least {0} bytes")]
    InvalidCryptoKey(usize),

    /// Payload encryption failed
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Payload decryption failed (bad key, tampered frame, malformed envelope)
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TLS connector could not be built
    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    /// Websocket transport error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Operation requires a live hub connection
    #[error("Not connected to the HiveMind")]
    NotConnected,

    /// `run_in_thread` was called on a client whose loop is already running
    #[error("Network loop is already running")]
    AlreadyRunning,

    /// Network thread or runtime could not be started
    #[error("Failed to start network thread: {0}")]
    Runtime(#[from] std::io::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for BusError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        BusError::Transport(err.to_string())
    }
}
