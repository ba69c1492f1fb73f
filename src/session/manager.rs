// Session manager
// Lazily creates the bus client on first connect and reconfigures it afterwards

use hivemind_bus::{BusClient, ConnectionConfig, ConnectionResult, HiveMessageBusClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Builds a bus client for a connection config
pub type ClientFactory = Box<dyn Fn(ConnectionConfig) -> Arc<dyn BusClient>>;

/// Owns at most one bus client for the lifetime of the UI
///
/// The first successful `connect` creates the client and starts its network
/// loop. Later calls only rewrite the client's connection parameters; the
/// client applies them on its next reconnect.
pub struct SessionManager {
    /// The live client, once created
    client: Option<Arc<dyn BusClient>>,
    /// Creates the client on first connect
    factory: ClientFactory,
    /// Sticky self-signed certificate acceptance
    accept_self_signed: bool,
    /// Bounded wait for the connected signal on first connect
    connect_timeout: Duration,
}

impl SessionManager {
    /// Create a session manager with an injected client factory
    pub fn new(factory: ClientFactory, connect_timeout: Duration) -> Self {
        Self {
            client: None,
            factory,
            accept_self_signed: false,
            connect_timeout,
        }
    }

    /// Session manager backed by real HiveMind websocket clients
    pub fn hivemind(useragent: String, connect_timeout: Duration) -> Self {
        let factory: ClientFactory = Box::new(move |config| {
            Arc::new(HiveMessageBusClient::new(config, useragent.clone())) as Arc<dyn BusClient>
        });
        Self::new(factory, connect_timeout)
    }

    /// Set self-signed certificate acceptance for future connects
    pub fn set_accept_self_signed(&mut self, accept: bool) {
        self.accept_self_signed = accept;
    }

    /// Current self-signed certificate acceptance
    pub fn accept_self_signed(&self) -> bool {
        self.accept_self_signed
    }

    /// Connect to the hub, or reconfigure the existing session
    ///
    /// With no session, builds the client, starts its network loop and
    /// blocks up to the connect timeout for the connected signal. With a
    /// session, mutates its parameters in place without waiting.
    pub fn connect(
        &mut self,
        access_key: &str,
        host: &str,
        port: u16,
        crypto_key: Option<&str>,
        accept_self_signed: Option<bool>,
    ) -> ConnectionResult {
        if let Some(accept) = accept_self_signed {
            self.accept_self_signed = accept;
        }
        let config = ConnectionConfig::new(
            host,
            port,
            access_key,
            crypto_key.map(str::to_string),
            self.accept_self_signed,
        );

        if let Some(client) = &self.client {
            // TODO: tear down and recreate the client once the hub is confirmed
            // not to re-authenticate a live socket after reconfigure.
            client.reconfigure(config);
            return if client.is_connected() {
                ConnectionResult::Connected
            } else {
                ConnectionResult::TimedOut
            };
        }

        let url = config.display_url();
        let client = (self.factory)(config);
        if let Err(e) = client.run_in_thread() {
            error!(url = %url, error = %e, "Failed to start HiveMind client");
            return ConnectionResult::TimedOut;
        }
        self.client = Some(client.clone());

        info!(url = %url, timeout_secs = self.connect_timeout.as_secs(), "Waiting for HiveMind connection");
        let result = client.wait_for_connection(self.connect_timeout);
        if !result.is_connected() {
            warn!(url = %url, "Timed out waiting for HiveMind connection");
        }
        result
    }

    /// True iff a session exists and its connected signal is set
    pub fn is_connected(&self) -> bool {
        self.client.as_ref().is_some_and(|c| c.is_connected())
    }

    /// Shared handle to the session's bus client, if one exists
    pub fn client(&self) -> Option<&Arc<dyn BusClient>> {
        self.client.as_ref()
    }
}
