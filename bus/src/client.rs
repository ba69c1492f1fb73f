//! HiveMind Bus Client
//!
//! Owns one websocket connection to a hub, kept alive by a background
//! network thread. Callers interact through the [`BusClient`] trait:
//! wait for the connected signal, emit messages, subscribe to events.

use crate::config::ConnectionConfig;
use crate::crypto;
use crate::error::BusError;
use crate::message::{HiveMessage, HiveMessageType, Message};
use crate::signal::{ConnectedSignal, ConnectionResult};
use crate::subscription::{EventRegistry, Handler, SubscriptionHandle};
use futures_util::{SinkExt, StreamExt};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Operations the chat UI needs from a hub connection
pub trait BusClient: Send + Sync {
    /// Start the background network loop
    fn run_in_thread(&self) -> Result<(), BusError>;

    /// Block until connected or `timeout` elapses
    fn wait_for_connection(&self, timeout: Duration) -> ConnectionResult;

    /// True while the hub connection is up
    fn is_connected(&self) -> bool;

    /// Snapshot of the current connection parameters
    fn config(&self) -> ConnectionConfig;

    /// Replace connection parameters in place
    ///
    /// The live socket is not torn down; the new values apply from the
    /// next (re)connect and to frames encrypted from now on.
    fn reconfigure(&self, config: ConnectionConfig);

    /// Send a bus message to the hub
    fn emit(&self, message: Message) -> Result<(), BusError>;

    /// Register a handler for inbound bus messages of type `event`
    fn subscribe(&self, event: &str, handler: Handler) -> SubscriptionHandle;

    /// Remove a handler; returns false if it was not registered
    fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool;
}

/// State shared between the client handle and its network thread
struct Shared {
    config: RwLock<ConnectionConfig>,
    useragent: String,
    signal: ConnectedSignal,
    registry: EventRegistry,
}

impl Shared {
    fn config(&self) -> ConnectionConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Serialize and, if a crypto key is set, encrypt an outbound message
    fn encode(&self, message: &Message) -> Result<String, BusError> {
        let frame = serde_json::to_string(&HiveMessage::bus(message)?)?;
        match self.config().crypto_key {
            Some(key) => crypto::encrypt_as_json(&key, &frame),
            None => Ok(frame),
        }
    }

    /// Decode one inbound text frame and dispatch it to subscribers
    fn handle_frame(&self, raw: &str) {
        let plaintext = match crypto::as_encrypted_frame(raw) {
            Some(frame) => {
                let Some(key) = self.config().crypto_key else {
                    warn!("Received encrypted frame but no crypto key is configured");
                    return;
                };
                match crypto::decrypt_from_json(&key, &frame) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "Dropping undecryptable frame");
                        return;
                    }
                }
            }
            None => raw.to_string(),
        };

        let envelope: HiveMessage = match serde_json::from_str(&plaintext) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "Dropping malformed frame");
                return;
            }
        };

        match envelope.bus_message() {
            Some(message) => {
                let handled = self.registry.dispatch(&message);
                debug!(msg_type = %message.msg_type, handled, "Inbound bus message");
            }
            None if envelope.msg_type == HiveMessageType::Bus => {
                warn!("Dropping bus frame without a valid message payload");
            }
            None => debug!(msg_type = ?envelope.msg_type, "Ignoring non-bus frame"),
        }
    }
}

/// Why a live socket stopped being pumped
enum PumpExit {
    /// Hub closed the socket or the transport failed
    Disconnected,
    /// The owning client was dropped; stop the loop
    ClientDropped,
}

/// Websocket client for a HiveMind hub
pub struct HiveMessageBusClient {
    shared: Arc<Shared>,
    outbound: UnboundedSender<String>,
    pending: Mutex<Option<UnboundedReceiver<String>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl HiveMessageBusClient {
    /// Create a client; nothing connects until [`BusClient::run_in_thread`]
    pub fn new(config: ConnectionConfig, useragent: impl Into<String>) -> Self {
        let (outbound, pending) = mpsc::unbounded_channel();
        Self {
            shared: Arc::new(Shared {
                config: RwLock::new(config),
                useragent: useragent.into(),
                signal: ConnectedSignal::new(),
                registry: EventRegistry::new(),
            }),
            outbound,
            pending: Mutex::new(Some(pending)),
            worker: Mutex::new(None),
        }
    }

    /// True once the network thread has been started and has not exited
    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl BusClient for HiveMessageBusClient {
    fn run_in_thread(&self) -> Result<(), BusError> {
        let outbound = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or(BusError::AlreadyRunning)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let shared = self.shared.clone();
        let handle = std::thread::Builder::new()
            .name("hivemind-bus".to_string())
            .spawn(move || runtime.block_on(network_loop(shared, outbound)))?;

        *self.worker.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
        info!(url = %self.shared.config().display_url(), "HiveMind network loop started");
        Ok(())
    }

    fn wait_for_connection(&self, timeout: Duration) -> ConnectionResult {
        self.shared.signal.wait(timeout)
    }

    fn is_connected(&self) -> bool {
        self.shared.signal.is_set()
    }

    fn config(&self) -> ConnectionConfig {
        self.shared.config()
    }

    fn reconfigure(&self, config: ConnectionConfig) {
        info!(url = %config.display_url(), "Updating HiveMind connection parameters");
        *self.shared.config.write().unwrap_or_else(|e| e.into_inner()) = config;
    }

    fn emit(&self, message: Message) -> Result<(), BusError> {
        if !self.is_connected() {
            return Err(BusError::NotConnected);
        }
        let frame = self.shared.encode(&message)?;
        self.outbound
            .send(frame)
            .map_err(|_| BusError::NotConnected)?;
        debug!(msg_type = %message.msg_type, "Queued outbound message");
        Ok(())
    }

    fn subscribe(&self, event: &str, handler: Handler) -> SubscriptionHandle {
        debug!(event = %event, "Subscribing to bus event");
        self.shared.registry.subscribe(event, handler)
    }

    fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        self.shared.registry.unsubscribe(handle)
    }
}

/// Connect, pump, reconnect with backoff until the client is dropped
async fn network_loop(shared: Arc<Shared>, mut outbound: UnboundedReceiver<String>) {
    let mut backoff = INITIAL_BACKOFF;

    loop {
        let config = shared.config();
        match open_socket(&config, &shared.useragent).await {
            Ok(socket) => {
                backoff = INITIAL_BACKOFF;
                info!(url = %config.display_url(), "Connected to HiveMind");
                shared.signal.set(true);
                let exit = pump(&shared, socket, &mut outbound).await;
                shared.signal.set(false);

                if let PumpExit::ClientDropped = exit {
                    info!("HiveMind client dropped, stopping network loop");
                    return;
                }
                warn!(url = %config.display_url(), "Disconnected from HiveMind");
            }
            Err(e) => {
                warn!(
                    url = %config.display_url(),
                    error = %e,
                    retry_in_secs = backoff.as_secs(),
                    "HiveMind connection failed"
                );
            }
        }

        // Frames queued for a dead socket are stale.
        loop {
            match outbound.try_recv() {
                Ok(_) => {}
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => return,
            }
        }

        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

async fn open_socket(config: &ConnectionConfig, useragent: &str) -> Result<Socket, BusError> {
    let url = config.endpoint(useragent)?;

    let connector = if config.is_secure() {
        let tls = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(config.accept_self_signed)
            .danger_accept_invalid_hostnames(config.accept_self_signed)
            .build()?;
        Some(Connector::NativeTls(tls))
    } else {
        None
    };

    let (socket, _) =
        tokio_tungstenite::connect_async_tls_with_config(url.as_str(), None, false, connector)
            .await?;
    Ok(socket)
}

async fn pump(
    shared: &Shared,
    socket: Socket,
    outbound: &mut UnboundedReceiver<String>,
) -> PumpExit {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => shared.handle_frame(&text),
                Some(Ok(WsMessage::Close(_))) | None => return PumpExit::Disconnected,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!(error = %e, "HiveMind socket error");
                    return PumpExit::Disconnected;
                }
            },
            next = outbound.recv() => match next {
                Some(text) => {
                    if let Err(e) = sink.send(WsMessage::Text(text)).await {
                        error!(error = %e, "Failed to send frame to HiveMind");
                        return PumpExit::Disconnected;
                    }
                }
                None => {
                    let _ = sink.close().await;
                    return PumpExit::ClientDropped;
                }
            },
        }
    }
}
