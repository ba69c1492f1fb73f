// Chat view controller state
// Connect form, connection status, transcript and the handlers behind every UI action

use crate::config::FormDefaults;
use crate::session::SessionManager;
use crate::state::transcript::{ChatEntry, Transcript};
use hivemind_bus::{crypto, Message, SubscriptionHandle};
use serde_json::json;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// First bubble of a fresh chat view
pub const GREETING: &str = "Ask me something";
/// Local reply when sending without a hub connection
pub const NOT_CONNECTED_REPLY: &str = "I am not connected to the HiveMind!";
/// Local reply prefix when the hub connection rejects an utterance
pub const SEND_FAILED_REPLY: &str = "I could not send that to the HiveMind";
/// Outbound event carrying typed text
pub const UTTERANCE_EVENT: &str = "recognizer_loop:utterance";
/// Inbound event carrying spoken responses
pub const SPEAK_EVENT: &str = "speak";

/// Connection status shown in the connect form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    /// No session, or never connected
    Disconnected,
    /// A connect is in progress
    Connecting,
    /// Hub connection is up
    Connected,
    /// The bounded wait elapsed without a connection
    TimedOut,
    /// The port field is not a valid port number
    InvalidPort,
    /// The crypto key is set but too short to encrypt with
    InvalidCryptoKey,
}

impl ConnectionStatus {
    /// Status label text
    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "Disconnected",
            ConnectionStatus::Connecting => "Connecting",
            ConnectionStatus::Connected => "Connected to HiveMind!",
            ConnectionStatus::TimedOut => "Connection timeout",
            ConnectionStatus::InvalidPort => "Invalid port",
            ConnectionStatus::InvalidCryptoKey => "Invalid crypto key",
        }
    }
}

/// Credentials form fields, edited directly by the UI
#[derive(Debug, Clone)]
pub struct ConnectForm {
    pub host: String,
    pub port: String,
    pub access_key: String,
    pub crypto_key: String,
    pub lang: String,
    pub accept_self_signed: bool,
}

impl From<&FormDefaults> for ConnectForm {
    fn from(defaults: &FormDefaults) -> Self {
        Self {
            host: defaults.host.clone(),
            port: defaults.port.clone(),
            access_key: defaults.access_key.clone(),
            crypto_key: defaults.crypto_key.clone(),
            lang: defaults.lang.clone(),
            accept_self_signed: defaults.accept_self_signed,
        }
    }
}

impl Default for ConnectForm {
    fn default() -> Self {
        Self::from(&FormDefaults::default())
    }
}

/// Tabs of the main window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Connect,
    Chat,
}

/// UI-specific state
#[derive(Debug, Clone)]
pub struct UiState {
    /// Currently shown tab
    pub active_tab: Tab,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_tab: Tab::Connect,
        }
    }
}

/// Events produced on the bus thread and applied on the UI thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// The hub spoke an utterance
    Speak(String),
}

/// Wakes the UI after an inbound event is queued
pub type RepaintHook = Arc<dyn Fn() + Send + Sync>;

/// Chat view controller
///
/// Holds everything the connect form and chat view render, and implements
/// their actions. Rendering lives in `ui`; this type never touches egui.
pub struct ChatController {
    /// Connect form fields
    pub form: ConnectForm,
    /// Connection status label
    pub status: ConnectionStatus,
    /// Chat transcript
    pub transcript: Transcript,
    /// Text input of the chat view
    pub input: String,
    /// UI preferences
    pub ui_state: UiState,
    /// The single hub session of this UI instance
    session: SessionManager,
    /// Sender cloned into bus subscriptions
    inbound_tx: Sender<InboundEvent>,
    /// Drained on the UI thread each frame
    inbound_rx: Receiver<InboundEvent>,
    /// Active `speak` subscription, registered once per session
    speak_subscription: Option<SubscriptionHandle>,
    /// Called from the bus thread after queueing an event
    repaint: Option<RepaintHook>,
}

impl ChatController {
    /// Create a controller with an injected session and initial form values
    pub fn new(session: SessionManager, form: ConnectForm) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel();
        let mut controller = Self {
            form,
            status: ConnectionStatus::Disconnected,
            transcript: Transcript::seeded(GREETING),
            input: String::new(),
            ui_state: UiState::default(),
            session,
            inbound_tx,
            inbound_rx,
            speak_subscription: None,
            repaint: None,
        };
        let accept = controller.form.accept_self_signed;
        controller.session.set_accept_self_signed(accept);
        controller
    }

    /// Install the hook used to wake the UI from the bus thread
    pub fn set_repaint_hook(&mut self, hook: RepaintHook) {
        self.repaint = Some(hook);
    }

    /// True iff the session reports a live connection
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Self-signed checkbox changed
    pub fn on_self_signed_toggled(&mut self) {
        self.session.set_accept_self_signed(self.form.accept_self_signed);
        debug!(accept = self.session.accept_self_signed(), "Self-signed acceptance toggled");
    }

    /// Connect button pressed
    ///
    /// Blocks for at most the session's connect timeout on first connect.
    pub fn on_connect_pressed(&mut self) {
        self.status = ConnectionStatus::Connecting;

        let port = match self.form.port.trim().parse::<u16>() {
            Ok(port) => port,
            Err(e) => {
                warn!(port = %self.form.port, error = %e, "Invalid port");
                self.status = ConnectionStatus::InvalidPort;
                return;
            }
        };
        let crypto_key = Some(self.form.crypto_key.trim()).filter(|k| !k.is_empty());
        if let Some(Err(e)) = crypto_key.map(crypto::validate_key) {
            warn!(error = %e, "Invalid crypto key");
            self.status = ConnectionStatus::InvalidCryptoKey;
            return;
        }

        self.session.connect(
            &self.form.access_key,
            self.form.host.trim(),
            port,
            crypto_key,
            None,
        );

        if self.session.is_connected() {
            info!(host = %self.form.host, port, "Connected to HiveMind!");
            self.status = ConnectionStatus::Connected;
            self.clear_chat();
            self.on_inbound_speak(ConnectionStatus::Connected.label().to_string());
            self.subscribe_speak();
        } else {
            self.status = ConnectionStatus::TimedOut;
        }
    }

    /// Send button pressed (or Enter in the input field)
    pub fn on_send_pressed(&mut self) {
        let utterance = std::mem::take(&mut self.input);
        self.transcript.push(ChatEntry::user(utterance.clone()));

        let client = self
            .session
            .client()
            .filter(|client| client.is_connected())
            .cloned();
        let Some(client) = client else {
            self.transcript.push(ChatEntry::bot(NOT_CONNECTED_REPLY));
            return;
        };

        let message = Message::new(
            UTTERANCE_EVENT,
            json!({
                "utterances": [utterance],
                "lang": self.form.lang,
            }),
        );
        if let Err(e) = client.emit(message) {
            warn!(error = %e, "Failed to send utterance");
            self.transcript
                .push(ChatEntry::bot(format!("{}: {}", SEND_FAILED_REPLY, e)));
        }
    }

    /// Spoken response from the hub
    pub fn on_inbound_speak(&mut self, utterance: String) {
        self.transcript.push(ChatEntry::bot(utterance));
    }

    /// Apply inbound events queued by the bus thread; returns how many
    pub fn drain_inbound(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.inbound_rx.try_recv() {
            match event {
                InboundEvent::Speak(utterance) => self.on_inbound_speak(utterance),
            }
            applied += 1;
        }
        applied
    }

    /// Remove every transcript entry
    pub fn clear_chat(&mut self) {
        self.transcript.clear();
    }

    fn subscribe_speak(&mut self) {
        if self.speak_subscription.is_some() {
            return;
        }
        let Some(client) = self.session.client() else {
            return;
        };

        let tx = self.inbound_tx.clone();
        let repaint = self.repaint.clone();
        let handle = client.subscribe(
            SPEAK_EVENT,
            Arc::new(move |message: &Message| {
                let Some(utterance) = message.data_str("utterance") else {
                    warn!(data = %message.data, "Speak event without an utterance");
                    return;
                };
                if tx.send(InboundEvent::Speak(utterance.to_string())).is_ok() {
                    if let Some(repaint) = &repaint {
                        repaint();
                    }
                }
            }),
        );
        self.speak_subscription = Some(handle);
    }
}
