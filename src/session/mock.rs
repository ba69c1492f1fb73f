// In-memory bus client for tests

use crate::session::manager::ClientFactory;
use hivemind_bus::{
    BusClient, BusError, ConnectionConfig, ConnectionResult, EventRegistry, Handler, Message,
    SubscriptionHandle,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Bus client that records emits and lets tests inject inbound messages
pub struct MockBus {
    config: Mutex<ConnectionConfig>,
    connect_on_start: bool,
    connected: AtomicBool,
    fail_emits: AtomicBool,
    starts: AtomicUsize,
    emitted: Mutex<Vec<Message>>,
    registry: EventRegistry,
}

impl MockBus {
    pub fn new(config: ConnectionConfig, connect_on_start: bool) -> Self {
        Self {
            config: Mutex::new(config),
            connect_on_start,
            connected: AtomicBool::new(false),
            fail_emits: AtomicBool::new(false),
            starts: AtomicUsize::new(0),
            emitted: Mutex::new(Vec::new()),
            registry: EventRegistry::new(),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Make every later emit fail even while connected
    pub fn set_fail_emits(&self, fail: bool) {
        self.fail_emits.store(fail, Ordering::SeqCst);
    }

    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn emitted(&self) -> Vec<Message> {
        self.emitted.lock().unwrap().clone()
    }

    /// Simulate an inbound bus message; returns handlers invoked
    pub fn deliver(&self, message: &Message) -> usize {
        self.registry.dispatch(message)
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.registry.handler_count(event)
    }
}

impl BusClient for MockBus {
    fn run_in_thread(&self) -> Result<(), BusError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.connect_on_start {
            self.set_connected(true);
        }
        Ok(())
    }

    fn wait_for_connection(&self, _timeout: Duration) -> ConnectionResult {
        if self.is_connected() {
            ConnectionResult::Connected
        } else {
            ConnectionResult::TimedOut
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn config(&self) -> ConnectionConfig {
        self.config.lock().unwrap().clone()
    }

    fn reconfigure(&self, config: ConnectionConfig) {
        *self.config.lock().unwrap() = config;
    }

    fn emit(&self, message: Message) -> Result<(), BusError> {
        if !self.is_connected() {
            return Err(BusError::NotConnected);
        }
        if self.fail_emits.load(Ordering::SeqCst) {
            return Err(BusError::Transport("connection reset".to_string()));
        }
        self.emitted.lock().unwrap().push(message);
        Ok(())
    }

    fn subscribe(&self, event: &str, handler: Handler) -> SubscriptionHandle {
        self.registry.subscribe(event, handler)
    }

    fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        self.registry.unsubscribe(handle)
    }
}

/// Factory producing `MockBus` clients, plus the list of clients it created
pub fn mock_factory(connect_on_start: bool) -> (ClientFactory, Arc<Mutex<Vec<Arc<MockBus>>>>) {
    let created = Arc::new(Mutex::new(Vec::new()));
    let registry = created.clone();
    let factory: ClientFactory = Box::new(move |config| {
        let bus = Arc::new(MockBus::new(config, connect_on_start));
        registry.lock().unwrap().push(bus.clone());
        bus as Arc<dyn BusClient>
    });
    (factory, created)
}
