//! HiveMind Bus Client
//!
//! Persistent websocket connection to a HiveMind hub: access-key
//! authentication, optional payload encryption, message framing and
//! event subscriptions. The GUI only talks to it through [`BusClient`].

pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod message;
pub mod signal;
pub mod subscription;

pub use client::{BusClient, HiveMessageBusClient};
pub use config::ConnectionConfig;
pub use error::BusError;
pub use message::{HiveMessage, HiveMessageType, Message};
pub use signal::{ConnectedSignal, ConnectionResult};
pub use subscription::{EventRegistry, Handler, SubscriptionHandle};
