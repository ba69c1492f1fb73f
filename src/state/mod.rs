// State management module
// Chat transcript, connect form and the chat view controller

pub mod app_state;
pub mod transcript;

pub use app_state::{ChatController, ConnectionStatus, Tab};
pub use transcript::{ChatEntry, Speaker};
