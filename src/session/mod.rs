// Session management
// Owns the single hub connection for this UI instance

pub mod manager;
#[cfg(test)]
pub mod mock;

pub use manager::SessionManager;
