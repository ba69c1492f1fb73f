//! Connected flag shared between the network thread and callers

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Outcome of waiting for a hub connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionResult {
    /// The connected signal was set before the timeout
    Connected,
    /// The timeout elapsed without a connection
    TimedOut,
}

impl ConnectionResult {
    /// True for [`ConnectionResult::Connected`]
    pub fn is_connected(self) -> bool {
        self == ConnectionResult::Connected
    }
}

/// Boolean flag with blocking wait-until-set
#[derive(Debug, Default)]
pub struct ConnectedSignal {
    flag: Mutex<bool>,
    changed: Condvar,
}

impl ConnectedSignal {
    /// New signal, initially unset
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock still holds a valid bool.
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.flag.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Set or clear the flag, waking any waiters
    pub fn set(&self, connected: bool) {
        *self.lock() = connected;
        self.changed.notify_all();
    }

    /// Current value
    pub fn is_set(&self) -> bool {
        *self.lock()
    }

    /// Block until the flag is set or `timeout` elapses
    pub fn wait(&self, timeout: Duration) -> ConnectionResult {
        let guard = self.lock();
        let (guard, _) = self
            .changed
            .wait_timeout_while(guard, timeout, |connected| !*connected)
            .unwrap_or_else(|e| e.into_inner());
        if *guard {
            ConnectionResult::Connected
        } else {
            ConnectionResult::TimedOut
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_wait_times_out_when_unset() {
        let signal = ConnectedSignal::new();
        let start = Instant::now();

        assert_eq!(signal.wait(Duration::from_millis(50)), ConnectionResult::TimedOut);
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert!(!signal.is_set());
    }

    #[test]
    fn test_wait_returns_immediately_when_set() {
        let signal = ConnectedSignal::new();
        signal.set(true);
        assert_eq!(signal.wait(Duration::from_secs(5)), ConnectionResult::Connected);
    }

    #[test]
    fn test_wait_wakes_on_set_from_other_thread() {
        let signal = Arc::new(ConnectedSignal::new());
        let setter = signal.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            setter.set(true);
        });

        assert!(signal.wait(Duration::from_secs(5)).is_connected());
        handle.join().unwrap();
    }
}
