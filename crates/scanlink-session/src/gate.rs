//! Listening mode gate.
//!
//! ```text
//!        start_listening()
//!   ┌──────┐ ────────────► ┌───────────┐
//!   │ Idle │               │ Listening │
//!   └──────┘ ◄──────────── └───────────┘
//!        stop_listening()
//! ```
//!
//! A session being established also moves `Idle` to `Listening` when
//! auto-start is enabled and the consumer has not stopped listening since
//! their last explicit start.

use serde::{Deserialize, Serialize};

/// Whether barcode events are forwarded to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListeningState {
    #[default]
    Idle,
    Listening,
}

/// Gate deciding whether barcode data reaches consumers.
#[derive(Debug, Clone, Default)]
pub struct ListeningGate {
    state: ListeningState,
    auto_start_on_connect: bool,
    stopped_explicitly: bool,
}

impl ListeningGate {
    pub fn new(auto_start_on_connect: bool) -> Self {
        Self {
            state: ListeningState::Idle,
            auto_start_on_connect,
            stopped_explicitly: false,
        }
    }

    pub fn state(&self) -> ListeningState {
        self.state
    }

    /// Start forwarding barcodes. Returns `true` if the state changed.
    pub fn start(&mut self) -> bool {
        self.stopped_explicitly = false;
        self.transition(ListeningState::Listening)
    }

    /// Stop forwarding barcodes. Returns `true` if the state changed.
    pub fn stop(&mut self) -> bool {
        self.stopped_explicitly = true;
        self.transition(ListeningState::Idle)
    }

    /// Apply the auto-start policy for a newly established session.
    ///
    /// Returns `true` if the gate opened.
    pub fn on_session_established(&mut self) -> bool {
        if self.auto_start_on_connect && !self.stopped_explicitly {
            self.transition(ListeningState::Listening)
        } else {
            false
        }
    }

    pub fn allows_barcodes(&self) -> bool {
        self.state == ListeningState::Listening
    }

    fn transition(&mut self, next: ListeningState) -> bool {
        let changed = self.state != next;
        self.state = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let gate = ListeningGate::new(true);
        assert_eq!(gate.state(), ListeningState::Idle);
        assert!(!gate.allows_barcodes());
    }

    #[test]
    fn test_start_and_stop_are_idempotent() {
        let mut gate = ListeningGate::new(false);
        assert!(gate.start());
        assert!(!gate.start());
        assert!(gate.allows_barcodes());

        assert!(gate.stop());
        assert!(!gate.stop());
        assert!(!gate.allows_barcodes());
    }

    #[test]
    fn test_auto_start_on_session() {
        let mut gate = ListeningGate::new(true);
        assert!(gate.on_session_established());
        assert!(gate.allows_barcodes());
    }

    #[test]
    fn test_no_auto_start_after_explicit_stop() {
        let mut gate = ListeningGate::new(true);
        gate.start();
        gate.stop();
        assert!(!gate.on_session_established());
        assert!(!gate.allows_barcodes());
    }

    #[test]
    fn test_auto_start_disabled() {
        let mut gate = ListeningGate::new(false);
        assert!(!gate.on_session_established());
        assert_eq!(gate.state(), ListeningState::Idle);
    }
}
