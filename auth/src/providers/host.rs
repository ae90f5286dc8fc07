//! Host shell trait.

use crate::effects::FlowSignal;

/// Receives the flow's signals.
///
/// The host uses them to update its chrome (title, spinner), to persist
/// state, and to close the presentation when a terminal signal arrives.
/// Signals are delivered in order and `Completed`, `Cancelled` and `Error`
/// are each delivered at most once per attempt.
pub trait HostShell: Send + Sync {
    /// Deliver a signal.
    fn notify(&self, signal: FlowSignal);
}
