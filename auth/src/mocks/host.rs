//! Mock host shell for testing.

use crate::effects::FlowSignal;
use crate::providers::HostShell;
use std::sync::{Arc, Mutex, PoisonError};

/// Mock host shell.
///
/// Records every signal in delivery order.
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    signals: Arc<Mutex<Vec<FlowSignal>>>,
}

impl MockHost {
    /// Create a new mock host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals received so far.
    #[must_use]
    pub fn signals(&self) -> Vec<FlowSignal> {
        self.signals.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// `Completed`, `Cancelled` and `Error` signals received so far.
    #[must_use]
    pub fn terminal_signals(&self) -> Vec<FlowSignal> {
        self.signals()
            .into_iter()
            .filter(FlowSignal::is_terminal)
            .collect()
    }
}

impl HostShell for MockHost {
    fn notify(&self, signal: FlowSignal) {
        self.signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(signal);
    }
}
