//! Visibility debounce.
//!
//! A flow that bounces through several server redirects would otherwise
//! flash its content between "please wait" views. Instead of revealing the
//! surface when a page finishes, the flow arms a single reveal slot and
//! schedules a timer carrying the slot's ticket. The reveal happens only if
//! the ticket still matches when the timer fires:
//!
//! ```text
//! Finished(A) → arm() = #1 ──150ms──▶ fire(#1)  ✗ (superseded)
//! Started(B)  → cancel()
//! Finished(B) → arm() = #2 ──150ms──▶ fire(#2)  ✓ show()
//! ```
//!
//! Firing is compare-and-clear on the slot, so a timer that races a newer
//! arm, a `Started` event or a terminal state can never reveal.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifies one arming of a [`RevealDebounce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevealTicket(u64);

impl RevealTicket {
    /// Raw ticket number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Single-slot, cancellable reveal timer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealDebounce {
    delay: Duration,
    issued: u64,
    pending: Option<RevealTicket>,
}

impl RevealDebounce {
    /// Create an idle debounce that reveals after `delay`.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            issued: 0,
            pending: None,
        }
    }

    /// Delay between arming and revealing.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm the reveal, superseding any earlier arm.
    pub const fn arm(&mut self) -> RevealTicket {
        self.issued += 1;
        let ticket = RevealTicket(self.issued);
        self.pending = Some(ticket);
        ticket
    }

    /// Disarm. Returns `true` if a reveal was pending.
    pub const fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Consume the slot if `ticket` is the current arm.
    ///
    /// Returns `true` when the caller should reveal.
    pub fn fire(&mut self, ticket: RevealTicket) -> bool {
        if self.pending == Some(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Returns `true` while a reveal is armed.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
