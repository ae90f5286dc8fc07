//! Flow actions.
//!
//! Every input to the flow reducer: host commands, browsing-surface events,
//! and the results of asynchronous work (URL fetch, trust decisions, reveal
//! timers).

use crate::certificate::{CertificateIdentity, TrustDecision};
use crate::debounce::RevealTicket;
use crate::error::FlowError;
use serde::{Deserialize, Serialize};
use url::Url;

/// Identifies a single resource load on the browsing surface.
///
/// Assigned by the surface adapter. A TLS warning carries the id of the
/// load it paused, so the eventual trust decision reaches that load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoadId(pub u64);

impl std::fmt::Display for LoadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "load#{}", self.0)
    }
}

/// A load failure as reported by the browsing engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadFailure {
    /// Error domain (e.g. `NSURLErrorDomain`, `net`).
    pub domain: String,
    /// Engine-specific error code.
    pub code: i64,
    /// Human-readable description.
    pub description: String,
}

impl LoadFailure {
    /// Create a new load failure.
    #[must_use]
    pub fn new(domain: impl Into<String>, code: i64, description: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            code,
            description: description.into(),
        }
    }
}

impl std::fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.domain, self.code, self.description)
    }
}

/// An event pushed in by the browsing surface.
///
/// Delivered in arrival order; the flow never reorders or batches them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavigationEvent {
    /// A page transition began.
    Started {
        /// Page being loaded
        url: Url,
    },
    /// A page finished loading.
    Finished {
        /// Page that loaded
        url: Url,
    },
    /// A load failed.
    LoadFailed {
        /// Failure reported by the engine
        failure: LoadFailure,
    },
    /// Certificate validation failed for a load; the load is paused.
    TlsWarning {
        /// The paused load
        load: LoadId,
        /// Certificate that failed validation
        certificate: CertificateIdentity,
    },
}

impl NavigationEvent {
    /// Event name used in logs and protocol-violation errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Started { .. } => "Started",
            Self::Finished { .. } => "Finished",
            Self::LoadFailed { .. } => "LoadFailed",
            Self::TlsWarning { .. } => "TlsWarning",
        }
    }
}

/// Flow actions.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowAction {
    // ═══════════════════════════════════════════════════════════
    // Host commands
    // ═══════════════════════════════════════════════════════════

    /// Begin the flow. Valid only while idle.
    Start,

    /// Start a new attempt after a retryable failure.
    Retry,

    /// The user dismissed the flow.
    Cancel,

    // ═══════════════════════════════════════════════════════════
    // Browsing surface
    // ═══════════════════════════════════════════════════════════

    /// An event from the browsing surface.
    Navigation(NavigationEvent),

    // ═══════════════════════════════════════════════════════════
    // Effect results
    // ═══════════════════════════════════════════════════════════

    /// The initial URL is available.
    InitialUrlLoaded {
        /// Attempt the URL was requested for
        attempt: u32,
        /// URL to navigate to
        url: Url,
    },

    /// The initial URL could not be obtained.
    InitialUrlFailed {
        /// Attempt the URL was requested for
        attempt: u32,
        /// Provider error
        error: FlowError,
    },

    /// The trust cache answered for a paused load.
    TrustResolved {
        /// The paused load
        load: LoadId,
        /// Certificate the decision applies to
        certificate: CertificateIdentity,
        /// The decision
        decision: TrustDecision,
    },

    /// A reveal timer elapsed.
    RevealElapsed {
        /// Ticket the timer was armed with
        ticket: RevealTicket,
    },
}

impl FlowAction {
    /// Action name used in logs and protocol-violation errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Retry => "Retry",
            Self::Cancel => "Cancel",
            Self::Navigation(event) => event.name(),
            Self::InitialUrlLoaded { .. } => "InitialUrlLoaded",
            Self::InitialUrlFailed { .. } => "InitialUrlFailed",
            Self::TrustResolved { .. } => "TrustResolved",
            Self::RevealElapsed { .. } => "RevealElapsed",
        }
    }
}

impl From<NavigationEvent> for FlowAction {
    fn from(event: NavigationEvent) -> Self {
        Self::Navigation(event)
    }
}
