//! Flow state.

use crate::actions::LoadId;
use crate::config::FlowConfig;
use crate::debounce::RevealDebounce;
use crate::error::FlowError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use url::Url;

/// Phase of a login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthFlowState {
    /// Created, not started.
    Idle,
    /// Fetching the initial URL and loading it.
    LoadingInitialUrl,
    /// A page transition is in progress.
    Navigating,
    /// At least one load is paused on a certificate decision.
    AwaitingTrustDecision,
    /// The completion URL was reached.
    Completed,
    /// The user cancelled.
    Cancelled,
    /// The attempt failed.
    Failed,
}

impl AuthFlowState {
    /// Returns `true` for `Completed`, `Cancelled` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    /// Returns `true` if navigation events are accepted in this phase.
    #[must_use]
    pub const fn accepts_navigation(self) -> bool {
        matches!(
            self,
            Self::LoadingInitialUrl | Self::Navigating | Self::AwaitingTrustDecision
        )
    }

    /// Lowercase phase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LoadingInitialUrl => "loading initial url",
            Self::Navigating => "navigating",
            Self::AwaitingTrustDecision => "awaiting trust decision",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for AuthFlowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State owned by one flow.
#[derive(Debug, Clone)]
pub struct FlowState {
    /// Current phase.
    pub phase: AuthFlowState,
    /// Configuration the flow was built with.
    pub config: FlowConfig,
    /// Failure that put the flow in `Failed`.
    pub failure: Option<FlowError>,
    /// Loads paused on a certificate decision.
    pub awaiting_trust: BTreeSet<LoadId>,
    /// Reveal debounce slot.
    pub reveal: RevealDebounce,
    /// Last URL announced as loaded.
    pub last_loaded: Option<Url>,
    /// Number of attempts started (initial start plus retries).
    pub attempts: u32,
}

impl FlowState {
    /// Create an idle flow.
    #[must_use]
    pub fn new(config: FlowConfig) -> Self {
        Self {
            phase: AuthFlowState::Idle,
            reveal: RevealDebounce::new(config.reveal_delay),
            config,
            failure: None,
            awaiting_trust: BTreeSet::new(),
            last_loaded: None,
            attempts: 0,
        }
    }

    /// Serializable view of the state for the host.
    #[must_use]
    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            phase: self.phase,
            failure: self.failure.clone(),
            awaiting_trust: self.awaiting_trust.iter().copied().collect(),
            reveal_pending: self.reveal.is_pending(),
            last_loaded: self.last_loaded.clone(),
            attempts: self.attempts,
        }
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self::new(FlowConfig::default())
    }
}

/// Point-in-time view of a flow, for the host to persist or display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSnapshot {
    /// Current phase.
    pub phase: AuthFlowState,
    /// Failure that put the flow in `Failed`.
    pub failure: Option<FlowError>,
    /// Loads paused on a certificate decision, ascending.
    pub awaiting_trust: Vec<LoadId>,
    /// Whether a reveal is armed.
    pub reveal_pending: bool,
    /// Last URL announced as loaded.
    pub last_loaded: Option<Url>,
    /// Number of attempts started.
    pub attempts: u32,
}
