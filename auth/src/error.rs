//! Error types for the login flow.

use crate::actions::LoadFailure;
use crate::state::AuthFlowState;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use webview_auth_runtime::StoreError;

/// Result type alias for flow operations.
pub type Result<T> = std::result::Result<T, FlowError>;

/// Everything that can go wrong while driving a login flow.
///
/// Only [`UrlAcquisitionFailed`](Self::UrlAcquisitionFailed) and
/// [`NavigationFailed`](Self::NavigationFailed) ever reach the host as an
/// error signal. The other variants describe races and teardown, which are
/// logged and returned to the caller but never shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowError {
    // ═══════════════════════════════════════════════════════════
    // Host-visible failures
    // ═══════════════════════════════════════════════════════════

    /// The initial URL could not be obtained.
    #[error("Initial URL could not be obtained: {reason}")]
    UrlAcquisitionFailed {
        /// Reason reported by the URL provider
        reason: String,
    },

    /// The browsing surface reported a non-benign load failure.
    #[error("Navigation failed: {failure}")]
    NavigationFailed {
        /// Failure reported by the browsing surface
        failure: LoadFailure,
    },

    // ═══════════════════════════════════════════════════════════
    // Internal conditions
    // ═══════════════════════════════════════════════════════════

    /// An input arrived in a phase that cannot accept it.
    #[error("{event} is not accepted while the flow is {phase}")]
    ProtocolViolation {
        /// Phase the flow was in
        phase: AuthFlowState,
        /// Name of the rejected input
        event: String,
    },

    /// A certificate prompt was torn down before the user answered.
    #[error("Certificate prompt abandoned before the user answered")]
    TrustPromptAbandoned,

    /// The controller has shut down and no longer accepts input.
    #[error("Flow controller is no longer running")]
    ControllerUnavailable,
}

/// Coarse classification of a [`FlowError`], as reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowErrorKind {
    /// See [`FlowError::UrlAcquisitionFailed`].
    UrlAcquisition,
    /// See [`FlowError::NavigationFailed`].
    Navigation,
    /// See [`FlowError::ProtocolViolation`].
    ProtocolViolation,
    /// See [`FlowError::TrustPromptAbandoned`].
    TrustPromptAbandoned,
    /// See [`FlowError::ControllerUnavailable`].
    ControllerUnavailable,
}

impl FlowErrorKind {
    /// Stable name used in logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UrlAcquisition => "url_acquisition",
            Self::Navigation => "navigation",
            Self::ProtocolViolation => "protocol_violation",
            Self::TrustPromptAbandoned => "trust_prompt_abandoned",
            Self::ControllerUnavailable => "controller_unavailable",
        }
    }
}

impl std::fmt::Display for FlowErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FlowError {
    /// Returns the coarse kind of this error.
    #[must_use]
    pub const fn kind(&self) -> FlowErrorKind {
        match self {
            Self::UrlAcquisitionFailed { .. } => FlowErrorKind::UrlAcquisition,
            Self::NavigationFailed { .. } => FlowErrorKind::Navigation,
            Self::ProtocolViolation { .. } => FlowErrorKind::ProtocolViolation,
            Self::TrustPromptAbandoned => FlowErrorKind::TrustPromptAbandoned,
            Self::ControllerUnavailable => FlowErrorKind::ControllerUnavailable,
        }
    }

    /// Returns `true` if the host may offer `retry()` after this error.
    ///
    /// # Examples
    ///
    /// ```
    /// # use webview_auth::FlowError;
    /// let error = FlowError::UrlAcquisitionFailed { reason: "offline".into() };
    /// assert!(error.is_retryable());
    /// assert!(!FlowError::ControllerUnavailable.is_retryable());
    /// ```
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UrlAcquisitionFailed { .. } | Self::NavigationFailed { .. }
        )
    }

    /// Returns `true` if this error is surfaced to the host as an error signal.
    #[must_use]
    pub const fn is_user_visible(&self) -> bool {
        self.is_retryable()
    }
}

impl From<StoreError> for FlowError {
    fn from(error: StoreError) -> Self {
        tracing::debug!(%error, "Store rejected flow input");
        Self::ControllerUnavailable
    }
}
