//! Flow effects and host signals.
//!
//! [`FlowMachine`](crate::reducers::FlowMachine) returns [`FlowEffect`]
//! values; [`FlowReducer`](crate::reducers::FlowReducer) turns them into
//! runtime effects against the environment.

use crate::actions::LoadId;
use crate::certificate::CertificateIdentity;
use crate::debounce::RevealTicket;
use crate::error::{FlowError, FlowErrorKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// One-shot notification for the host shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowSignal {
    /// A page started loading; `authority` is suitable for a title bar.
    PageLoading {
        /// Host and optional port of the page
        authority: String,
    },
    /// A page finished loading.
    PageLoaded {
        /// The loaded page
        url: Url,
    },
    /// The flow reached its completion URL.
    Completed {
        /// Whether the journey succeeded
        success: bool,
    },
    /// The user cancelled the flow.
    Cancelled,
    /// The attempt failed; the host may offer retry.
    Error(FlowError),
}

impl FlowSignal {
    /// Signal name used in logs and metric labels.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PageLoading { .. } => "page_loading",
            Self::PageLoaded { .. } => "page_loaded",
            Self::Completed { .. } => "completed",
            Self::Cancelled => "cancelled",
            Self::Error(_) => "error",
        }
    }

    /// Returns `true` for `Completed`, `Cancelled` and `Error`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Cancelled | Self::Error(_)
        )
    }

    /// Error kind for `Error` signals.
    #[must_use]
    pub const fn error_kind(&self) -> Option<FlowErrorKind> {
        match self {
            Self::Error(error) => Some(error.kind()),
            _ => None,
        }
    }
}

/// A side effect requested by the flow state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEffect {
    // ═══════════════════════════════════════════════════════════
    // Asynchronous
    // ═══════════════════════════════════════════════════════════

    /// Ask the URL provider for the initial URL.
    RequestInitialUrl {
        /// Attempt number the answer belongs to
        attempt: u32,
    },

    /// Ask the trust cache about a paused load.
    RequestTrustDecision {
        /// The paused load
        load: LoadId,
        /// Certificate that failed validation
        certificate: CertificateIdentity,
    },

    /// Schedule the reveal timer.
    ScheduleReveal {
        /// How long to wait
        delay: Duration,
        /// Ticket to present when the timer fires
        ticket: RevealTicket,
    },

    // ═══════════════════════════════════════════════════════════
    // Immediate (run in order)
    // ═══════════════════════════════════════════════════════════

    /// Clear browser cookies.
    ClearCookies,

    /// Load a URL.
    Navigate(Url),

    /// Stop whatever is loading.
    AbortCurrentNavigation,

    /// Reveal the browsing surface.
    Show,

    /// Hide the browsing surface behind the "please wait" view.
    Hide,

    /// Let a paused load continue.
    ProceedLoad(LoadId),

    /// Abort a paused load.
    AbortLoad(LoadId),

    /// Deliver a signal to the host.
    Notify(FlowSignal),
}

impl FlowEffect {
    /// Returns `true` for effects that run synchronously, in order.
    #[must_use]
    pub const fn is_immediate(&self) -> bool {
        !matches!(
            self,
            Self::RequestInitialUrl { .. } | Self::RequestTrustDecision { .. } | Self::ScheduleReveal { .. }
        )
    }
}

/// Authority (host and non-default port) of `url`, for display.
///
/// Falls back to the full URL for URLs without a host.
#[must_use]
pub fn authority(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authority() {
        let url = Url::parse("https://login.example.com/oauth/authorize?x=1").unwrap();
        assert_eq!(authority(&url), "login.example.com");

        let url = Url::parse("http://localhost:8080/cb").unwrap();
        assert_eq!(authority(&url), "localhost:8080");

        // Default ports are not repeated
        let url = Url::parse("https://login.example.com:443/").unwrap();
        assert_eq!(authority(&url), "login.example.com");

        let url = Url::parse("about:blank").unwrap();
        assert_eq!(authority(&url), "about:blank");
    }

    #[test]
    fn test_signal_classification() {
        assert!(FlowSignal::Cancelled.is_terminal());
        assert!(FlowSignal::Completed { success: true }.is_terminal());
        assert!(!FlowSignal::PageLoading { authority: "a".into() }.is_terminal());

        let error = FlowSignal::Error(FlowError::UrlAcquisitionFailed { reason: "x".into() });
        assert_eq!(error.error_kind(), Some(FlowErrorKind::UrlAcquisition));
        assert_eq!(error.name(), "error");
    }

    #[test]
    fn test_immediate_effects() {
        assert!(FlowEffect::Show.is_immediate());
        assert!(FlowEffect::Notify(FlowSignal::Cancelled).is_immediate());
        assert!(!FlowEffect::RequestInitialUrl { attempt: 1 }.is_immediate());
    }
}
