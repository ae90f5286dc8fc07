//! Browsing surface trait.

use crate::actions::{LoadFailure, LoadId};
use std::collections::{HashMap, HashSet};
use url::Url;

/// The embedded browser the flow drives.
///
/// Commands are fire-and-forget and are issued in the order the flow
/// decides them. Events travel the other way, through
/// [`AuthFlowController::on_navigation_event`](crate::AuthFlowController::on_navigation_event).
///
/// # Implementation Notes
///
/// - Calls arrive from the flow's runtime, not necessarily the UI thread;
///   marshal to the UI thread as the platform requires
/// - `is_benign_cancel` decides which load failures are normal
///   supersession (a newer navigation replaced this one) rather than errors
pub trait BrowsingSurface: Send + Sync {
    /// Load `url`.
    fn navigate(&self, url: &Url);

    /// Stop whatever is currently loading.
    fn abort_current_navigation(&self);

    /// Let a load paused on a TLS warning continue.
    fn proceed_load(&self, load: LoadId);

    /// Abort a load paused on a TLS warning.
    fn abort_load(&self, load: LoadId);

    /// Reveal the surface.
    fn show(&self);

    /// Hide the surface behind a "please wait" view.
    fn hide(&self);

    /// Clear the engine's cookie store.
    fn clear_cookies(&self);

    /// Returns `true` if `failure` is a benign cancellation.
    fn is_benign_cancel(&self, failure: &LoadFailure) -> bool;
}

/// Set of `(domain, code)` pairs an adapter treats as benign cancellations.
///
/// # Example
///
/// ```
/// # use webview_auth::providers::BenignCancelCodes;
/// # use webview_auth::LoadFailure;
/// let codes = BenignCancelCodes::new().with("NSURLErrorDomain", -999);
/// assert!(codes.contains(&LoadFailure::new("NSURLErrorDomain", -999, "cancelled")));
/// assert!(!codes.contains(&LoadFailure::new("NSURLErrorDomain", -1001, "timed out")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BenignCancelCodes {
    codes: HashMap<String, HashSet<i64>>,
}

impl BenignCancelCodes {
    /// Create an empty set; nothing is benign.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a benign `(domain, code)` pair.
    #[must_use]
    pub fn with(mut self, domain: impl Into<String>, code: i64) -> Self {
        self.codes.entry(domain.into()).or_default().insert(code);
        self
    }

    /// Returns `true` if `failure` matches a configured pair.
    #[must_use]
    pub fn contains(&self, failure: &LoadFailure) -> bool {
        self.codes
            .get(&failure.domain)
            .is_some_and(|codes| codes.contains(&failure.code))
    }

    /// Number of configured pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.values().map(HashSet::len).sum()
    }

    /// Returns `true` if no pair is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
