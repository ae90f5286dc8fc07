//! Mock browsing surface for testing.

use crate::actions::{LoadFailure, LoadId};
use crate::providers::{BenignCancelCodes, BrowsingSurface};
use std::sync::{Arc, Mutex, PoisonError};
use url::Url;

/// A command the flow issued to the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    /// `navigate(url)`
    Navigate(Url),
    /// `abort_current_navigation()`
    AbortCurrentNavigation,
    /// `proceed_load(load)`
    ProceedLoad(LoadId),
    /// `abort_load(load)`
    AbortLoad(LoadId),
    /// `show()`
    Show,
    /// `hide()`
    Hide,
    /// `clear_cookies()`
    ClearCookies,
}

/// Mock browsing surface.
///
/// Records every command. Treats `NSURLErrorDomain` code `-999` as a
/// benign cancellation unless configured otherwise.
#[derive(Debug, Clone)]
pub struct MockSurface {
    calls: Arc<Mutex<Vec<SurfaceCall>>>,
    benign: BenignCancelCodes,
}

impl MockSurface {
    /// Create a new mock surface.
    #[must_use]
    pub fn new() -> Self {
        Self::with_benign_codes(BenignCancelCodes::new().with("NSURLErrorDomain", -999))
    }

    /// Create a mock surface with custom benign cancellation codes.
    #[must_use]
    pub fn with_benign_codes(benign: BenignCancelCodes) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            benign,
        }
    }

    /// Commands received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of times `call` was received.
    #[must_use]
    pub fn count(&self, call: &SurfaceCall) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|c| *c == call)
            .count()
    }

    /// Whether the last visibility command was `show()`.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find_map(|c| match c {
                SurfaceCall::Show => Some(true),
                SurfaceCall::Hide => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    fn record(&self, call: SurfaceCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl Default for MockSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowsingSurface for MockSurface {
    fn navigate(&self, url: &Url) {
        self.record(SurfaceCall::Navigate(url.clone()));
    }

    fn abort_current_navigation(&self) {
        self.record(SurfaceCall::AbortCurrentNavigation);
    }

    fn proceed_load(&self, load: LoadId) {
        self.record(SurfaceCall::ProceedLoad(load));
    }

    fn abort_load(&self, load: LoadId) {
        self.record(SurfaceCall::AbortLoad(load));
    }

    fn show(&self) {
        self.record(SurfaceCall::Show);
    }

    fn hide(&self) {
        self.record(SurfaceCall::Hide);
    }

    fn clear_cookies(&self) {
        self.record(SurfaceCall::ClearCookies);
    }

    fn is_benign_cancel(&self, failure: &LoadFailure) -> bool {
        self.benign.contains(failure)
    }
}
