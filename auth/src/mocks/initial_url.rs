//! Mock initial URL provider for testing.

use crate::error::{FlowError, Result};
use crate::providers::InitialUrlProvider;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use url::Url;

/// Mock initial URL provider.
///
/// Returns scripted responses in order, then the fallback response for
/// every later call.
#[derive(Debug, Clone)]
pub struct MockUrlProvider {
    script: Arc<Mutex<VecDeque<Result<Url>>>>,
    fallback: Result<Url>,
    latency: Duration,
    calls: Arc<AtomicUsize>,
}

impl MockUrlProvider {
    /// A provider that always returns `url`.
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self::with_fallback(Ok(url))
    }

    /// A provider that always fails with `reason`.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with_fallback(Err(FlowError::UrlAcquisitionFailed {
            reason: reason.into(),
        }))
    }

    fn with_fallback(fallback: Result<Url>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback,
            latency: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Return `response` before the fallback (queued after earlier ones).
    #[must_use]
    pub fn then(self, response: Result<Url>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
        self
    }

    /// Delay every response by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of times the URL was requested.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl InitialUrlProvider for MockUrlProvider {
    fn initial_url(&self) -> impl Future<Output = Result<Url>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        let latency = self.latency;

        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            response
        }
    }
}
