//! Flow environment.
//!
//! This module defines the environment type for dependency injection
//! in the flow reducer.

use crate::providers::{
    BrowsingSurface, CertificatePrompt, CompletionClassifier, HostShell, InitialUrlProvider,
};
use crate::trust::TrustDecisionCache;
use std::sync::Arc;

/// Flow environment.
///
/// Contains all collaborators needed by the flow reducer.
///
/// # Type Parameters
///
/// - `U`: Initial URL provider
/// - `S`: Browsing surface
/// - `H`: Host shell
/// - `C`: Completion classifier
/// - `P`: Certificate prompt behind the shared trust cache
pub struct FlowEnvironment<U, S, H, C, P>
where
    U: InitialUrlProvider + Clone,
    S: BrowsingSurface + Clone,
    H: HostShell + Clone,
    C: CompletionClassifier + Clone,
    P: CertificatePrompt,
{
    /// Initial URL provider.
    pub urls: U,

    /// Browsing surface.
    pub surface: S,

    /// Host shell receiving signals.
    pub host: H,

    /// Completion classifier.
    pub classifier: C,

    /// Trust decision cache, shared with every flow on the same engine.
    pub trust: Arc<TrustDecisionCache<P>>,
}

impl<U, S, H, C, P> FlowEnvironment<U, S, H, C, P>
where
    U: InitialUrlProvider + Clone,
    S: BrowsingSurface + Clone,
    H: HostShell + Clone,
    C: CompletionClassifier + Clone,
    P: CertificatePrompt,
{
    /// Create a new flow environment.
    #[must_use]
    pub const fn new(
        urls: U,
        surface: S,
        host: H,
        classifier: C,
        trust: Arc<TrustDecisionCache<P>>,
    ) -> Self {
        Self {
            urls,
            surface,
            host,
            classifier,
            trust,
        }
    }
}

// Manual impl: the prompt lives behind `Arc` and need not be `Clone`
impl<U, S, H, C, P> Clone for FlowEnvironment<U, S, H, C, P>
where
    U: InitialUrlProvider + Clone,
    S: BrowsingSurface + Clone,
    H: HostShell + Clone,
    C: CompletionClassifier + Clone,
    P: CertificatePrompt,
{
    fn clone(&self) -> Self {
        Self {
            urls: self.urls.clone(),
            surface: self.surface.clone(),
            host: self.host.clone(),
            classifier: self.classifier.clone(),
            trust: Arc::clone(&self.trust),
        }
    }
}
