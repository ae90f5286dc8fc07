//! Initial URL provider trait.

use crate::error::Result;
use url::Url;

/// Produces the URL a flow starts from.
///
/// Typically builds an authorization request (client id, scopes, PKCE
/// challenge) and may need network access to discover endpoints.
pub trait InitialUrlProvider: Send + Sync {
    /// Produce the initial URL.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::UrlAcquisitionFailed`](crate::FlowError::UrlAcquisitionFailed)
    /// if the URL cannot be built (network or configuration error).
    fn initial_url(&self) -> impl std::future::Future<Output = Result<Url>> + Send;
}

/// Provider that always returns the same URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticUrlProvider {
    url: Url,
}

impl StaticUrlProvider {
    /// Create a provider for `url`.
    #[must_use]
    pub const fn new(url: Url) -> Self {
        Self { url }
    }
}

impl InitialUrlProvider for StaticUrlProvider {
    fn initial_url(&self) -> impl std::future::Future<Output = Result<Url>> + Send {
        let url = self.url.clone();
        async move { Ok(url) }
    }
}
