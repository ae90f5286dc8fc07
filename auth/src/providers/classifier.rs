//! Completion classifier trait.

use url::Url;

/// Decides whether a loaded URL completes the login.
///
/// Supplied by the authentication protocol (for OAuth-style logins, "is
/// this the redirect URI"). Any `Fn(&Url) -> bool` closure is a classifier.
pub trait CompletionClassifier: Send + Sync {
    /// Returns `true` if loading `url` completes the flow.
    fn is_completion_url(&self, url: &Url) -> bool;
}

impl<F> CompletionClassifier for F
where
    F: Fn(&Url) -> bool + Send + Sync,
{
    fn is_completion_url(&self, url: &Url) -> bool {
        self(url)
    }
}

/// Matches URLs against a configured redirect URI.
///
/// Scheme, host, port and path must match; query and fragment are ignored
/// (they carry the authorization response), and a trailing `/` on the path
/// is insignificant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectUriClassifier {
    redirect_uri: Url,
}

impl RedirectUriClassifier {
    /// Create a classifier for `redirect_uri`.
    #[must_use]
    pub const fn new(redirect_uri: Url) -> Self {
        Self { redirect_uri }
    }

    /// The configured redirect URI.
    #[must_use]
    pub const fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }
}

impl CompletionClassifier for RedirectUriClassifier {
    fn is_completion_url(&self, url: &Url) -> bool {
        let expected = &self.redirect_uri;
        url.scheme() == expected.scheme()
            && url.host_str() == expected.host_str()
            && url.port_or_known_default() == expected.port_or_known_default()
            && url.path().trim_end_matches('/') == expected.path().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> RedirectUriClassifier {
        RedirectUriClassifier::new(Url::parse("https://app.example.com/auth/callback").unwrap())
    }

    #[test]
    fn test_matches_redirect_uri_ignoring_query_and_fragment() {
        let classifier = classifier();
        assert!(classifier.is_completion_url(
            &Url::parse("https://app.example.com/auth/callback?code=abc&state=xyz").unwrap()
        ));
        assert!(classifier.is_completion_url(
            &Url::parse("https://app.example.com:443/auth/callback/#access_token=t").unwrap()
        ));
    }

    #[test]
    fn test_rejects_other_urls() {
        let classifier = classifier();
        for url in [
            "http://app.example.com/auth/callback",
            "https://evil.example.com/auth/callback",
            "https://app.example.com:8443/auth/callback",
            "https://app.example.com/auth/callback/extra",
            "https://app.example.com/auth",
        ] {
            assert!(!classifier.is_completion_url(&Url::parse(url).unwrap()), "{url}");
        }
    }

    #[test]
    fn test_closures_are_classifiers() {
        let classifier = |url: &Url| url.path() == "/done";
        assert!(classifier.is_completion_url(&Url::parse("https://x.test/done").unwrap()));
    }
}
