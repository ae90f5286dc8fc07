//! Certificate prompt trait.

use crate::certificate::{CertificateIdentity, TrustDecision};

/// The host's "trust this certificate?" dialog.
///
/// Called by [`TrustDecisionCache`](crate::TrustDecisionCache) at most once
/// per distinct [`CertificateIdentity`]. The future may stay pending for as
/// long as the user takes to answer.
pub trait CertificatePrompt: Send + Sync {
    /// Ask the user about `identity`.
    fn prompt_user(
        &self,
        identity: &CertificateIdentity,
    ) -> impl std::future::Future<Output = TrustDecision> + Send;
}
