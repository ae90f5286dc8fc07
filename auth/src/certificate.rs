//! Certificate identity and trust decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifies a certificate for trust purposes.
///
/// Two identities are equal when issuer, subject and both validity bounds
/// are equal. This is coarser than comparing the encoded certificate: every
/// certificate presenting the same names and validity window shares one
/// trust decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CertificateIdentity {
    /// Issuer distinguished name.
    pub issuer: String,
    /// Subject distinguished name.
    pub subject: String,
    /// Start of the validity window.
    pub not_before: DateTime<Utc>,
    /// End of the validity window.
    pub not_after: DateTime<Utc>,
}

impl CertificateIdentity {
    /// Create a new identity.
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        subject: impl Into<String>,
        not_before: DateTime<Utc>,
        not_after: DateTime<Utc>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            subject: subject.into(),
            not_before,
            not_after,
        }
    }
}

impl std::fmt::Display for CertificateIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (issued by {}, valid {} to {})",
            self.subject,
            self.issuer,
            self.not_before.format("%Y-%m-%d"),
            self.not_after.format("%Y-%m-%d")
        )
    }
}

/// The user's verdict on a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrustDecision {
    /// Let the load proceed despite the warning.
    Trust,
    /// Abort the load.
    Reject,
}

impl TrustDecision {
    /// Returns `true` for [`TrustDecision::Trust`].
    #[must_use]
    pub const fn is_trusted(self) -> bool {
        matches!(self, Self::Trust)
    }

    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trust => "trust",
            Self::Reject => "reject",
        }
    }
}
