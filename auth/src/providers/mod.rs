//! Flow collaborators.
//!
//! This module defines traits for everything outside the flow core. The
//! reducer depends on these traits, and the host provides concrete
//! implementations.
//!
//! ```text
//!            ┌──────────────────────┐
//!  URL ─────▶│                      │────▶ BrowsingSurface
//!  provider  │     Flow reducer     │      (navigate, show, abort …)
//!            │                      │
//!  classifier│                      │────▶ HostShell
//!  ─────────▶│                      │      (PageLoading, Completed …)
//!            └──────────┬───────────┘
//!                       │ TLS warning
//!                       ▼
//!            ┌──────────────────────┐
//!            │ TrustDecisionCache   │────▶ CertificatePrompt
//!            └──────────────────────┘      (asked once per certificate)
//! ```
//!
//! This enables:
//! - **Testing**: Use mocks (in-memory, deterministic)
//! - **Production**: Bind to the platform web view and dialogs
//! - **Development**: Use console versions (logging, scripted answers)

pub mod classifier;
pub mod host;
pub mod initial_url;
pub mod prompt;
pub mod surface;

pub use classifier::{CompletionClassifier, RedirectUriClassifier};
pub use host::HostShell;
pub use initial_url::{InitialUrlProvider, StaticUrlProvider};
pub use prompt::CertificatePrompt;
pub use surface::{BenignCancelCodes, BrowsingSurface};
