//! # Webview Auth
//!
//! Drives a browser-based login journey inside an embedded web view and
//! arbitrates the TLS certificate warnings it runs into.
//!
//! ## Features
//!
//! - **Flow controller**: one journey from initial URL to completion,
//!   cancellation or failure, with host-driven retry
//! - **Trust decision cache**: asks the user about a certificate once, and
//!   coalesces concurrent warnings for it behind that single prompt
//! - **Reveal debounce**: keeps the surface hidden through rapid redirects
//! - **Testable**: the state machine is a pure function over actions
//!
//! ## Architecture
//!
//! The flow is a reducer running in a store:
//!
//! ```text
//! NavigationEvent → FlowReducer → (FlowState, Effects) → Effect Execution → More Actions
//!                                                          │
//!                          surface commands, host signals ◀┘
//! ```
//!
//! Collaborators (browsing surface, host shell, URL provider, completion
//! classifier, certificate prompt) are traits in [`providers`], injected
//! through [`FlowEnvironment`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use webview_auth::*;
//! use std::sync::Arc;
//!
//! let trust = Arc::new(TrustDecisionCache::new(dialog));
//! let env = FlowEnvironment::new(
//!     StaticUrlProvider::new(authorize_url),
//!     surface,
//!     host,
//!     RedirectUriClassifier::new(redirect_uri),
//!     trust,
//! );
//!
//! let controller = AuthFlowController::new(FlowConfig::default(), env);
//! controller.start().await?;
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod actions;
pub mod certificate;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod effects;
pub mod environment;
pub mod error;
pub mod metrics;
pub mod providers;
pub mod reducers;
pub mod state;
pub mod trust;

// Mock collaborators for testing
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use actions::{FlowAction, LoadFailure, LoadId, NavigationEvent};
pub use certificate::{CertificateIdentity, TrustDecision};
pub use config::FlowConfig;
pub use controller::{AuthFlowController, FlowStore};
pub use debounce::{RevealDebounce, RevealTicket};
pub use effects::{FlowEffect, FlowSignal};
pub use environment::FlowEnvironment;
pub use error::{FlowError, FlowErrorKind, Result};
pub use providers::{
    BenignCancelCodes, BrowsingSurface, CertificatePrompt, CompletionClassifier, HostShell,
    InitialUrlProvider, RedirectUriClassifier, StaticUrlProvider,
};
pub use reducers::{FlowMachine, FlowReducer};
pub use state::{AuthFlowState, FlowSnapshot, FlowState};
pub use trust::TrustDecisionCache;
