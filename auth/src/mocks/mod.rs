//! Mock collaborators for testing.
//!
//! This module provides simple, in-memory implementations of all provider
//! traits for use in unit and integration tests. Each mock records what the
//! flow asked of it so tests can assert on order and counts.

pub mod host;
pub mod initial_url;
pub mod prompt;
pub mod surface;

pub use host::MockHost;
pub use initial_url::MockUrlProvider;
pub use prompt::{MockPrompt, PromptGate};
pub use surface::{MockSurface, SurfaceCall};
