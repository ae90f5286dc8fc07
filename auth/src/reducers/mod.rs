//! Flow reducers.
//!
//! This module contains the pure decision logic for login flows.
//!
//! Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.

pub mod flow;

// Re-export
pub use flow::{FlowMachine, FlowReducer};
