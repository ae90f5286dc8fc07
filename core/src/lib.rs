//! # Webview Auth Core
//!
//! Core traits and types shared by the login-flow runtime and domain crates.
//!
//! The flow controller is written as a reducer: a function that takes the
//! current state and one action, mutates the state, and returns descriptions
//! of side effects. The runtime executes those descriptions and feeds any
//! resulting actions back into the reducer.
//!
//! ## Core Concepts
//!
//! - **State**: Everything the flow needs to decide its next step
//! - **Action**: Every input to the reducer (host commands, browser events, async results)
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Collaborators injected via traits
//!
//! ## Example
//!
//! ```ignore
//! use webview_auth_core::*;
//!
//! impl Reducer for FlowReducer {
//!     type State = FlowState;
//!     type Action = FlowAction;
//!     type Environment = FlowEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut FlowState,
//!         action: FlowAction,
//!         env: &FlowEnvironment,
//!     ) -> SmallVec<[Effect<FlowAction>; 4]> {
//!         smallvec![Effect::None]
//!     }
//! }
//! ```

pub use smallvec::{SmallVec, smallvec};

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They contain all decision logic and are deterministic and testable.
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action against the current state
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// Most actions produce at most a handful of effects, so the
        /// return type keeps up to four inline before spilling to the heap.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// A reducer returns a list of them; the runtime runs `Run` commands in list
/// order and spawns the rest.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Delayed action (timeouts, debounced reveals)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

        /// Synchronous side effect, run by the runtime before `send` returns
        ///
        /// Used for fire-and-forget commands whose relative order matters
        /// (UI instructions, host notifications). Runs in the order effects
        /// were returned by the reducer.
        Run(Box<dyn FnOnce() + Send>),
    }

    // Manual Debug implementation since Future and FnOnce don't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Run(_) => write!(f, "Effect::Run(<fn>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap an async block that produces an optional follow-up action
        #[must_use]
        pub fn future<F>(fut: F) -> Effect<Action>
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }

        /// Wrap a synchronous command
        #[must_use]
        pub fn run<F>(f: F) -> Effect<Action>
        where
            F: FnOnce() + Send + 'static,
        {
            Effect::Run(Box::new(f))
        }

        /// Returns `true` for `Effect::None`
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Ping {
        Pong,
    }

    #[test]
    fn debug_output_hides_closures() {
        let effect: Effect<Ping> = Effect::run(|| {});
        assert_eq!(format!("{effect:?}"), "Effect::Run(<fn>)");

        let effect: Effect<Ping> = Effect::future(async { None });
        assert_eq!(format!("{effect:?}"), "Effect::Future(<future>)");
    }

    #[test]
    fn delay_debug_includes_action() {
        let effect = Effect::Delay {
            duration: Duration::from_millis(150),
            action: Box::new(Ping::Pong),
        };
        let rendered = format!("{effect:?}");
        assert!(rendered.contains("150ms"));
        assert!(rendered.contains("Pong"));
    }

    #[test]
    fn only_none_is_none() {
        assert!(Effect::<Ping>::None.is_none());
        assert!(!Effect::<Ping>::run(|| {}).is_none());
        assert!(!Effect::Delay {
            duration: Duration::ZERO,
            action: Box::new(Ping::Pong),
        }
        .is_none());
    }

    #[test]
    fn run_effect_executes_when_called() {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        let effect: Effect<Ping> = Effect::run(move || flag.store(true, Ordering::SeqCst));

        if let Effect::Run(f) = effect {
            f();
        }
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn future_effect_yields_action() {
        let effect: Effect<Ping> = Effect::future(async { Some(Ping::Pong) });
        let Effect::Future(fut) = effect else {
            unreachable!("constructed as a future");
        };
        assert_eq!(tokio_test::block_on(fut), Some(Ping::Pong));
    }
}
