//! # Webview Auth Testing
//!
//! Testing utilities and helpers for reducer-driven login flows.
//!
//! This crate provides:
//! - A Given-When-Then harness for reducers
//! - Helpers that run synchronous commands and settle a [`Store`]
//! - Property-based testing strategies
//! - Assertion helpers for reducers and stores
//!
//! ## Example
//!
//! ```ignore
//! use webview_auth_testing::helpers::{init_test_tracing, settle};
//!
//! #[tokio::test]
//! async fn test_login_flow() {
//!     init_test_tracing();
//!     let store = Store::new(FlowState::new(config), FlowReducer::new(), env);
//!
//!     store.send(FlowAction::Start).await.unwrap();
//!     settle(&store).await;
//!
//!     let phase = store.state(|s| s.phase).await;
//!     assert_eq!(phase, AuthFlowState::Navigating);
//! }
//! ```
//!
//! [`Store`]: webview_auth_runtime::Store

pub mod reducer_test;

/// Test helpers and utilities
pub mod helpers {
    use std::time::Duration;
    use webview_auth_core::{effect::Effect, reducer::Reducer};
    use webview_auth_runtime::Store;

    /// Install a test-friendly tracing subscriber
    ///
    /// Honors `RUST_LOG` and falls back to `debug`. Safe to call from every
    /// test; only the first call installs anything.
    pub fn init_test_tracing() {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }

    /// Execute every `Run` command in `effects`, in order
    ///
    /// Returns the asynchronous effects that were not executed.
    pub fn run_commands<A, I>(effects: I) -> Vec<Effect<A>>
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        effects
            .into_iter()
            .filter_map(|effect| match effect {
                Effect::None => None,
                Effect::Run(command) => {
                    command();
                    None
                },
                other => Some(other),
            })
            .collect()
    }

    /// Wait until a store has no effects in flight
    ///
    /// Polls every millisecond and gives up after two seconds, so a
    /// stuck test fails on its own assertions instead of hanging.
    pub async fn settle<S, A, E, R>(store: &Store<S, A, E, R>)
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while store.pending_effects() > 0 && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// DNS-style host names such as `login.example.com`
    pub fn host_strategy() -> impl Strategy<Value = String> {
        (
            prop::collection::vec("[a-z][a-z0-9]{0,8}", 1..3),
            prop::sample::select(vec!["com", "org", "net", "test"]),
        )
            .prop_map(|(labels, tld)| format!("{}.{tld}", labels.join(".")))
    }

    /// Absolute URL paths with one to three segments
    pub fn path_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z0-9_-]{1,10}", 1..4)
            .prop_map(|segments| format!("/{}", segments.join("/")))
    }

    /// `https` URLs built from [`host_strategy`] and [`path_strategy`]
    pub fn https_url_strategy() -> impl Strategy<Value = String> {
        (host_strategy(), path_strategy()).prop_map(|(host, path)| format!("https://{host}{path}"))
    }
}

// Re-export commonly used items
pub use helpers::{init_test_tracing, run_commands, settle};
pub use reducer_test::{ReducerTest, assertions};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use webview_auth_core::effect::Effect;

    #[test]
    fn test_run_commands_executes_in_order_and_keeps_async_effects() {
        let calls = Arc::new(AtomicUsize::new(0));
        let first = Arc::clone(&calls);
        let second = Arc::clone(&calls);

        let remaining = run_commands(vec![
            Effect::run(move || assert_eq!(first.fetch_add(1, Ordering::SeqCst), 0)),
            Effect::None,
            Effect::future(async { Some(1_u8) }),
            Effect::run(move || assert_eq!(second.fetch_add(1, Ordering::SeqCst), 1)),
        ]);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(remaining.len(), 1);
        let Some(Effect::Future(fut)) = remaining.into_iter().next() else {
            unreachable!("only the future remains");
        };
        assert_eq!(tokio_test::block_on(fut), Some(1));
    }

    proptest! {
        #[test]
        fn generated_urls_are_https_with_a_path(url in properties::https_url_strategy()) {
            prop_assert!(url.starts_with("https://"));
            let rest = &url["https://".len()..];
            prop_assert!(rest.contains('/'));
            prop_assert!(rest.split('/').next().is_some_and(|host| host.contains('.')));
        }
    }
}
