//! Integration tests for Store action broadcasting
//!
//! Actions produced by effects are broadcast to observers, which is how a
//! host waits for a flow to reach a terminal outcome without polling state.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::time::Duration;
use tokio::sync::broadcast;
use tokio_test::assert_ok;
use webview_auth_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use webview_auth_runtime::{Store, StoreConfig, StoreError};

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum PageAction {
    /// Begin loading a page with the given id
    Load { id: u64 },
    /// One redirect hop finished
    Hop { id: u64, hop: u32 },
    /// Load finished (terminal action)
    Loaded { id: u64 },
    /// Load aborted (terminal action)
    Aborted { id: u64 },
}

#[derive(Debug, Clone, Default)]
struct PageState {
    hops: Vec<u32>,
    finished: Vec<u64>,
}

#[derive(Clone)]
struct PageEnvironment {
    max_hops: u32,
}

#[derive(Clone)]
struct PageReducer;

impl Reducer for PageReducer {
    type State = PageState;
    type Action = PageAction;
    type Environment = PageEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            PageAction::Load { id } => {
                state.hops.clear();
                if env.max_hops == 0 {
                    return smallvec![Effect::future(async move { Some(PageAction::Aborted { id }) })];
                }
                smallvec![Effect::future(async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Some(PageAction::Hop { id, hop: 1 })
                })]
            },
            PageAction::Hop { id, hop } => {
                state.hops.push(hop);
                if hop < env.max_hops {
                    smallvec![Effect::future(async move {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        Some(PageAction::Hop { id, hop: hop + 1 })
                    })]
                } else {
                    smallvec![Effect::future(async move { Some(PageAction::Loaded { id }) })]
                }
            },
            PageAction::Loaded { id } => {
                state.finished.push(id);
                smallvec![Effect::None]
            },
            PageAction::Aborted { .. } => smallvec![Effect::None],
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("webview_auth_runtime=trace")
        .try_init();
}

fn is_terminal(action: &PageAction) -> bool {
    matches!(action, PageAction::Loaded { .. } | PageAction::Aborted { .. })
}

/// Collect broadcast actions up to and including the first terminal one.
async fn until_terminal(rx: &mut broadcast::Receiver<PageAction>) -> Vec<PageAction> {
    let mut seen = Vec::new();
    while seen.last().is_none_or(|a| !is_terminal(a)) {
        let action = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("action before timeout")
            .unwrap();
        seen.push(action);
    }
    seen
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_multi_step_feedback_reaches_terminal() {
    init_tracing();
    let store = Store::new(PageState::default(), PageReducer, PageEnvironment { max_hops: 3 });
    let mut rx = store.subscribe_actions();

    assert_ok!(store.send(PageAction::Load { id: 7 }).await);

    let seen = until_terminal(&mut rx).await;
    assert_eq!(seen.last(), Some(&PageAction::Loaded { id: 7 }));
    assert_eq!(store.state(|s| s.hops.clone()).await, vec![1, 2, 3]);

    // The terminal action is broadcast before it is reduced
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(store.state(|s| s.finished.clone()).await, vec![7]);
}

#[tokio::test]
async fn test_immediate_terminal() {
    let store = Store::new(PageState::default(), PageReducer, PageEnvironment { max_hops: 0 });
    let mut rx = store.subscribe_actions();

    store.send(PageAction::Load { id: 1 }).await.unwrap();

    assert_eq!(until_terminal(&mut rx).await, vec![PageAction::Aborted { id: 1 }]);
}

#[tokio::test]
async fn test_subscribers_see_every_produced_action_in_order() {
    let store = Store::new(PageState::default(), PageReducer, PageEnvironment { max_hops: 2 });
    let mut rx = store.subscribe_actions();

    store.send(PageAction::Load { id: 3 }).await.unwrap();

    assert_eq!(
        until_terminal(&mut rx).await,
        vec![
            PageAction::Hop { id: 3, hop: 1 },
            PageAction::Hop { id: 3, hop: 2 },
            PageAction::Loaded { id: 3 },
        ]
    );
}

#[tokio::test]
async fn test_sent_actions_are_not_broadcast() {
    let store = Store::new(PageState::default(), PageReducer, PageEnvironment { max_hops: 1 });
    let mut rx = store.subscribe_actions();

    store.send(PageAction::Loaded { id: 9 }).await.unwrap();

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_send_after_shutdown_is_rejected() {
    let store = Store::with_config(
        PageState::default(),
        PageReducer,
        PageEnvironment { max_hops: 1 },
        StoreConfig::default().with_broadcast_capacity(4),
    );
    store.shutdown(Duration::from_millis(100)).await.unwrap();

    let result = store.send(PageAction::Load { id: 2 }).await;

    assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
    assert!(store.state(|s| s.hops.is_empty()).await);
}

#[tokio::test]
async fn test_shutdown_drains_a_feedback_chain_started_before_it() {
    init_tracing();
    let store = Store::new(PageState::default(), PageReducer, PageEnvironment { max_hops: 3 });

    assert_ok!(store.send(PageAction::Load { id: 5 }).await);
    assert_ok!(store.shutdown(Duration::from_secs(1)).await);

    // Every hop was fed back and reduced even though shutdown had begun
    assert_eq!(store.state(|s| s.hops.clone()).await, vec![1, 2, 3]);
    assert_eq!(store.state(|s| s.finished.clone()).await, vec![5]);
    assert_eq!(store.pending_effects(), 0);
}
