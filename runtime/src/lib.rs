//! # Webview Auth Runtime
//!
//! Runtime implementation for reducer-driven login flows.
//!
//! The [`Store`] owns the flow state and is the only place a reducer runs.
//! Inputs are reduced one at a time under the state write lock. Synchronous
//! commands run before that lock is released, and asynchronous work is
//! spawned and fed back into the reducer when it finishes.
//!
//! ## Core Components
//!
//! - **Store**: Owns state, runs the reducer, executes effects
//! - **`EffectHandle`**: Lets a caller wait for the background work one input started
//! - **Shutdown**: Refuses new input, then drains work already in flight
//!
//! ## Example
//!
//! ```ignore
//! use webview_auth_runtime::Store;
//!
//! let store = Store::new(FlowState::new(config), FlowReducer::new(), environment);
//!
//! // Send an action
//! store.send(FlowAction::Start).await?;
//!
//! // Read state
//! let phase = store.state(|s| s.phase).await;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use webview_auth_core::{effect::Effect, reducer::Reducer};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Shutdown has begun; the store refuses input from outside.
        ///
        /// Actions produced by effects already in flight are still reduced.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Background work was still running when the shutdown timeout expired.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),
    }
}

pub use error::StoreError;

/// Configuration for Store instances
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(64)
///     .with_shutdown_timeout(Duration::from_secs(5));
///
/// let store = Store::with_config(state, reducer, env, config);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Number of actions buffered for slow action observers
    pub broadcast_capacity: usize,
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(broadcast_capacity: usize, default_shutdown_timeout: Duration) -> Self {
        Self {
            broadcast_capacity,
            default_shutdown_timeout,
        }
    }

    /// Set the action broadcast capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            default_shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Completion handle for the background work started by one action.
///
/// Covers the futures and delays the reducer returned for that action. Work
/// started later by the actions those effects feed back is not included.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(FlowAction::Start).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // The initial URL request has resolved and its follow-up action ran
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    running: Arc<AtomicUsize>,
    done: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a handle and the tracker effects report completion through.
    fn new() -> (Self, EffectTracking) {
        let running = Arc::new(AtomicUsize::new(0));
        let (notifier, done) = watch::channel(());

        let handle = Self {
            running: Arc::clone(&running),
            done,
        };
        (handle, EffectTracking { running, notifier })
    }

    /// A handle with nothing to wait for
    #[must_use]
    pub fn completed() -> Self {
        let (handle, tracking) = Self::new();
        drop(tracking);
        handle
    }

    /// Number of tracked effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Wait until every tracked effect has finished
    ///
    /// Effects that feed an action back finish only after that action has
    /// been reduced.
    pub async fn wait(&mut self) {
        while self.pending() > 0 {
            if self.done.changed().await.is_err() {
                // Every tracker is gone, nothing left to wait for
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns `Err(())` if the timeout expires before all effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), ()> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| ())
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.pending())
            .finish_non_exhaustive()
    }
}

/// Writer side of an [`EffectHandle`]
#[derive(Clone)]
struct EffectTracking {
    running: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    fn started(&self) -> DecrementGuard {
        self.running.fetch_add(1, Ordering::SeqCst);
        DecrementGuard(self.clone())
    }
}

/// Marks one tracked effect finished when dropped, even if it panicked.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        if self.0.running.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.0.notifier.send(());
        }
    }
}

/// Store-wide count of spawned effects, used by shutdown.
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl AtomicCounterGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, Duration, Effect, EffectHandle,
        EffectTracking, Ordering, Reducer, RwLock, StoreConfig, StoreError,
    };
    use tokio::sync::broadcast;

    /// Runtime coordinator for one reducer.
    ///
    /// Actions are reduced one at a time under the state write lock, so the
    /// reducer observes them strictly in the order they acquired the lock.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        /// Actions produced by effects, for observers.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default()`].
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                action_broadcast,
            }
        }

        /// Access the injected environment
        #[must_use]
        pub const fn environment(&self) -> &E {
            &self.environment
        }

        /// Number of effects still running across all actions
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Returns `true` once shutdown has been initiated
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            self.shutdown.load(Ordering::Acquire)
        }

        /// Refuse further input and drain work already in flight.
        ///
        /// Effects that were running when shutdown began still feed their
        /// actions back, and whatever those actions spawn is drained too.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if effects are still
        /// running when `timeout` expires.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.store(true, Ordering::Release);

            let deadline = tokio::time::Instant::now() + timeout;
            loop {
                let pending = self.pending_effects();
                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    metrics::counter!("store.shutdown.completed").increment(1);
                    return Ok(());
                }

                if tokio::time::Instant::now() >= deadline {
                    tracing::error!(pending_effects = pending, "Shutdown timed out");
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tracing::trace!(pending_effects = pending, "Waiting for effects to complete");
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }

        /// Reduce an action and execute its effects.
        ///
        /// `Effect::Run` commands have finished when this returns. They run
        /// before the write lock is released, so commands from consecutive
        /// actions never interleave. `Future` and `Delay` effects are
        /// spawned; the returned [`EffectHandle`] waits for them.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        ///
        /// # Panics
        ///
        /// If the reducer or a `Run` command panics, the panic propagates.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError>
        where
            R: Clone,
            E: Clone,
        {
            self.admit()?;
            let mut state = self.state.write().await;
            Ok(self.apply(&mut *state, action))
        }

        /// Reduce an action only if `guard` accepts the current state.
        ///
        /// `guard` runs under the same write lock as the reducer, so no other
        /// action can change the state between the check and the reduce.
        /// A refusal leaves the state untouched and is returned as the
        /// inner `Err`.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action, guard), name = "store_send_if")]
        pub async fn send_if<F, T>(
            &self,
            action: A,
            guard: F,
        ) -> Result<Result<EffectHandle, T>, StoreError>
        where
            R: Clone,
            E: Clone,
            F: FnOnce(&S) -> Result<(), T>,
        {
            self.admit()?;
            let mut state = self.state.write().await;
            if let Err(refusal) = guard(&*state) {
                tracing::trace!("Guard refused action");
                metrics::counter!("store.commands.refused").increment(1);
                return Ok(Err(refusal));
            }
            Ok(Ok(self.apply(&mut *state, action)))
        }

        /// Subscribe to all actions produced by effects
        ///
        /// Only actions produced by effects are broadcast (not actions sent
        /// via `send`). A lagging receiver skips old actions.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let phase = store.state(|s| s.phase).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        fn admit(&self) -> Result<(), StoreError> {
            if self.is_shutting_down() {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }
            Ok(())
        }

        /// Reduce `action` against the locked state and execute its effects.
        fn apply(&self, state: &mut S, action: A) -> EffectHandle
        where
            R: Clone,
            E: Clone,
        {
            metrics::counter!("store.commands.total").increment(1);
            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let span = tracing::trace_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!(effects = effects.len(), "Reducer completed");
                effects
            };

            for effect in effects {
                self.execute(effect, &tracking);
            }
            handle
        }

        /// Reduce an action produced by an effect.
        ///
        /// Not subject to the shutdown check: the effect was started before
        /// shutdown, and its outcome has to reach the reducer.
        async fn feed_back(&self, action: A)
        where
            R: Clone,
            E: Clone,
        {
            if self.is_shutting_down() {
                tracing::debug!("Reducing effect result during shutdown");
            }
            let mut state = self.state.write().await;
            self.apply(&mut *state, action);
        }

        /// Spawn a tracked task that may feed an action back into the store
        fn spawn_tracked<Fut>(&self, tracking: &EffectTracking, fut: Fut)
        where
            R: Clone,
            E: Clone,
            Fut: std::future::Future<Output = Option<A>> + Send + 'static,
        {
            let done = tracking.started();
            let pending = AtomicCounterGuard::acquire(&self.pending_effects);
            let store = self.clone();

            tokio::spawn(async move {
                let _done = done;
                let _pending = pending;

                if let Some(action) = fut.await {
                    tracing::trace!("Effect produced an action");
                    let _ = store.action_broadcast.send(action.clone());
                    store.feed_back(action).await;
                }
            });
        }

        /// Execute one effect.
        ///
        /// Spawned effects that panic are isolated in their task; the
        /// tracking guards still record them as finished.
        fn execute(&self, effect: Effect<A>, tracking: &EffectTracking)
        where
            R: Clone,
            E: Clone,
        {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Run(command) => {
                    metrics::counter!("store.effects.executed", "type" => "run").increment(1);
                    command();
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    self.spawn_tracked(tracking, fut);
                },
                Effect::Delay { duration, action } => {
                    tracing::trace!(?duration, "Scheduling delayed action");
                    metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                    self.spawn_tracked(tracking, async move {
                        tokio::time::sleep(duration).await;
                        Some(*action)
                    });
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
