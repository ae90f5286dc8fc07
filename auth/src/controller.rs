//! Host-facing flow controller.
//!
//! [`AuthFlowController`] wraps a [`Store`] running [`FlowReducer`]. The
//! store reduces inputs one at a time, so navigation events are applied in
//! the order the host delivers them while URL requests, trust prompts and
//! reveal timers run in the background.
//!
//! # Example
//!
//! ```ignore
//! let controller = AuthFlowController::new(FlowConfig::default(), env);
//! controller.start().await?;
//!
//! // From the browsing surface's delegate callbacks:
//! controller.on_navigation_event(NavigationEvent::Started { url }).await?;
//! ```

use crate::actions::{FlowAction, NavigationEvent};
use crate::config::FlowConfig;
use crate::environment::FlowEnvironment;
use crate::error::{FlowError, Result};
use crate::providers::{
    BrowsingSurface, CertificatePrompt, CompletionClassifier, HostShell, InitialUrlProvider,
};
use crate::reducers::FlowReducer;
use crate::state::{AuthFlowState, FlowSnapshot, FlowState};
use std::time::Duration;
use tokio::sync::broadcast;
use webview_auth_runtime::{EffectHandle, Store, StoreConfig};

/// Store type driving one flow.
pub type FlowStore<U, S, H, C, P> =
    Store<FlowState, FlowAction, FlowEnvironment<U, S, H, C, P>, FlowReducer<U, S, H, C, P>>;

/// Drives one login journey.
///
/// Every operation returns an [`EffectHandle`] that completes once the
/// background work the input started (URL fetch, trust decision, reveal
/// timer) has finished and fed its result back.
pub struct AuthFlowController<U, S, H, C, P>
where
    U: InitialUrlProvider + Clone + 'static,
    S: BrowsingSurface + Clone + 'static,
    H: HostShell + Clone + 'static,
    C: CompletionClassifier + Clone + 'static,
    P: CertificatePrompt + 'static,
{
    store: FlowStore<U, S, H, C, P>,
}

impl<U, S, H, C, P> AuthFlowController<U, S, H, C, P>
where
    U: InitialUrlProvider + Clone + 'static,
    S: BrowsingSurface + Clone + 'static,
    H: HostShell + Clone + 'static,
    C: CompletionClassifier + Clone + 'static,
    P: CertificatePrompt + 'static,
{
    /// Create an idle controller.
    #[must_use]
    pub fn new(config: FlowConfig, env: FlowEnvironment<U, S, H, C, P>) -> Self {
        Self::with_store_config(config, env, StoreConfig::default())
    }

    /// Create an idle controller with custom runtime configuration.
    #[must_use]
    pub fn with_store_config(
        config: FlowConfig,
        env: FlowEnvironment<U, S, H, C, P>,
        store_config: StoreConfig,
    ) -> Self {
        tracing::debug!(title = %config.title, allow_cancel = config.allow_cancel, "Creating flow controller");
        Self {
            store: Store::with_config(FlowState::new(config), FlowReducer::new(), env, store_config),
        }
    }

    /// Begin the flow by requesting the initial URL.
    ///
    /// A second `start` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::ControllerUnavailable`] after shutdown.
    pub async fn start(&self) -> Result<EffectHandle> {
        Ok(self.store.send(FlowAction::Start).await?)
    }

    /// Deliver an event from the browsing surface.
    ///
    /// The phase is checked under the same lock the event is reduced in, so
    /// `Ok` means the event was applied.
    ///
    /// # Errors
    ///
    /// - [`FlowError::ProtocolViolation`]: the flow has not started or is
    ///   already terminal
    /// - [`FlowError::ControllerUnavailable`]: the controller has shut down
    pub async fn on_navigation_event(&self, event: NavigationEvent) -> Result<EffectHandle> {
        let name = event.name();
        self.store
            .send_if(FlowAction::Navigation(event), |state| {
                if state.phase.accepts_navigation() {
                    return Ok(());
                }
                tracing::debug!(phase = %state.phase, event = name, "Navigation event refused");
                Err(FlowError::ProtocolViolation {
                    phase: state.phase,
                    event: name.to_string(),
                })
            })
            .await?
    }

    /// Cancel the flow.
    ///
    /// Idempotent; ignored when the configuration disallows cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::ControllerUnavailable`] after shutdown.
    pub async fn cancel(&self) -> Result<EffectHandle> {
        Ok(self.store.send(FlowAction::Cancel).await?)
    }

    /// Start a new attempt after a retryable failure.
    ///
    /// # Errors
    ///
    /// - [`FlowError::ProtocolViolation`]: the flow has not failed, or the
    ///   failure is not retryable
    /// - [`FlowError::ControllerUnavailable`]: the controller has shut down
    pub async fn retry(&self) -> Result<EffectHandle> {
        self.store
            .send_if(FlowAction::Retry, |state| {
                let retryable = state.failure.as_ref().is_some_and(FlowError::is_retryable);
                if state.phase == AuthFlowState::Failed && retryable {
                    return Ok(());
                }
                Err(FlowError::ProtocolViolation {
                    phase: state.phase,
                    event: "Retry".to_string(),
                })
            })
            .await?
    }

    /// Current phase.
    pub async fn phase(&self) -> AuthFlowState {
        self.store.state(|s| s.phase).await
    }

    /// Point-in-time view of the flow.
    pub async fn snapshot(&self) -> FlowSnapshot {
        self.store.state(FlowState::snapshot).await
    }

    /// Observe actions produced by background work (URL results, trust
    /// resolutions, reveal timers).
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FlowAction> {
        self.store.subscribe_actions()
    }

    /// Stop accepting input and wait for background work to finish.
    ///
    /// Results of work already running are still applied. Outstanding trust
    /// prompts are not cancelled; closing the shared
    /// [`TrustDecisionCache`](crate::TrustDecisionCache) resolves them as
    /// `Reject`, which aborts their paused loads before shutdown returns.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::ControllerUnavailable`] if work is still
    /// running when `timeout` expires.
    pub async fn shutdown(&self, timeout: Duration) -> Result<()> {
        self.store.shutdown(timeout).await.map_err(|error| {
            tracing::warn!(%error, "Flow controller did not shut down cleanly");
            FlowError::from(error)
        })
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &FlowStore<U, S, H, C, P> {
        &self.store
    }
}

impl<U, S, H, C, P> Clone for AuthFlowController<U, S, H, C, P>
where
    U: InitialUrlProvider + Clone + 'static,
    S: BrowsingSurface + Clone + 'static,
    H: HostShell + Clone + 'static,
    C: CompletionClassifier + Clone + 'static,
    P: CertificatePrompt + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}
