//! Login flow reducer.
//!
//! This module implements the pure decision logic for one login journey.
//!
//! # Flow
//!
//! ```text
//! Idle ──Start──▶ LoadingInitialUrl ──Started──▶ Navigating ◀──┐
//!                  │                               │  │        │ TrustResolved
//!                  │ url error                     │  └─TlsWarning──▶ AwaitingTrustDecision
//!                  ▼                               │
//!                Failed ◀──LoadFailed (not benign)─┤
//!                  │                               ├──Finished(completion url)──▶ Completed
//!                  └──Retry──▶ LoadingInitialUrl   └──Cancel──▶ Cancelled
//! ```
//!
//! [`FlowMachine::step`] applies one action and returns [`FlowEffect`]
//! values. [`FlowReducer`] runs it against a [`FlowEnvironment`] and turns
//! the effects into runtime effects: commands for the surface and host run
//! in order as a single `Effect::Run`, while the URL request, trust
//! decisions and reveal timers run asynchronously and feed their results
//! back as actions.

use crate::actions::{FlowAction, LoadFailure, LoadId, NavigationEvent};
use crate::certificate::{CertificateIdentity, TrustDecision};
use crate::effects::{FlowEffect, FlowSignal, authority};
use crate::environment::FlowEnvironment;
use crate::error::FlowError;
use crate::providers::{
    BrowsingSurface, CertificatePrompt, CompletionClassifier, HostShell, InitialUrlProvider,
};
use crate::state::{AuthFlowState, FlowState};
use std::marker::PhantomData;
use std::sync::Arc;
use webview_auth_core::effect::Effect;
use webview_auth_core::reducer::Reducer;
use webview_auth_core::{SmallVec, smallvec};

/// The flow state machine.
///
/// Stateless; all state lives in [`FlowState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowMachine;

impl FlowMachine {
    /// Apply `action` to `state`.
    ///
    /// `classifier` decides completion URLs and `is_benign` decides which
    /// load failures are swallowed. Inputs the current phase cannot accept
    /// are logged and produce no effects.
    pub fn step<C, B>(
        state: &mut FlowState,
        action: FlowAction,
        classifier: &C,
        is_benign: B,
    ) -> Vec<FlowEffect>
    where
        C: CompletionClassifier + ?Sized,
        B: Fn(&LoadFailure) -> bool,
    {
        match action {
            // ═══════════════════════════════════════════════════════════════════
            // Host commands
            // ═══════════════════════════════════════════════════════════════════
            FlowAction::Start => {
                if state.phase != AuthFlowState::Idle {
                    return Self::reject(state, "Start");
                }
                Self::begin_attempt(state)
            },

            FlowAction::Retry => {
                let retryable = state.failure.as_ref().is_some_and(FlowError::is_retryable);
                if state.phase != AuthFlowState::Failed || !retryable {
                    return Self::reject(state, "Retry");
                }
                Self::begin_attempt(state)
            },

            FlowAction::Cancel => Self::cancel(state),

            // ═══════════════════════════════════════════════════════════════════
            // Initial URL
            // ═══════════════════════════════════════════════════════════════════
            FlowAction::InitialUrlLoaded { attempt, url } => {
                if !Self::is_current_attempt(state, attempt) {
                    tracing::debug!(attempt, %url, "Discarding initial URL for a finished attempt");
                    return Vec::new();
                }

                tracing::debug!(attempt, %url, "Navigating to initial URL");
                let mut effects = Vec::with_capacity(2);
                if state.config.clear_cookies_before_login {
                    effects.push(FlowEffect::ClearCookies);
                }
                effects.push(FlowEffect::Navigate(url));
                effects
            },

            FlowAction::InitialUrlFailed { attempt, error } => {
                if !Self::is_current_attempt(state, attempt) {
                    tracing::debug!(attempt, %error, "Discarding URL failure for a finished attempt");
                    return Vec::new();
                }

                let error = match error {
                    error @ FlowError::UrlAcquisitionFailed { .. } => error,
                    other => FlowError::UrlAcquisitionFailed {
                        reason: other.to_string(),
                    },
                };
                Self::fail(state, error)
            },

            // ═══════════════════════════════════════════════════════════════════
            // Browsing surface
            // ═══════════════════════════════════════════════════════════════════
            FlowAction::Navigation(event) => {
                if !state.phase.accepts_navigation() {
                    return Self::reject(state, event.name());
                }
                Self::navigation(state, event, classifier, is_benign)
            },

            // ═══════════════════════════════════════════════════════════════════
            // Trust decisions and reveal timer
            // ═══════════════════════════════════════════════════════════════════
            FlowAction::TrustResolved {
                load,
                certificate,
                decision,
            } => Self::apply_trust(state, load, &certificate, decision),

            FlowAction::RevealElapsed { ticket } => {
                if state.reveal.fire(ticket) && !state.phase.is_terminal() {
                    tracing::trace!(ticket = ticket.get(), "Revealing browsing surface");
                    vec![FlowEffect::Show]
                } else {
                    tracing::trace!(ticket = ticket.get(), "Stale reveal suppressed");
                    Vec::new()
                }
            },
        }
    }

    fn navigation<C, B>(
        state: &mut FlowState,
        event: NavigationEvent,
        classifier: &C,
        is_benign: B,
    ) -> Vec<FlowEffect>
    where
        C: CompletionClassifier + ?Sized,
        B: Fn(&LoadFailure) -> bool,
    {
        match event {
            NavigationEvent::Started { url } => {
                state.reveal.cancel();
                // A page starting does not end AwaitingTrustDecision; the
                // phase returns to Navigating once the last decision resolves.
                if state.awaiting_trust.is_empty() {
                    state.phase = AuthFlowState::Navigating;
                }
                tracing::debug!(%url, "Page loading");
                vec![
                    FlowEffect::Hide,
                    FlowEffect::Notify(FlowSignal::PageLoading {
                        authority: authority(&url),
                    }),
                ]
            },

            NavigationEvent::Finished { url } => {
                if state.last_loaded.as_ref() == Some(&url) {
                    tracing::trace!(%url, "Page reloaded, re-arming reveal only");
                    return vec![Self::schedule_reveal(state)];
                }

                state.last_loaded = Some(url.clone());
                let mut effects = vec![FlowEffect::Notify(FlowSignal::PageLoaded { url: url.clone() })];

                if classifier.is_completion_url(&url) {
                    tracing::info!(%url, "Completion URL reached");
                    effects.extend(Self::finish(
                        state,
                        AuthFlowState::Completed,
                        FlowSignal::Completed { success: true },
                    ));
                } else {
                    if state.awaiting_trust.is_empty() {
                        state.phase = AuthFlowState::Navigating;
                    }
                    effects.push(Self::schedule_reveal(state));
                }
                effects
            },

            NavigationEvent::LoadFailed { failure } => {
                if is_benign(&failure) {
                    tracing::debug!(%failure, "Ignoring benign load cancellation");
                    return Vec::new();
                }
                tracing::warn!(%failure, "Navigation failed");
                Self::fail(state, FlowError::NavigationFailed { failure })
            },

            NavigationEvent::TlsWarning { load, certificate } => {
                if !state.awaiting_trust.insert(load) {
                    tracing::debug!(%load, "Load already awaiting a trust decision");
                    return Vec::new();
                }
                state.phase = AuthFlowState::AwaitingTrustDecision;
                tracing::debug!(%load, %certificate, "Load paused on certificate warning");
                vec![FlowEffect::RequestTrustDecision { load, certificate }]
            },
        }
    }

    fn apply_trust(
        state: &mut FlowState,
        load: LoadId,
        certificate: &CertificateIdentity,
        decision: TrustDecision,
    ) -> Vec<FlowEffect> {
        let was_waiting = state.awaiting_trust.remove(&load);
        if !was_waiting || state.phase.is_terminal() {
            tracing::debug!(%load, phase = %state.phase, "Trust decision for inactive load, aborting it");
            return vec![FlowEffect::AbortLoad(load)];
        }

        if state.awaiting_trust.is_empty() {
            state.phase = AuthFlowState::Navigating;
        }

        tracing::debug!(%load, %certificate, decision = decision.as_str(), "Applying trust decision");
        if decision.is_trusted() {
            vec![FlowEffect::ProceedLoad(load)]
        } else {
            vec![FlowEffect::AbortLoad(load)]
        }
    }

    fn cancel(state: &mut FlowState) -> Vec<FlowEffect> {
        if !state.config.allow_cancel {
            tracing::debug!("Cancel ignored: cancellation is disabled for this flow");
            return Vec::new();
        }
        if state.phase.is_terminal() {
            tracing::debug!(phase = %state.phase, "Cancel ignored: flow already finished");
            return Vec::new();
        }

        tracing::info!(phase = %state.phase, "Flow cancelled by user");
        let mut effects = vec![FlowEffect::AbortCurrentNavigation];
        effects.extend(Self::finish(state, AuthFlowState::Cancelled, FlowSignal::Cancelled));
        effects
    }

    fn begin_attempt(state: &mut FlowState) -> Vec<FlowEffect> {
        state.attempts = state.attempts.saturating_add(1);
        state.phase = AuthFlowState::LoadingInitialUrl;
        state.failure = None;
        state.last_loaded = None;
        state.awaiting_trust.clear();
        state.reveal.cancel();

        tracing::info!(attempt = state.attempts, "Starting login attempt");
        vec![
            FlowEffect::Hide,
            FlowEffect::RequestInitialUrl {
                attempt: state.attempts,
            },
        ]
    }

    fn fail(state: &mut FlowState, error: FlowError) -> Vec<FlowEffect> {
        tracing::info!(%error, kind = %error.kind(), "Login attempt failed");
        state.failure = Some(error.clone());
        Self::finish(state, AuthFlowState::Failed, FlowSignal::Error(error))
    }

    /// Enter a terminal phase. The single place terminal signals come from.
    fn finish(state: &mut FlowState, phase: AuthFlowState, signal: FlowSignal) -> Vec<FlowEffect> {
        state.phase = phase;
        state.reveal.cancel();
        state.awaiting_trust.clear();
        vec![FlowEffect::Notify(signal)]
    }

    fn schedule_reveal(state: &mut FlowState) -> FlowEffect {
        let ticket = state.reveal.arm();
        FlowEffect::ScheduleReveal {
            delay: state.reveal.delay(),
            ticket,
        }
    }

    fn is_current_attempt(state: &FlowState, attempt: u32) -> bool {
        attempt == state.attempts && !state.phase.is_terminal()
    }

    fn reject(state: &FlowState, input: &str) -> Vec<FlowEffect> {
        metrics::counter!("webview_auth.flow.protocol_violations").increment(1);
        tracing::warn!(phase = %state.phase, input, "Input not accepted in current phase, ignoring");
        Vec::new()
    }
}

/// Flow reducer.
///
/// Runs [`FlowMachine`] against a [`FlowEnvironment`].
pub struct FlowReducer<U, S, H, C, P> {
    _environment: PhantomData<fn() -> (U, S, H, C, P)>,
}

impl<U, S, H, C, P> FlowReducer<U, S, H, C, P> {
    /// Create a new flow reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _environment: PhantomData,
        }
    }
}

impl<U, S, H, C, P> Default for FlowReducer<U, S, H, C, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U, S, H, C, P> Clone for FlowReducer<U, S, H, C, P> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<U, S, H, C, P> std::fmt::Debug for FlowReducer<U, S, H, C, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FlowReducer")
    }
}

impl<U, S, H, C, P> FlowReducer<U, S, H, C, P>
where
    U: InitialUrlProvider + Clone + 'static,
    S: BrowsingSurface + Clone + 'static,
    H: HostShell + Clone + 'static,
    C: CompletionClassifier + Clone + 'static,
    P: CertificatePrompt + 'static,
{
    fn interpret(
        effects: Vec<FlowEffect>,
        env: &FlowEnvironment<U, S, H, C, P>,
    ) -> SmallVec<[Effect<FlowAction>; 4]> {
        let mut commands = Vec::new();
        let mut deferred: SmallVec<[Effect<FlowAction>; 4]> = SmallVec::new();

        for effect in effects {
            match effect {
                FlowEffect::RequestInitialUrl { attempt } => {
                    let urls = env.urls.clone();
                    deferred.push(Effect::future(async move {
                        Some(match urls.initial_url().await {
                            Ok(url) => FlowAction::InitialUrlLoaded { attempt, url },
                            Err(error) => FlowAction::InitialUrlFailed { attempt, error },
                        })
                    }));
                },
                FlowEffect::RequestTrustDecision { load, certificate } => {
                    let trust = Arc::clone(&env.trust);
                    deferred.push(Effect::future(async move {
                        let decision = trust.request_decision(&certificate).await;
                        Some(FlowAction::TrustResolved {
                            load,
                            certificate,
                            decision,
                        })
                    }));
                },
                FlowEffect::ScheduleReveal { delay, ticket } => {
                    deferred.push(Effect::Delay {
                        duration: delay,
                        action: Box::new(FlowAction::RevealElapsed { ticket }),
                    });
                },
                command => commands.push(command),
            }
        }

        if commands.is_empty() {
            return if deferred.is_empty() {
                smallvec![Effect::None]
            } else {
                deferred
            };
        }

        let surface = env.surface.clone();
        let host = env.host.clone();
        let mut out: SmallVec<[Effect<FlowAction>; 4]> = smallvec![Effect::run(move || {
            for command in commands {
                Self::execute(&surface, &host, command);
            }
        })];
        out.extend(deferred);
        out
    }

    fn execute(surface: &S, host: &H, command: FlowEffect) {
        match command {
            FlowEffect::ClearCookies => surface.clear_cookies(),
            FlowEffect::Navigate(url) => surface.navigate(&url),
            FlowEffect::AbortCurrentNavigation => surface.abort_current_navigation(),
            FlowEffect::Show => surface.show(),
            FlowEffect::Hide => surface.hide(),
            FlowEffect::ProceedLoad(load) => surface.proceed_load(load),
            FlowEffect::AbortLoad(load) => surface.abort_load(load),
            FlowEffect::Notify(signal) => {
                metrics::counter!("webview_auth.flow.signals", "signal" => signal.name()).increment(1);
                tracing::debug!(signal = signal.name(), "Notifying host");
                host.notify(signal);
            },
            asynchronous @ (FlowEffect::RequestInitialUrl { .. }
            | FlowEffect::RequestTrustDecision { .. }
            | FlowEffect::ScheduleReveal { .. }) => {
                tracing::error!(effect = ?asynchronous, "Asynchronous effect reached the command runner");
            },
        }
    }
}

impl<U, S, H, C, P> Reducer for FlowReducer<U, S, H, C, P>
where
    U: InitialUrlProvider + Clone + 'static,
    S: BrowsingSurface + Clone + 'static,
    H: HostShell + Clone + 'static,
    C: CompletionClassifier + Clone + 'static,
    P: CertificatePrompt + 'static,
{
    type State = FlowState;
    type Action = FlowAction;
    type Environment = FlowEnvironment<U, S, H, C, P>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let input = action.name();
        let effects = FlowMachine::step(state, action, &env.classifier, |failure| {
            env.surface.is_benign_cancel(failure)
        });
        tracing::trace!(input, phase = %state.phase, effects = effects.len(), "Reduced flow action");
        Self::interpret(effects, env)
    }
}
