//! Certificate trust decision cache.
//!
//! Arbitrates TLS trust warnings reported by the browsing surface. The user
//! is asked about a given [`CertificateIdentity`] at most once:
//!
//! ```text
//! request_decision(id)
//!   ├─ decided?      → return the recorded decision       (cached)
//!   ├─ prompt open?  → queue behind it, await its answer  (coalesced)
//!   └─ otherwise     → open a prompt, ask the user once   (prompted)
//!                      record the answer, resolve every queued caller in order
//! ```
//!
//! The cache is shared (`Arc`) by every flow using the same browsing engine.
//! Its maps sit behind one mutex that is never held across an `.await`; the
//! user prompt runs outside it.

use crate::certificate::{CertificateIdentity, TrustDecision};
use crate::error::FlowError;
use crate::providers::CertificatePrompt;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// Callers waiting on an open prompt, in arrival order.
type Waiters = Vec<oneshot::Sender<TrustDecision>>;

#[derive(Default)]
struct Inner {
    decisions: HashMap<CertificateIdentity, TrustDecision>,
    pending: HashMap<CertificateIdentity, Waiters>,
    closed: bool,
}

/// How a request entered the cache.
enum Admission {
    Decided(TrustDecision),
    Closed,
    Queued(oneshot::Receiver<TrustDecision>),
    Prompt(oneshot::Receiver<TrustDecision>),
}

/// Single-flight, memoizing arbiter for certificate trust prompts.
///
/// # Example
///
/// ```ignore
/// let cache = Arc::new(TrustDecisionCache::new(prompt));
///
/// // Both loads hit the same misconfigured host; the user is asked once.
/// let (a, b) = tokio::join!(
///     cache.request_decision(&cert),
///     cache.request_decision(&cert),
/// );
/// assert_eq!(a, b);
/// ```
pub struct TrustDecisionCache<P> {
    prompt: P,
    inner: Mutex<Inner>,
}

impl<P> TrustDecisionCache<P>
where
    P: CertificatePrompt,
{
    /// Create an empty cache that asks `prompt` for new decisions.
    #[must_use]
    pub fn new(prompt: P) -> Self {
        Self {
            prompt,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Decide whether loads presenting `identity` may proceed.
    ///
    /// Returns immediately when a decision is recorded. Otherwise suspends
    /// until the single open prompt for `identity` is answered, opening it
    /// if necessary. Resolves [`TrustDecision::Reject`] if the cache is
    /// closed or the prompt is abandoned.
    pub async fn request_decision(&self, identity: &CertificateIdentity) -> TrustDecision {
        let admission = {
            let mut inner = self.lock();
            if inner.closed {
                Admission::Closed
            } else if let Some(decision) = inner.decisions.get(identity) {
                Admission::Decided(*decision)
            } else if let Some(waiters) = inner.pending.get_mut(identity) {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                Admission::Queued(rx)
            } else {
                let (tx, rx) = oneshot::channel();
                inner.pending.insert(identity.clone(), vec![tx]);
                Admission::Prompt(rx)
            }
        };

        match admission {
            Admission::Decided(decision) => {
                metrics::counter!("webview_auth.trust.requests", "outcome" => "cached").increment(1);
                tracing::debug!(certificate = %identity, decision = decision.as_str(), "Replaying recorded trust decision");
                decision
            },
            Admission::Closed => {
                metrics::counter!("webview_auth.trust.requests", "outcome" => "closed").increment(1);
                tracing::debug!(certificate = %identity, "Trust cache closed, rejecting");
                TrustDecision::Reject
            },
            Admission::Queued(rx) => {
                metrics::counter!("webview_auth.trust.requests", "outcome" => "coalesced").increment(1);
                tracing::debug!(certificate = %identity, "Waiting on open certificate prompt");
                rx.await.unwrap_or(TrustDecision::Reject)
            },
            Admission::Prompt(mut rx) => {
                metrics::counter!("webview_auth.trust.requests", "outcome" => "prompted").increment(1);
                tracing::info!(certificate = %identity, "Asking user to decide on certificate");

                let guard = PromptGuard {
                    cache: self,
                    identity: Some(identity),
                };

                // Our own slot is released early only by `close`
                let answer = tokio::select! {
                    biased;
                    decision = self.prompt.prompt_user(identity) => Some(decision),
                    _ = &mut rx => None,
                };

                match answer {
                    Some(decision) => {
                        guard.resolve(decision);
                        rx.await.unwrap_or(TrustDecision::Reject)
                    },
                    None => {
                        tracing::debug!(certificate = %identity, "Trust cache closed while prompting");
                        TrustDecision::Reject
                    },
                }
            },
        }
    }
}

impl<P> TrustDecisionCache<P> {
    /// Recorded decision for `identity`, if the user has answered.
    #[must_use]
    pub fn decision_for(&self, identity: &CertificateIdentity) -> Option<TrustDecision> {
        self.lock().decisions.get(identity).copied()
    }

    /// Number of certificates with a prompt currently open.
    #[must_use]
    pub fn pending_prompts(&self) -> usize {
        self.lock().pending.len()
    }

    /// Returns `true` once [`close`](Self::close) has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Tear down the cache.
    ///
    /// Every queued caller resolves [`TrustDecision::Reject`]. Later requests
    /// resolve `Reject` without prompting. Idempotent.
    pub fn close(&self) {
        let abandoned: Vec<_> = {
            let mut inner = self.lock();
            inner.closed = true;
            inner.pending.drain().collect()
        };

        for (identity, waiters) in abandoned {
            Self::reject_all(&identity, waiters);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // The maps stay consistent under every critical section, so a
        // poisoned lock is still usable
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolve(&self, identity: &CertificateIdentity, decision: TrustDecision) {
        let waiters = {
            let mut inner = self.lock();
            let waiters = inner.pending.remove(identity);
            if waiters.is_some() && !inner.closed {
                inner.decisions.insert(identity.clone(), decision);
            }
            waiters
        };

        let Some(waiters) = waiters else {
            tracing::debug!(certificate = %identity, "Prompt answered after teardown, discarding");
            return;
        };

        tracing::info!(
            certificate = %identity,
            decision = decision.as_str(),
            waiters = waiters.len(),
            "Recorded trust decision"
        );
        for waiter in waiters {
            let _ = waiter.send(decision);
        }
    }

    fn abandon(&self, identity: &CertificateIdentity) {
        let waiters = self.lock().pending.remove(identity);
        if let Some(waiters) = waiters {
            Self::reject_all(identity, waiters);
        }
    }

    fn reject_all(identity: &CertificateIdentity, waiters: Waiters) {
        let error = FlowError::TrustPromptAbandoned;
        metrics::counter!("webview_auth.trust.abandoned").increment(1);
        tracing::warn!(
            certificate = %identity,
            waiters = waiters.len(),
            kind = %error.kind(),
            %error,
            "Rejecting queued loads"
        );
        for waiter in waiters {
            let _ = waiter.send(TrustDecision::Reject);
        }
    }
}

impl<P> Drop for TrustDecisionCache<P> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<P> std::fmt::Debug for TrustDecisionCache<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("TrustDecisionCache")
            .field("decisions", &inner.decisions.len())
            .field("pending", &inner.pending.len())
            .field("closed", &inner.closed)
            .finish_non_exhaustive()
    }
}

/// Abandons the open prompt if the prompting caller goes away before
/// the user answers.
struct PromptGuard<'a, P> {
    cache: &'a TrustDecisionCache<P>,
    identity: Option<&'a CertificateIdentity>,
}

impl<P> PromptGuard<'_, P> {
    fn resolve(mut self, decision: TrustDecision) {
        if let Some(identity) = self.identity.take() {
            self.cache.resolve(identity, decision);
        }
    }
}

impl<P> Drop for PromptGuard<'_, P> {
    fn drop(&mut self) {
        if let Some(identity) = self.identity.take() {
            self.cache.abandon(identity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockPrompt;
    use chrono::{TimeZone, Utc};
    use tokio_test::{assert_pending, assert_ready_eq, task};

    fn cert(subject: &str) -> CertificateIdentity {
        CertificateIdentity::new(
            "CN=Self Signed",
            subject,
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_concurrent_requests_share_one_prompt() {
        let (prompt, gate) = MockPrompt::gated(TrustDecision::Trust);
        let cache = TrustDecisionCache::new(prompt.clone());
        let id = cert("CN=idp.local");

        let mut first = task::spawn(cache.request_decision(&id));
        let mut second = task::spawn(cache.request_decision(&id));
        let mut third = task::spawn(cache.request_decision(&id));

        assert_pending!(first.poll());
        assert_pending!(second.poll());
        assert_pending!(third.poll());
        assert_eq!(prompt.invocations(), 1);
        assert_eq!(cache.pending_prompts(), 1);

        gate.release();
        assert!(first.is_woken());
        assert_ready_eq!(first.poll(), TrustDecision::Trust);
        assert_ready_eq!(second.poll(), TrustDecision::Trust);
        assert_ready_eq!(third.poll(), TrustDecision::Trust);

        assert_eq!(prompt.invocations(), 1);
        assert_eq!(cache.pending_prompts(), 0);
        assert_eq!(cache.decision_for(&id), Some(TrustDecision::Trust));
    }

    #[test]
    fn test_recorded_decision_is_replayed_without_prompting() {
        let prompt = MockPrompt::answering(TrustDecision::Reject);
        let cache = TrustDecisionCache::new(prompt.clone());
        let id = cert("CN=idp.local");

        let mut first = task::spawn(cache.request_decision(&id));
        assert_ready_eq!(first.poll(), TrustDecision::Reject);

        let id_again = id.clone();
        let mut again = task::spawn(cache.request_decision(&id_again));
        assert_ready_eq!(again.poll(), TrustDecision::Reject);
        assert_eq!(prompt.invocations(), 1);
    }

    #[test]
    fn test_distinct_identities_prompt_separately() {
        let prompt = MockPrompt::answering(TrustDecision::Trust);
        let cache = TrustDecisionCache::new(prompt.clone());

        let a = cert("CN=idp.local");
        let b = cert("CN=cdn.local");
        assert_ready_eq!(task::spawn(cache.request_decision(&a)).poll(), TrustDecision::Trust);
        assert_ready_eq!(task::spawn(cache.request_decision(&b)).poll(), TrustDecision::Trust);
        assert_eq!(prompt.invocations(), 2);
        assert_eq!(prompt.prompted(), vec![a, b]);
    }

    #[test]
    fn test_close_rejects_queued_callers_and_future_requests() {
        let (prompt, gate) = MockPrompt::gated(TrustDecision::Trust);
        let cache = TrustDecisionCache::new(prompt.clone());
        let id = cert("CN=idp.local");

        let mut prompter = task::spawn(cache.request_decision(&id));
        let mut waiter = task::spawn(cache.request_decision(&id));
        assert_pending!(prompter.poll());
        assert_pending!(waiter.poll());

        cache.close();
        assert!(cache.is_closed());
        assert_ready_eq!(waiter.poll(), TrustDecision::Reject);

        // The prompting caller is released without waiting for the user
        assert!(prompter.is_woken());
        assert_ready_eq!(prompter.poll(), TrustDecision::Reject);

        // A late answer is neither recorded nor replayed
        gate.release();
        assert_eq!(cache.decision_for(&id), None);

        assert_ready_eq!(task::spawn(cache.request_decision(&id)).poll(), TrustDecision::Reject);
        assert_eq!(prompt.invocations(), 1);
    }

    #[test]
    fn test_dropped_prompter_rejects_waiters() {
        let (prompt, _gate) = MockPrompt::gated(TrustDecision::Trust);
        let cache = TrustDecisionCache::new(prompt.clone());
        let id = cert("CN=idp.local");

        let mut prompter = task::spawn(cache.request_decision(&id));
        let mut waiter = task::spawn(cache.request_decision(&id));
        assert_pending!(prompter.poll());
        assert_pending!(waiter.poll());

        drop(prompter);
        assert_ready_eq!(waiter.poll(), TrustDecision::Reject);
        assert_eq!(cache.pending_prompts(), 0);
        assert_eq!(cache.decision_for(&id), None);
        assert!(!cache.is_closed());
    }

    #[test]
    fn test_drop_resolves_outstanding_receivers() {
        let (prompt, _gate) = MockPrompt::gated(TrustDecision::Trust);
        let cache = TrustDecisionCache::new(prompt);
        let id = cert("CN=idp.local");

        let (tx, mut rx) = oneshot::channel();
        cache.lock().pending.insert(id, vec![tx]);

        drop(cache);
        assert_eq!(rx.try_recv(), Ok(TrustDecision::Reject));
    }
}
