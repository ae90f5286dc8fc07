//! Mock certificate prompt for testing.

use crate::certificate::{CertificateIdentity, TrustDecision};
use crate::providers::CertificatePrompt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Semaphore;

/// Mock certificate prompt.
///
/// Answers every prompt with a fixed decision, optionally holding each
/// answer until a [`PromptGate`] releases it.
#[derive(Debug, Clone)]
pub struct MockPrompt {
    decision: TrustDecision,
    prompted: Arc<Mutex<Vec<CertificateIdentity>>>,
    gate: Option<Arc<Semaphore>>,
}

/// Releases answers held by a gated [`MockPrompt`].
#[derive(Debug, Clone)]
pub struct PromptGate {
    semaphore: Arc<Semaphore>,
}

impl PromptGate {
    /// Let one held prompt answer.
    pub fn release(&self) {
        self.semaphore.add_permits(1);
    }
}

impl MockPrompt {
    /// A prompt that answers `decision` immediately.
    #[must_use]
    pub fn answering(decision: TrustDecision) -> Self {
        Self {
            decision,
            prompted: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// A prompt that answers `decision` once released through the gate.
    #[must_use]
    pub fn gated(decision: TrustDecision) -> (Self, PromptGate) {
        let semaphore = Arc::new(Semaphore::new(0));
        let prompt = Self {
            gate: Some(Arc::clone(&semaphore)),
            ..Self::answering(decision)
        };
        (prompt, PromptGate { semaphore })
    }

    /// Number of times the user was prompted.
    #[must_use]
    pub fn invocations(&self) -> usize {
        self.prompted.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Certificates the user was prompted about, in order.
    #[must_use]
    pub fn prompted(&self) -> Vec<CertificateIdentity> {
        self.prompted.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl CertificatePrompt for MockPrompt {
    fn prompt_user(
        &self,
        identity: &CertificateIdentity,
    ) -> impl Future<Output = TrustDecision> + Send {
        self.prompted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(identity.clone());

        let gate = self.gate.clone();
        let decision = self.decision;
        async move {
            if let Some(gate) = gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
            decision
        }
    }
}
