//! Console collaborators for the scripted login demo.
//!
//! Stand-ins for a real web view, host window and certificate dialog that
//! print what the flow asks of them.

use std::future::Future;
use std::time::Duration;
use url::Url;
use webview_auth::{
    BenignCancelCodes, BrowsingSurface, CertificateIdentity, CertificatePrompt, FlowSignal,
    HostShell, LoadFailure, LoadId, TrustDecision,
};

/// Browsing surface that prints every command.
#[derive(Debug, Clone)]
pub struct ConsoleSurface {
    benign: BenignCancelCodes,
}

impl ConsoleSurface {
    /// Create a surface using WebKit's "cancelled" code as the benign cancel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            benign: BenignCancelCodes::new().with("NSURLErrorDomain", -999),
        }
    }
}

impl Default for ConsoleSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowsingSurface for ConsoleSurface {
    fn navigate(&self, url: &Url) {
        println!("  [surface] navigate → {url}");
    }

    fn abort_current_navigation(&self) {
        println!("  [surface] abort current navigation");
    }

    fn proceed_load(&self, load: LoadId) {
        println!("  [surface] proceed {load}");
    }

    fn abort_load(&self, load: LoadId) {
        println!("  [surface] abort {load}");
    }

    fn show(&self) {
        println!("  [surface] show");
    }

    fn hide(&self) {
        println!("  [surface] hide (please wait)");
    }

    fn clear_cookies(&self) {
        println!("  [surface] clear cookies");
    }

    fn is_benign_cancel(&self, failure: &LoadFailure) -> bool {
        self.benign.contains(failure)
    }
}

/// Host shell that prints every signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleHost;

impl HostShell for ConsoleHost {
    fn notify(&self, signal: FlowSignal) {
        match signal {
            FlowSignal::PageLoading { authority } => println!("  [host] title: {authority}"),
            FlowSignal::PageLoaded { url } => println!("  [host] loaded {url}"),
            FlowSignal::Completed { success } => println!("  [host] completed (success: {success})"),
            FlowSignal::Cancelled => println!("  [host] cancelled"),
            FlowSignal::Error(error) => println!("  [host] error: {error}"),
        }
    }
}

/// Certificate dialog that "thinks" for a moment, then gives a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedPrompt {
    answer: TrustDecision,
    think_time: Duration,
}

impl ScriptedPrompt {
    /// Create a prompt answering `answer` after `think_time`.
    #[must_use]
    pub const fn new(answer: TrustDecision, think_time: Duration) -> Self {
        Self { answer, think_time }
    }
}

impl CertificatePrompt for ScriptedPrompt {
    fn prompt_user(
        &self,
        identity: &CertificateIdentity,
    ) -> impl Future<Output = TrustDecision> + Send {
        println!("  [dialog] Trust certificate {identity}?");
        let Self { answer, think_time } = *self;
        async move {
            tokio::time::sleep(think_time).await;
            println!("  [dialog] user chose {}", answer.as_str());
            answer
        }
    }
}
