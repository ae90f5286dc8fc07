//! Metric descriptions.
//!
//! The flow and the trust cache record through the `metrics` facade; the
//! host installs whatever recorder it uses. Call [`describe_metrics`] once
//! after installing it so exporters carry units and help text.
//!
//! | Metric | Kind | Labels |
//! |--------|------|--------|
//! | `store.commands.total` | counter | |
//! | `store.commands.refused` | counter | |
//! | `store.effects.executed` | counter | `type` |
//! | `store.reducer.duration_seconds` | histogram | |
//! | `store.shutdown.*` | counter | |
//! | `webview_auth.flow.signals` | counter | `signal` |
//! | `webview_auth.flow.protocol_violations` | counter | |
//! | `webview_auth.trust.requests` | counter | `outcome` |
//! | `webview_auth.trust.abandoned` | counter | |

use metrics::{Unit, describe_counter, describe_histogram};

/// Register descriptions for every metric this workspace records.
pub fn describe_metrics() {
    // Store runtime
    describe_counter!(
        "store.commands.total",
        "Total number of actions reduced by a store"
    );
    describe_counter!(
        "store.commands.refused",
        "Actions refused by a guard before reaching the reducer"
    );
    describe_counter!(
        "store.effects.executed",
        "Total number of effects executed, by effect type"
    );
    describe_histogram!(
        "store.reducer.duration_seconds",
        Unit::Seconds,
        "Time spent inside the reducer per action"
    );
    describe_counter!(
        "store.shutdown.initiated",
        "Number of graceful shutdowns started"
    );
    describe_counter!(
        "store.shutdown.completed",
        "Number of graceful shutdowns that drained all effects"
    );
    describe_counter!(
        "store.shutdown.timeout",
        "Number of graceful shutdowns that timed out"
    );
    describe_counter!(
        "store.shutdown.rejected_actions",
        "Actions rejected because the store was shutting down"
    );

    // Login flow
    describe_counter!(
        "webview_auth.flow.signals",
        "Signals delivered to the host, by signal"
    );
    describe_counter!(
        "webview_auth.flow.protocol_violations",
        "Inputs ignored because the flow could not accept them"
    );

    // Trust cache
    describe_counter!(
        "webview_auth.trust.requests",
        "Trust decision requests, by outcome (cached, coalesced, prompted, closed)"
    );
    describe_counter!(
        "webview_auth.trust.abandoned",
        "Prompts abandoned before the user answered; waiters were rejected"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_without_recorder() {
        // No recorder installed: descriptions are dropped silently
        describe_metrics();
        describe_metrics();
    }
}
