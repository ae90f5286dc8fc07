//! Flow configuration.
//!
//! Values are supplied by the host application when it builds a controller.

use std::time::Duration;

/// Login flow configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowConfig {
    /// Title the host shows above the browsing surface.
    ///
    /// Default: `"Sign in"`
    pub title: String,

    /// Whether the host shows a cancel affordance.
    ///
    /// When `false`, `cancel()` is ignored. Default: `true`
    pub allow_cancel: bool,

    /// Clear browser cookies before loading the initial URL.
    ///
    /// Applies to every attempt, including retries. Default: `false`
    pub clear_cookies_before_login: bool,

    /// How long a loaded page must stay current before the surface is revealed.
    ///
    /// Default: 150 milliseconds
    pub reveal_delay: Duration,
}

impl FlowConfig {
    /// Create a configuration with the given title and default settings.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Enable or disable the cancel affordance.
    #[must_use]
    pub const fn with_allow_cancel(mut self, allow: bool) -> Self {
        self.allow_cancel = allow;
        self
    }

    /// Clear cookies before each attempt.
    #[must_use]
    pub const fn with_clear_cookies_before_login(mut self, clear: bool) -> Self {
        self.clear_cookies_before_login = clear;
        self
    }

    /// Set the reveal debounce delay.
    #[must_use]
    pub const fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            title: "Sign in".to_string(),
            allow_cancel: true,
            clear_cookies_before_login: false,
            reveal_delay: Duration::from_millis(150),
        }
    }
}
