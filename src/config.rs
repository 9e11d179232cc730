//! # Router Configuration
//!
//! [`RouterConfig`] is fixed when the [`Router`](crate::router::Router) is
//! created and travels with the [`Dispatcher`](crate::dispatcher::Dispatcher)
//! it builds. The boolean options can also be loaded from TOML through
//! [`RouterOptions`]:
//!
//! ```toml
//! redirect_trailing_slash = true
//! handle_method_not_allowed = false
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::dispatcher::{Handler, SharedHandler};

/// Behavioural switches for routing.
#[derive(Clone)]
pub struct RouterConfig {
    /// Create `path/` shadow routes that redirect to `path`. Default: true
    pub redirect_trailing_slash: bool,
    /// Answer 405 with an `Allow` header when the path exists for other
    /// methods, instead of falling through to not-found. Default: true
    pub handle_method_not_allowed: bool,
    /// Handler for requests nothing else answered. Default: plain 404
    pub not_found: Option<SharedHandler>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            redirect_trailing_slash: true,
            handle_method_not_allowed: true,
            not_found: None,
        }
    }
}

impl fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterConfig")
            .field("redirect_trailing_slash", &self.redirect_trailing_slash)
            .field("handle_method_not_allowed", &self.handle_method_not_allowed)
            .field("not_found", &self.not_found.as_ref().map(|_| "custom"))
            .finish()
    }
}

impl RouterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn redirect_trailing_slash(mut self, enabled: bool) -> Self {
        self.redirect_trailing_slash = enabled;
        self
    }

    #[must_use]
    pub fn handle_method_not_allowed(mut self, enabled: bool) -> Self {
        self.handle_method_not_allowed = enabled;
        self
    }

    #[must_use]
    pub fn not_found<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.not_found = Some(Arc::new(handler));
        self
    }
}

/// Serializable subset of [`RouterConfig`]; missing keys keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterOptions {
    pub redirect_trailing_slash: bool,
    pub handle_method_not_allowed: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            redirect_trailing_slash: true,
            handle_method_not_allowed: true,
        }
    }
}

impl RouterOptions {
    /// Parse options from a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse router options")
    }

    /// Load options from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read router options from {}", path.display()))?;
        Self::from_toml_str(&text)
    }
}

impl From<RouterOptions> for RouterConfig {
    fn from(options: RouterOptions) -> Self {
        RouterConfig::default()
            .redirect_trailing_slash(options.redirect_trailing_slash)
            .handle_method_not_allowed(options.handle_method_not_allowed)
    }
}
