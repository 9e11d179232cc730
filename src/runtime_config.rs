//! # Runtime Configuration Module
//!
//! Environment-driven settings for the bundled HTTP server.
//!
//! ## Environment Variables
//!
//! ### `MUXR_STACK_SIZE`
//!
//! Stack size for the `may` coroutines that serve connections. Accepts
//! decimal (`16384`) or hexadecimal (`0x4000`). Default: `0x4000` (16 KB).
//!
//! ### `MUXR_ADDR`
//!
//! Address the server binds to. Default: `0.0.0.0:8080`.
//!
//! ## Usage
//!
//! ```rust
//! use muxrouter::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Stack size: {} bytes", config.stack_size);
//! ```

use std::env;

/// Default coroutine stack size (16 KB).
pub const DEFAULT_STACK_SIZE: usize = 0x4000;

/// Default bind address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
    /// Bind address for the HTTP server
    pub addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let stack_size = lookup("MUXR_STACK_SIZE")
            .and_then(|val| parse_size(&val))
            .unwrap_or(DEFAULT_STACK_SIZE);
        let addr = lookup("MUXR_ADDR")
            .filter(|addr| !addr.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());
        RuntimeConfig { stack_size, addr }
    }

    /// Apply the stack size to the `may` runtime.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}
