//! `[purge]` options, resolved once per interceptor.
//!
//! # Example
//!
//! ```toml
//! [purge]
//! minify = true                   # Minify the purified CSS
//! whitelist = [".no", "*modal*"]  # Selectors never removed
//! debug = false                   # Print a one-line report per response
//! ```

use serde::{Deserialize, Serialize};

use super::reducer::ReduceOptions;

/// Reduction options for one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurgeOptions {
    /// Minify the purified CSS.
    pub minify: bool,

    /// Selectors the reducer must keep even when the body never uses them.
    pub whitelist: Vec<String>,

    /// Log a report line for every purified response.
    pub debug: bool,
}

impl Default for PurgeOptions {
    fn default() -> Self {
        Self {
            minify: true,
            whitelist: Vec::new(),
            debug: false,
        }
    }
}

impl PurgeOptions {
    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    pub fn with_whitelist<I, S>(mut self, whitelist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whitelist = whitelist.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The subset handed to the reducer.
    pub fn reduce_options(&self) -> ReduceOptions<'_> {
        ReduceOptions {
            minify: self.minify,
            whitelist: &self.whitelist,
        }
    }
}
