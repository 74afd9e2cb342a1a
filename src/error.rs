//! Error types for the stringing engine.
//!
//! Every variant is fatal: the run stops before any string is built and the
//! caller gets a structured failure instead of a partial result. Advisory
//! outcomes (stragglers, sizing status, overflow MPPTs) are part of a
//! successful [`StringingResult`](crate::optimizer::StringingResult).

use thiserror::Error;

use crate::config::ConfigError;

/// Fatal failure of an optimisation run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StringingError {
    /// Malformed or physically inconsistent specs or configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The inverter cannot host any string of this panel at the site's
    /// temperature extremes.
    #[error("sizing incompatibility (min {min_panels} > max {max_panels} panels): {reason}")]
    Incompatible {
        /// Minimum panels needed to reach the start-up voltage.
        min_panels: usize,
        /// Maximum panels allowed by the voltage limits.
        max_panels: usize,
        /// Which limit pair clashed.
        reason: String,
    },

    /// The panel layout itself is unusable (empty, duplicate ids).
    #[error("invalid layout: {0}")]
    Layout(String),
}

impl StringingError {
    /// Shorthand for a [`ConfigError`] on a dotted field path.
    pub(crate) fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config(ConfigError {
            field: field.into(),
            message: message.into(),
        })
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, StringingError>;
