//! Error types for the gpucache library.
//!
//! ## Key Components
//!
//! - [`InvariantError`]: Returned when internal cache invariants are
//!   violated (debug-only `check_invariants`).
//! - [`ConfigError`]: Returned when cache configuration parameters are
//!   invalid (e.g. zero budgets).
//!
//! ## Example Usage
//!
//! ```
//! use gpucache::builder::CacheBuilder;
//! use gpucache::error::ConfigError;
//!
//! // Fallible configuration for user-supplied budgets
//! let err: ConfigError = CacheBuilder::new().max_count(0).validate().unwrap_err();
//! assert!(err.to_string().contains("max_count"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by the debug-only `check_invariants` method on
/// [`ResourceCache`](crate::cache::ResourceCache). Carries a human-readable
/// description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`CacheBuilder::try_budgets`](crate::builder::CacheBuilder::try_budgets)
/// and [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
/// Carries a human-readable description of which parameter failed
/// validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}
