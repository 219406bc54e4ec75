//! Error types for the climbkit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when policy configuration parameters are
//!   invalid (e.g. zero capacity, out-of-range segment fractions).
//! - [`InvariantError`]: Returned by the non-panicking `check_invariants`
//!   methods when internal sizing or list invariants are violated.
//!
//! ## Example Usage
//!
//! ```
//! use climbkit::builder::PolicyBuilder;
//! use climbkit::error::ConfigError;
//!
//! // Fallible construction for user-configurable parameters
//! let policy = PolicyBuilder::new(100).try_build();
//! assert!(policy.is_ok());
//!
//! // An invalid fraction is caught without panicking
//! let bad = PolicyBuilder::new(100).percent_main(1.5).try_build();
//! assert!(bad.is_err());
//! ```
//!
//! Invariant *violations observed at runtime* (as opposed to audits) are
//! fatal panics, not `InvariantError` values: the simulator has no
//! recoverable failure mode once its bookkeeping is wrong.

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when policy configuration parameters are invalid.
///
/// Produced by [`PolicyBuilder::try_build`](crate::builder::PolicyBuilder::try_build)
/// and friends. Carries a human-readable description of which parameter
/// failed validation.
///
/// # Example
///
/// ```
/// use climbkit::builder::PolicyBuilder;
///
/// let err = PolicyBuilder::new(0).try_build().unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
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

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when an invariant audit fails.
///
/// Produced by audit methods such as
/// [`AdaptiveWTinyLfuCore::check_invariants`](crate::policy::adaptive_wtlfu::AdaptiveWTinyLfuCore::check_invariants).
/// Carries a description naming the violated invariant and the observed
/// numbers.
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
// Tests
// ---------------------------------------------------------------------------
