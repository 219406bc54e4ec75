//! Validated construction of adaptive W-TinyLFU policy instances.
//!
//! The builder resolves the climber strategy and a capacity-sized TinyLFU
//! admittor once, up front; the policy core never sees configuration. A
//! driving harness that sweeps parameter grids can expand the same
//! cross-product the configuration file describes with [`variations`].
//!
//! ## Example
//!
//! ```rust
//! use climbkit::builder::PolicyBuilder;
//! use climbkit::climb::ClimberType;
//!
//! let mut policy = PolicyBuilder::new(512)
//!     .percent_main(0.99)
//!     .percent_main_protected(0.8)
//!     .climber(ClimberType::Simple)
//!     .try_build()
//!     .unwrap();
//! policy.record(42);
//! ```

use crate::admission::TinyLfu;
use crate::climb::ClimberType;
use crate::error::ConfigError;
use crate::policy::adaptive_wtlfu::AdaptiveWTinyLfuCore;

/// Default fraction of capacity assigned to the main region.
const DEFAULT_PERCENT_MAIN: f64 = 0.99;

/// Default fraction of main assigned to the protected segment.
const DEFAULT_PERCENT_MAIN_PROTECTED: f64 = 0.8;

/// Builder for [`AdaptiveWTinyLfuCore`] instances.
#[derive(Debug, Clone)]
pub struct PolicyBuilder {
    capacity: usize,
    percent_main: f64,
    percent_main_protected: f64,
    climber: ClimberType,
}

impl PolicyBuilder {
    /// Creates a builder for a policy of `capacity` entries with the
    /// default segment split and the simple climber.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            percent_main: DEFAULT_PERCENT_MAIN,
            percent_main_protected: DEFAULT_PERCENT_MAIN_PROTECTED,
            climber: ClimberType::Simple,
        }
    }

    /// Sets the initial fraction of capacity assigned to main, in `(0, 1]`.
    /// The window receives the remainder.
    pub fn percent_main(mut self, percent_main: f64) -> Self {
        self.percent_main = percent_main;
        self
    }

    /// Sets the fraction of main initially assigned to protected, in
    /// `[0, 1]`.
    pub fn percent_main_protected(mut self, fraction: f64) -> Self {
        self.percent_main_protected = fraction;
        self
    }

    /// Sets the climber strategy.
    pub fn climber(mut self, climber: ClimberType) -> Self {
        self.climber = climber;
        self
    }

    /// Builds the policy, validating every parameter.
    pub fn try_build(self) -> Result<AdaptiveWTinyLfuCore, ConfigError> {
        let name = format!(
            "adaptive-wtlfu ({} {:.0}%)",
            self.climber.label(),
            100.0 * (1.0 - self.percent_main),
        );
        AdaptiveWTinyLfuCore::with_parts(
            self.capacity,
            self.percent_main,
            self.percent_main_protected,
            Box::new(TinyLfu::new(self.capacity)),
            self.climber.build(self.capacity),
            name,
        )
    }
}

/// Expands the cross-product of main-percent values and climber strategies
/// into one policy per combination, sharing `percent_main_protected`.
///
/// Mirrors the shape of harness configuration: a list of main percents, a
/// single protected fraction, a list of strategy names.
///
/// # Example
///
/// ```rust
/// use climbkit::builder::variations;
/// use climbkit::climb::ClimberType;
///
/// let policies = variations(
///     256,
///     &[0.95, 0.99],
///     0.8,
///     &[ClimberType::Simple, ClimberType::Hold],
/// )
/// .unwrap();
/// assert_eq!(policies.len(), 4);
/// ```
pub fn variations(
    capacity: usize,
    percent_main: &[f64],
    percent_main_protected: f64,
    climbers: &[ClimberType],
) -> Result<Vec<AdaptiveWTinyLfuCore>, ConfigError> {
    let mut policies = Vec::with_capacity(percent_main.len() * climbers.len());
    for &climber in climbers {
        for &percent in percent_main {
            policies.push(
                PolicyBuilder::new(capacity)
                    .percent_main(percent)
                    .percent_main_protected(percent_main_protected)
                    .climber(climber)
                    .try_build()?,
            );
        }
    }
    Ok(policies)
}
