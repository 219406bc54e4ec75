//! Online controllers that retune the window/protected split.
//!
//! The policy core reports every access to its [`HillClimber`] and asks it
//! for an [`Adaptation`] directive afterwards. Climbers are opaque to the
//! core; the only requirements are that `Hold` changes nothing, amounts are
//! non-negative, and the climber never touches cache state itself.
//!
//! Strategy resolution happens once, at construction, through
//! [`ClimberType`] — never per access.

pub mod simple;

pub use simple::SimpleClimber;

use std::str::FromStr;

use crate::error::ConfigError;
use crate::policy::Segment;

/// Directive returned by [`HillClimber::adapt`].
///
/// Amounts are real-valued entry counts; the resize executor converts them
/// into whole-node moves and carries the fractional residue forward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adaptation {
    /// Grow the window at the expense of the protected region.
    IncreaseWindow { amount: f64 },
    /// Shrink the window back into the protected region.
    DecreaseWindow { amount: f64 },
    /// Leave the boundaries where they are.
    Hold,
}

/// Controller contract consumed by the policy core.
///
/// `on_hit` receives the segment the entry occupied *before* the hit moved
/// it. `is_full` reflects residency at the start of the access, before any
/// mutation.
pub trait HillClimber {
    /// Observes a miss.
    fn on_miss(&mut self, key: u64, is_full: bool);

    /// Observes a hit in `segment`.
    fn on_hit(&mut self, key: u64, segment: Segment, is_full: bool);

    /// Returns the directive for this access.
    fn adapt(
        &mut self,
        window_size: f64,
        probation_size: f64,
        protected_size: f64,
        is_full: bool,
    ) -> Adaptation;
}

/// Never adapts. The static W-TinyLFU baseline.
#[derive(Debug, Default, Clone, Copy)]
pub struct HoldClimber;

impl HillClimber for HoldClimber {
    fn on_miss(&mut self, _key: u64, _is_full: bool) {}

    fn on_hit(&mut self, _key: u64, _segment: Segment, _is_full: bool) {}

    fn adapt(
        &mut self,
        _window_size: f64,
        _probation_size: f64,
        _protected_size: f64,
        _is_full: bool,
    ) -> Adaptation {
        Adaptation::Hold
    }
}

/// Climber strategy identifier, resolved at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimberType {
    /// Fixed-step sampling climber ([`SimpleClimber`]).
    Simple,
    /// No adaptation ([`HoldClimber`]).
    Hold,
}

impl ClimberType {
    /// Builds the climber for a cache of `capacity` entries.
    pub fn build(self, capacity: usize) -> Box<dyn HillClimber> {
        match self {
            ClimberType::Simple => Box::new(SimpleClimber::new(capacity)),
            ClimberType::Hold => Box::new(HoldClimber),
        }
    }

    /// Harness-facing strategy name.
    pub fn label(self) -> &'static str {
        match self {
            ClimberType::Simple => "simple",
            ClimberType::Hold => "hold",
        }
    }
}

impl FromStr for ClimberType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(ClimberType::Simple),
            "hold" => Ok(ClimberType::Hold),
            other => Err(ConfigError::new(format!(
                "unknown climber strategy: {other:?}"
            ))),
        }
    }
}
