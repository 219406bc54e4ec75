//! Fixed-step hill climber driven by sampled hit rate.

use crate::climb::{Adaptation, HillClimber};
use crate::policy::Segment;

/// Accesses sampled per decision epoch, as a multiple of capacity.
const SAMPLE_FACTOR: u64 = 10;

/// Step size per decision, as a fraction of capacity.
const STEP_FRACTION: f64 = 0.0625;

/// The classic hill climber: walk in one direction while the hit rate
/// improves, turn around when it regresses.
///
/// Sampling only counts accesses made while the cache is full — until
/// then every configuration misses equally and the gradient is noise.
/// After each epoch of `10 × capacity` sampled accesses the epoch hit
/// rate is compared against the previous epoch; the climber keeps its
/// direction on improvement and reverses on regress, always emitting a
/// fixed step of `max(1, capacity/16)` entries. The first epoch compares
/// against a zero baseline, so the initial direction (growing the window)
/// is kept.
#[derive(Debug)]
pub struct SimpleClimber {
    sample_size: u64,
    step: f64,
    sampled: u64,
    hits: u64,
    previous_hit_rate: f64,
    increase: bool,
}

impl SimpleClimber {
    /// Creates a climber with default tuning for `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self::with_tuning(
            (SAMPLE_FACTOR * capacity as u64).max(1),
            (STEP_FRACTION * capacity as f64).max(1.0),
        )
    }

    /// Creates a climber with an explicit epoch length and step size.
    pub fn with_tuning(sample_size: u64, step: f64) -> Self {
        assert!(sample_size > 0, "sample size must be positive");
        assert!(step >= 0.0, "step must be non-negative");
        Self {
            sample_size,
            step,
            sampled: 0,
            hits: 0,
            previous_hit_rate: 0.0,
            increase: true,
        }
    }

    fn sample(&mut self, hit: bool, is_full: bool) {
        if !is_full {
            return;
        }
        self.sampled += 1;
        if hit {
            self.hits += 1;
        }
    }
}

impl HillClimber for SimpleClimber {
    fn on_miss(&mut self, _key: u64, is_full: bool) {
        self.sample(false, is_full);
    }

    fn on_hit(&mut self, _key: u64, _segment: Segment, is_full: bool) {
        self.sample(true, is_full);
    }

    fn adapt(
        &mut self,
        _window_size: f64,
        _probation_size: f64,
        _protected_size: f64,
        _is_full: bool,
    ) -> Adaptation {
        if self.sampled < self.sample_size {
            return Adaptation::Hold;
        }

        let hit_rate = self.hits as f64 / self.sampled as f64;
        if hit_rate < self.previous_hit_rate {
            self.increase = !self.increase;
        }
        self.previous_hit_rate = hit_rate;
        self.sampled = 0;
        self.hits = 0;

        if self.increase {
            Adaptation::IncreaseWindow { amount: self.step }
        } else {
            Adaptation::DecreaseWindow { amount: self.step }
        }
    }
}
