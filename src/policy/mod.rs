//! Cache replacement policies driven by key-only access traces.

pub mod adaptive_wtlfu;

pub use adaptive_wtlfu::AdaptiveWTinyLfuCore;

use crate::stats::PolicyStats;

/// The three LRU regions of a windowed cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Admission buffer collecting recent arrivals; its LRU victim is the
    /// candidate offered to the admission filter.
    Window,
    /// Main-region entries not recently re-referenced; the victim pool.
    Probation,
    /// Main-region entries recently re-referenced; capped, demotes to
    /// probation on overflow.
    Protected,
}

/// Surface a trace driver needs from a key-only policy.
///
/// The driver feeds the trace through [`record`](Self::record) in order,
/// calls [`finished`](Self::finished) once at the end, and reads the
/// accumulated [`PolicyStats`] back.
pub trait KeyOnlyPolicy {
    /// Ingests one access.
    fn record(&mut self, key: u64);

    /// Returns the statistics accumulated so far.
    fn stats(&self) -> &PolicyStats;

    /// Runs the end-of-trace invariant audit and commits final statistics.
    fn finished(&mut self);
}
