//! Admission filtering: decides whether a window candidate may displace a
//! probation victim.
//!
//! The policy core only consumes the [`Admittor`] contract; the shipped
//! implementation is [`TinyLfu`], a count-min frequency sketch behind a
//! doorkeeper bloom filter. [`AlwaysAdmit`] and [`NeverAdmit`] are trivial
//! baselines for tests and benchmarks.

pub mod doorkeeper;
pub mod frequency;
pub mod tinylfu;

pub use doorkeeper::Doorkeeper;
pub use frequency::FrequencySketch;
pub use tinylfu::TinyLfu;

/// Filter consulted at the probation boundary.
///
/// `record` is called once per access, before the access is classified as
/// hit or miss. `admit` answers the pairwise question posed by eviction:
/// `true` means the candidate replaces the victim, `false` means the victim
/// survives and the candidate is evicted instead.
pub trait Admittor {
    /// Informs the filter that `key` was referenced.
    fn record(&mut self, key: u64);

    /// Returns `true` if `candidate` should replace `victim`.
    fn admit(&mut self, candidate: u64, victim: u64) -> bool;
}

/// Admits every candidate. Degenerates the policy to plain segmented LRU.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysAdmit;

impl Admittor for AlwaysAdmit {
    fn record(&mut self, _key: u64) {}

    fn admit(&mut self, _candidate: u64, _victim: u64) -> bool {
        true
    }
}

/// Rejects every candidate; the freshly arrived entry always loses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverAdmit;

impl Admittor for NeverAdmit {
    fn record(&mut self, _key: u64) {}

    fn admit(&mut self, _candidate: u64, _victim: u64) -> bool {
        false
    }
}
