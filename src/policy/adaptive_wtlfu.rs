//! Adaptive Window TinyLFU cache replacement policy.
//!
//! Implements the W-TinyLFU algorithm with an online hill-climbing
//! controller: a small admission window feeds a segmented main region
//! through a frequency-based admission filter, and the window/protected
//! boundary is retuned continuously against the observed hit rate.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────────────┐
//! │                      AdaptiveWTinyLfuCore Layout                           │
//! │                                                                            │
//! │   ┌────────────────────────────────────────────────────────────────────┐   │
//! │   │  directory: FxHashMap<u64, NodeId>     arena: RingArena<Entry>     │   │
//! │   │                                                                    │   │
//! │   │  ┌──────────┬──────────┐        ┌────────┬────────────────────┐    │   │
//! │   │  │   Key    │  NodeId  │        │  Node  │  key, segment      │    │   │
//! │   │  ├──────────┼──────────┤        ├────────┼────────────────────┤    │   │
//! │   │  │   17     │   id_0   │───────►│  id_0  │  17, Window        │    │   │
//! │   │  │   42     │   id_1   │───────►│  id_1  │  42, Probation     │    │   │
//! │   │  │    5     │   id_2   │───────►│  id_2  │   5, Protected     │    │   │
//! │   │  └──────────┴──────────┘        └────────┴────────────────────┘    │   │
//! │   └────────────────────────────────────────────────────────────────────┘   │
//! │                                                                            │
//! │   ┌────────────────────────────────────────────────────────────────────┐   │
//! │   │                       Segment Organization                         │   │
//! │   │                                                                    │   │
//! │   │   WINDOW (LRU)              MAIN = PROBATION + PROTECTED           │   │
//! │   │   ┌──────────────────┐      ┌──────────────┐  ┌────────────────┐   │   │
//! │   │   │ head        tail │      │  PROBATION   │  │   PROTECTED    │   │   │
//! │   │   │  ▼            ▼  │      │ (victim pool)│  │ (capped, LRU)  │   │   │
//! │   │   │ LRU ◄──────► MRU │      └──────┬───────┘  └───────┬────────┘   │   │
//! │   │   └───────┬──────────┘             │    hit: promote  ▲            │   │
//! │   │           │ overflow: candidate    └──────────────────┘            │   │
//! │   │           ▼                               ▲   overflow: demote     │   │
//! │   │   admittor.admit(candidate, victim) ──────┘                        │   │
//! │   └────────────────────────────────────────────────────────────────────┘   │
//! │                                                                            │
//! │   climber.adapt(...) ──► IncreaseWindow / DecreaseWindow / Hold            │
//! │       moves the window↔protected budget boundary, shuffling nodes          │
//! └────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Access Flow
//!
//! ```text
//!   record(key):
//!     1. is_full captured before any mutation
//!     2. admittor.record(key)
//!     3. miss → new node at window MRU, then evict()
//!        hit  → window:    move to window MRU
//!               probation: promote to protected MRU, demote on overflow
//!               protected: move to protected MRU
//!     4. climber observes the access, then adapt() is dispatched
//!
//!   evict():
//!     window over budget → its LRU entry becomes the candidate and moves
//!     to probation; if the cache is over capacity the candidate is pitted
//!     against probation's LRU victim and the admittor picks the loser.
//!
//!   increase_window(amount) / decrease_window(amount):
//!     fractional amounts accumulate in window_size; every whole-number
//!     crossing moves one node across the probation boundary. Growth pulls
//!     probation's LRU into the window tail; shrink pushes the window's
//!     LRU onto probation's HEAD so transfers face the next eviction
//!     first. The asymmetry is load-bearing for benchmark parity.
//! ```
//!
//! ## Operations
//!
//! | Operation    | Time   | Notes                                       |
//! |--------------|--------|---------------------------------------------|
//! | `record`     | O(1)*  | *Plus up to `steps` boundary moves          |
//! | `contains`   | O(1)   | Directory lookup only, no reordering        |
//! | `finished`   | O(n)   | Full recount audit, fatal on mismatch       |
//! | `check_invariants` | O(n) | Non-panicking audit for tests/fuzzing  |
//!
//! ## Thread Safety
//!
//! Not thread-safe; the simulator is strictly single-threaded and the
//! admittor and climber observe events in exact trace order.
//!
//! ## References
//!
//! - Einziger, Friedman, Manes, "TinyLFU: A Highly Efficient Cache
//!   Admission Policy", ACM ToS 2017

use rustc_hash::FxHashMap;

use crate::admission::Admittor;
use crate::climb::{Adaptation, HillClimber};
use crate::ds::{NodeId, RingArena, RingId};
use crate::error::{ConfigError, InvariantError};
use crate::policy::{KeyOnlyPolicy, Segment};
use crate::stats::PolicyStats;

#[derive(Debug)]
struct Entry {
    key: u64,
    segment: Segment,
}

/// Adaptive Window TinyLFU policy over a fixed-capacity keyspace.
///
/// Residents are keys only; a node is created on miss, migrates across the
/// window/probation/protected rings by unlink-and-relink, and is destroyed
/// only on eviction. Budgets (`max_window`, `max_protected`) move under
/// the climber's directives while the real-valued `window_size` /
/// `protected_size` carry fractional adaptation residue between whole-node
/// transfers.
///
/// # Example
///
/// ```
/// use climbkit::builder::PolicyBuilder;
/// use climbkit::policy::KeyOnlyPolicy;
///
/// let mut policy = PolicyBuilder::new(128).try_build().unwrap();
/// for key in [1u64, 2, 3, 1, 2, 3] {
///     policy.record(key);
/// }
/// policy.finished();
/// assert_eq!(policy.stats().operations(), 6);
/// ```
pub struct AdaptiveWTinyLfuCore {
    arena: RingArena<Entry>,
    window: RingId,
    probation: RingId,
    protected: RingId,
    directory: FxHashMap<u64, NodeId>,
    admittor: Box<dyn Admittor>,
    climber: Box<dyn HillClimber>,
    stats: PolicyStats,

    capacity: usize,
    initial_percent_main: f64,
    max_window: usize,
    max_protected: usize,
    window_size: f64,
    protected_size: f64,
}

impl AdaptiveWTinyLfuCore {
    /// Builds a policy from already-resolved scalars and injected
    /// collaborators.
    ///
    /// Derivation: `max_main = floor(capacity · percent_main)`,
    /// `max_protected = floor(max_main · percent_main_protected)`,
    /// `max_window = capacity − max_main`.
    ///
    /// Most callers go through
    /// [`PolicyBuilder`](crate::builder::PolicyBuilder), which resolves the
    /// admittor and climber from configuration; this seam exists for the
    /// harness and for tests that script the collaborators.
    pub fn with_parts(
        capacity: usize,
        percent_main: f64,
        percent_main_protected: f64,
        admittor: Box<dyn Admittor>,
        climber: Box<dyn HillClimber>,
        name: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("capacity must be > 0"));
        }
        if !(percent_main > 0.0 && percent_main <= 1.0) {
            return Err(ConfigError::new(format!(
                "percent_main must be in (0, 1], got {percent_main}"
            )));
        }
        if !(0.0..=1.0).contains(&percent_main_protected) {
            return Err(ConfigError::new(format!(
                "percent_main_protected must be in [0, 1], got {percent_main_protected}"
            )));
        }

        let max_main = (capacity as f64 * percent_main) as usize;
        let max_protected = (max_main as f64 * percent_main_protected) as usize;
        let max_window = capacity - max_main;

        let mut arena = RingArena::with_capacity(capacity + 3);
        let window = arena.new_ring();
        let probation = arena.new_ring();
        let protected = arena.new_ring();

        Ok(Self {
            arena,
            window,
            probation,
            protected,
            directory: FxHashMap::default(),
            admittor,
            climber,
            stats: PolicyStats::new(name),
            capacity,
            initial_percent_main: percent_main,
            max_window,
            max_protected,
            window_size: 0.0,
            protected_size: 0.0,
        })
    }

    /// Ingests one access.
    pub fn record(&mut self, key: u64) {
        let is_full = self.directory.len() >= self.capacity;
        self.stats.record_operation();
        self.admittor.record(key);

        let segment = match self.directory.get(&key).copied() {
            None => {
                self.on_miss(key);
                None
            },
            Some(id) => {
                // classified by the segment occupied before the hit moves it
                let segment = self.entry(id).segment;
                self.on_hit(id, segment);
                Some(segment)
            },
        };
        self.climb(key, segment, is_full);

        #[cfg(debug_assertions)]
        {
            if let Err(err) = self.check_invariants() {
                panic!("invariant violated after record({key}): {err}");
            }
        }
    }

    /// Adds the entry to the admission window, evicting if necessary.
    fn on_miss(&mut self, key: u64) {
        self.stats.record_miss();
        let id = self.arena.push_tail(
            self.window,
            Entry {
                key,
                segment: Segment::Window,
            },
        );
        self.directory.insert(key, id);
        self.window_size += 1.0;
        self.evict();
    }

    /// Moves or promotes as necessary.
    fn on_hit(&mut self, id: NodeId, segment: Segment) {
        self.stats.record_hit();
        match segment {
            Segment::Window => {
                self.arena.move_to_tail(self.window, id);
            },
            Segment::Probation => {
                self.arena.unlink(id);
                self.set_segment(id, Segment::Protected);
                self.arena.link_tail(self.protected, id);
                self.protected_size += 1.0;
                self.demote_protected();
            },
            Segment::Protected => {
                self.arena.move_to_tail(self.protected, id);
            },
        }
    }

    /// Slides at most one entry protected → probation when over budget.
    fn demote_protected(&mut self) {
        if self.protected_size > self.max_protected as f64 {
            let demoted = self
                .arena
                .head(self.protected)
                .unwrap_or_else(|| {
                    panic!(
                        "protected ring empty with protected_size={} > max_protected={}",
                        self.protected_size, self.max_protected
                    )
                });
            self.arena.unlink(demoted);
            self.set_segment(demoted, Segment::Probation);
            self.arena.link_tail(self.probation, demoted);
            self.protected_size -= 1.0;
        }
    }

    /// Evicts from the admission window into probation. If the cache is
    /// over capacity the candidate and probation's victim are pitted
    /// against each other and the admittor's loser is evicted.
    fn evict(&mut self) {
        if self.window_size <= self.max_window as f64 {
            return;
        }

        let candidate = self.arena.head(self.window).unwrap_or_else(|| {
            panic!(
                "window ring empty with window_size={} > max_window={}",
                self.window_size, self.max_window
            )
        });
        self.window_size -= 1.0;

        self.arena.unlink(candidate);
        self.set_segment(candidate, Segment::Probation);
        self.arena.link_tail(self.probation, candidate);

        if self.directory.len() > self.capacity {
            let victim = self
                .arena
                .head(self.probation)
                .expect("probation ring empty while over capacity");
            let candidate_key = self.entry(candidate).key;
            let victim_key = self.entry(victim).key;
            // a "no" verdict evicts the freshly promoted candidate
            let loser = if self.admittor.admit(candidate_key, victim_key) {
                victim
            } else {
                candidate
            };
            let entry = self
                .arena
                .remove(loser)
                .expect("evicting a node that is not live");
            self.directory.remove(&entry.key);
            self.stats.record_eviction();
        }
    }

    /// Performs the hill climbing process.
    fn climb(&mut self, key: u64, segment: Option<Segment>, is_full: bool) {
        match segment {
            None => self.climber.on_miss(key, is_full),
            Some(segment) => self.climber.on_hit(key, segment, is_full),
        }

        let probation_size = self.capacity as f64 - self.window_size - self.protected_size;
        match self
            .climber
            .adapt(self.window_size, probation_size, self.protected_size, is_full)
        {
            Adaptation::IncreaseWindow { amount } => self.increase_window(amount),
            Adaptation::DecreaseWindow { amount } => self.decrease_window(amount),
            Adaptation::Hold => {},
        }
    }

    /// Grows the window at the expense of the protected region.
    fn increase_window(&mut self, amount: f64) {
        assert!(amount >= 0.0, "adaptation amount {amount} must be >= 0");
        if self.max_protected == 0 {
            return;
        }

        let quota = amount.min(self.max_protected as f64);
        let steps = ((self.window_size + quota).floor() - self.window_size.floor()) as usize;
        self.window_size += quota;

        for _ in 0..steps {
            self.max_window += 1;
            self.max_protected = self.max_protected.checked_sub(1).unwrap_or_else(|| {
                panic!("protected budget underflow: {steps} steps exceed the donor region")
            });

            self.demote_protected();
            let migrant = self.arena.head(self.probation).unwrap_or_else(|| {
                panic!(
                    "probation ring empty during window growth: window_size={} max_window={}",
                    self.window_size, self.max_window
                )
            });
            self.arena.unlink(migrant);
            self.set_segment(migrant, Segment::Window);
            self.arena.link_tail(self.window, migrant);
        }

        assert!(
            self.window_size >= 0.0,
            "window size {} went negative",
            self.window_size
        );
        self.assert_budgets();
    }

    /// Shrinks the window back into the protected region.
    fn decrease_window(&mut self, amount: f64) {
        assert!(amount >= 0.0, "adaptation amount {amount} must be >= 0");
        if self.max_window == 0 {
            return;
        }

        let quota = amount.min(self.max_window as f64);
        let steps = (self.window_size.floor() - (self.window_size - quota).floor()) as usize;
        self.window_size -= quota;

        for _ in 0..steps {
            self.max_window = self.max_window.checked_sub(1).unwrap_or_else(|| {
                panic!("window budget underflow: {steps} steps exceed the window")
            });
            self.max_protected += 1;

            let migrant = self.arena.head(self.window).unwrap_or_else(|| {
                panic!(
                    "window ring empty during window shrink: window_size={} max_window={}",
                    self.window_size, self.max_window
                )
            });
            self.arena.unlink(migrant);
            self.set_segment(migrant, Segment::Probation);
            // transfers land at probation's LRU end: they face the next
            // eviction cycle first instead of being spared by it
            self.arena.link_head(self.probation, migrant);
        }

        assert!(
            self.window_size >= 0.0,
            "window size {} went negative",
            self.window_size
        );
        self.assert_budgets();
    }

    /// End-of-trace audit; commits the adaptation drift to the stats and
    /// recounts every segment. Mismatches are fatal, in release too.
    pub fn finished(&mut self) {
        self.stats.set_percent_adaptation(
            self.max_window as f64 / self.capacity as f64 - (1.0 - self.initial_percent_main),
        );

        let mut actual_window = 0u64;
        let mut actual_probation = 0u64;
        let mut actual_protected = 0u64;
        for &id in self.directory.values() {
            match self.entry(id).segment {
                Segment::Window => actual_window += 1,
                Segment::Probation => actual_probation += 1,
                Segment::Protected => actual_protected += 1,
            }
        }
        let calculated_probation = self.directory.len() as u64 - actual_window - actual_protected;

        assert_eq!(
            self.window_size as u64, actual_window,
            "window: {} != {}",
            self.window_size as u64, actual_window
        );
        assert_eq!(
            self.protected_size as u64, actual_protected,
            "protected: {} != {}",
            self.protected_size as u64, actual_protected
        );
        assert_eq!(
            actual_probation, calculated_probation,
            "probation: {} != {}",
            actual_probation, calculated_probation
        );
        assert!(
            self.directory.len() <= self.capacity,
            "maximum: {} > {}",
            self.directory.len(),
            self.capacity
        );
    }

    /// Non-panicking audit of the sizing and linkage invariants.
    ///
    /// Walks all three rings and cross-checks them against the directory
    /// and the budget/size bookkeeping. Used by tests and fuzz targets;
    /// `record` runs it after every access in debug builds.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.max_window > self.capacity {
            return Err(InvariantError::new(format!(
                "window budget {} exceeds capacity {}",
                self.max_window, self.capacity
            )));
        }
        let max_main = self.capacity - self.max_window;
        if self.max_protected > max_main {
            return Err(InvariantError::new(format!(
                "protected budget {} exceeds main budget {}",
                self.max_protected, max_main
            )));
        }
        if self.directory.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "resident count {} exceeds capacity {}",
                self.directory.len(),
                self.capacity
            )));
        }

        let window_count = self.audit_ring(self.window, Segment::Window)?;
        let probation_count = self.audit_ring(self.probation, Segment::Probation)?;
        let protected_count = self.audit_ring(self.protected, Segment::Protected)?;

        if window_count != self.window_size.floor() as usize {
            return Err(InvariantError::new(format!(
                "window count mismatch: {} linked != floor(window_size) {}",
                window_count,
                self.window_size.floor()
            )));
        }
        if protected_count != self.protected_size.floor() as usize {
            return Err(InvariantError::new(format!(
                "protected count mismatch: {} linked != floor(protected_size) {}",
                protected_count,
                self.protected_size.floor()
            )));
        }
        if window_count + probation_count + protected_count != self.directory.len() {
            return Err(InvariantError::new(format!(
                "segment counts {} + {} + {} != resident count {}",
                window_count,
                probation_count,
                protected_count,
                self.directory.len()
            )));
        }
        Ok(())
    }

    fn audit_ring(&self, ring: RingId, expected: Segment) -> Result<usize, InvariantError> {
        let mut count = 0;
        for (id, entry) in self.arena.iter_ring(ring) {
            if entry.segment != expected {
                return Err(InvariantError::new(format!(
                    "key {} tagged {:?} is linked into the {:?} ring",
                    entry.key, entry.segment, expected
                )));
            }
            if self.directory.get(&entry.key) != Some(&id) {
                return Err(InvariantError::new(format!(
                    "directory does not map key {} to its linked node",
                    entry.key
                )));
            }
            count += 1;
        }
        Ok(count)
    }

    /// Returns the statistics accumulated so far.
    pub fn stats(&self) -> &PolicyStats {
        &self.stats
    }

    /// Returns the fixed total capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the current number of residents.
    pub fn len(&self) -> usize {
        self.directory.len()
    }

    /// Returns `true` if no keys are resident.
    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    /// Returns `true` if `key` is resident. No reordering side effects.
    pub fn contains(&self, key: u64) -> bool {
        self.directory.contains_key(&key)
    }

    /// Returns the segment currently holding `key`, if resident.
    pub fn segment_of(&self, key: u64) -> Option<Segment> {
        self.directory
            .get(&key)
            .map(|&id| self.entry(id).segment)
    }

    /// Current window budget.
    pub fn max_window(&self) -> usize {
        self.max_window
    }

    /// Current protected budget.
    pub fn max_protected(&self) -> usize {
        self.max_protected
    }

    /// Fractional window population (whole residents plus carried residue).
    pub fn window_size(&self) -> f64 {
        self.window_size
    }

    /// Fractional protected population.
    pub fn protected_size(&self) -> f64 {
        self.protected_size
    }

    fn entry(&self, id: NodeId) -> &Entry {
        self.arena
            .get(id)
            .expect("directory points at a node that is not live")
    }

    fn set_segment(&mut self, id: NodeId, segment: Segment) {
        self.arena
            .get_mut(id)
            .expect("retagging a node that is not live")
            .segment = segment;
    }

    fn assert_budgets(&self) {
        assert!(
            self.max_window <= self.capacity,
            "window budget {} exceeds capacity {}",
            self.max_window,
            self.capacity
        );
        let max_main = self.capacity - self.max_window;
        assert!(
            self.max_protected <= max_main,
            "protected budget {} exceeds main budget {}",
            self.max_protected,
            max_main
        );
    }
}

impl KeyOnlyPolicy for AdaptiveWTinyLfuCore {
    fn record(&mut self, key: u64) {
        AdaptiveWTinyLfuCore::record(self, key);
    }

    fn stats(&self) -> &PolicyStats {
        AdaptiveWTinyLfuCore::stats(self)
    }

    fn finished(&mut self) {
        AdaptiveWTinyLfuCore::finished(self);
    }
}

impl std::fmt::Debug for AdaptiveWTinyLfuCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptiveWTinyLfuCore")
            .field("capacity", &self.capacity)
            .field("len", &self.directory.len())
            .field("max_window", &self.max_window)
            .field("max_protected", &self.max_protected)
            .field("window_size", &self.window_size)
            .field("protected_size", &self.protected_size)
            .finish_non_exhaustive()
    }
}
