#![no_main]

use climbkit::admission::TinyLfu;
use climbkit::climb::{Adaptation, HillClimber};
use climbkit::policy::adaptive_wtlfu::AdaptiveWTinyLfuCore;
use climbkit::policy::Segment;
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary traces and adaptation pulses against the policy core.
//
// The first bytes pick capacity and the segment split; the rest drive
// record() with a small key universe while a byte-fed climber emits
// increase/decrease pulses once the cache is full. Invariants are audited
// continuously and by the final recount.

/// Climber that turns fuzz bytes into adaptation directives.
///
/// Mirrors the contract real climbers honor: it only adapts once the cache
/// is full, and it never asks to shrink by more than the window holds.
struct ByteClimber {
    bytes: Vec<u8>,
    pos: usize,
}

impl HillClimber for ByteClimber {
    fn on_miss(&mut self, _key: u64, _is_full: bool) {}

    fn on_hit(&mut self, _key: u64, _segment: Segment, _is_full: bool) {}

    fn adapt(
        &mut self,
        window_size: f64,
        _probation_size: f64,
        _protected_size: f64,
        is_full: bool,
    ) -> Adaptation {
        if !is_full || self.pos >= self.bytes.len() {
            return Adaptation::Hold;
        }
        let byte = self.bytes[self.pos];
        self.pos += 1;

        let amount = f64::from(byte % 16) / 4.0;
        match byte % 3 {
            0 => Adaptation::IncreaseWindow { amount },
            1 => Adaptation::DecreaseWindow {
                amount: amount.min(window_size),
            },
            _ => Adaptation::Hold,
        }
    }
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let capacity = 1 + usize::from(data[0]) % 32;
    let percent_main = f64::from(1 + data[1] % 100) / 100.0;
    let percent_main_protected = f64::from(data[2] % 101) / 100.0;

    let climber = ByteClimber {
        bytes: data[3..].to_vec(),
        pos: 0,
    };
    let mut policy = AdaptiveWTinyLfuCore::with_parts(
        capacity,
        percent_main,
        percent_main_protected,
        Box::new(TinyLfu::new(capacity)),
        Box::new(climber),
        "fuzz",
    )
    .expect("derived parameters are always in range");

    for (step, &byte) in data[3..].iter().enumerate() {
        let key = u64::from(byte) % (capacity as u64 * 2 + 1);
        policy.record(key);

        assert!(policy.len() <= capacity);
        if step % 7 == 0 {
            if let Err(err) = policy.check_invariants() {
                panic!("invariant violated at step {step}: {err}");
            }
        }
    }

    let stats_hits = policy.stats().hits();
    let stats_misses = policy.stats().misses();
    assert_eq!(stats_hits + stats_misses, policy.stats().operations());
    assert!(stats_misses >= policy.stats().evictions());

    policy.finished();
});
