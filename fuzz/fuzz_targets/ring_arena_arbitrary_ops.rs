#![no_main]

use climbkit::ds::{NodeId, RingArena};
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on RingArena
//
// Tests random sequences of push_tail, push_head, move_to_tail, unlink,
// link_tail, link_head, remove, get operations across three rings sharing
// one arena, the same shape the policy core uses.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut arena: RingArena<u64> = RingArena::new();
    let rings = [arena.new_ring(), arena.new_ring(), arena.new_ring()];
    let mut ids: Vec<NodeId> = Vec::new();

    let mut idx = 0;
    while idx + 2 < data.len() {
        let op = data[idx] % 8;
        let ring = rings[usize::from(data[idx + 1]) % rings.len()];
        let value = u64::from(data[idx + 2]);

        match op {
            0 => {
                let id = arena.push_tail(ring, value);
                ids.push(id);
                assert_eq!(arena.tail(ring), Some(id));
                assert_eq!(arena.get(id), Some(&value));
            }
            1 => {
                let id = arena.push_head(ring, value);
                ids.push(id);
                assert_eq!(arena.head(ring), Some(id));
            }
            2 => {
                if !ids.is_empty() {
                    let id = ids[value as usize % ids.len()];
                    if arena.move_to_tail(ring, id) {
                        assert_eq!(arena.tail(ring), Some(id));
                    }
                }
            }
            3 => {
                if !ids.is_empty() {
                    let id = ids[value as usize % ids.len()];
                    let was_linked = arena.is_linked(id);
                    assert_eq!(arena.unlink(id), was_linked);
                    assert!(!arena.is_linked(id));
                }
            }
            4 => {
                if !ids.is_empty() {
                    let id = ids[value as usize % ids.len()];
                    if arena.contains(id) && !arena.is_linked(id) {
                        arena.link_tail(ring, id);
                        assert_eq!(arena.tail(ring), Some(id));
                    }
                }
            }
            5 => {
                if !ids.is_empty() {
                    let id = ids[value as usize % ids.len()];
                    if arena.contains(id) && !arena.is_linked(id) {
                        arena.link_head(ring, id);
                        assert_eq!(arena.head(ring), Some(id));
                    }
                }
            }
            6 => {
                if !ids.is_empty() {
                    let id = ids[value as usize % ids.len()];
                    let old_len = arena.len();
                    if arena.remove(id).is_some() {
                        assert_eq!(arena.len(), old_len - 1);
                        assert!(!arena.contains(id));
                    }
                }
            }
            7 => {
                // head/tail agree with emptiness
                if arena.is_ring_empty(ring) {
                    assert_eq!(arena.head(ring), None);
                    assert_eq!(arena.tail(ring), None);
                } else {
                    assert!(arena.head(ring).is_some());
                    assert!(arena.tail(ring).is_some());
                }
            }
            _ => unreachable!(),
        }

        let linked: usize = rings.iter().map(|&r| arena.ring_len(r)).sum();
        assert!(linked <= arena.len());

        #[cfg(debug_assertions)]
        arena.debug_validate_invariants();

        idx += 3;
    }
});
