pub mod ring_arena;

pub use ring_arena::{NodeId, RingArena, RingId};
