pub use crate::admission::{Admittor, AlwaysAdmit, NeverAdmit, TinyLfu};
pub use crate::builder::PolicyBuilder;
pub use crate::climb::{Adaptation, ClimberType, HillClimber};
pub use crate::ds::{NodeId, RingArena, RingId};
pub use crate::policy::{AdaptiveWTinyLfuCore, KeyOnlyPolicy, Segment};
pub use crate::stats::PolicyStats;
