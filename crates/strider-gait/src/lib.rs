//! Walk-cycle timing for bipeds.
//!
//! The cycle is keyed on *distance walked*, not time: a leg is due for a
//! step every `step_distance` meters of accumulated travel, with the two
//! legs offset by half a cycle. Faster walking therefore steps faster with
//! no extra bookkeeping, and standing still freezes the cycle.

pub mod walk_cycle;

pub use walk_cycle::{LegSide, LegState, WalkCycle};
