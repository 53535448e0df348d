//! Inverse kinematics for Strider limbs.
//!
//! A limb is an [`IkChain`]: an ordered run of joints from a moving root
//! (the pelvis or chest, attached to a rigid body) out to an end effector
//! (foot or hand), each joint carrying a rotation constraint. The chain is
//! built once through [`ChainBuilder`] and locked by `finalize()`; after
//! that only the root pose, the target and the joint rotations move.
//!
//! ```text
//! ChainBuilder ──► IkChain ──► CcdSolver::solve() each tick
//! ```
//!
//! The solver is incremental: it runs a few damped cyclic-coordinate-descent
//! passes per tick, seeded by the previous tick's pose. Targets move
//! continuously, so the warm start makes a handful of passes enough.

pub mod chain;
pub mod solver;

pub use chain::{ChainBuilder, IkChain, Joint, JointConstraint};
pub use solver::{CcdSolver, SolveConfig, SolveOutcome};
