//! Biped locomotion assembly.
//!
//! Composes the lower-level crates into a walking character:
//!
//! ```text
//!                 ┌──────────────┐
//!   InputCommand ─►    Biped     │── velocities ──► PhysicsWorld
//!                 │  (assembly)  │── joint poses ──► scene graph
//!                 └──┬───┬───┬───┘
//!                    │   │   └─ WalkCycle (strider-gait)
//!                    │   └───── IkChain × legs + arm (strider-ik)
//!                    └───────── LocomotionStrategy / TerrainFollower
//! ```
//!
//! The controller is tick-driven and single-threaded: exactly one of
//! [`Biped::walk_in_dir`] or [`Biped::stand_still`] per simulation tick,
//! before the physics backend integrates. All state it reads from the body
//! is one tick stale relative to the velocities it writes; that lag is part
//! of the design, not an accident.

pub mod arm;
pub mod biped;
pub mod ground;
pub mod input;
pub mod plugin;
pub mod strategy;

pub use arm::ArmController;
pub use biped::{Biped, BodyProportions};
pub use ground::{DriveCommand, TerrainFollower};
pub use input::{apply_input, InputCommand, MoveDirection};
pub use plugin::{CharacterId, CharacterRegistry, PhysicsResource, StriderLocomotionPlugin, TickDriver};
pub use strategy::{FootPlanted, LocomotionStrategy, MotorDriven};
