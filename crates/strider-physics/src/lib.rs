//! Physics abstraction for the Strider locomotion stack.
//!
//! The locomotion controllers never talk to a rigid-body engine directly.
//! They see [`PhysicsWorld`]: positions, yaw, linear/angular velocities and a
//! terrain ray test. Any engine can sit behind the trait; this crate ships
//! [`KinematicWorld`], a deterministic integrator used by tests and demos.
//!
//! ```text
//! controllers ──► PhysicsWorld (trait) ──► engine backend
//!                      │
//!                      └─ GroundProbe (vertical terrain ray)
//! ```

pub mod body;
pub mod context;
pub mod kinematic;
pub mod probe;
pub mod terrain;

pub use body::{BodyDesc, BodyHandle, PhysicsStepper, PhysicsWorld, RayHit};
pub use context::SimulationContext;
pub use kinematic::KinematicWorld;
pub use probe::GroundProbe;
pub use terrain::Heightfield;
