//! Interchangeable locomotion strategies.
//!
//! One walking-character contract, multiple ways of producing motion. The
//! biped picks a strategy at construction; everything above the strategy
//! (gait, IK, heading control) is shared.

use nalgebra::Vector3;

use strider_physics::{BodyHandle, PhysicsWorld};

use crate::ground::{DriveCommand, TerrainFollower};

/// Turns a per-tick movement command into body velocities.
pub trait LocomotionStrategy: Send + Sync {
    /// Apply one tick's command. `feet` are the current end-effector world
    /// positions. Returns whether the body actually moved.
    fn drive(
        &mut self,
        world: &mut dyn PhysicsWorld,
        body: BodyHandle,
        feet: &[Vector3<f64>],
        command: &DriveCommand,
        dt: f64,
    ) -> bool;

    /// Human-readable strategy name.
    fn name(&self) -> &'static str;
}

/// The production strategy: terrain-following velocity control with planted
/// IK feet.
#[derive(Debug, Clone)]
pub struct FootPlanted {
    follower: TerrainFollower,
}

impl FootPlanted {
    /// Wrap a configured terrain follower.
    #[must_use]
    pub const fn new(follower: TerrainFollower) -> Self {
        Self { follower }
    }

    /// The underlying follower.
    #[must_use]
    pub const fn follower(&self) -> &TerrainFollower {
        &self.follower
    }
}

impl LocomotionStrategy for FootPlanted {
    fn drive(
        &mut self,
        world: &mut dyn PhysicsWorld,
        body: BodyHandle,
        feet: &[Vector3<f64>],
        command: &DriveCommand,
        dt: f64,
    ) -> bool {
        self.follower.drive(world, body, feet, command, dt)
    }

    fn name(&self) -> &'static str {
        "foot-planted"
    }
}

/// Direct velocity drive with no terrain adaptation.
///
/// The body's vertical motion is left entirely to the physics backend; the
/// strategy only writes the horizontal component. Kept as the simplest
/// interchangeable baseline.
#[derive(Debug, Clone)]
pub struct MotorDriven {
    negligible_speed: f64,
}

impl MotorDriven {
    /// Create with the speed below which the body snaps to rest.
    #[must_use]
    pub const fn new(negligible_speed: f64) -> Self {
        Self { negligible_speed }
    }
}

impl Default for MotorDriven {
    fn default() -> Self {
        Self::new(0.2)
    }
}

impl LocomotionStrategy for MotorDriven {
    fn drive(
        &mut self,
        world: &mut dyn PhysicsWorld,
        body: BodyHandle,
        _feet: &[Vector3<f64>],
        command: &DriveCommand,
        _dt: f64,
    ) -> bool {
        let velocity = world.linear_velocity(body);
        if !command.decelerate {
            let step_x = -command.angle.cos() * command.speed;
            let step_y = command.angle.sin() * command.speed;
            let heading = world.heading_deg(body).to_radians();
            let (sin_h, cos_h) = heading.sin_cos();
            world.set_linear_velocity(
                body,
                Vector3::new(
                    cos_h * step_x - sin_h * step_y,
                    sin_h * step_x + cos_h * step_y,
                    velocity.z,
                ),
            );
        }

        let settled = world.linear_velocity(body);
        if settled.xy().norm() < self.negligible_speed {
            world.set_linear_velocity(body, Vector3::new(0.0, 0.0, settled.z));
            return false;
        }
        true
    }

    fn name(&self) -> &'static str {
        "motor-driven"
    }
}
