//! Deterministic kinematic backend.
//!
//! Stands in for the external rigid-body engine in tests and headless demos.
//! Bodies integrate commanded velocities directly and apply the engine-style
//! per-step damping `v *= (1 - damping)^dt`; there is no collision response
//! beyond the terrain ray test, which is exactly the surface the locomotion
//! core relies on.

use nalgebra::Vector3;

use strider_core::math::wrap_degrees;

use crate::body::{BodyDesc, BodyHandle, PhysicsStepper, PhysicsWorld, RayHit};
use crate::terrain::Heightfield;

#[derive(Debug, Clone)]
struct BodyState {
    position: Vector3<f64>,
    heading_deg: f64,
    linear_velocity: Vector3<f64>,
    angular_velocity: Vector3<f64>,
    linear_damping: f64,
    angular_damping: f64,
}

/// A minimal world: a terrain heightfield plus velocity-integrated bodies.
#[derive(Debug, Clone)]
pub struct KinematicWorld {
    terrain: Heightfield,
    bodies: Vec<BodyState>,
}

impl KinematicWorld {
    /// Create a world over the given terrain.
    #[must_use]
    pub fn new(terrain: Heightfield) -> Self {
        Self {
            terrain,
            bodies: Vec::new(),
        }
    }

    /// Spawn a body.
    pub fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(u32::try_from(self.bodies.len()).expect("body count fits u32"));
        self.bodies.push(BodyState {
            position: desc.position,
            heading_deg: wrap_degrees(desc.heading_deg),
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            linear_damping: desc.linear_damping,
            angular_damping: desc.angular_damping,
        });
        handle
    }

    /// The terrain surface.
    #[must_use]
    pub fn terrain(&self) -> &Heightfield {
        &self.terrain
    }

    /// Integrate one fixed step: positions from velocities, yaw from the
    /// angular z component, then damping.
    pub fn step(&mut self, dt: f64) {
        for body in &mut self.bodies {
            body.position += body.linear_velocity * dt;
            body.heading_deg =
                wrap_degrees(body.heading_deg + body.angular_velocity.z.to_degrees() * dt);

            let lin_keep = (1.0 - body.linear_damping).max(0.0).powf(dt);
            let ang_keep = (1.0 - body.angular_damping).max(0.0).powf(dt);
            body.linear_velocity *= lin_keep;
            body.angular_velocity *= ang_keep;
        }
    }

    fn body(&self, handle: BodyHandle) -> &BodyState {
        &self.bodies[handle.0 as usize]
    }

    fn body_mut(&mut self, handle: BodyHandle) -> &mut BodyState {
        &mut self.bodies[handle.0 as usize]
    }
}

impl PhysicsWorld for KinematicWorld {
    fn position(&self, body: BodyHandle) -> Vector3<f64> {
        self.body(body).position
    }

    fn heading_deg(&self, body: BodyHandle) -> f64 {
        self.body(body).heading_deg
    }

    fn linear_velocity(&self, body: BodyHandle) -> Vector3<f64> {
        self.body(body).linear_velocity
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vector3<f64>) {
        self.body_mut(body).linear_velocity = velocity;
    }

    fn angular_velocity(&self, body: BodyHandle) -> Vector3<f64> {
        self.body(body).angular_velocity
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, velocity: Vector3<f64>) {
        self.body_mut(body).angular_velocity = velocity;
    }

    fn ray_test(&self, from: Vector3<f64>, to: Vector3<f64>) -> Option<RayHit> {
        self.terrain.raycast(from, to).map(|point| RayHit { point })
    }
}

impl PhysicsStepper for KinematicWorld {
    fn step(&mut self, dt: f64) {
        Self::step(self, dt);
    }
}
