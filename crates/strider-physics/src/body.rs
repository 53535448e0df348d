//! Engine-agnostic rigid-body surface.
//!
//! [`PhysicsWorld`] is the narrow contract between the locomotion core and
//! whatever rigid-body engine owns the bodies. The core writes velocities and
//! reads back transforms one tick later; it never steps the integration
//! itself.

use nalgebra::Vector3;

/// Opaque handle to a rigid body owned by a physics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) u32);

impl BodyHandle {
    /// Raw index, for diagnostics.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Result of a terrain ray test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space hit point on the terrain surface.
    pub point: Vector3<f64>,
}

/// Spawn parameters for a body in a backend that supports spawning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    /// Initial world position.
    pub position: Vector3<f64>,
    /// Initial yaw in degrees.
    pub heading_deg: f64,
    /// Per-step linear damping exponent base, `v *= (1 - d)^dt`.
    pub linear_damping: f64,
    /// Per-step angular damping exponent base.
    pub angular_damping: f64,
}

impl Default for BodyDesc {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            heading_deg: 0.0,
            linear_damping: 0.5,
            angular_damping: 0.9,
        }
    }
}

impl BodyDesc {
    /// Place the body at a world position.
    #[must_use]
    pub fn at(position: Vector3<f64>) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Set the initial yaw in degrees.
    #[must_use]
    pub const fn with_heading(mut self, heading_deg: f64) -> Self {
        self.heading_deg = heading_deg;
        self
    }
}

/// The rigid-body surface the locomotion core consumes.
///
/// Velocities written here take effect when the backend next integrates;
/// transforms read here are the result of the previous integration. The
/// controllers are written for that one-tick lag.
pub trait PhysicsWorld: Send + Sync {
    /// World position of a body.
    fn position(&self, body: BodyHandle) -> Vector3<f64>;

    /// Yaw of a body in degrees, wrapped to `[-180, 180)`.
    fn heading_deg(&self, body: BodyHandle) -> f64;

    /// Current linear velocity in m/s.
    fn linear_velocity(&self, body: BodyHandle) -> Vector3<f64>;

    /// Command a linear velocity in m/s.
    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vector3<f64>);

    /// Current angular velocity in rad/s.
    fn angular_velocity(&self, body: BodyHandle) -> Vector3<f64>;

    /// Command an angular velocity in rad/s.
    fn set_angular_velocity(&mut self, body: BodyHandle, velocity: Vector3<f64>);

    /// Cast a segment against the terrain collision surface. Returns the
    /// first hit, or `None` when the segment misses the terrain entirely.
    fn ray_test(&self, from: Vector3<f64>, to: Vector3<f64>) -> Option<RayHit>;
}

/// A backend that also owns its integration step.
///
/// The locomotion core never steps physics; the app glue (plugin or demo
/// loop) does, through this extension trait.
pub trait PhysicsStepper: PhysicsWorld {
    /// Integrate one fixed step of `dt` seconds.
    fn step(&mut self, dt: f64);
}
