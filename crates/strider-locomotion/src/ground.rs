//! Ground-following and slope handling.
//!
//! [`TerrainFollower`] turns a movement command into a 3-D linear velocity
//! for the torso rigid body: the commanded horizontal step rotated into the
//! body's heading frame, plus a rate-limited vertical term that keeps the
//! feet height-matched to the terrain below.

use nalgebra::Vector3;
use tracing::debug;

use strider_core::config::FollowerConfig;
use strider_physics::{BodyHandle, GroundProbe, PhysicsWorld};

/// One tick's movement request.
#[derive(Debug, Clone, Copy)]
pub struct DriveCommand {
    /// Commanded speed in m/s, assuming flat ground.
    pub speed: f64,
    /// Walk direction in radians, relative to the body's heading.
    pub angle: f64,
    /// `true` lets the current horizontal velocity bleed out instead of
    /// commanding a new one.
    pub decelerate: bool,
}

impl DriveCommand {
    /// Active movement at `speed` toward `angle`.
    #[must_use]
    pub const fn walk(speed: f64, angle: f64) -> Self {
        Self {
            speed,
            angle,
            decelerate: false,
        }
    }

    /// Passive deceleration; the body glides to a halt.
    #[must_use]
    pub const fn coast() -> Self {
        Self {
            speed: 0.0,
            angle: 0.0,
            decelerate: true,
        }
    }
}

/// Velocity controller that keeps a torso riding the terrain surface.
#[derive(Debug, Clone)]
pub struct TerrainFollower {
    config: FollowerConfig,
    probe: GroundProbe,
    slope_difficult: f64,
    slope_max: f64,
}

impl TerrainFollower {
    /// Build a follower from validated configuration.
    #[must_use]
    pub fn new(config: FollowerConfig) -> Self {
        let slope_difficult = config.slope_difficult();
        let slope_max = config.slope_max();
        Self {
            config,
            probe: GroundProbe::default(),
            slope_difficult,
            slope_max,
        }
    }

    /// The follower's configuration.
    #[must_use]
    pub const fn config(&self) -> &FollowerConfig {
        &self.config
    }

    /// Average height of the feet above the terrain under the body,
    /// optionally offset from the body's center.
    ///
    /// Positive means the feet ride above the surface. A probe miss counts
    /// as ground height zero, so the body keeps moving with no adjustment
    /// rather than faulting.
    #[must_use]
    pub fn ground_offset(
        &self,
        world: &dyn PhysicsWorld,
        body: BodyHandle,
        feet: &[Vector3<f64>],
        offset_x: f64,
        offset_y: f64,
    ) -> f64 {
        debug_assert!(!feet.is_empty(), "a grounded body needs feet");
        if feet.is_empty() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let average_z = feet.iter().map(|f| f.z).sum::<f64>() / feet.len() as f64;
        let pos = world.position(body);
        average_z - self.probe.height_at(world, pos.x + offset_x, pos.y + offset_y)
    }

    /// Vertical velocity that closes the given ground offset, rate-limited
    /// so one tick's height change stays inside the jitter-avoidance bound.
    ///
    /// The bound scales with the horizontal speed (a faster body is allowed
    /// more correction per tick) but never drops below the floor given by
    /// `min_correction_speed`, so a standing body can still settle.
    #[must_use]
    pub fn ground_z_velocity(&self, offset: f64, horizontal_speed: f64, dt: f64) -> f64 {
        if offset.abs() < self.config.settle_tolerance {
            return 0.0;
        }
        let span = horizontal_speed.max(self.config.min_correction_speed);
        let max_dz = self.config.vertical_rate_gain * dt * self.config.vertical_span_gain * span;
        -offset.clamp(-max_dz, max_dz) / dt
    }

    /// Set the body's linear velocity for this tick.
    ///
    /// Returns whether the body is actually moving: `false` when the slope
    /// ahead is too steep to climb or the body has come to rest.
    pub fn drive(
        &self,
        world: &mut dyn PhysicsWorld,
        body: BodyHandle,
        feet: &[Vector3<f64>],
        command: &DriveCommand,
        dt: f64,
    ) -> bool {
        let offset_now = self.ground_offset(world, body, feet, 0.0, 0.0);
        let velocity = world.linear_velocity(body);
        let z_velocity =
            self.ground_z_velocity(offset_now, velocity.xy().norm(), dt);

        let new_velocity = if command.decelerate {
            Vector3::new(velocity.x, velocity.y, z_velocity)
        } else {
            // Walk direction in the body frame, rotated by the heading.
            let step_x = -command.angle.cos() * command.speed;
            let step_y = command.angle.sin() * command.speed;
            let heading = world.heading_deg(body).to_radians();
            let (sin_h, cos_h) = heading.sin_cos();
            Vector3::new(
                cos_h * step_x - sin_h * step_y,
                sin_h * step_x + cos_h * step_y,
                z_velocity,
            )
        };

        // Probe a small step ahead along the candidate velocity and derive
        // the approach angle of the terrain.
        let eps_x = new_velocity.x * self.config.slope_probe_scale;
        let eps_y = new_velocity.y * self.config.slope_probe_scale;
        let z_diff = offset_now - self.ground_offset(world, body, feet, eps_x, eps_y);
        let eps_dist = eps_x.hypot(eps_y);
        let probe_dist = (eps_x * eps_x + eps_y * eps_y + z_diff * z_diff).sqrt();
        let vertical_angle = if probe_dist > 0.0 && probe_dist >= eps_dist {
            (eps_dist / probe_dist).clamp(-1.0, 1.0).acos().copysign(z_diff)
        } else {
            0.0
        };

        if vertical_angle > self.slope_difficult {
            if vertical_angle >= self.slope_max {
                debug!(
                    angle_deg = vertical_angle.to_degrees(),
                    "slope too steep, movement blocked"
                );
                world.set_linear_velocity(body, Vector3::new(0.0, 0.0, z_velocity));
                return false;
            }
            let normalized =
                (vertical_angle - self.slope_difficult) / (self.slope_max - self.slope_difficult);
            let mut mult = (1.0 - normalized).powf(self.config.slope_damping);
            if command.decelerate {
                mult = (1.0 - mult).powf(dt);
            }
            world.set_linear_velocity(
                body,
                Vector3::new(new_velocity.x * mult, new_velocity.y * mult, z_velocity),
            );
        } else {
            world.set_linear_velocity(body, new_velocity);
        }

        // Below negligible speed and spin, snap to rest: saves the physics
        // backend work and kills micro-jitter.
        let settled = world.linear_velocity(body);
        if settled.norm() < self.config.negligible_speed
            && world.angular_velocity(body).z.abs() < self.config.negligible_spin
        {
            world.set_linear_velocity(body, Vector3::new(0.0, 0.0, settled.z));
            return false;
        }

        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
