//! Vertical terrain probe.

use nalgebra::Vector3;

use crate::body::PhysicsWorld;

/// Casts a vertical ray against the terrain surface and reports the height.
///
/// Used to place spawns, to compute the per-tick ground-following velocity,
/// and to project where a stepping foot should land.
#[derive(Debug, Clone, Copy)]
pub struct GroundProbe {
    /// Half-length of the probe segment above and below the query point.
    pub reach: f64,
}

impl Default for GroundProbe {
    fn default() -> Self {
        Self { reach: 1000.0 }
    }
}

impl GroundProbe {
    /// Probe with a custom reach.
    #[must_use]
    pub const fn new(reach: f64) -> Self {
        Self { reach }
    }

    /// Terrain height at `(x, y)`, or `None` when the ray misses.
    #[must_use]
    pub fn try_height_at(&self, world: &dyn PhysicsWorld, x: f64, y: f64) -> Option<f64> {
        world
            .ray_test(
                Vector3::new(x, y, self.reach),
                Vector3::new(x, y, -self.reach),
            )
            .map(|hit| hit.point.z)
    }

    /// Terrain height at `(x, y)`; a miss is `0.0`.
    ///
    /// Callers treat the sentinel as "no adjustment", not as an error — a
    /// character over a hole floats rather than faulting.
    #[must_use]
    pub fn height_at(&self, world: &dyn PhysicsWorld, x: f64, y: f64) -> f64 {
        self.try_height_at(world, x, y).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyDesc;
    use crate::kinematic::KinematicWorld;
    use crate::terrain::Heightfield;
    use approx::assert_relative_eq;

    #[test]
    fn probe_reads_terrain_height() {
        let world = KinematicWorld::new(Heightfield::flat(2.0));
        let probe = GroundProbe::default();
        assert_relative_eq!(probe.height_at(&world, 5.0, -3.0), 2.0);
        assert_eq!(probe.try_height_at(&world, 5.0, -3.0), Some(2.0));
    }

    #[test]
    fn probe_miss_is_zero_sentinel() {
        // Terrain far below a short probe: the ray never reaches it.
        let world = KinematicWorld::new(Heightfield::flat(-500.0));
        let probe = GroundProbe::new(10.0);
        assert_eq!(probe.try_height_at(&world, 0.0, 0.0), None);
        assert_relative_eq!(probe.height_at(&world, 0.0, 0.0), 0.0);
    }

    #[test]
    fn probe_ignores_bodies() {
        let mut world = KinematicWorld::new(Heightfield::flat(1.0));
        world.add_body(BodyDesc::at(Vector3::new(0.0, 0.0, 5.0)));
        let probe = GroundProbe::default();
        assert_relative_eq!(probe.height_at(&world, 0.0, 0.0), 1.0);
    }
}
