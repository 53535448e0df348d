//! Shared scaffolding for the Strider demos and integration tests.

use nalgebra::Vector3;

use strider_core::config::BipedConfig;
use strider_locomotion::{Biped, BodyProportions};
use strider_physics::{BodyDesc, GroundProbe, Heightfield, KinematicWorld, SimulationContext};

/// A biped standing on a terrain, ready to tick.
pub struct Scene {
    /// The physics backend.
    pub world: KinematicWorld,
    /// The character.
    pub biped: Biped,
    /// Fixed timestep in seconds.
    pub dt: f64,
    tick: u64,
}

impl Scene {
    /// Spawn a biped at `(x, y)`, placed on the terrain surface via the
    /// ground probe, facing `heading_deg`.
    ///
    /// # Panics
    ///
    /// Panics when the configuration is invalid.
    #[must_use]
    pub fn spawn(terrain: Heightfield, config: BipedConfig, x: f64, y: f64, heading_deg: f64) -> Self {
        let mut world = KinematicWorld::new(terrain);
        let probe = GroundProbe::default();
        let ground = probe.height_at(&world, x, y);
        let stance = BodyProportions::from_height(config.height).stance_height();
        let body = world.add_body(
            BodyDesc::at(Vector3::new(x, y, ground + stance)).with_heading(heading_deg),
        );
        let biped = Biped::new(body, heading_deg, config).expect("valid biped config");
        Self {
            world,
            biped,
            dt: 1.0 / 60.0,
            tick: 0,
        }
    }

    /// One simulation tick: drive the biped, then integrate.
    pub fn tick_with(&mut self, drive: impl FnOnce(&mut Biped, &mut SimulationContext<'_>)) {
        let mut ctx = SimulationContext::new(self.dt, self.tick, &mut self.world);
        drive(&mut self.biped, &mut ctx);
        self.world.step(self.dt);
        self.tick += 1;
    }

    /// Walk toward `angle` for one tick.
    pub fn walk(&mut self, angle: f64) {
        self.tick_with(|biped, ctx| {
            biped.walk_in_dir(ctx, angle);
        });
    }

    /// Stand for one tick.
    pub fn stand(&mut self) {
        self.tick_with(|biped, ctx| {
            biped.stand_still(ctx);
        });
    }

    /// Body world position.
    #[must_use]
    pub fn position(&self) -> Vector3<f64> {
        use strider_physics::PhysicsWorld;
        self.world.position(self.biped.body())
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.tick
    }
}
