//! Per-tick context threaded through the controller stack.

use crate::body::PhysicsWorld;

/// Everything a controller needs for one simulation tick.
///
/// Built fresh each tick by the driving loop. The timestep and tick index
/// are explicit so nothing in the stack reads ambient time; the tick index
/// also backs the exactly-once-per-tick debug assertion in the controllers.
pub struct SimulationContext<'w> {
    /// Fixed timestep in seconds.
    pub dt: f64,
    /// Monotonic tick counter.
    pub tick: u64,
    /// The physics backend owning the rigid bodies and terrain.
    pub world: &'w mut dyn PhysicsWorld,
}

impl<'w> SimulationContext<'w> {
    /// Create a context for one tick.
    pub fn new(dt: f64, tick: u64, world: &'w mut dyn PhysicsWorld) -> Self {
        Self { dt, tick, world }
    }
}
