//! Bevy ECS integration.
//!
//! [`StriderLocomotionPlugin`] wires the per-tick contract into an app
//! schedule: every registered character gets exactly one command applied in
//! [`StriderSet::Decide`], then the physics backend integrates in
//! [`StriderSet::Simulate`]. Commands are consumed each tick; a character
//! without a fresh command stands still, which keeps gait and velocity in
//! lock-step with the simulation clock.
//!
//! The physics backend is injected as [`PhysicsResource`] by the app builder
//! before the first update.

use std::collections::HashMap;

use bevy::prelude::*;
use tracing::warn;

use strider_core::{StriderCorePlugin, StriderSet};
use strider_physics::{PhysicsStepper, SimulationContext};

use crate::biped::Biped;
use crate::input::{apply_input, InputCommand};

/// Plugin adding the locomotion tick and physics step systems.
pub struct StriderLocomotionPlugin;

impl Plugin for StriderLocomotionPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<StriderCorePlugin>() {
            app.add_plugins(StriderCorePlugin);
        }
        app.init_resource::<TickDriver>()
            .init_resource::<CharacterRegistry>()
            .add_systems(
                Update,
                (
                    locomotion_tick.in_set(StriderSet::Decide),
                    physics_step.in_set(StriderSet::Simulate),
                ),
            );
    }
}

/// The physics backend driving all characters.
#[derive(Resource)]
pub struct PhysicsResource(pub Box<dyn PhysicsStepper>);

/// Fixed timestep and tick counter for the simulation schedule.
#[derive(Resource, Debug, Clone, Copy)]
pub struct TickDriver {
    /// Fixed timestep in seconds.
    pub dt: f64,
    /// Monotonic tick counter, bumped after each physics step.
    pub tick: u64,
}

impl Default for TickDriver {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            tick: 0,
        }
    }
}

/// Identifier of a registered character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharacterId(u32);

struct CharacterEntry {
    biped: Biped,
    command: InputCommand,
}

/// All characters driven by the locomotion systems.
#[derive(Resource, Default)]
pub struct CharacterRegistry {
    entries: HashMap<CharacterId, CharacterEntry>,
    next_id: u32,
}

impl CharacterRegistry {
    /// Register a character.
    pub fn insert(&mut self, biped: Biped) -> CharacterId {
        let id = CharacterId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            CharacterEntry {
                biped,
                command: InputCommand::default(),
            },
        );
        id
    }

    /// Remove a character, returning its controller.
    pub fn remove(&mut self, id: CharacterId) -> Option<Biped> {
        self.entries.remove(&id).map(|entry| entry.biped)
    }

    /// Queue the command applied on the next tick. Unset commands default to
    /// standing still.
    pub fn set_command(&mut self, id: CharacterId, command: InputCommand) {
        match self.entries.get_mut(&id) {
            Some(entry) => entry.command = command,
            None => warn!(?id, "command for unknown character dropped"),
        }
    }

    /// Read a character's controller.
    #[must_use]
    pub fn get(&self, id: CharacterId) -> Option<&Biped> {
        self.entries.get(&id).map(|entry| &entry.biped)
    }

    /// Mutable access to a character's controller.
    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Biped> {
        self.entries.get_mut(&id).map(|entry| &mut entry.biped)
    }

    /// Number of registered characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no characters are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Apply each character's queued command exactly once.
#[allow(clippy::needless_pass_by_value)]
fn locomotion_tick(
    mut registry: ResMut<CharacterRegistry>,
    physics: Option<ResMut<PhysicsResource>>,
    driver: Res<TickDriver>,
) {
    let Some(mut physics) = physics else {
        return;
    };
    for entry in registry.entries.values_mut() {
        let command = std::mem::take(&mut entry.command);
        let mut ctx = SimulationContext::new(driver.dt, driver.tick, physics.0.as_mut());
        apply_input(&mut entry.biped, &mut ctx, &command);
    }
}

/// Integrate the backend and advance the tick counter.
fn physics_step(physics: Option<ResMut<PhysicsResource>>, mut driver: ResMut<TickDriver>) {
    let Some(mut physics) = physics else {
        return;
    };
    physics.0.step(driver.dt);
    driver.tick += 1;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
