//! Core types for the Strider locomotion stack: errors, configuration,
//! the fixed-step clock and angle math shared by every other crate.
//!
//! Also defines the [`StriderSet`] schedule sets that order the per-tick
//! pipeline: read world state, decide and apply velocities, then let the
//! physics backend integrate.

use bevy::prelude::*;

pub mod config;
pub mod error;
pub mod math;
pub mod time;

pub use config::{BipedConfig, FollowerConfig};
pub use error::{ChainError, ConfigError, StriderError};

/// System sets ordering the locomotion pipeline within `Update`.
///
/// Controllers run in [`Decide`](StriderSet::Decide); the physics backend
/// integrates in [`Simulate`](StriderSet::Simulate). Anything reading back
/// post-step state for the *next* tick belongs in [`Sense`](StriderSet::Sense).
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StriderSet {
    /// Read back rigid-body state from the previous step.
    Sense,
    /// Run controllers: compute and apply body velocities, solve IK.
    Decide,
    /// Step the physics backend (external integration).
    Simulate,
}

/// Plugin that configures the [`StriderSet`] ordering.
pub struct StriderCorePlugin;

impl Plugin for StriderCorePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (StriderSet::Sense, StriderSet::Decide, StriderSet::Simulate).chain(),
        );
    }
}
