use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_slope_difficult_deg() -> f64 {
    30.0
}
const fn default_slope_max_deg() -> f64 {
    45.0
}
const fn default_slope_damping() -> f64 {
    0.6
}
const fn default_negligible_speed() -> f64 {
    0.2
}
const fn default_negligible_spin() -> f64 {
    0.1
}
const fn default_vertical_gain() -> f64 {
    4.0
}
const fn default_slope_probe_scale() -> f64 {
    0.01
}
const fn default_settle_tolerance() -> f64 {
    0.002
}
const fn default_height() -> f64 {
    1.7
}
const fn default_walk_speed() -> f64 {
    1.0
}
const fn default_max_walk_speed() -> f64 {
    9.0
}
const fn default_speed_step() -> f64 {
    0.25
}
const fn default_turn_rate_deg() -> f64 {
    450.0
}
const fn default_heading_gain() -> f64 {
    8.0
}
const fn default_step_distance() -> f64 {
    0.75
}
const fn default_step_gain() -> f64 {
    0.1
}
const fn default_foot_spacing() -> f64 {
    0.15
}
const fn default_leg_speed_factor() -> f64 {
    3.0
}

// ---------------------------------------------------------------------------
// FollowerConfig
// ---------------------------------------------------------------------------

/// Terrain-following and slope-handling constants.
///
/// The vertical correction applied per tick is rate-limited to
/// `vertical_rate_gain * dt * vertical_span_gain * max(|v_xy|, min_correction_speed)`.
/// The gains are tunable because the safe bound depends on the backend's
/// timestep; too large a budget produces jitter on sharp terrain creases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
pub struct FollowerConfig {
    /// Slope angle in degrees at which movement starts slowing down.
    #[serde(default = "default_slope_difficult_deg")]
    pub slope_difficult_deg: f64,

    /// Slope angle in degrees that is too steep to climb.
    #[serde(default = "default_slope_max_deg")]
    pub slope_max_deg: f64,

    /// Exponent of the damping multiplier between the two slope thresholds.
    #[serde(default = "default_slope_damping")]
    pub slope_damping: f64,

    /// Speed in m/s below which the body is snapped to rest.
    #[serde(default = "default_negligible_speed")]
    pub negligible_speed: f64,

    /// Yaw rate in rad/s below which the body counts as not turning.
    #[serde(default = "default_negligible_spin")]
    pub negligible_spin: f64,

    /// Rate term of the vertical correction budget.
    #[serde(default = "default_vertical_gain")]
    pub vertical_rate_gain: f64,

    /// Span term of the vertical correction budget.
    #[serde(default = "default_vertical_gain")]
    pub vertical_span_gain: f64,

    /// Floor on the speed used for the correction budget, so a stationary
    /// body can still settle onto the terrain.
    #[serde(default = "default_negligible_speed")]
    pub min_correction_speed: f64,

    /// Lookahead used for the slope probe, in seconds of travel.
    #[serde(default = "default_slope_probe_scale")]
    pub slope_probe_scale: f64,

    /// Ground offsets smaller than this (meters) get no vertical
    /// correction. Soaks up solver residue so a standing body truly rests.
    #[serde(default = "default_settle_tolerance")]
    pub settle_tolerance: f64,
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            slope_difficult_deg: default_slope_difficult_deg(),
            slope_max_deg: default_slope_max_deg(),
            slope_damping: default_slope_damping(),
            negligible_speed: default_negligible_speed(),
            negligible_spin: default_negligible_spin(),
            vertical_rate_gain: default_vertical_gain(),
            vertical_span_gain: default_vertical_gain(),
            min_correction_speed: default_negligible_speed(),
            slope_probe_scale: default_slope_probe_scale(),
            settle_tolerance: default_settle_tolerance(),
        }
    }
}

impl FollowerConfig {
    /// Validate configuration. Returns `Err` on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slope_difficult_deg <= 0.0 || self.slope_difficult_deg >= self.slope_max_deg {
            return Err(ConfigError::InvalidValue {
                field: "slope_difficult_deg",
                message: "must be positive and below slope_max_deg",
            });
        }
        if self.slope_max_deg > 90.0 {
            return Err(ConfigError::InvalidValue {
                field: "slope_max_deg",
                message: "must not exceed 90 degrees",
            });
        }
        if self.slope_damping < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "slope_damping",
                message: "must be non-negative",
            });
        }
        if self.negligible_speed < 0.0 || self.negligible_spin < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "negligible_speed",
                message: "rest thresholds must be non-negative",
            });
        }
        if self.vertical_rate_gain <= 0.0 || self.vertical_span_gain <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "vertical_rate_gain",
                message: "correction gains must be positive",
            });
        }
        if self.slope_probe_scale <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "slope_probe_scale",
                message: "must be positive",
            });
        }
        if self.settle_tolerance < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "settle_tolerance",
                message: "must be non-negative",
            });
        }
        Ok(())
    }

    /// `slope_difficult` in radians.
    #[must_use]
    pub fn slope_difficult(&self) -> f64 {
        self.slope_difficult_deg.to_radians()
    }

    /// `slope_max` in radians.
    #[must_use]
    pub fn slope_max(&self) -> f64 {
        self.slope_max_deg.to_radians()
    }
}

// ---------------------------------------------------------------------------
// BipedConfig
// ---------------------------------------------------------------------------

/// Configuration for a walking biped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
pub struct BipedConfig {
    /// Character height in meters. Body proportions are derived from it.
    #[serde(default = "default_height")]
    pub height: f64,

    /// Initial walk speed in m/s.
    #[serde(default = "default_walk_speed")]
    pub walk_speed: f64,

    /// Upper clamp for the walk speed in m/s.
    #[serde(default = "default_max_walk_speed")]
    pub max_walk_speed: f64,

    /// Fixed walk-speed increment per `speed_up`/`slow_down` call, m/s.
    #[serde(default = "default_speed_step")]
    pub speed_step: f64,

    /// Rate at which the desired heading turns, degrees per second.
    #[serde(default = "default_turn_rate_deg")]
    pub turn_rate_deg: f64,

    /// Proportional gain of the heading controller, 1/s.
    #[serde(default = "default_heading_gain")]
    pub heading_gain: f64,

    /// Distance walked between steps of the same leg, meters.
    #[serde(default = "default_step_distance")]
    pub step_distance: f64,

    /// Forward offset of the planned foot target per m/s of walk speed.
    #[serde(default = "default_step_gain")]
    pub step_gain: f64,

    /// Lateral offset of each planned foot target from the pelvis, meters.
    #[serde(default = "default_foot_spacing")]
    pub foot_spacing: f64,

    /// Foot-target interpolation speed as a multiple of walk speed.
    #[serde(default = "default_leg_speed_factor")]
    pub leg_speed_factor: f64,

    /// Terrain-following constants.
    #[serde(default)]
    pub follower: FollowerConfig,
}

impl Default for BipedConfig {
    fn default() -> Self {
        Self {
            height: default_height(),
            walk_speed: default_walk_speed(),
            max_walk_speed: default_max_walk_speed(),
            speed_step: default_speed_step(),
            turn_rate_deg: default_turn_rate_deg(),
            heading_gain: default_heading_gain(),
            step_distance: default_step_distance(),
            step_gain: default_step_gain(),
            foot_spacing: default_foot_spacing(),
            leg_speed_factor: default_leg_speed_factor(),
            follower: FollowerConfig::default(),
        }
    }
}

impl BipedConfig {
    /// Validate configuration, including the nested follower section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.height <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "height",
                message: "must be positive",
            });
        }
        if self.walk_speed < 0.0 || self.walk_speed > self.max_walk_speed {
            return Err(ConfigError::InvalidValue {
                field: "walk_speed",
                message: "must lie within [0, max_walk_speed]",
            });
        }
        if self.max_walk_speed <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "max_walk_speed",
                message: "must be positive",
            });
        }
        if self.speed_step <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "speed_step",
                message: "must be positive",
            });
        }
        if self.turn_rate_deg <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "turn_rate_deg",
                message: "must be positive",
            });
        }
        if self.heading_gain <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "heading_gain",
                message: "must be positive",
            });
        }
        if self.step_distance <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "step_distance",
                message: "must be positive",
            });
        }
        if self.foot_spacing < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "foot_spacing",
                message: "must be non-negative",
            });
        }
        if self.leg_speed_factor <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "leg_speed_factor",
                message: "must be positive",
            });
        }
        self.follower.validate()
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
