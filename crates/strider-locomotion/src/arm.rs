//! Pointer-driven arm IK.
//!
//! A two-joint arm (ball shoulder, hinge elbow) tracking a target derived
//! from a normalized 2-D pointer: the pointer is mapped onto the hemisphere
//! in front of the character and scaled by the arm's reach.

use nalgebra::{Isometry3, Vector3};

use strider_core::error::StriderError;
use strider_ik::{CcdSolver, IkChain, JointConstraint};

use crate::biped::BodyProportions;

/// Shoulder swing bound: generous but keeps the arm out of the torso.
const SHOULDER_SWING: f64 = 1.4;
/// Elbow bends one way, like the source rig's pitch limit.
const ELBOW_MIN: f64 = -150.0 * std::f64::consts::PI / 180.0;

/// Arm controller driving one IK chain from a 2-D pointer.
#[derive(Debug, Clone)]
pub struct ArmController {
    chain: IkChain,
    reach: f64,
    shoulder_local: Vector3<f64>,
    pointer: (f64, f64),
}

impl ArmController {
    /// Build an arm for the given body proportions. `right` picks the side.
    pub fn new(proportions: &BodyProportions, right: bool) -> Result<Self, StriderError> {
        let lateral = if right { 1.0 } else { -1.0 };
        let shoulder_local = Vector3::new(
            lateral * proportions.chest_width / 2.0,
            0.0,
            proportions.chest_height / 2.0,
        );
        let chain = IkChain::builder()
            .joint("shoulder_mount", shoulder_local, JointConstraint::Fixed)
            .joint(
                "shoulder",
                Vector3::zeros(),
                JointConstraint::Ball {
                    max_swing: SHOULDER_SWING,
                },
            )
            .joint(
                "elbow",
                Vector3::new(0.0, 0.0, -proportions.upper_arm_length),
                JointConstraint::Hinge {
                    axis: Vector3::x_axis(),
                    min: ELBOW_MIN,
                    max: 0.0,
                },
            )
            .joint(
                "hand",
                Vector3::new(0.0, 0.0, -proportions.forearm_length),
                JointConstraint::Fixed,
            )
            .finalize()?;

        Ok(Self {
            chain,
            reach: proportions.upper_arm_length + proportions.forearm_length,
            shoulder_local,
            pointer: (0.0, 0.0),
        })
    }

    /// Aim the arm from a normalized pointer position. Inputs are clamped
    /// to `[-1, 1]`; y grows downward as pointer coordinates do.
    pub fn point_at(&mut self, x: f64, y: f64) {
        self.pointer = (x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
    }

    /// Current pointer.
    #[must_use]
    pub const fn pointer(&self) -> (f64, f64) {
        self.pointer
    }

    /// Target direction in the body frame: pointer on the forward hemisphere.
    fn target_direction(&self) -> Vector3<f64> {
        let (x, y) = self.pointer;
        let forward = (1.0 - x * x - y * y).max(0.0).sqrt();
        let dir = Vector3::new(x, forward, -y);
        let norm = dir.norm();
        if norm < 1e-9 {
            Vector3::new(0.0, 1.0, 0.0)
        } else {
            dir / norm
        }
    }

    /// Re-target and re-solve the arm for this tick's chest pose.
    pub fn update(&mut self, solver: &CcdSolver, chest: Isometry3<f64>) {
        let shoulder_world = chest.translation.vector + chest.rotation * self.shoulder_local;
        let target =
            shoulder_world + chest.rotation * (self.target_direction() * (self.reach * 0.95));
        self.chain.set_root_pose(chest);
        self.chain.set_target(target);
        solver.solve(&mut self.chain);
    }

    /// World position of the hand.
    #[must_use]
    pub fn hand_position(&self) -> Vector3<f64> {
        self.chain.end_effector()
    }

    /// The underlying chain (for scene-graph pose readout).
    #[must_use]
    pub const fn chain(&self) -> &IkChain {
        &self.chain
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
