//! Constrained kinematic chains.

use nalgebra::{Isometry3, Translation3, UnitQuaternion, UnitVector3, Vector3};

use strider_core::error::ChainError;

/// Rotation constraint of a single joint.
#[derive(Debug, Clone)]
pub enum JointConstraint {
    /// No rotation; a purely translational link (e.g. pelvis to hip).
    Fixed,
    /// Rotation about one explicit axis, with angle limits in radians.
    Hinge {
        /// Hinge axis in the joint's parent frame.
        axis: UnitVector3<f64>,
        /// Lower angle limit (radians).
        min: f64,
        /// Upper angle limit (radians).
        max: f64,
    },
    /// Free swing up to a maximum angle from the rest orientation (radians).
    Ball {
        /// Maximum swing angle (radians).
        max_swing: f64,
    },
}

impl JointConstraint {
    /// Whether this constraint allows any rotation.
    #[must_use]
    pub const fn is_actuated(&self) -> bool {
        !matches!(self, Self::Fixed)
    }
}

/// One joint of a chain: a translation from its parent plus a constrained
/// local rotation.
#[derive(Debug, Clone)]
pub struct Joint {
    name: String,
    offset: Vector3<f64>,
    constraint: JointConstraint,
    rotation: UnitQuaternion<f64>,
    /// Scalar state for hinge joints; the quaternion is derived from it.
    hinge_angle: f64,
}

impl Joint {
    fn new(name: String, offset: Vector3<f64>, constraint: JointConstraint) -> Self {
        Self {
            name,
            offset,
            constraint,
            rotation: UnitQuaternion::identity(),
            hinge_angle: 0.0,
        }
    }

    /// Joint name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Offset from the parent joint, in the parent's frame.
    #[must_use]
    pub const fn offset(&self) -> Vector3<f64> {
        self.offset
    }

    /// The joint's constraint.
    #[must_use]
    pub const fn constraint(&self) -> &JointConstraint {
        &self.constraint
    }

    /// Current local rotation.
    #[must_use]
    pub const fn rotation(&self) -> UnitQuaternion<f64> {
        self.rotation
    }

    /// Current hinge angle in radians (zero for non-hinge joints).
    #[must_use]
    pub const fn hinge_angle(&self) -> f64 {
        self.hinge_angle
    }

    /// Local transform: translate by the offset, then rotate.
    #[must_use]
    pub fn local_pose(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.offset), self.rotation)
    }

    /// Whether the current rotation satisfies the constraint.
    #[must_use]
    pub fn within_limits(&self, epsilon: f64) -> bool {
        match &self.constraint {
            JointConstraint::Fixed => self.rotation.angle() <= epsilon,
            JointConstraint::Hinge { min, max, .. } => {
                self.hinge_angle >= min - epsilon && self.hinge_angle <= max + epsilon
            }
            JointConstraint::Ball { max_swing } => self.rotation.angle() <= max_swing + epsilon,
        }
    }

    /// Set a hinge angle, clamped to the limits. No-op on non-hinge joints.
    pub(crate) fn set_hinge_angle(&mut self, angle: f64) {
        if let JointConstraint::Hinge { axis, min, max } = &self.constraint {
            self.hinge_angle = angle.clamp(*min, *max);
            self.rotation = UnitQuaternion::from_axis_angle(axis, self.hinge_angle);
        }
    }

    /// Compose a rotation delta onto a ball joint and re-clamp the swing.
    /// No-op on non-ball joints.
    pub(crate) fn compose_ball(&mut self, delta: UnitQuaternion<f64>) {
        if let JointConstraint::Ball { max_swing } = &self.constraint {
            let mut q = delta * self.rotation;
            let angle = q.angle();
            if angle > *max_swing {
                // Scale the rotation back onto the swing bound.
                q = q.powf(*max_swing / angle);
            }
            self.rotation = q;
        }
    }

    fn reset(&mut self) {
        self.rotation = UnitQuaternion::identity();
        self.hinge_angle = 0.0;
    }
}

/// Builder for an [`IkChain`]. Push joints root → leaf, then `finalize()`.
#[derive(Debug, Default)]
pub struct ChainBuilder {
    joints: Vec<Joint>,
}

impl ChainBuilder {
    /// Start an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a joint.
    #[must_use]
    pub fn joint(
        mut self,
        name: impl Into<String>,
        offset: Vector3<f64>,
        constraint: JointConstraint,
    ) -> Self {
        self.joints.push(Joint::new(name.into(), offset, constraint));
        self
    }

    /// Validate and lock the structure.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] on an empty chain, a chain with no actuated
    /// joint, inverted hinge limits, or a negative swing bound.
    pub fn finalize(self) -> Result<IkChain, ChainError> {
        if self.joints.is_empty() {
            return Err(ChainError::Empty);
        }
        if !self.joints.iter().any(|j| j.constraint.is_actuated()) {
            return Err(ChainError::NoActuatedJoint);
        }
        for (index, joint) in self.joints.iter().enumerate() {
            match &joint.constraint {
                JointConstraint::Hinge { min, max, .. } if min > max => {
                    return Err(ChainError::InvertedLimits { index });
                }
                JointConstraint::Ball { max_swing } if *max_swing < 0.0 => {
                    return Err(ChainError::NegativeSwing { index });
                }
                _ => {}
            }
        }
        Ok(IkChain {
            joints: self.joints,
            root: Isometry3::identity(),
            target: Vector3::zeros(),
        })
    }
}

/// A finalized chain: fixed structure, moving root pose, target and joint
/// rotations.
#[derive(Debug, Clone)]
pub struct IkChain {
    joints: Vec<Joint>,
    root: Isometry3<f64>,
    target: Vector3<f64>,
}

impl IkChain {
    /// Start building a chain.
    #[must_use]
    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    /// Number of joints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Always `false`; finalize rejects empty chains. Present for clippy's
    /// `len_without_is_empty`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// The joints, root → leaf.
    #[must_use]
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub(crate) fn joints_mut(&mut self) -> &mut [Joint] {
        &mut self.joints
    }

    /// Move the chain root (the pelvis/chest attachment).
    pub fn set_root_pose(&mut self, pose: Isometry3<f64>) {
        self.root = pose;
    }

    /// Current root pose.
    #[must_use]
    pub const fn root_pose(&self) -> Isometry3<f64> {
        self.root
    }

    /// Move the world-space target the end effector should reach.
    pub fn set_target(&mut self, target: Vector3<f64>) {
        self.target = target;
    }

    /// Current target.
    #[must_use]
    pub const fn target(&self) -> Vector3<f64> {
        self.target
    }

    /// World pose of every joint frame, root → leaf.
    ///
    /// This is the hand-off to the scene graph: each joint's visual node is
    /// placed at the corresponding pose.
    #[must_use]
    pub fn world_poses(&self) -> Vec<Isometry3<f64>> {
        let mut poses = Vec::with_capacity(self.joints.len());
        let mut acc = self.root;
        for joint in &self.joints {
            acc *= joint.local_pose();
            poses.push(acc);
        }
        poses
    }

    /// World position of the end effector (the last joint).
    #[must_use]
    pub fn end_effector(&self) -> Vector3<f64> {
        let mut acc = self.root;
        for joint in &self.joints {
            acc *= joint.local_pose();
        }
        acc.translation.vector
    }

    /// Total length of the chain: an upper bound on how far the end effector
    /// can sit from the root.
    #[must_use]
    pub fn reach(&self) -> f64 {
        self.joints.iter().map(|j| j.offset.norm()).sum()
    }

    /// Reset all joints to their rest rotation.
    pub fn reset_pose(&mut self) {
        for joint in &mut self.joints {
            joint.reset();
        }
    }

    /// Whether every joint satisfies its constraint.
    #[must_use]
    pub fn within_limits(&self, epsilon: f64) -> bool {
        self.joints.iter().all(|j| j.within_limits(epsilon))
    }
}
