//! The walking biped: ground adaptation + two IK legs + walk cycle +
//! heading control, assembled behind the per-tick contract.
//!
//! Exactly one of [`Biped::walk_in_dir`] or [`Biped::stand_still`] must run
//! each simulation tick, before the physics backend integrates. The
//! controller measures the distance actually travelled since the previous
//! tick (one tick stale, by design) and feeds it to the walk cycle, so gait
//! cadence follows real motion, not commanded motion.

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use tracing::debug;

use strider_core::config::BipedConfig;
use strider_core::error::StriderError;
use strider_core::math::{angle_diff_degrees, wrap_degrees};
use strider_gait::{LegSide, WalkCycle};
use strider_ik::{CcdSolver, IkChain, JointConstraint};
use strider_physics::{BodyHandle, GroundProbe, SimulationContext};

use crate::arm::ArmController;
use crate::ground::{DriveCommand, TerrainFollower};
use crate::strategy::{FootPlanted, LocomotionStrategy};

/// Turn requests are refused once the desired heading would come within
/// this many degrees of the exact opposite of the current heading: an
/// about-face is walked as a turn, never snapped.
const ABOUT_FACE_GUARD_DEG: f64 = 10.0;

/// Body measurements derived from a character height, using the source
/// rig's anthropometric ratios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyProportions {
    /// Full character height (m).
    pub height: f64,
    /// Head height (m).
    pub head_height: f64,
    /// Lower torso (pelvis block) height (m).
    pub lower_torso_height: f64,
    /// Chest height (m).
    pub chest_height: f64,
    /// Pelvis width (m).
    pub pelvis_width: f64,
    /// Chest width (m).
    pub chest_width: f64,
    /// Whole leg, hip to sole (m).
    pub leg_height: f64,
    /// Thigh segment (m).
    pub thigh_length: f64,
    /// Lower leg segment (m).
    pub lower_leg_length: f64,
    /// Foot height (m).
    pub foot_height: f64,
    /// Upper arm segment (m).
    pub upper_arm_length: f64,
    /// Forearm segment (m).
    pub forearm_length: f64,
}

impl BodyProportions {
    /// Derive all measurements from a character height.
    #[must_use]
    pub fn from_height(height: f64) -> Self {
        let head_height = height / 7.0;
        let lower_torso_height = 1.5 * height / 7.0;
        let chest_height = 1.5 * height / 7.0;
        let leg_height = height - head_height - lower_torso_height - chest_height;
        let thigh_length = leg_height * 59.0 / 109.0;
        let lower_leg_length = leg_height * 40.0 / 109.0;
        let foot_height = leg_height - thigh_length - lower_leg_length;
        let arm_height = leg_height;
        Self {
            height,
            head_height,
            lower_torso_height,
            chest_height,
            pelvis_width: 0.38,
            chest_width: 0.38,
            leg_height,
            thigh_length,
            lower_leg_length,
            foot_height,
            upper_arm_length: arm_height / 2.0,
            forearm_length: arm_height / 2.0,
        }
    }

    /// Vertical distance from the pelvis center to a fully extended sole:
    /// the height the torso rides at over flat ground.
    #[must_use]
    pub fn stance_height(&self) -> f64 {
        self.lower_torso_height / 2.0 + self.thigh_length + self.lower_leg_length
    }

    /// Depth below the pelvis at which planned foot targets are placed.
    ///
    /// Deliberately one foot height beyond the chain's reach, so standing
    /// legs stay taut and the ground offset tracks the torso.
    #[must_use]
    pub fn stance_target_depth(&self) -> f64 {
        self.lower_torso_height / 2.0 + self.leg_height
    }
}

#[derive(Debug)]
struct Leg {
    chain: IkChain,
    foot_target: Vector3<f64>,
}

/// A walking character.
pub struct Biped {
    config: BipedConfig,
    proportions: BodyProportions,
    body: BodyHandle,
    legs: [Leg; 2],
    walk_cycle: WalkCycle,
    strategy: Box<dyn LocomotionStrategy>,
    solver: CcdSolver,
    arm: ArmController,
    probe: GroundProbe,
    walk_speed: f64,
    desired_heading: f64,
    last_position: Option<Vector3<f64>>,
    last_heading: Option<f64>,
    last_tick: Option<u64>,
}

impl Biped {
    /// Build a biped around an existing rigid body.
    ///
    /// `heading_deg` is the body's spawn heading; the desired heading starts
    /// there so the character does not turn on its first tick.
    pub fn new(
        body: BodyHandle,
        heading_deg: f64,
        config: BipedConfig,
    ) -> Result<Self, StriderError> {
        config.validate()?;
        let proportions = BodyProportions::from_height(config.height);
        let legs = [
            Self::build_leg(&proportions, LegSide::Left)?,
            Self::build_leg(&proportions, LegSide::Right)?,
        ];
        let walk_cycle = WalkCycle::new(config.step_distance);
        let strategy = Box::new(FootPlanted::new(TerrainFollower::new(
            config.follower.clone(),
        )));
        let arm = ArmController::new(&proportions, true)?;
        let walk_speed = config.walk_speed;
        Ok(Self {
            config,
            proportions,
            body,
            legs,
            walk_cycle,
            strategy,
            solver: CcdSolver::default(),
            arm,
            probe: GroundProbe::default(),
            walk_speed,
            desired_heading: wrap_degrees(heading_deg),
            last_position: None,
            last_heading: None,
            last_tick: None,
        })
    }

    /// Swap the locomotion strategy (chosen at construction time).
    #[must_use]
    pub fn with_strategy(mut self, strategy: Box<dyn LocomotionStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    fn build_leg(proportions: &BodyProportions, side: LegSide) -> Result<Leg, StriderError> {
        let lateral = match side {
            LegSide::Left => -1.0,
            LegSide::Right => 1.0,
        };
        let chain = IkChain::builder()
            .joint(
                "hip",
                Vector3::new(
                    lateral * proportions.pelvis_width / 4.0,
                    0.0,
                    -proportions.lower_torso_height / 2.0,
                ),
                JointConstraint::Fixed,
            )
            .joint(
                "thigh",
                Vector3::zeros(),
                JointConstraint::Ball {
                    max_swing: std::f64::consts::FRAC_PI_4,
                },
            )
            .joint(
                "knee",
                Vector3::new(0.0, 0.0, -proportions.thigh_length),
                JointConstraint::Hinge {
                    axis: Vector3::x_axis(),
                    min: -std::f64::consts::FRAC_PI_2,
                    max: 0.0,
                },
            )
            .joint(
                "foot",
                Vector3::new(0.0, 0.0, -proportions.lower_leg_length),
                JointConstraint::Fixed,
            )
            .finalize()?;
        Ok(Leg {
            chain,
            foot_target: Vector3::zeros(),
        })
    }

    // -- accessors ----------------------------------------------------------

    /// The rigid body this biped drives.
    #[must_use]
    pub const fn body(&self) -> BodyHandle {
        self.body
    }

    /// Derived body measurements.
    #[must_use]
    pub const fn proportions(&self) -> &BodyProportions {
        &self.proportions
    }

    /// Height the torso rides at over flat ground.
    #[must_use]
    pub fn stance_height(&self) -> f64 {
        self.proportions.stance_height()
    }

    /// Current walk speed (m/s).
    #[must_use]
    pub const fn walk_speed(&self) -> f64 {
        self.walk_speed
    }

    /// Foot-target interpolation speed: stride cadence tracks travel speed.
    #[must_use]
    pub fn leg_movement_speed(&self) -> f64 {
        self.config.leg_speed_factor * self.walk_speed
    }

    /// Desired heading in degrees.
    #[must_use]
    pub const fn desired_heading(&self) -> f64 {
        self.desired_heading
    }

    /// Current world position of a foot (post-IK end effector).
    #[must_use]
    pub fn foot_position(&self, side: LegSide) -> Vector3<f64> {
        self.legs[side.index()].chain.end_effector()
    }

    /// World poses of a leg's joints, for the scene graph.
    #[must_use]
    pub fn leg_poses(&self, side: LegSide) -> Vec<Isometry3<f64>> {
        self.legs[side.index()].chain.world_poses()
    }

    /// The pointer-driven arm.
    #[must_use]
    pub const fn arm(&self) -> &ArmController {
        &self.arm
    }

    /// Aim the arm from a normalized 2-D pointer.
    pub fn point_arm(&mut self, x: f64, y: f64) {
        self.arm.point_at(x, y);
    }

    /// Drain the step events recorded since the last call.
    pub fn take_step_events(&mut self) -> Vec<LegSide> {
        self.walk_cycle.take_events()
    }

    /// Whether every joint of both legs and the arm satisfies its
    /// constraint. Holds after every solve; exposed for diagnostics.
    #[must_use]
    pub fn joints_within_limits(&self) -> bool {
        self.legs.iter().all(|leg| leg.chain.within_limits(1e-6))
            && self.arm.chain().within_limits(1e-6)
    }

    // -- per-tick operations ------------------------------------------------

    /// Walk toward `angle` (radians, relative to the body's heading) for one
    /// tick. Returns whether the body moved.
    pub fn walk_in_dir(&mut self, ctx: &mut SimulationContext<'_>, angle: f64) -> bool {
        self.tick(ctx, angle, false)
    }

    /// Stand for one tick: velocity bleeds out while gait and IK stay in
    /// lock-step with the simulation clock.
    pub fn stand_still(&mut self, ctx: &mut SimulationContext<'_>) -> bool {
        self.tick(ctx, 0.0, true)
    }

    /// Turn the desired heading left (counter-clockwise).
    pub fn turn_left(&mut self, dt: f64) {
        self.turn(self.config.turn_rate_deg * dt);
    }

    /// Turn the desired heading right (clockwise).
    pub fn turn_right(&mut self, dt: f64) {
        self.turn(-self.config.turn_rate_deg * dt);
    }

    fn turn(&mut self, delta_deg: f64) {
        let candidate = wrap_degrees(self.desired_heading + delta_deg);
        if let Some(current) = self.last_heading {
            if angle_diff_degrees(current, candidate).abs() > 180.0 - ABOUT_FACE_GUARD_DEG {
                return;
            }
        }
        self.desired_heading = candidate;
    }

    /// Raise the walk speed by one fixed increment.
    pub fn speed_up(&mut self) {
        self.set_walk_speed(self.walk_speed + self.config.speed_step);
    }

    /// Lower the walk speed by one fixed increment.
    pub fn slow_down(&mut self) {
        self.set_walk_speed(self.walk_speed - self.config.speed_step);
    }

    /// Set the walk speed, clamped to the configured range.
    pub fn set_walk_speed(&mut self, speed: f64) {
        self.walk_speed = speed.clamp(0.0, self.config.max_walk_speed);
    }

    // -- tick internals -----------------------------------------------------

    fn tick(&mut self, ctx: &mut SimulationContext<'_>, angle: f64, decelerate: bool) -> bool {
        debug_assert!(
            self.last_tick != Some(ctx.tick),
            "walk_in_dir/stand_still must be called exactly once per tick"
        );
        self.last_tick = Some(ctx.tick);
        let dt = ctx.dt;

        let position = ctx.world.position(self.body);
        let heading = ctx.world.heading_deg(self.body);

        // Distance actually travelled since the previous tick. The transform
        // read here is the result of the previous integration; the lag is
        // part of the contract.
        let walked = self
            .last_position
            .map_or(0.0, |prev| (position - prev).xy().norm());
        let turned_rad = self
            .last_heading
            .map_or(0.0, |prev| angle_diff_degrees(prev, heading).to_radians().abs());
        let first_tick = self.last_position.is_none();
        self.last_position = Some(position);
        self.last_heading = Some(heading);

        // Heading is never set directly: a proportional controller steers
        // the yaw rate toward the desired heading.
        let heading_error = angle_diff_degrees(heading, self.desired_heading);
        ctx.world.set_angular_velocity(
            self.body,
            Vector3::new(0.0, 0.0, self.config.heading_gain * heading_error.to_radians()),
        );

        let feet = [
            self.legs[0].chain.end_effector(),
            self.legs[1].chain.end_effector(),
        ];
        let command = if decelerate {
            DriveCommand::coast()
        } else {
            DriveCommand::walk(self.walk_speed, angle)
        };
        let moved = self
            .strategy
            .drive(ctx.world, self.body, &feet, &command, dt);

        let root = Isometry3::from_parts(
            Translation3::from(position),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), heading.to_radians()),
        );

        if first_tick {
            // Plant the feet at their natural stance spots.
            for index in 0..2 {
                self.legs[index].foot_target = self.planned_target(ctx, &root, index);
            }
        } else if moved {
            // Turning in place contributes half its arc to the gait phase.
            self.walk_cycle.advance(walked + turned_rad * 0.5);
        }

        for index in 0..2 {
            let leg = LegSide::from_index(index);
            if self.walk_cycle.step_required(leg) && self.walk_cycle.begin_step(leg) {
                debug!(?leg, "step");
            }
        }

        // Stepping feet interpolate toward their planned landing spots; a
        // step completes when the remainder is smaller than one tick of
        // interpolation travel.
        let leg_step = self.leg_movement_speed() * dt;
        for index in 0..2 {
            let leg = LegSide::from_index(index);
            if !self.walk_cycle.is_stepping(leg) {
                continue;
            }
            let planned = self.planned_target(ctx, &root, index);
            let diff = planned - self.legs[index].foot_target;
            if diff.norm() <= leg_step {
                self.legs[index].foot_target = planned;
                self.walk_cycle.complete_step(leg);
            } else {
                self.legs[index].foot_target += diff.normalize() * leg_step;
            }
        }

        for leg in &mut self.legs {
            leg.chain.set_root_pose(root);
            leg.chain.set_target(leg.foot_target);
            self.solver.solve(&mut leg.chain);
        }
        self.arm.update(&self.solver, root);

        moved
    }

    /// Where a stepping foot should land: rigidly in front of the pelvis,
    /// stride scaled by walk speed, projected onto the terrain. On a probe
    /// miss the body-relative depth is kept unchanged.
    fn planned_target(
        &self,
        ctx: &SimulationContext<'_>,
        root: &Isometry3<f64>,
        index: usize,
    ) -> Vector3<f64> {
        let lateral = if index == 0 { -1.0 } else { 1.0 };
        let local = Vector3::new(
            lateral * self.config.foot_spacing,
            self.config.step_gain * self.walk_speed,
            -self.proportions.stance_target_depth(),
        );
        let mut world_pos = root.translation.vector + root.rotation * local;
        if let Some(ground) = self.probe.try_height_at(ctx.world, world_pos.x, world_pos.y) {
            world_pos.z = ground;
        }
        world_pos
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
