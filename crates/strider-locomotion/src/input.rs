//! Discrete input mapping.
//!
//! The input layer hands the core a compass-style walking direction plus
//! boolean turn/speed flags each tick; the core knows nothing about keys.
//! Walk angles follow the source mapping: forward is 90 degrees, left 0,
//! right 180, with the diagonals between.

use strider_physics::SimulationContext;

use crate::biped::Biped;

/// Eight-way walking direction, relative to the body's facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    ForwardLeft,
    ForwardRight,
    Back,
    BackLeft,
    BackRight,
    Left,
    Right,
}

impl MoveDirection {
    /// Build from axis states: `dx` is -1 left / +1 right, `dy` is +1
    /// forward / -1 back. `(0, 0)` is no movement.
    #[must_use]
    pub const fn from_axes(dx: i8, dy: i8) -> Option<Self> {
        match (dx, dy) {
            (0, 1) => Some(Self::Forward),
            (-1, 1) => Some(Self::ForwardLeft),
            (1, 1) => Some(Self::ForwardRight),
            (0, -1) => Some(Self::Back),
            (-1, -1) => Some(Self::BackLeft),
            (1, -1) => Some(Self::BackRight),
            (-1, 0) => Some(Self::Left),
            (1, 0) => Some(Self::Right),
            _ => None,
        }
    }

    /// Walk angle in radians for [`Biped::walk_in_dir`].
    #[must_use]
    pub fn walk_angle(self) -> f64 {
        let degrees: f64 = match self {
            Self::ForwardLeft => 45.0,
            Self::Forward => 90.0,
            Self::ForwardRight => 135.0,
            Self::Left => 0.0,
            Self::Right => 180.0,
            Self::BackLeft => -45.0,
            Self::Back => -90.0,
            Self::BackRight => -135.0,
        };
        degrees.to_radians()
    }
}

/// One tick's worth of input for a character.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputCommand {
    /// Walking direction; `None` stands still.
    pub direction: Option<MoveDirection>,
    /// Turn counter-clockwise this tick.
    pub turn_left: bool,
    /// Turn clockwise this tick.
    pub turn_right: bool,
    /// Raise walk speed one increment.
    pub speed_up: bool,
    /// Lower walk speed one increment.
    pub slow_down: bool,
    /// Normalized pointer driving the arm, if any.
    pub pointer: Option<[f64; 2]>,
}

impl InputCommand {
    /// Command that walks in the given direction.
    #[must_use]
    pub fn walk(direction: MoveDirection) -> Self {
        Self {
            direction: Some(direction),
            ..Self::default()
        }
    }
}

/// Apply one tick of input to a biped: turns and speed changes first, then
/// exactly one of walk/stand.
pub fn apply_input(biped: &mut Biped, ctx: &mut SimulationContext<'_>, command: &InputCommand) -> bool {
    if command.turn_left {
        biped.turn_left(ctx.dt);
    }
    if command.turn_right {
        biped.turn_right(ctx.dt);
    }
    if command.speed_up {
        biped.speed_up();
    }
    if command.slow_down {
        biped.slow_down();
    }
    if let Some([x, y]) = command.pointer {
        biped.point_arm(x, y);
    }
    match command.direction {
        Some(direction) => biped.walk_in_dir(ctx, direction.walk_angle()),
        None => biped.stand_still(ctx),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use strider_core::config::BipedConfig;
    use strider_physics::{BodyDesc, Heightfield, KinematicWorld, PhysicsWorld};

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn axes_map_to_directions() {
        assert_eq!(MoveDirection::from_axes(0, 1), Some(MoveDirection::Forward));
        assert_eq!(
            MoveDirection::from_axes(-1, 1),
            Some(MoveDirection::ForwardLeft)
        );
        assert_eq!(MoveDirection::from_axes(1, -1), Some(MoveDirection::BackRight));
        assert_eq!(MoveDirection::from_axes(0, 0), None);
        assert_eq!(MoveDirection::from_axes(2, 0), None);
    }

    #[test]
    fn forward_angle_is_ninety_degrees() {
        assert_relative_eq!(
            MoveDirection::Forward.walk_angle(),
            std::f64::consts::FRAC_PI_2
        );
        assert_relative_eq!(MoveDirection::Left.walk_angle(), 0.0);
        assert_relative_eq!(
            MoveDirection::Back.walk_angle(),
            -std::f64::consts::FRAC_PI_2
        );
    }

    fn spawn() -> (KinematicWorld, Biped) {
        let config = BipedConfig {
            walk_speed: 2.0,
            ..BipedConfig::default()
        };
        let mut world = KinematicWorld::new(Heightfield::flat(0.0));
        let stance = crate::biped::BodyProportions::from_height(config.height).stance_height();
        let body = world.add_body(BodyDesc::at(Vector3::new(0.0, 0.0, stance)));
        let biped = Biped::new(body, 0.0, config).unwrap();
        (world, biped)
    }

    #[test]
    fn walk_command_moves_forward() {
        let (mut world, mut biped) = spawn();
        for i in 0..60 {
            let mut ctx = SimulationContext::new(DT, i, &mut world);
            apply_input(&mut biped, &mut ctx, &InputCommand::walk(MoveDirection::Forward));
            world.step(DT);
        }
        assert!(world.position(biped.body()).y > 1.5);
    }

    #[test]
    fn empty_command_stands_still() {
        let (mut world, mut biped) = spawn();
        for i in 0..60 {
            let mut ctx = SimulationContext::new(DT, i, &mut world);
            apply_input(&mut biped, &mut ctx, &InputCommand::default());
            world.step(DT);
        }
        assert!(world.position(biped.body()).xy().norm() < 0.05);
    }

    #[test]
    fn turn_flag_adjusts_desired_heading() {
        let (mut world, mut biped) = spawn();
        let command = InputCommand {
            turn_left: true,
            ..InputCommand::default()
        };
        for i in 0..20 {
            let mut ctx = SimulationContext::new(DT, i, &mut world);
            apply_input(&mut biped, &mut ctx, &command);
            world.step(DT);
        }
        // 450 deg/s for a third of a second; the actual heading trails the
        // desired heading through the proportional controller.
        assert!(biped.desired_heading() > 100.0);
        assert!(world.heading_deg(biped.body()) > 45.0);
    }

    #[test]
    fn speed_flags_change_walk_speed() {
        let (mut world, mut biped) = spawn();
        let command = InputCommand {
            speed_up: true,
            ..InputCommand::default()
        };
        let mut ctx = SimulationContext::new(DT, 0, &mut world);
        apply_input(&mut biped, &mut ctx, &command);
        assert_relative_eq!(biped.walk_speed(), 2.25);
    }

    #[test]
    fn pointer_reaches_the_arm() {
        let (mut world, mut biped) = spawn();
        let command = InputCommand {
            pointer: Some([0.5, -0.25]),
            ..InputCommand::default()
        };
        let mut ctx = SimulationContext::new(DT, 0, &mut world);
        apply_input(&mut biped, &mut ctx, &command);
        assert_eq!(biped.arm().pointer(), (0.5, -0.25));
    }
}
