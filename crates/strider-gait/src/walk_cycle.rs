//! Distance-phased walk cycle for two legs.

/// Which leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegSide {
    Left,
    Right,
}

impl LegSide {
    /// Index into per-leg arrays. Left is 0 and is serviced first on ties.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    /// Leg side for an index.
    ///
    /// # Panics
    ///
    /// Panics on indices other than 0 or 1.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Left,
            1 => Self::Right,
            _ => panic!("a biped has two legs"),
        }
    }

    /// The other leg.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Per-leg stepping state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegState {
    /// No step pending.
    Idle,
    /// The phase accumulator crossed this leg's threshold; a step is due.
    StepRequired,
    /// The foot target is interpolating toward its planned landing spot.
    Stepping,
}

/// Walk-cycle state machine for a biped.
///
/// `advance` accumulates distance walked; each leg's trigger sits every
/// `step_distance` meters, the right leg offset by half a cycle behind the
/// left. Steps alternate structurally: a leg is never granted two steps
/// without the other leg stepping in between.
#[derive(Debug, Clone)]
pub struct WalkCycle {
    step_distance: f64,
    phase: f64,
    next_step_at: [f64; 2],
    states: [LegState; 2],
    last_stepped: Option<LegSide>,
    events: Vec<LegSide>,
}

impl WalkCycle {
    /// Create a cycle with the given step distance in meters.
    ///
    /// The left leg first triggers after one full step distance, the right
    /// half a cycle later.
    #[must_use]
    pub fn new(step_distance: f64) -> Self {
        Self {
            step_distance,
            phase: 0.0,
            next_step_at: [step_distance, step_distance * 1.5],
            states: [LegState::Idle; 2],
            last_stepped: None,
            events: Vec::new(),
        }
    }

    /// Configured step distance.
    #[must_use]
    pub const fn step_distance(&self) -> f64 {
        self.step_distance
    }

    /// Accumulated phase distance.
    #[must_use]
    pub const fn phase(&self) -> f64 {
        self.phase
    }

    /// State of a leg.
    #[must_use]
    pub const fn state(&self, leg: LegSide) -> LegState {
        self.states[leg.index()]
    }

    /// Whether a step is due for this leg.
    #[must_use]
    pub fn step_required(&self, leg: LegSide) -> bool {
        self.states[leg.index()] == LegState::StepRequired
    }

    /// Whether this leg's foot is currently interpolating.
    #[must_use]
    pub fn is_stepping(&self, leg: LegSide) -> bool {
        self.states[leg.index()] == LegState::Stepping
    }

    /// Add walked distance (plus any turn contribution) to the phase and
    /// raise step flags for legs whose thresholds were crossed.
    ///
    /// Negative increments are ignored; the cycle only runs forward.
    pub fn advance(&mut self, distance: f64) {
        if distance <= 0.0 {
            return;
        }
        self.phase += distance;
        for index in 0..2 {
            if self.states[index] == LegState::Idle && self.phase >= self.next_step_at[index] {
                self.states[index] = LegState::StepRequired;
            }
        }
    }

    /// Begin the pending step for `leg`: clears the flag, records the step
    /// event and moves the leg to [`LegState::Stepping`].
    ///
    /// Returns `false` (and leaves the flag pending) when no step is due or
    /// when granting it would make the same leg step twice in a row.
    pub fn begin_step(&mut self, leg: LegSide) -> bool {
        let index = leg.index();
        if self.states[index] != LegState::StepRequired {
            return false;
        }
        if self.last_stepped == Some(leg) && self.states[leg.other().index()] != LegState::Idle {
            // The other leg is owed a step first; keep this one pending.
            return false;
        }
        self.states[index] = LegState::Stepping;
        self.last_stepped = Some(leg);
        // Catch the threshold up past the current phase.
        while self.next_step_at[index] <= self.phase {
            self.next_step_at[index] += self.step_distance;
        }
        self.events.push(leg);
        true
    }

    /// Finish a step: the foot target reached its planned landing spot.
    pub fn complete_step(&mut self, leg: LegSide) {
        if self.states[leg.index()] == LegState::Stepping {
            self.states[leg.index()] = LegState::Idle;
        }
    }

    /// Drain the recorded step events since the last call.
    pub fn take_events(&mut self) -> Vec<LegSide> {
        std::mem::take(&mut self.events)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn no_step_before_threshold() {
        let mut cycle = WalkCycle::new(0.75);
        cycle.advance(0.74);
        assert!(!cycle.step_required(LegSide::Left));
        assert!(!cycle.step_required(LegSide::Right));
    }

    #[test]
    fn left_triggers_at_one_step_distance() {
        let mut cycle = WalkCycle::new(0.75);
        cycle.advance(0.76);
        assert!(cycle.step_required(LegSide::Left));
        assert!(!cycle.step_required(LegSide::Right));
    }

    #[test]
    fn right_triggers_half_a_cycle_later() {
        let mut cycle = WalkCycle::new(0.75);
        cycle.advance(1.13);
        assert!(cycle.step_required(LegSide::Right));
    }

    #[test]
    fn two_meters_yields_two_steps_per_leg() {
        // Thresholds at 0.75 / 1.5 (left) and 1.125 / 1.875 (right).
        let mut cycle = WalkCycle::new(0.75);
        let mut events = Vec::new();
        let ticks = 120;
        for _ in 0..ticks {
            cycle.advance(2.0 / f64::from(ticks));
            for index in 0..2 {
                let leg = LegSide::from_index(index);
                if cycle.step_required(leg) && cycle.begin_step(leg) {
                    cycle.complete_step(leg);
                }
            }
        }
        events.extend(cycle.take_events());
        let left = events.iter().filter(|&&l| l == LegSide::Left).count();
        let right = events.iter().filter(|&&l| l == LegSide::Right).count();
        assert_eq!(left, 2, "events: {events:?}");
        assert_eq!(right, 2, "events: {events:?}");
        assert_eq!(events[0], LegSide::Left);
    }

    #[test]
    fn big_jump_services_left_first() {
        let mut cycle = WalkCycle::new(0.75);
        cycle.advance(2.0);
        assert!(cycle.step_required(LegSide::Left));
        assert!(cycle.step_required(LegSide::Right));
        // Caller order is left then right; both are granted.
        assert!(cycle.begin_step(LegSide::Left));
        assert!(cycle.begin_step(LegSide::Right));
        assert_eq!(cycle.take_events(), vec![LegSide::Left, LegSide::Right]);
    }

    #[test]
    fn begin_without_flag_is_refused() {
        let mut cycle = WalkCycle::new(0.75);
        assert!(!cycle.begin_step(LegSide::Left));
    }

    #[test]
    fn same_leg_twice_is_deferred_when_other_owed() {
        let mut cycle = WalkCycle::new(0.75);
        cycle.advance(0.8);
        assert!(cycle.begin_step(LegSide::Left));
        cycle.complete_step(LegSide::Left);

        // Jump far enough that both legs are due again.
        cycle.advance(1.2);
        assert!(cycle.step_required(LegSide::Left));
        assert!(cycle.step_required(LegSide::Right));
        // Left just stepped and right is owed: left is deferred.
        assert!(!cycle.begin_step(LegSide::Left));
        assert!(cycle.begin_step(LegSide::Right));
        cycle.complete_step(LegSide::Right);
        // Now left may go.
        assert!(cycle.begin_step(LegSide::Left));
    }

    #[test]
    fn complete_step_returns_to_idle() {
        let mut cycle = WalkCycle::new(0.75);
        cycle.advance(0.8);
        cycle.begin_step(LegSide::Left);
        assert!(cycle.is_stepping(LegSide::Left));
        cycle.complete_step(LegSide::Left);
        assert_eq!(cycle.state(LegSide::Left), LegState::Idle);
    }

    #[test]
    fn negative_advance_ignored() {
        let mut cycle = WalkCycle::new(0.75);
        cycle.advance(-5.0);
        assert!((cycle.phase() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn events_alternate_over_random_walks() {
        let mut cycle = WalkCycle::new(0.75);
        let mut rng = ChaCha8Rng::seed_from_u64(0xA17);
        for _ in 0..5000 {
            cycle.advance(rng.gen_range(0.0..0.08));
            for index in 0..2 {
                let leg = LegSide::from_index(index);
                if cycle.step_required(leg) && cycle.begin_step(leg) {
                    cycle.complete_step(leg);
                }
            }
        }
        let events = cycle.take_events();
        assert!(events.len() > 100, "walked far enough to step many times");
        for pair in events.windows(2) {
            assert_ne!(pair[0], pair[1], "legs must alternate: {events:?}");
        }
    }

    #[test]
    fn phase_accumulates() {
        let mut cycle = WalkCycle::new(0.75);
        cycle.advance(0.3);
        cycle.advance(0.3);
        assert!((cycle.phase() - 0.6).abs() < 1e-12);
    }
}
