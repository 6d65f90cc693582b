// Forward simulation of our own movement while surfing a wave

use super::wave::Wave;
use crate::config::{ACCELERATION, DECELERATION, MAX_PREDICTION_TICKS, MAX_VELOCITY};
use crate::types::{BotState, Point, SurfDirection};
use crate::utils::{absolute_bearing, limit, max_turn_rate, normalize_relative_angle, project};
use crate::wall::WallSmoother;
use std::f64::consts::{FRAC_PI_2, PI};

/// Position, heading and velocity of a bot, advanced one turn at a time under the
/// movement rules of the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    pub position: Point,
    pub heading: f64,
    pub velocity: f64,
}

impl MotionState {
    pub fn new(position: Point, heading: f64, velocity: f64) -> Self {
        MotionState {
            position,
            heading,
            velocity,
        }
    }

    /// Advances one turn. `turn` is the requested body rotation, capped by the turn rate
    /// for the current velocity. `move_dir` is +1 forward, -1 backward, 0 to brake.
    pub fn step(&mut self, turn: f64, move_dir: f64) {
        let max_turn = max_turn_rate(self.velocity);
        self.heading = normalize_relative_angle(self.heading + limit(-max_turn, turn, max_turn));

        if move_dir == 0.0 {
            // Brake towards a standstill
            let slowed = (self.velocity.abs() - DECELERATION).max(0.0);
            self.velocity = slowed.copysign(self.velocity);
        } else if self.velocity * move_dir < 0.0 {
            self.velocity += DECELERATION * move_dir;
        } else {
            self.velocity += ACCELERATION * move_dir;
        }
        self.velocity = limit(-MAX_VELOCITY, self.velocity, MAX_VELOCITY);

        self.position = project(self.position, self.heading, self.velocity);
    }
}

impl From<&BotState> for MotionState {
    fn from(state: &BotState) -> Self {
        MotionState::new(state.position, state.heading, state.speed)
    }
}

/// Where we expect to be when a wave reaches us.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub position: Point,
    pub ticks: u32,
    pub intercepted: bool, // false when the step budget ran out first
}

/// Simulates orbiting `wave` in `direction` from `start` until the wave front catches up.
pub fn predict_position(
    start: MotionState,
    wave: &Wave,
    direction: SurfDirection,
    smoother: &WallSmoother<'_>,
) -> Prediction {
    let mut state = start;
    let sign = direction.sign();
    let mut ticks = 0;

    while ticks < MAX_PREDICTION_TICKS {
        let orbit = absolute_bearing(wave.origin, state.position) + sign * FRAC_PI_2;
        let mut move_angle = smoother.smooth(state.position, orbit, direction) - state.heading;
        let mut move_dir = 1.0;

        // Drive backwards rather than turn more than a quarter circle
        if move_angle.cos() < 0.0 {
            move_angle += PI;
            move_dir = -1.0;
        }

        state.step(normalize_relative_angle(move_angle), move_dir);
        ticks += 1;

        let reach = wave.distance_traveled + ticks as f64 * wave.speed + wave.speed;
        if state.position.distance(wave.origin) < reach {
            return Prediction {
                position: state.position,
                ticks,
                intercepted: true,
            };
        }
    }

    crate::debug_surf!(
        wave.fire_turn,
        "Prediction for wave at {} gave up after {} ticks",
        wave.origin,
        ticks
    );
    Prediction {
        position: state.position,
        ticks,
        intercepted: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Battlefield;
    use assert_approx_eq::assert_approx_eq;

    fn wave_from(origin: Point, traveled: f64) -> Wave {
        let mut wave = Wave::new(origin, 0, 2.0, 0.0, SurfDirection::Right);
        wave.distance_traveled = traveled;
        wave
    }

    #[test]
    fn test_step_accelerates_and_caps_velocity() {
        let mut state = MotionState::new(Point::new(0.0, 0.0), 0.0, 0.0);
        state.step(0.0, 1.0);
        assert_approx_eq!(state.velocity, 1.0);
        assert_approx_eq!(state.position.x, 1.0);
        for _ in 0..20 {
            state.step(0.0, 1.0);
        }
        assert_approx_eq!(state.velocity, MAX_VELOCITY);
    }

    #[test]
    fn test_step_decelerates_when_reversing() {
        let mut state = MotionState::new(Point::new(0.0, 0.0), 0.0, 8.0);
        state.step(0.0, -1.0);
        assert_approx_eq!(state.velocity, 6.0);
        let mut braking = MotionState::new(Point::new(0.0, 0.0), 0.0, -1.5);
        braking.step(0.0, 0.0);
        assert_approx_eq!(braking.velocity, 0.0);
    }

    #[test]
    fn test_step_turn_is_rate_limited() {
        let mut state = MotionState::new(Point::new(0.0, 0.0), 0.0, 8.0);
        state.step(1.0, 1.0);
        assert_approx_eq!(state.heading, max_turn_rate(8.0));
        let mut still = MotionState::new(Point::new(0.0, 0.0), 0.0, 0.0);
        still.step(-1.0, 1.0);
        assert_approx_eq!(still.heading, -max_turn_rate(0.0));
    }

    #[test]
    fn test_prediction_stops_when_wave_arrives() {
        let battlefield = Battlefield::default();
        let smoother = WallSmoother::new(&battlefield);
        let origin = Point::new(600.0, 300.0);
        let start = MotionState::new(Point::new(600.0, 600.0), 0.0, 0.0);
        let wave = wave_from(origin, 14.0);

        let prediction = predict_position(start, &wave, SurfDirection::Right, &smoother);
        assert!(prediction.intercepted);
        assert!(prediction.ticks < 30);
        let reach = wave.distance_traveled + (prediction.ticks + 1) as f64 * wave.speed;
        assert!(prediction.position.distance(origin) < reach);
    }

    #[test]
    fn test_directions_diverge() {
        let battlefield = Battlefield::default();
        let smoother = WallSmoother::new(&battlefield);
        let origin = Point::new(600.0, 300.0);
        // Facing east, perpendicular to the wave, so either orbit is reachable head-on
        let start = MotionState::new(Point::new(600.0, 600.0), 0.0, 0.0);
        let wave = wave_from(origin, 14.0);

        let right = predict_position(start, &wave, SurfDirection::Right, &smoother);
        let left = predict_position(start, &wave, SurfDirection::Left, &smoother);
        // Counter-clockwise around an origin below us heads west
        assert!(right.position.x < 600.0);
        assert!(left.position.x > 600.0);
    }

    #[test]
    fn test_unreachable_wave_hits_step_budget() {
        let battlefield = Battlefield::default();
        let smoother = WallSmoother::new(&battlefield);
        let start = MotionState::new(Point::new(600.0, 600.0), 0.0, 0.0);
        let mut wave = wave_from(Point::new(600.0, 300.0), -1.0e6);
        wave.speed = 0.0;

        let prediction = predict_position(start, &wave, SurfDirection::Left, &smoother);
        assert!(!prediction.intercepted);
        assert_eq!(prediction.ticks, MAX_PREDICTION_TICKS);
        assert!(prediction.position.is_finite());
    }
}
