// Movement policy: picks the safer surf direction and turns headings into body commands

use crate::config::{
    HIT_WALL_TURN, MOVE_DISTANCE, STUCK_CHECK_INTERVAL, STUCK_MIN_ENERGY, STUCK_NUDGE_DISTANCE,
};
use crate::surf::{DangerModel, MotionState, Wave, predict_position};
use crate::types::{Move, Point, SurfDirection};
use crate::utils::{absolute_bearing, normalize_relative_angle};
use crate::wall::{WallSegment, WallSmoother};
use std::f64::consts::{FRAC_PI_2, PI};

/// Turns towards `go_angle` by at most a quarter circle, reversing when that is shorter.
pub fn back_as_front(heading: f64, go_angle: f64) -> Move {
    let angle = normalize_relative_angle(go_angle - heading);
    if angle.abs() > FRAC_PI_2 {
        Move {
            turn: normalize_relative_angle(angle + PI),
            distance: -MOVE_DISTANCE,
        }
    } else {
        Move {
            turn: angle,
            distance: MOVE_DISTANCE,
        }
    }
}

/// Outcome of weighing both surf directions against one wave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfPlan {
    pub direction: SurfDirection,
    pub danger_left: f64,
    pub danger_right: f64,
    pub go_angle: f64,
    pub movement: Move,
}

/// Danger of the bin we would be standing in when `wave` arrives if we orbit `direction`.
pub fn check_danger(
    danger: &DangerModel,
    smoother: &WallSmoother<'_>,
    start: MotionState,
    wave: &Wave,
    direction: SurfDirection,
) -> f64 {
    let prediction = predict_position(start, wave, direction, smoother);
    danger.danger(DangerModel::factor_index(wave, prediction.position))
}

/// Picks the lower-danger orbit around `wave` and the body move that follows it.
/// Ties go left.
pub fn plan_surf(
    danger: &DangerModel,
    smoother: &WallSmoother<'_>,
    start: MotionState,
    wave: &Wave,
) -> SurfPlan {
    let danger_left = check_danger(danger, smoother, start, wave, SurfDirection::Left);
    let danger_right = check_danger(danger, smoother, start, wave, SurfDirection::Right);
    let direction = if danger_left <= danger_right {
        SurfDirection::Left
    } else {
        SurfDirection::Right
    };

    let orbit = absolute_bearing(wave.origin, start.position) + direction.sign() * FRAC_PI_2;
    let go_angle = smoother.smooth(start.position, orbit, direction);
    SurfPlan {
        direction,
        danger_left,
        danger_right,
        go_angle,
        movement: back_as_front(start.heading, go_angle),
    }
}

/// Slides along `wall` instead of driving into it.
pub fn slide_along_wall(
    wall: &WallSegment,
    position: Point,
    heading: f64,
    orientation: SurfDirection,
    smoother: &WallSmoother<'_>,
) -> Move {
    let go_angle = smoother.smooth(position, wall.rotation, orientation);
    back_as_front(heading, go_angle)
}

/// Back off and swing clockwise after touching the arena edge.
pub fn hit_wall_recovery() -> Move {
    Move {
        turn: -HIT_WALL_TURN,
        distance: -MOVE_DISTANCE,
    }
}

/// Notices when we have not moved at all between periodic checkpoints.
#[derive(Debug, Clone, Default)]
pub struct StuckDetector {
    ticks: u32,
    checkpoint: Option<Point>,
    pending_back: bool,
}

impl StuckDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per turn. Returns a nudge distance when one is due.
    pub fn update(&mut self, position: Point, energy: f64) -> Option<f64> {
        if self.pending_back {
            self.pending_back = false;
            return Some(-STUCK_NUDGE_DISTANCE);
        }

        self.ticks += 1;
        if self.ticks < STUCK_CHECK_INTERVAL {
            return None;
        }
        self.ticks = 0;

        let stuck = self.checkpoint == Some(position) && energy >= STUCK_MIN_ENERGY;
        self.checkpoint = Some(position);
        if stuck {
            self.pending_back = true;
            Some(STUCK_NUDGE_DISTANCE)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Battlefield;
    use crate::types::ScannedWall;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_back_as_front_forward() {
        let movement = back_as_front(0.0, 0.5);
        assert_approx_eq!(movement.turn, 0.5);
        assert_eq!(movement.distance, MOVE_DISTANCE);

        let movement = back_as_front(0.0, -0.5);
        assert_approx_eq!(movement.turn, -0.5);
    }

    #[test]
    fn test_back_as_front_reverses_past_quarter_turn() {
        // Target almost behind us on the left: reverse and swing clockwise
        let movement = back_as_front(0.0, 2.5);
        assert_eq!(movement.distance, -MOVE_DISTANCE);
        assert_approx_eq!(movement.turn, 2.5 - PI);

        let movement = back_as_front(0.0, -2.5);
        assert_eq!(movement.distance, -MOVE_DISTANCE);
        assert_approx_eq!(movement.turn, PI - 2.5);

        // Never turns more than a quarter circle
        for step in -30..=30 {
            let movement = back_as_front(1.0, step as f64 * 0.2);
            assert!(movement.turn.abs() <= FRAC_PI_2 + 1e-9);
        }
    }

    fn surf_fixture() -> (Battlefield, Wave, MotionState) {
        let battlefield = Battlefield::default();
        let wave = Wave::new(Point::new(600.0, 300.0), 0, 2.0, FRAC_PI_2, SurfDirection::Right);
        let start = MotionState::new(Point::new(600.0, 600.0), 0.0, 0.0);
        (battlefield, wave, start)
    }

    #[test]
    fn test_plan_surf_tie_goes_left() {
        let (battlefield, wave, start) = surf_fixture();
        let smoother = WallSmoother::new(&battlefield);
        let plan = plan_surf(&DangerModel::new(), &smoother, start, &wave);
        assert_eq!(plan.direction, SurfDirection::Left);
        assert_eq!(plan.danger_left, plan.danger_right);
        // Left orbit from due north of the origin heads east, straight ahead
        assert_approx_eq!(plan.go_angle, 0.0);
        assert_eq!(plan.movement.distance, MOVE_DISTANCE);
    }

    #[test]
    fn test_plan_surf_avoids_dangerous_side() {
        let (battlefield, wave, start) = surf_fixture();
        let smoother = WallSmoother::new(&battlefield);

        let left = predict_position(start, &wave, SurfDirection::Left, &smoother);
        let mut danger = DangerModel::new();
        let left_index = danger.reinforce(&wave, left.position);

        let plan = plan_surf(&danger, &smoother, start, &wave);
        assert_approx_eq!(plan.danger_left, danger.danger(left_index));
        assert!(plan.danger_left > plan.danger_right);
        assert_eq!(plan.direction, SurfDirection::Right);
        // Orbiting right from here means driving west, i.e. reversing
        assert_eq!(plan.movement.distance, -MOVE_DISTANCE);
    }

    #[test]
    fn test_slide_along_wall_follows_rotation() {
        let battlefield = Battlefield::default();
        let smoother = WallSmoother::new(&battlefield);
        let wall = WallSegment::from_scan(&ScannedWall {
            id: 1,
            center: Point::new(600.0, 700.0),
            width: 10.0,
            height: 300.0,
            rotation: 0.3,
        });
        let movement = slide_along_wall(&wall, Point::new(600.0, 600.0), 0.0, SurfDirection::Right, &smoother);
        assert_approx_eq!(movement.turn, 0.3);
        assert_eq!(movement.distance, MOVE_DISTANCE);
    }

    #[test]
    fn test_stuck_detector_nudges_forward_then_back() {
        let mut detector = StuckDetector::new();
        let spot = Point::new(100.0, 100.0);
        // First checkpoint only records the position
        for _ in 0..STUCK_CHECK_INTERVAL {
            assert_eq!(detector.update(spot, 100.0), None);
        }
        for _ in 0..STUCK_CHECK_INTERVAL - 1 {
            assert_eq!(detector.update(spot, 100.0), None);
        }
        assert_eq!(detector.update(spot, 100.0), Some(STUCK_NUDGE_DISTANCE));
        assert_eq!(detector.update(spot, 100.0), Some(-STUCK_NUDGE_DISTANCE));
    }

    #[test]
    fn test_stuck_detector_ignores_low_energy_and_movement() {
        let mut detector = StuckDetector::new();
        for i in 0..(3 * STUCK_CHECK_INTERVAL) {
            let spot = Point::new(100.0 + i as f64, 100.0);
            assert_eq!(detector.update(spot, 100.0), None);
        }
        let mut weak = StuckDetector::new();
        for _ in 0..(3 * STUCK_CHECK_INTERVAL) {
            assert_eq!(weak.update(Point::new(5.0, 5.0), 10.0), None);
        }
    }
}
