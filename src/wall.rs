//! Wall smoothing against the arena edge and scanned wall obstacles.
//!
//! The smoother projects a fixed-length "stick" from the bot along the desired heading and
//! rotates the heading until the tip of the stick is back inside the playable field. Against
//! the arena edge the rotation is solved directly so the tip lands on the edge, which makes
//! the bot hug walls instead of bouncing off them. Against obstacle segments it steps by a
//! fixed angle until the stick no longer crosses one.

use crate::config::{
    Battlefield, FIELD_MARGIN, MAX_SMOOTHING_ITERATIONS, OBSTACLE_SMOOTHING_STEP,
    SMOOTHING_EPSILON, WALL_STICK,
};
use crate::types::{Point, ScannedWall, SurfDirection};
use crate::utils::{distance_to_segment, limit, project, segments_intersect};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// The playable rectangle, inset from the arena edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl Field {
    pub fn inset(battlefield: &Battlefield, margin: f64) -> Self {
        Field {
            left: margin,
            bottom: margin,
            right: battlefield.width - margin,
            top: battlefield.height - margin,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.bottom && point.y < self.top
    }

    // Distance to the nearer of the two vertical edges, negative when outside
    fn x_clearance(&self, point: Point) -> f64 {
        (point.x - self.left).min(self.right - point.x)
    }

    // Distance to the nearer of the two horizontal edges, negative when outside
    fn y_clearance(&self, point: Point) -> f64 {
        (point.y - self.bottom).min(self.top - point.y)
    }
}

/// A scanned wall obstacle reduced to the line segment through its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSegment {
    pub id: i32,
    pub center: Point,
    pub rotation: f64,
    pub start: Point,
    pub end: Point,
}

impl WallSegment {
    pub fn from_scan(scan: &ScannedWall) -> Self {
        let half = scan.height / 2.0;
        WallSegment {
            id: scan.id,
            center: scan.center,
            rotation: scan.rotation,
            start: project(scan.center, scan.rotation, half),
            end: project(scan.center, scan.rotation, -half),
        }
    }

    pub fn distance_to(&self, point: Point) -> f64 {
        distance_to_segment(point, self.start, self.end)
    }

    pub fn crosses(&self, from: Point, to: Point) -> bool {
        segments_intersect(from, to, self.start, self.end)
    }
}

/// Wall obstacles seen so far, keyed by id. The first sighting of an id wins.
#[derive(Debug, Clone, Default)]
pub struct ObstacleMap {
    walls: HashMap<i32, WallSegment>,
}

impl ObstacleMap {
    pub fn new() -> Self {
        ObstacleMap {
            walls: HashMap::new(),
        }
    }

    /// Inserts the wall unless its id is already known. Returns the stored segment.
    pub fn observe(&mut self, scan: &ScannedWall) -> &WallSegment {
        match self.walls.entry(scan.id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                crate::debug_wall!("Mapped wall {} at {}", scan.id, scan.center);
                entry.insert(WallSegment::from_scan(scan))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    pub fn clear(&mut self) {
        self.walls.clear();
    }

    /// Closest known wall and its distance from `position`.
    pub fn nearest(&self, position: Point) -> Option<(&WallSegment, f64)> {
        self.walls
            .values()
            .map(|wall| (wall, wall.distance_to(position)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
    }

    pub fn crossed_by(&self, from: Point, to: Point) -> bool {
        self.walls.values().any(|wall| wall.crosses(from, to))
    }
}

/// Deflects desired headings so the bot keeps clear of walls.
#[derive(Debug, Clone, Copy)]
pub struct WallSmoother<'a> {
    field: Field,
    obstacles: Option<&'a ObstacleMap>,
}

impl<'a> WallSmoother<'a> {
    pub fn new(battlefield: &Battlefield) -> Self {
        WallSmoother {
            field: Field::inset(battlefield, FIELD_MARGIN),
            obstacles: None,
        }
    }

    pub fn with_obstacles(mut self, obstacles: &'a ObstacleMap) -> Self {
        self.obstacles = Some(obstacles);
        self
    }

    fn obstacle_in_way(&self, from: Point, to: Point) -> bool {
        self.obstacles.is_some_and(|walls| walls.crossed_by(from, to))
    }

    /// Rotates `angle` in the `orientation` sense until a `WALL_STICK` projection from
    /// `position` is clear. Gives up after `MAX_SMOOTHING_ITERATIONS` and returns the last
    /// candidate.
    pub fn smooth(&self, position: Point, angle: f64, orientation: SurfDirection) -> f64 {
        let sign = orientation.sign();
        let wall_distance_x = self.field.x_clearance(position).abs();
        let wall_distance_y = self.field.y_clearance(position).abs();

        let mut candidate = angle;
        let mut adjacent = 0.0;
        for _ in 0..MAX_SMOOTHING_ITERATIONS {
            let test = project(position, candidate, WALL_STICK);
            let inside = self.field.contains(test);
            if inside && !self.obstacle_in_way(position, test) {
                return candidate;
            }

            // Snapping below needs a non-negative angle
            candidate = candidate.rem_euclid(TAU);

            if inside {
                candidate += sign * OBSTACLE_SMOOTHING_STEP;
                continue;
            }

            let test_x = self.field.x_clearance(test);
            let test_y = self.field.y_clearance(test);
            if test_y < 0.0 && test_y < test_x {
                // Top or bottom edge: point straight at it
                candidate = (candidate / PI).floor() * PI + FRAC_PI_2;
                adjacent = wall_distance_y;
            } else if test_x < 0.0 && test_x <= test_y {
                // Left or right edge: point straight at it
                candidate = ((candidate + FRAC_PI_2) / PI).floor() * PI;
                adjacent = wall_distance_x;
            }

            // Rotate off the edge just far enough for the stick tip to touch it
            candidate += sign * (limit(-1.0, adjacent / WALL_STICK, 1.0).acos().abs() + SMOOTHING_EPSILON);
        }

        crate::debug_wall!(
            "Smoothing at {} did not converge, using {:.3}",
            position,
            candidate
        );
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn battlefield() -> Battlefield {
        Battlefield::new(800.0, 600.0).unwrap()
    }

    fn wall_scan(id: i32, center: Point, rotation: f64) -> ScannedWall {
        ScannedWall {
            id,
            center,
            width: 10.0,
            height: 200.0,
            rotation,
        }
    }

    #[test]
    fn test_field_contains() {
        let field = Field::inset(&battlefield(), FIELD_MARGIN);
        assert!(field.contains(Point::new(20.0, 20.0)));
        assert!(field.contains(Point::new(400.0, 300.0)));
        assert!(!field.contains(Point::new(780.0, 300.0)));
        assert!(!field.contains(Point::new(400.0, 10.0)));
    }

    #[test]
    fn test_open_space_leaves_angle_unchanged() {
        let smoother = WallSmoother::new(&battlefield());
        let position = Point::new(400.0, 300.0);
        for step in -12..=12 {
            let angle = step as f64 * 0.5;
            assert_eq!(smoother.smooth(position, angle, SurfDirection::Right), angle);
            assert_eq!(smoother.smooth(position, angle, SurfDirection::Left), angle);
        }
    }

    #[test]
    fn test_smoothing_keeps_projection_inside() {
        let battlefield = battlefield();
        let smoother = WallSmoother::new(&battlefield);
        let field = Field::inset(&battlefield, FIELD_MARGIN);
        // 60 units from the right edge, heading straight at it
        let position = Point::new(740.0, 300.0);

        for orientation in [SurfDirection::Left, SurfDirection::Right] {
            let angle = smoother.smooth(position, 0.0, orientation);
            assert!(field.contains(project(position, angle, WALL_STICK)));
            // Hugging: the tip lands right at the edge
            let tip = project(position, angle, WALL_STICK);
            assert!(field.right - tip.x < 1.0);
        }
    }

    #[test]
    fn test_orientation_picks_the_rotation_sense() {
        let smoother = WallSmoother::new(&battlefield());
        let position = Point::new(740.0, 300.0);
        let right = smoother.smooth(position, 0.0, SurfDirection::Right);
        let left = smoother.smooth(position, 0.0, SurfDirection::Left);
        // Counter-clockwise turns up the wall, clockwise turns down it
        assert!(project(position, right, WALL_STICK).y > position.y);
        assert!(project(position, left, WALL_STICK).y < position.y);
    }

    #[test]
    fn test_corner_converges() {
        let battlefield = battlefield();
        let smoother = WallSmoother::new(&battlefield);
        let field = Field::inset(&battlefield, FIELD_MARGIN);
        let position = Point::new(60.0, 60.0);
        let angle = smoother.smooth(position, -3.0 * FRAC_PI_2 / 2.0, SurfDirection::Right);
        assert!(field.contains(project(position, angle, WALL_STICK)));
    }

    #[test]
    fn test_obstacle_map_first_sighting_wins() {
        let mut walls = ObstacleMap::new();
        walls.observe(&wall_scan(7, Point::new(100.0, 100.0), 0.0));
        let kept = *walls.observe(&wall_scan(7, Point::new(500.0, 500.0), 1.0));
        assert_eq!(walls.len(), 1);
        assert_eq!(kept.center, Point::new(100.0, 100.0));
        assert_approx_eq!(kept.start.x, 200.0);
        assert_approx_eq!(kept.end.x, 0.0);
    }

    #[test]
    fn test_nearest_wall() {
        let mut walls = ObstacleMap::new();
        walls.observe(&wall_scan(1, Point::new(100.0, 100.0), 0.0));
        walls.observe(&wall_scan(2, Point::new(400.0, 400.0), FRAC_PI_2));
        let (wall, distance) = walls.nearest(Point::new(420.0, 400.0)).unwrap();
        assert_eq!(wall.id, 2);
        assert_approx_eq!(distance, 20.0);
        assert!(ObstacleMap::new().nearest(Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_boxed_in_smoothing_gives_up() {
        let battlefield = battlefield();
        let mut walls = ObstacleMap::new();
        // Every stick from the center crosses one of these
        walls.observe(&wall_scan(1, Point::new(480.0, 300.0), FRAC_PI_2));
        walls.observe(&wall_scan(2, Point::new(320.0, 300.0), FRAC_PI_2));
        walls.observe(&wall_scan(3, Point::new(400.0, 380.0), 0.0));
        walls.observe(&wall_scan(4, Point::new(400.0, 220.0), 0.0));
        let position = Point::new(400.0, 300.0);

        let angle = WallSmoother::new(&battlefield)
            .with_obstacles(&walls)
            .smooth(position, 0.0, SurfDirection::Right);
        assert!(angle.is_finite());
        assert_approx_eq!(angle, MAX_SMOOTHING_ITERATIONS as f64 * OBSTACLE_SMOOTHING_STEP);
        assert!(walls.crossed_by(position, project(position, angle, WALL_STICK)));
    }

    #[test]
    fn test_smoothing_steers_around_obstacles() {
        let battlefield = battlefield();
        let mut walls = ObstacleMap::new();
        // Vertical wall 80 units ahead of us
        walls.observe(&wall_scan(3, Point::new(480.0, 300.0), FRAC_PI_2));
        let position = Point::new(400.0, 300.0);

        let plain = WallSmoother::new(&battlefield).smooth(position, 0.0, SurfDirection::Right);
        assert_eq!(plain, 0.0);

        let aware = WallSmoother::new(&battlefield)
            .with_obstacles(&walls)
            .smooth(position, 0.0, SurfDirection::Right);
        assert!(aware > 0.0);
        assert!(!walls.crossed_by(position, project(position, aware, WALL_STICK)));
    }
}
