use std::fmt;

/// A position in arena coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Lateral direction relative to an incoming wave.
/// Right orbits the wave origin counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfDirection {
    Left,
    Right,
}

impl SurfDirection {
    pub fn sign(self) -> f64 {
        match self {
            SurfDirection::Left => -1.0,
            SurfDirection::Right => 1.0,
        }
    }

    /// Zero lateral velocity counts as Right.
    pub fn from_lateral_velocity(velocity: f64) -> Self {
        if velocity >= 0.0 {
            SurfDirection::Right
        } else {
            SurfDirection::Left
        }
    }
}

/// Own telemetry delivered by the simulation at the start of every turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotState {
    pub turn: u32,
    pub position: Point,
    pub heading: f64, // Body direction in radians
    pub speed: f64,   // Signed, +forward / -backward
    pub energy: f64,
    pub gun_heading: f64,
    pub radar_heading: f64,
}

impl BotState {
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.heading.is_finite()
            && self.speed.is_finite()
            && self.energy.is_finite()
            && self.gun_heading.is_finite()
            && self.radar_heading.is_finite()
    }
}

impl Default for BotState {
    fn default() -> Self {
        BotState {
            turn: 0,
            position: Point::default(),
            heading: 0.0,
            speed: 0.0,
            energy: 100.0,
            gun_heading: 0.0,
            radar_heading: 0.0,
        }
    }
}

/// An opponent seen by the radar this turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScannedBot {
    pub id: i32,
    pub position: Point,
    pub heading: f64,
    pub speed: f64,
    pub energy: f64,
}

/// A wall obstacle seen by the radar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScannedWall {
    pub id: i32,
    pub center: Point,
    pub width: f64, // Thickness, not used: walls are mapped as segments through the center
    pub height: f64, // Length of the wall along its rotation
    pub rotation: f64,
}

/// One of our own hits taken from an enemy bullet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitByBullet {
    pub position: Point, // Bullet position at impact
    pub power: f64,
}

/// Inputs delivered by the simulation during a turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    ScannedBot(ScannedBot),
    ScannedWall(ScannedWall),
    HitByBullet(HitByBullet),
    HitWall,
    HitBot,
    BotDeath { id: i32 },
}

impl Event {
    /// Dispatch priority, higher runs first.
    pub fn priority(&self) -> u32 {
        match self {
            Event::ScannedBot(_) => 120,
            Event::HitWall => 100,
            Event::ScannedWall(_) => 90,
            Event::HitByBullet(_) => 60,
            Event::HitBot => 40,
            Event::BotDeath { .. } => 30,
        }
    }
}

/// Commands issued for the current turn. `None` leaves the previous order in place.
/// Turns are radians, positive is counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Commands {
    pub body_turn: Option<f64>,
    pub gun_turn: Option<f64>,
    pub radar_turn: Option<f64>,
    pub distance: Option<f64>, // +forward / -backward
    pub fire: Option<f64>,     // Bullet power
    pub rescan: bool,
}

impl Commands {
    pub fn set_move(&mut self, movement: Move) {
        self.body_turn = Some(movement.turn);
        self.distance = Some(movement.distance);
    }
}

/// A body turn paired with a travel distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    pub turn: f64,
    pub distance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_approx_eq!(a.distance(b), 5.0);
        assert_approx_eq!(b.distance(a), 5.0);
    }

    #[test]
    fn test_surf_direction_sign() {
        assert_eq!(SurfDirection::Left.sign(), -1.0);
        assert_eq!(SurfDirection::Right.sign(), 1.0);
        assert_eq!(SurfDirection::from_lateral_velocity(0.0), SurfDirection::Right);
        assert_eq!(SurfDirection::from_lateral_velocity(-0.1), SurfDirection::Left);
    }

    #[test]
    fn test_event_priorities() {
        let scan = Event::ScannedBot(ScannedBot {
            id: 1,
            position: Point::default(),
            heading: 0.0,
            speed: 0.0,
            energy: 100.0,
        });
        let hit = Event::HitByBullet(HitByBullet {
            position: Point::default(),
            power: 1.0,
        });
        assert!(scan.priority() > Event::HitWall.priority());
        assert!(Event::HitWall.priority() > hit.priority());
        assert!(hit.priority() > Event::HitBot.priority());
        assert!(Event::HitBot.priority() > Event::BotDeath { id: 1 }.priority());
    }
}
