use crate::config::{MAX_VELOCITY, MIN_BULLET_POWER};
use crate::types::Point;
use std::f64::consts::{PI, TAU};

/// Normalize an angle to (-PI, PI]
pub fn normalize_relative_angle(angle: f64) -> f64 {
    let mut wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped -= TAU;
    }
    wrapped
}

/// Normalize an angle to [0, TAU)
pub fn normalize_absolute_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Absolute angle from source to target
pub fn absolute_bearing(source: Point, target: Point) -> f64 {
    (target.y - source.y).atan2(target.x - source.x)
}

/// Point reached by travelling `length` from `source` along `angle`
pub fn project(source: Point, angle: f64, length: f64) -> Point {
    Point {
        x: source.x + angle.cos() * length,
        y: source.y + angle.sin() * length,
    }
}

/// Constrain a value between min and max
pub fn limit(min: f64, value: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Bullet travel per turn for a given fire power
pub fn bullet_speed(power: f64) -> f64 {
    20.0 - 3.0 * power
}

/// Widest angle a target moving at full speed can reach during a bullet's flight
pub fn max_escape_angle(speed: f64) -> f64 {
    limit(-1.0, MAX_VELOCITY / speed, 1.0).asin()
}

/// Maximum body turn per turn at a given velocity
pub fn max_turn_rate(velocity: f64) -> f64 {
    PI / 720.0 * (40.0 - 3.0 * velocity.abs())
}

/// Damage dealt by a bullet of the given power
pub fn bullet_damage(power: f64) -> f64 {
    let power = power.max(MIN_BULLET_POWER);
    4.0 * power + (2.0 * (power - 1.0)).max(0.0)
}

/// Shortest distance from `point` to the segment `a`-`b`
pub fn distance_to_segment(point: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return point.distance(a);
    }
    let t = limit(
        0.0,
        ((point.x - a.x) * dx + (point.y - a.y) * dy) / length_sq,
        1.0,
    );
    point.distance(Point {
        x: a.x + t * dx,
        y: a.y + t * dy,
    })
}

/// Whether segments `p1`-`p2` and `q1`-`q2` cross or touch
pub fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    fn orientation(a: Point, b: Point, c: Point) -> f64 {
        (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
    }
    fn on_segment(a: Point, b: Point, c: Point) -> bool {
        c.x >= a.x.min(b.x) && c.x <= a.x.max(b.x) && c.y >= a.y.min(b.y) && c.y <= a.y.max(b.y)
    }

    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}
