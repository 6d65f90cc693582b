// Targeting: gun bearing, fire readiness and bullet power

use crate::config::{
    AGGRESSIVE_ENERGY, AGGRESSIVE_POWER_BOOST, FIRE_ALIGNMENT, MAX_BULLET_POWER,
    MIN_BULLET_POWER, MIN_FIRE_ENERGY, POWER_DISTANCE_SCALE, SLOW_TARGET_SPEED,
    WEAK_TARGET_ENERGY,
};
use crate::types::{BotState, ScannedBot};
use crate::utils::{absolute_bearing, normalize_relative_angle};

/// What the gun should do this turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GunOrder {
    pub turn: f64,
    pub fire: Option<f64>,
}

/// Bullet power for a target, or 0.0 when we should hold fire.
///
/// `known_energy` is the target's energy from the previous scan.
pub fn optimal_power(
    me: &BotState,
    target: &ScannedBot,
    known_energy: f64,
    max_fire_distance: f64,
) -> f64 {
    let distance = me.position.distance(target.position);
    if me.energy <= MIN_FIRE_ENERGY || distance > max_fire_distance {
        return 0.0;
    }

    let mut power = MAX_BULLET_POWER.min(POWER_DISTANCE_SCALE / distance);
    if target.energy > me.energy {
        // Outgunned: cheap shots only
        power = 1.0;
    } else if me.energy > AGGRESSIVE_ENERGY
        && (target.speed.abs() < SLOW_TARGET_SPEED || known_energy < WEAK_TARGET_ENERGY)
    {
        power = MAX_BULLET_POWER.min(power * AGGRESSIVE_POWER_BOOST);
    }

    power.clamp(MIN_BULLET_POWER, MAX_BULLET_POWER)
}

/// Points the gun straight at the target and fires once it is lined up.
pub fn aim(me: &BotState, target: &ScannedBot, known_energy: f64, max_fire_distance: f64) -> GunOrder {
    let bearing = absolute_bearing(me.position, target.position);
    let turn = normalize_relative_angle(bearing - me.gun_heading);
    let power = optimal_power(me, target, known_energy, max_fire_distance);

    let fire = if power > 0.0 && turn.abs() < FIRE_ALIGNMENT {
        crate::debug_gun!(me.turn, "Firing power {:.2} at {}", power, target.position);
        Some(power)
    } else {
        None
    };
    GunOrder { turn, fire }
}
