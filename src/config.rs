//! Configuration constants and runtime settings for the surfing agent.

use crate::error::ConfigError;

// Danger model
pub const BINS: usize = 47; // Number of escape-angle bins
pub const MIDDLE_BIN: usize = (BINS - 1) / 2; // Bin for a factor of 0.0

// Arena and wall smoothing
pub const DEFAULT_BATTLEFIELD_WIDTH: f64 = 1200.0;
pub const DEFAULT_BATTLEFIELD_HEIGHT: f64 = 1200.0;
pub const FIELD_MARGIN: f64 = 20.0; // Inset from each edge the smoother keeps clear
pub const WALL_STICK: f64 = 160.0; // Lookahead projection length
pub const SMOOTHING_EPSILON: f64 = 0.005; // Extra rotation so the angle never stagnates
pub const OBSTACLE_SMOOTHING_STEP: f64 = 0.05; // Rotation per iteration around wall segments
pub const MAX_SMOOTHING_ITERATIONS: u32 = 50;

// Waves
pub const WAVE_EXPIRY_MARGIN: f64 = 50.0; // Distance a wave may pass us before it is dropped
pub const HIT_MATCH_TOLERANCE: f64 = 50.0;
pub const SPEED_MATCH_TOLERANCE: f64 = 0.001;
pub const MIN_FIRE_ENERGY_DROP: f64 = 0.09;
pub const MAX_FIRE_ENERGY_DROP: f64 = 3.01;
pub const SURF_HISTORY_LEN: usize = 2;

// Robot physics
pub const MAX_VELOCITY: f64 = 8.0;
pub const ACCELERATION: f64 = 1.0;
pub const DECELERATION: f64 = 2.0;
pub const MAX_PREDICTION_TICKS: u32 = 500;
pub const BOT_RADIUS: f64 = 18.0;
pub const MAX_GUN_TURN_RATE: f64 = 20.0 * std::f64::consts::PI / 180.0;

// Movement commands
pub const MOVE_DISTANCE: f64 = 100.0;
pub const HIT_WALL_TURN: f64 = std::f64::consts::PI * 0.7;
pub const STUCK_CHECK_INTERVAL: u32 = 30;
pub const STUCK_MIN_ENERGY: f64 = 30.0;
pub const STUCK_NUDGE_DISTANCE: f64 = 10.0;

// Gun
pub const FIRE_ALIGNMENT: f64 = 0.1; // Max remaining gun turn (radians) that still fires
pub const MIN_BULLET_POWER: f64 = 0.1;
pub const MAX_BULLET_POWER: f64 = 3.0;
pub const MIN_FIRE_ENERGY: f64 = 15.0; // At or below this we hold fire
pub const DEFAULT_MAX_FIRE_DISTANCE: f64 = 1200.0;
pub const POWER_DISTANCE_SCALE: f64 = 800.0;
pub const AGGRESSIVE_ENERGY: f64 = 40.0;
pub const AGGRESSIVE_POWER_BOOST: f64 = 1.2;
pub const SLOW_TARGET_SPEED: f64 = 0.5;
pub const WEAK_TARGET_ENERGY: f64 = 20.0;

/// Dimensions of the rectangular arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Battlefield {
    pub width: f64,
    pub height: f64,
}

impl Battlefield {
    pub fn new(width: f64, height: f64) -> Result<Self, ConfigError> {
        let battlefield = Battlefield { width, height };
        battlefield.validate()?;
        Ok(battlefield)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let min = 2.0 * FIELD_MARGIN;
        if !self.width.is_finite()
            || !self.height.is_finite()
            || self.width <= min
            || self.height <= min
        {
            return Err(ConfigError::InvalidBattlefield {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

impl Default for Battlefield {
    fn default() -> Self {
        Battlefield {
            width: DEFAULT_BATTLEFIELD_WIDTH,
            height: DEFAULT_BATTLEFIELD_HEIGHT,
        }
    }
}

/// Runtime settings for one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentConfig {
    pub battlefield: Battlefield,
    pub avoid_obstacles: bool, // Smooth around scanned wall segments as well as the arena edge
    pub max_fire_distance: f64,
    pub seed: Option<u64>, // Seed for the agent's own RNG; entropy when None
}

impl AgentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.battlefield.validate()?;
        if !(self.max_fire_distance.is_finite() && self.max_fire_distance > 0.0) {
            return Err(ConfigError::InvalidFireDistance(self.max_fire_distance));
        }
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            battlefield: Battlefield::default(),
            avoid_obstacles: true,
            max_fire_distance: DEFAULT_MAX_FIRE_DISTANCE,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_battlefield_is_valid() {
        assert!(Battlefield::default().validate().is_ok());
        assert!(AgentConfig::default().validate().is_ok());
    }

    #[test]
    fn test_battlefield_rejects_degenerate_sizes() {
        assert_eq!(
            Battlefield::new(40.0, 600.0),
            Err(ConfigError::InvalidBattlefield {
                width: 40.0,
                height: 600.0
            })
        );
        assert!(Battlefield::new(f64::NAN, 600.0).is_err());
        assert!(Battlefield::new(800.0, 600.0).is_ok());
    }

    #[test]
    fn test_agent_config_rejects_bad_fire_distance() {
        let config = AgentConfig {
            max_fire_distance: -1.0,
            ..AgentConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidFireDistance(-1.0)));
    }
}
