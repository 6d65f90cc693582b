// Enemy wave tracking: creation from energy drops, expiry, and hit matching

use crate::config::{
    HIT_MATCH_TOLERANCE, MAX_FIRE_ENERGY_DROP, MIN_FIRE_ENERGY_DROP, SPEED_MATCH_TOLERANCE,
    SURF_HISTORY_LEN, WAVE_EXPIRY_MARGIN,
};
use crate::types::{Point, SurfDirection};
use crate::utils::bullet_speed;
use std::collections::VecDeque;

/// An enemy bullet in flight, tracked as an expanding circle around its fire position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wave {
    pub origin: Point,
    pub fire_turn: u32,
    pub speed: f64,
    pub reference_angle: f64, // Bearing from origin to us when it was fired
    pub lateral_direction: SurfDirection, // Our orbit direction when it was fired
    pub distance_traveled: f64,
}

impl Wave {
    pub fn new(
        origin: Point,
        fire_turn: u32,
        power: f64,
        reference_angle: f64,
        lateral_direction: SurfDirection,
    ) -> Self {
        let speed = bullet_speed(power);
        Wave {
            origin,
            fire_turn,
            speed,
            reference_angle,
            lateral_direction,
            distance_traveled: speed,
        }
    }

    /// Remaining gap between the wave front and `position`.
    pub fn distance_remaining(&self, position: Point) -> f64 {
        position.distance(self.origin) - self.distance_traveled
    }

    pub fn has_passed(&self, position: Point) -> bool {
        self.distance_traveled > position.distance(self.origin) + WAVE_EXPIRY_MARGIN
    }
}

/// One radar sample used to back-fill the reference values of a new wave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfSample {
    pub direction: SurfDirection,
    pub bearing: f64, // Bearing from the opponent to us
}

/// The most recent surf samples, newest first.
#[derive(Debug, Clone, Default)]
pub struct SurfHistory {
    samples: VecDeque<SurfSample>,
}

impl SurfHistory {
    pub fn new() -> Self {
        SurfHistory {
            samples: VecDeque::with_capacity(SURF_HISTORY_LEN),
        }
    }

    pub fn push(&mut self, direction: SurfDirection, bearing: f64) {
        self.samples.push_front(SurfSample { direction, bearing });
        self.samples.truncate(SURF_HISTORY_LEN);
    }

    /// Sample `turns_ago` scans back, 0 being the latest.
    pub fn get(&self, turns_ago: usize) -> Option<SurfSample> {
        self.samples.get(turns_ago).copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Owns every enemy wave currently in the air.
#[derive(Debug, Clone, Default)]
pub struct WaveTracker {
    waves: Vec<Wave>,
    created: u32, // Waves created since construction, including expired ones
}

impl WaveTracker {
    pub fn new() -> Self {
        WaveTracker {
            waves: Vec::new(),
            created: 0,
        }
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    pub fn created(&self) -> u32 {
        self.created
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    pub fn clear(&mut self) {
        self.waves.clear();
    }

    /// Recomputes how far each wave has travelled and drops the ones that have passed us.
    pub fn advance(&mut self, current_turn: u32, defender: Point) {
        let before = self.waves.len();
        self.waves.retain_mut(|wave| {
            wave.distance_traveled =
                current_turn.saturating_sub(wave.fire_turn) as f64 * wave.speed;
            !wave.has_passed(defender)
        });
        let expired = before - self.waves.len();
        if expired > 0 {
            crate::debug_wave!(current_turn, "Expired {} wave(s), {} left", expired, self.waves.len());
        }
    }

    /// Creates a wave if the opponent's energy drop looks like a shot fired last turn.
    ///
    /// `opponent_position` is where the opponent was on the previous scan and
    /// `energy_delta` is the change in its energy since then.
    pub fn try_create_wave(
        &mut self,
        current_turn: u32,
        defender: Point,
        opponent_position: Point,
        energy_delta: f64,
        history: &SurfHistory,
    ) -> Option<&Wave> {
        let power = -energy_delta;
        if !(power > MIN_FIRE_ENERGY_DROP && power < MAX_FIRE_ENERGY_DROP) {
            return None;
        }
        // The shot left one turn ago, so its reference values come from the previous sample
        let sample = match (history.len() >= 2, history.get(1)) {
            (true, Some(sample)) => sample,
            _ => return None,
        };

        let wave = Wave::new(
            opponent_position,
            current_turn.saturating_sub(1),
            power,
            sample.bearing,
            sample.direction,
        );
        crate::debug_wave!(
            current_turn,
            "New wave from {} power {:.2} speed {:.1}, {:.0} away",
            wave.origin,
            power,
            wave.speed,
            defender.distance(wave.origin)
        );
        self.waves.push(wave);
        self.created += 1;
        self.waves.last()
    }

    /// Nearest wave that has not yet reached us.
    pub fn closest_surfable(&self, defender: Point) -> Option<&Wave> {
        self.waves
            .iter()
            .map(|wave| (wave, wave.distance_remaining(defender)))
            .filter(|(wave, remaining)| *remaining > wave.speed)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(wave, _)| wave)
    }

    /// Index of the first wave consistent with a bullet of `hit_speed` hitting us now.
    pub fn match_hit(&self, defender: Point, hit_speed: f64) -> Option<usize> {
        self.waves.iter().position(|wave| {
            (wave.distance_traveled - defender.distance(wave.origin)).abs() < HIT_MATCH_TOLERANCE
                && (hit_speed - wave.speed).abs() < SPEED_MATCH_TOLERANCE
        })
    }

    pub fn remove(&mut self, index: usize) -> Option<Wave> {
        if index < self.waves.len() {
            Some(self.waves.remove(index))
        } else {
            None
        }
    }

    /// Matches a hit and removes the wave that caused it.
    pub fn take_hit(&mut self, defender: Point, hit_speed: f64) -> Option<Wave> {
        let index = self.match_hit(defender, hit_speed)?;
        self.remove(index)
    }

    #[cfg(test)]
    pub(crate) fn push(&mut self, wave: Wave) {
        self.waves.push(wave);
    }
}
