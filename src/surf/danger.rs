// Danger statistics over normalized escape-angle bins

use super::wave::Wave;
use crate::config::{BINS, MIDDLE_BIN};
use crate::types::Point;
use crate::utils::{absolute_bearing, limit, max_escape_angle, normalize_relative_angle};

/// Hit histogram indexed by guess factor. Lives for the whole match and never decays.
#[derive(Debug, Clone, PartialEq)]
pub struct DangerModel {
    bins: [f64; BINS],
}

impl DangerModel {
    pub fn new() -> Self {
        DangerModel { bins: [0.0; BINS] }
    }

    /// Bin of the guess factor `point` represents for `wave`, always within [0, BINS - 1].
    pub fn factor_index(wave: &Wave, point: Point) -> usize {
        let offset = normalize_relative_angle(absolute_bearing(wave.origin, point) - wave.reference_angle);
        let factor = offset / max_escape_angle(wave.speed) * wave.lateral_direction.sign();
        let middle = MIDDLE_BIN as f64;
        limit(0.0, factor * middle + middle, (BINS - 1) as f64).round() as usize
    }

    pub fn danger(&self, index: usize) -> f64 {
        self.bins.get(index).copied().unwrap_or(0.0)
    }

    pub fn bins(&self) -> &[f64; BINS] {
        &self.bins
    }

    /// Records a hit by `wave` at `hit_point`, spreading weight to neighbouring bins.
    pub fn reinforce(&mut self, wave: &Wave, hit_point: Point) -> usize {
        let index = Self::factor_index(wave, hit_point);
        self.reinforce_index(index);
        index
    }

    pub fn reinforce_index(&mut self, index: usize) {
        for (x, bin) in self.bins.iter_mut().enumerate() {
            let d = index as f64 - x as f64;
            *bin += 1.0 / (d * d + 1.0);
        }
    }

    /// Bin with the most recorded danger, lowest index on ties.
    pub fn peak(&self) -> usize {
        let mut best = 0;
        for (i, value) in self.bins.iter().enumerate() {
            if *value > self.bins[best] {
                best = i;
            }
        }
        best
    }
}

impl Default for DangerModel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SurfDirection;
    use crate::utils::project;
    use assert_approx_eq::assert_approx_eq;

    fn wave(direction: SurfDirection) -> Wave {
        Wave::new(Point::new(100.0, 100.0), 0, 2.0, 0.0, direction)
    }

    #[test]
    fn test_factor_index_head_on_is_middle() {
        let wave = wave(SurfDirection::Right);
        assert_eq!(DangerModel::factor_index(&wave, Point::new(500.0, 100.0)), MIDDLE_BIN);
    }

    #[test]
    fn test_factor_index_edges_and_mirroring() {
        let right = wave(SurfDirection::Right);
        let left = wave(SurfDirection::Left);
        let escape = max_escape_angle(right.speed);
        let at_max = project(right.origin, escape, 300.0);
        let past_max = project(right.origin, -2.0 * escape, 300.0);

        assert_eq!(DangerModel::factor_index(&right, at_max), BINS - 1);
        assert_eq!(DangerModel::factor_index(&left, at_max), 0);
        assert_eq!(DangerModel::factor_index(&right, past_max), 0);
        assert_eq!(DangerModel::factor_index(&left, past_max), BINS - 1);
    }

    #[test]
    fn test_factor_index_stays_in_range() {
        let wave = wave(SurfDirection::Left);
        for step in 0..72 {
            let angle = step as f64 * 5.0f64.to_radians();
            let index = DangerModel::factor_index(&wave, project(wave.origin, angle, 250.0));
            assert!(index < BINS);
        }
        // Standing on the origin still yields a valid bin
        assert!(DangerModel::factor_index(&wave, wave.origin) < BINS);
    }

    #[test]
    fn test_reinforce_center_bin() {
        let mut model = DangerModel::new();
        model.reinforce_index(23);
        assert_approx_eq!(model.danger(23), 1.0);
        assert_approx_eq!(model.danger(22), 0.5);
        assert_approx_eq!(model.danger(24), 0.5);
        assert_approx_eq!(model.danger(0), 1.0 / 530.0);
        assert_approx_eq!(model.danger(46), 1.0 / 530.0);
    }

    #[test]
    fn test_reinforce_decays_with_distance() {
        let mut model = DangerModel::new();
        model.reinforce_index(10);
        assert_approx_eq!(model.danger(10), 1.0);
        for x in 11..BINS {
            assert!(model.danger(x) > 0.0);
            assert!(model.danger(x) < model.danger(x - 1));
        }
        for x in 0..10 {
            assert!(model.danger(x) < model.danger(x + 1));
        }
        assert_eq!(model.peak(), 10);
    }

    #[test]
    fn test_reinforce_accumulates_at_hit_point() {
        let mut model = DangerModel::new();
        let wave = wave(SurfDirection::Right);
        let hit = Point::new(500.0, 100.0);
        let index = model.reinforce(&wave, hit);
        model.reinforce(&wave, hit);
        assert_eq!(index, MIDDLE_BIN);
        assert_approx_eq!(model.danger(MIDDLE_BIN), 2.0);
        assert_eq!(model.danger(BINS), 0.0);
    }
}
