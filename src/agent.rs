//! The surfing agent: per-match decision state and the handlers for each input event.
//!
//! The simulation calls [`Agent::update_status`] with our own telemetry at the start of a
//! turn and then [`Agent::dispatch`] with that turn's events. Handlers run in a fixed
//! priority order and write into a shared [`Commands`]; later handlers overwrite earlier
//! ones field by field.

use crate::config::{AgentConfig, MOVE_DISTANCE, WALL_STICK};
use crate::error::ConfigError;
use crate::gun;
use crate::movement::{self, StuckDetector};
use crate::surf::{DangerModel, MotionState, SurfHistory, WaveTracker};
use crate::types::{BotState, Commands, Event, HitByBullet, Point, ScannedBot, ScannedWall, SurfDirection};
use crate::utils::{absolute_bearing, bullet_speed, normalize_relative_angle, project};
use crate::wall::{ObstacleMap, WallSegment, WallSmoother};
use log::{debug, warn};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::f64::consts::PI;

/// Last scanned state of one opponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyTrack {
    pub id: i32,
    pub position: Point,
    pub energy: f64,
}

// Scan state of one opponent; energy drops and surf samples never mix across opponents
#[derive(Debug, Clone, Default)]
struct Opponent {
    track: Option<EnemyTrack>,
    history: SurfHistory,
}

#[derive(Debug)]
pub struct Agent {
    config: AgentConfig,
    danger: DangerModel,
    waves: WaveTracker,
    opponents: HashMap<i32, Opponent>,
    walls: ObstacleMap,
    me: BotState,
    stuck: StuckDetector,
    rng: StdRng,
}

impl Agent {
    pub fn new(config: AgentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Agent {
            config,
            danger: DangerModel::new(),
            waves: WaveTracker::new(),
            opponents: HashMap::new(),
            walls: ObstacleMap::new(),
            me: BotState::default(),
            stuck: StuckDetector::new(),
            rng,
        })
    }

    pub fn danger(&self) -> &DangerModel {
        &self.danger
    }

    pub fn waves(&self) -> &WaveTracker {
        &self.waves
    }

    pub fn walls(&self) -> &ObstacleMap {
        &self.walls
    }

    pub fn enemy(&self, id: i32) -> Option<&EnemyTrack> {
        self.opponents.get(&id).and_then(|opponent| opponent.track.as_ref())
    }

    pub fn opponent_count(&self) -> usize {
        self.opponents.len()
    }

    pub fn status(&self) -> &BotState {
        &self.me
    }

    /// Starts a new round. Everything but the danger statistics is forgotten.
    pub fn new_round(&mut self) {
        self.waves.clear();
        self.opponents.clear();
        self.walls.clear();
        self.stuck.reset();
        self.me = BotState::default();
    }

    fn smoother(&self) -> WallSmoother<'_> {
        let smoother = WallSmoother::new(&self.config.battlefield);
        if self.config.avoid_obstacles {
            smoother.with_obstacles(&self.walls)
        } else {
            smoother
        }
    }

    /// Ingests our own telemetry for the turn. Returns a stuck-recovery nudge if one is due.
    pub fn update_status(&mut self, state: BotState) -> Commands {
        let mut commands = Commands::default();
        if !state.is_finite() {
            warn!("Ignoring non-finite telemetry for turn {}", state.turn);
            return commands;
        }
        self.me = state;
        if let Some(nudge) = self.stuck.update(state.position, state.energy) {
            debug!("Stuck at {}, nudging {:.0}", state.position, nudge);
            commands.distance = Some(nudge);
        }
        commands
    }

    /// Runs every event of the turn in priority order and returns the combined commands.
    pub fn dispatch(&mut self, events: &[Event]) -> Commands {
        let mut ordered = events.to_vec();
        // Stable, so same-priority events keep their delivery order
        ordered.sort_by_key(|event| std::cmp::Reverse(event.priority()));

        let mut commands = Commands::default();
        for event in &ordered {
            self.handle(event, &mut commands);
        }
        commands
    }

    pub fn handle(&mut self, event: &Event, commands: &mut Commands) {
        match event {
            Event::ScannedBot(scan) => self.on_scanned_bot(scan, commands),
            Event::ScannedWall(scan) => self.on_scanned_wall(scan, commands),
            Event::HitByBullet(hit) => self.on_hit_by_bullet(hit, commands),
            Event::HitWall => self.on_hit_wall(commands),
            Event::HitBot => self.on_hit_bot(commands),
            Event::BotDeath { id } => self.on_bot_death(*id),
        }
    }

    fn on_scanned_bot(&mut self, scan: &ScannedBot, commands: &mut Commands) {
        if !scan.position.is_finite() || !scan.energy.is_finite() {
            warn!("Ignoring non-finite scan of bot {}", scan.id);
            return;
        }
        let me = self.me;
        let turn = me.turn;

        let bearing_to_enemy = absolute_bearing(me.position, scan.position);
        let bearing_from_enemy = bearing_to_enemy + PI;
        let lateral_velocity = me.speed * (me.heading - bearing_from_enemy).sin();

        // Gun first, it judges the target against the energy we knew before this scan
        let known_energy = self.enemy(scan.id).map_or(scan.energy, |enemy| enemy.energy);
        let order = gun::aim(&me, scan, known_energy, self.config.max_fire_distance);
        commands.gun_turn = Some(order.turn);
        commands.fire = order.fire;

        // Keep the radar locked, overshooting so the beam sweeps past the target
        commands.radar_turn = Some(normalize_relative_angle(bearing_to_enemy - me.radar_heading) * 2.0);

        let opponent = match self.opponents.entry(scan.id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!("Tracking opponent {}", scan.id);
                entry.insert(Opponent::default())
            }
        };
        opponent
            .history
            .push(SurfDirection::from_lateral_velocity(lateral_velocity), bearing_from_enemy);

        if let Some(previous) = opponent.track {
            self.waves.try_create_wave(
                turn,
                me.position,
                previous.position,
                scan.energy - previous.energy,
                &opponent.history,
            );
        }
        opponent.track = Some(EnemyTrack {
            id: scan.id,
            position: scan.position,
            energy: scan.energy,
        });

        self.waves.advance(turn, me.position);
        self.surf(commands);
        commands.rescan = true;
    }

    fn surf(&self, commands: &mut Commands) {
        let Some(wave) = self.waves.closest_surfable(self.me.position) else {
            return;
        };
        let plan = movement::plan_surf(&self.danger, &self.smoother(), MotionState::from(&self.me), wave);
        crate::debug_surf!(
            self.me.turn,
            "Surfing {:?} (left {:.3}, right {:.3}) towards {:.2}",
            plan.direction,
            plan.danger_left,
            plan.danger_right,
            plan.go_angle
        );
        commands.set_move(plan.movement);
    }

    fn on_hit_by_bullet(&mut self, hit: &HitByBullet, commands: &mut Commands) {
        let speed = bullet_speed(hit.power);
        match self.waves.take_hit(self.me.position, speed) {
            Some(wave) => {
                let index = self.danger.reinforce(&wave, hit.position);
                crate::debug_wave!(self.me.turn, "Hit by wave from {}, bin {} reinforced", wave.origin, index);
            }
            None => {
                crate::debug_wave!(self.me.turn, "Hit at {} matched no wave", hit.position);
            }
        }
        // Keep moving unless this turn already has a movement order
        commands.distance.get_or_insert(MOVE_DISTANCE);
    }

    fn on_scanned_wall(&mut self, scan: &ScannedWall, commands: &mut Commands) {
        if !scan.center.is_finite() || !scan.rotation.is_finite() || !scan.height.is_finite() {
            warn!("Ignoring non-finite scan of wall {}", scan.id);
            return;
        }
        let wall = *self.walls.observe(scan);
        if self.me.speed == 0.0 || !self.approaching(&wall) {
            return;
        }
        self.avoid_nearest_wall(commands);
    }

    // Whether our next step brings us closer to the wall
    fn approaching(&self, wall: &WallSegment) -> bool {
        let ahead = project(self.me.position, self.me.heading, self.me.speed);
        wall.distance_to(ahead) < wall.distance_to(self.me.position)
    }

    fn avoid_nearest_wall(&mut self, commands: &mut Commands) {
        let position = self.me.position;
        let Some((nearest, distance)) = self.walls.nearest(position) else {
            return;
        };
        if distance >= WALL_STICK {
            return;
        }
        let wall = *nearest;
        let orientation = if self.rng.gen_bool(0.5) {
            SurfDirection::Right
        } else {
            SurfDirection::Left
        };
        let movement = movement::slide_along_wall(&wall, position, self.me.heading, orientation, &self.smoother());
        crate::debug_wall!("Sliding along wall {} ({:.0} away)", wall.id, distance);
        commands.set_move(movement);
    }

    fn on_hit_wall(&mut self, commands: &mut Commands) {
        commands.set_move(movement::hit_wall_recovery());
        commands.rescan = true;
    }

    fn on_hit_bot(&mut self, commands: &mut Commands) {
        commands.distance = Some(MOVE_DISTANCE);
        commands.rescan = true;
    }

    fn on_bot_death(&mut self, id: i32) {
        if self.opponents.remove(&id).is_none() {
            return;
        }
        // Bullets of a dead opponent are still in the air while others remain
        if self.opponents.is_empty() {
            debug!("Last opponent {} destroyed, dropping {} wave(s)", id, self.waves.len());
            self.waves.clear();
        } else {
            debug!("Opponent {} destroyed, {} left", id, self.opponents.len());
        }
    }
}
