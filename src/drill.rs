//! Sparring drill: the agent against a stationary scripted shooter.
//!
//! The drill is a small stand-in for the real simulation. It moves our bot with the same
//! kinematics the predictor assumes, flies the shooter's bullets in straight lines and feeds
//! the agent the events a simulation would deliver. It exists to exercise the decision loop
//! end to end and to watch the danger statistics pay off over several rounds.

use crate::agent::Agent;
use crate::config::{AgentConfig, BOT_RADIUS, Battlefield, MAX_GUN_TURN_RATE};
use crate::error::DrillError;
use crate::surf::MotionState;
use crate::types::{BotState, Commands, Event, HitByBullet, Point, ScannedBot, SurfDirection};
use crate::utils::{
    absolute_bearing, bullet_damage, bullet_speed, distance_to_segment, limit, max_escape_angle,
    normalize_relative_angle, project,
};
use clap::ValueEnum;
use log::info;
use rand::prelude::*;
use rand::rngs::StdRng;

const SHOOTER_ID: i32 = 2;
const SHOOTER_ENERGY: f64 = 100.0;
const PREFERRED_FACTOR: f64 = 0.7; // Guess factor the scripted gun favours
const FACTOR_JITTER: f64 = 0.15;

/// How the scripted shooter aims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AimStyle {
    /// Straight at our current position
    HeadOn,
    /// Leads us by a fixed guess factor with a little noise
    GuessFactor,
    /// Either of the above, chosen per shot
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrillConfig {
    pub rounds: u32,
    pub turns: u32,
    pub battlefield: Battlefield,
    pub seed: u64,
    pub aim: AimStyle,
}

impl Default for DrillConfig {
    fn default() -> Self {
        DrillConfig {
            rounds: 10,
            turns: 1000,
            battlefield: Battlefield::default(),
            seed: 1,
            aim: AimStyle::GuessFactor,
        }
    }
}

/// Outcome of one round.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoundReport {
    pub round: u32,
    pub turns: u32,
    pub bullets_faced: u32,
    pub hits_taken: u32,
    pub waves_detected: u32,
    pub shots_fired: u32,
    pub peak_bin: usize, // Most dangerous guess factor bin after the round
    pub survived: bool,
}

impl RoundReport {
    pub fn hit_rate(&self) -> f64 {
        if self.bullets_faced == 0 {
            0.0
        } else {
            self.hits_taken as f64 / self.bullets_faced as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrillReport {
    pub rounds: Vec<RoundReport>,
}

impl DrillReport {
    pub fn bullets_faced(&self) -> u32 {
        self.rounds.iter().map(|r| r.bullets_faced).sum()
    }

    pub fn hits_taken(&self) -> u32 {
        self.rounds.iter().map(|r| r.hits_taken).sum()
    }

    pub fn waves_detected(&self) -> u32 {
        self.rounds.iter().map(|r| r.waves_detected).sum()
    }

    pub fn hit_rate(&self) -> f64 {
        let faced = self.bullets_faced();
        if faced == 0 {
            0.0
        } else {
            self.hits_taken() as f64 / faced as f64
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Bullet {
    origin: Point,
    angle: f64,
    speed: f64,
    power: f64,
    fire_turn: u32,
    position: Point,
}

#[derive(Debug, Clone, Copy)]
struct Shooter {
    position: Point,
    energy: f64,
    cooldown: u32,
}

// Our bot as the drill simulates it, with the orders it is still carrying out
#[derive(Debug, Clone, Copy)]
struct Defender {
    motion: MotionState,
    energy: f64,
    gun_heading: f64,
    radar_heading: f64,
    pending_turn: f64,
    pending_distance: f64,
    pending_gun_turn: f64,
}

impl Defender {
    fn new(position: Point, heading: f64) -> Self {
        Defender {
            motion: MotionState::new(position, heading, 0.0),
            energy: 100.0,
            gun_heading: heading,
            radar_heading: heading,
            pending_turn: 0.0,
            pending_distance: 0.0,
            pending_gun_turn: 0.0,
        }
    }

    fn state(&self, turn: u32) -> BotState {
        BotState {
            turn,
            position: self.motion.position,
            heading: self.motion.heading,
            speed: self.motion.velocity,
            energy: self.energy,
            gun_heading: self.gun_heading,
            radar_heading: self.radar_heading,
        }
    }

    fn apply(&mut self, commands: &Commands) {
        if let Some(turn) = commands.body_turn {
            self.pending_turn = turn;
        }
        if let Some(distance) = commands.distance {
            self.pending_distance = distance;
        }
        if let Some(turn) = commands.gun_turn {
            self.pending_gun_turn = turn;
        }
        if let Some(turn) = commands.radar_turn {
            self.radar_heading = normalize_relative_angle(self.radar_heading + turn);
        }
    }

    // Moves one turn; returns true when the arena edge stopped us
    fn advance(&mut self, battlefield: &Battlefield) -> bool {
        let move_dir = if self.pending_distance > 0.5 {
            1.0
        } else if self.pending_distance < -0.5 {
            -1.0
        } else {
            0.0
        };
        let before = self.motion.heading;
        self.motion.step(self.pending_turn, move_dir);
        self.pending_turn -= normalize_relative_angle(self.motion.heading - before);
        self.pending_distance -= self.motion.velocity;

        let gun_step = limit(-MAX_GUN_TURN_RATE, self.pending_gun_turn, MAX_GUN_TURN_RATE);
        self.gun_heading = normalize_relative_angle(self.gun_heading + gun_step);
        self.pending_gun_turn -= gun_step;

        let position = self.motion.position;
        let clamped = Point {
            x: limit(BOT_RADIUS, position.x, battlefield.width - BOT_RADIUS),
            y: limit(BOT_RADIUS, position.y, battlefield.height - BOT_RADIUS),
        };
        if clamped != position {
            self.motion.position = clamped;
            self.motion.velocity = 0.0;
            self.pending_distance = 0.0;
            return true;
        }
        false
    }
}

/// Runs every round of the drill with one agent, so danger statistics carry over.
pub fn run_drill(config: &DrillConfig) -> Result<DrillReport, DrillError> {
    if config.rounds == 0 || config.turns == 0 {
        return Err(DrillError::EmptyDrill);
    }
    let mut agent = Agent::new(AgentConfig {
        battlefield: config.battlefield,
        seed: Some(config.seed),
        ..AgentConfig::default()
    })?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut report = DrillReport::default();
    for round in 1..=config.rounds {
        agent.new_round();
        let round_report = run_round(&mut agent, &mut rng, config, round);
        info!(
            target: "drill",
            "Round {}: {} turns, faced {}, hit {} ({:.1}%), waves {}, fired {}, peak bin {}{}",
            round,
            round_report.turns,
            round_report.bullets_faced,
            round_report.hits_taken,
            round_report.hit_rate() * 100.0,
            round_report.waves_detected,
            round_report.shots_fired,
            round_report.peak_bin,
            if round_report.survived { "" } else { ", destroyed" }
        );
        report.rounds.push(round_report);
    }
    Ok(report)
}

fn run_round(agent: &mut Agent, rng: &mut StdRng, config: &DrillConfig, round: u32) -> RoundReport {
    let battlefield = config.battlefield;
    let start = Point::new(battlefield.width * 0.25, battlefield.height * 0.5);
    let mut defender = Defender::new(start, rng.gen_range(-1.0..1.0));
    let mut shooter = Shooter {
        position: Point::new(
            battlefield.width * 0.75,
            battlefield.height * rng.gen_range(0.3..0.7),
        ),
        energy: SHOOTER_ENERGY,
        cooldown: rng.gen_range(10..20),
    };
    let mut bullets: Vec<Bullet> = Vec::new();
    let waves_before = agent.waves().created();
    let mut report = RoundReport {
        round,
        survived: true,
        ..RoundReport::default()
    };

    for turn in 1..=config.turns {
        report.turns = turn;
        let mut events = Vec::new();
        if defender.advance(&battlefield) {
            events.push(Event::HitWall);
        }

        let me = defender.motion.position;
        bullets.retain_mut(|bullet| {
            let previous = bullet.position;
            bullet.position = project(
                bullet.origin,
                bullet.angle,
                turn.saturating_sub(bullet.fire_turn) as f64 * bullet.speed,
            );
            if distance_to_segment(me, previous, bullet.position) < BOT_RADIUS {
                events.push(Event::HitByBullet(HitByBullet {
                    position: bullet.position,
                    power: bullet.power,
                }));
                defender.energy -= bullet_damage(bullet.power);
                report.hits_taken += 1;
                return false;
            }
            let p = bullet.position;
            p.x >= 0.0 && p.x <= battlefield.width && p.y >= 0.0 && p.y <= battlefield.height
        });

        events.push(Event::ScannedBot(ScannedBot {
            id: SHOOTER_ID,
            position: shooter.position,
            heading: 0.0,
            speed: 0.0,
            energy: shooter.energy,
        }));

        let status_commands = agent.update_status(defender.state(turn));
        let commands = agent.dispatch(&events);
        defender.apply(&status_commands);
        defender.apply(&commands);
        if let Some(power) = commands.fire {
            if defender.energy > power {
                defender.energy -= power;
                report.shots_fired += 1;
            }
        }

        if defender.energy <= 0.0 {
            report.survived = false;
            break;
        }

        // The shooter fires after the scan, so the drop shows up on the next one
        shooter.cooldown = shooter.cooldown.saturating_sub(1);
        if shooter.cooldown == 0 {
            let power = (rng.gen_range(1.0..=3.0f64) * 10.0).round() / 10.0;
            if shooter.energy > power {
                let speed = bullet_speed(power);
                let angle = aim(config.aim, rng, shooter.position, &defender, speed);
                bullets.push(Bullet {
                    origin: shooter.position,
                    angle,
                    speed,
                    power,
                    fire_turn: turn,
                    position: shooter.position,
                });
                shooter.energy -= power;
                report.bullets_faced += 1;
            }
            shooter.cooldown = rng.gen_range(12..=22);
        }
    }

    report.waves_detected = agent.waves().created() - waves_before;
    report.peak_bin = agent.danger().peak();
    report
}

fn aim(style: AimStyle, rng: &mut StdRng, from: Point, target: &Defender, speed: f64) -> f64 {
    let bearing = absolute_bearing(from, target.motion.position);
    let head_on = match style {
        AimStyle::HeadOn => true,
        AimStyle::GuessFactor => false,
        AimStyle::Mixed => rng.gen_bool(0.5),
    };
    if head_on {
        return bearing;
    }

    let lateral = SurfDirection::from_lateral_velocity(
        target.motion.velocity * (target.motion.heading - bearing).sin(),
    );
    let factor = limit(
        -1.0,
        PREFERRED_FACTOR + rng.gen_range(-FACTOR_JITTER..FACTOR_JITTER),
        1.0,
    );
    bearing + factor * max_escape_angle(speed) * lateral.sign()
}
