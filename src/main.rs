use clap::Parser;
use log::{LevelFilter, error, info};
use std::process::ExitCode;
use wavesurf::config::{self, Battlefield};
use wavesurf::drill::{AimStyle, DrillConfig, run_drill};
use wavesurf::logging;

// --- Command Line Arguments ---
#[derive(Parser, Debug)]
#[command(author, version, about = "Spar the wave-surfing agent against a scripted shooter", long_about = None)]
struct Args {
    /// Number of rounds; danger statistics carry over between them.
    #[arg(long, default_value_t = 10)]
    rounds: u32,

    /// Maximum number of turns per round.
    #[arg(long, default_value_t = 1000)]
    turns: u32,

    /// Arena width.
    #[arg(long, default_value_t = config::DEFAULT_BATTLEFIELD_WIDTH)]
    width: f64,

    /// Arena height.
    #[arg(long, default_value_t = config::DEFAULT_BATTLEFIELD_HEIGHT)]
    height: f64,

    /// Seed for the shooter and the agent.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// How the scripted shooter aims.
    #[arg(long, value_enum, default_value_t = AimStyle::GuessFactor)]
    aim: AimStyle,

    /// Debug filter to specify log topics (e.g., "surf,wave,gun,wall,drill")
    #[arg(long)]
    debug_filter: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = match args.log_level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    if let Err(e) = logging::init_logger(log_level, args.debug_filter) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    let battlefield = match Battlefield::new(args.width, args.height) {
        Ok(battlefield) => battlefield,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let drill = DrillConfig {
        rounds: args.rounds,
        turns: args.turns,
        battlefield,
        seed: args.seed,
        aim: args.aim,
    };

    info!(
        "Sparring for {} round(s) of up to {} turns on a {}x{} field, {:?} aim",
        drill.rounds, drill.turns, battlefield.width, battlefield.height, drill.aim
    );
    match run_drill(&drill) {
        Ok(report) => {
            info!(
                "Faced {} bullets, took {} hits ({:.1}%), detected {} waves",
                report.bullets_faced(),
                report.hits_taken(),
                report.hit_rate() * 100.0,
                report.waves_detected()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Drill failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
