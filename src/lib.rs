//! Wave-surfing decision core for a turn-based tank arena bot.

pub mod agent;
pub mod config;
pub mod drill;
pub mod error;
pub mod gun;
pub mod logging;
pub mod movement;
pub mod surf;
pub mod types;
pub mod utils;
pub mod wall;

pub use agent::Agent;
pub use config::{AgentConfig, Battlefield};
pub use error::{ConfigError, DrillError};
pub use types::{BotState, Commands, Event};
