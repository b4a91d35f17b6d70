mod client;
mod command;
mod coordinator;
mod diff;
mod error;
mod logger;
mod state;
mod types;

pub use client::EvolutionClient;
pub use command::{
    Command, TemperatureRequest, plan_set_fan_mode, plan_set_hvac_mode, plan_set_temperature,
};
pub use coordinator::{Coordinator, CoordinatorBuilder, CoordinatorHandle, DEFAULT_POLL_INTERVAL, discover};
pub use diff::diff_states;
pub use error::{Error, Result};
pub use logger::MessageLogMode;
pub use state::{EvolutionState, TargetTemperatures, ZoneAttributes};
pub use types::*;
