use serde_json::{Value, json};

use crate::state::EvolutionState;
use crate::types::{FAN_MODES, HvacMode, normalize_fan_mode};
use crate::{Error, Result};

/// A single write to the SAM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetHvacMode { system: u8, mode: HvacMode },
    SetHeatingSetpoint { system: u8, zone: u8, temperature: i32 },
    SetCoolingSetpoint { system: u8, zone: u8, temperature: i32 },
    SetFanMode { system: u8, mode: String },
}

impl Command {
    pub fn action(&self) -> &'static str {
        match self {
            Command::SetHvacMode { .. } => "set_hvac_mode",
            Command::SetHeatingSetpoint { .. } => "set_heating_setpoint",
            Command::SetCoolingSetpoint { .. } => "set_cooling_setpoint",
            Command::SetFanMode { .. } => "set_fan_mode",
        }
    }

    pub fn system(&self) -> u8 {
        match self {
            Command::SetHvacMode { system, .. }
            | Command::SetHeatingSetpoint { system, .. }
            | Command::SetCoolingSetpoint { system, .. }
            | Command::SetFanMode { system, .. } => *system,
        }
    }

    pub fn zone(&self) -> Option<u8> {
        match self {
            Command::SetHeatingSetpoint { zone, .. } | Command::SetCoolingSetpoint { zone, .. } => {
                Some(*zone)
            }
            _ => None,
        }
    }

    /// Body recorded in the message log.
    pub fn body(&self) -> Value {
        match self {
            Command::SetHvacMode { mode, .. } => json!({ "mode": mode.as_raw() }),
            Command::SetHeatingSetpoint { temperature, .. } => json!({ "htsp": temperature }),
            Command::SetCoolingSetpoint { temperature, .. } => json!({ "clsp": temperature }),
            Command::SetFanMode { mode, .. } => json!({ "fan": mode }),
        }
    }
}

/// Requested temperatures, shaped like a climate `set_temperature` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TemperatureRequest {
    pub target: Option<i32>,
    pub low: Option<i32>,
    pub high: Option<i32>,
}

impl TemperatureRequest {
    pub fn target(temperature: i32) -> Self {
        Self {
            target: Some(temperature),
            ..Default::default()
        }
    }

    pub fn range(low: i32, high: i32) -> Self {
        Self {
            target: None,
            low: Some(low),
            high: Some(high),
        }
    }
}

pub fn plan_set_hvac_mode(system: u8, mode: HvacMode) -> Vec<Command> {
    vec![Command::SetHvacMode { system, mode }]
}

pub fn plan_set_fan_mode(system: u8, mode: &str) -> Result<Vec<Command>> {
    let mode = normalize_fan_mode(mode);
    if !FAN_MODES.contains(&mode.as_str()) {
        return Err(Error::InvalidFanMode(mode));
    }
    Ok(vec![Command::SetFanMode { system, mode }])
}

/// Turn a temperature request into setpoint writes for the zone's current mode.
///
/// `high` writes the cooling setpoint and `low` the heating setpoint. A bare
/// `target` goes to whichever setpoint the mode uses; heat/cool and off have
/// no single target.
pub fn plan_set_temperature(
    state: &EvolutionState,
    system: u8,
    zone: u8,
    request: TemperatureRequest,
) -> Result<Vec<Command>> {
    state.zone(system, zone)?;

    let mut commands = Vec::new();
    if let Some(temperature) = request.high {
        commands.push(Command::SetCoolingSetpoint { system, zone, temperature });
    }
    if let Some(temperature) = request.low {
        commands.push(Command::SetHeatingSetpoint { system, zone, temperature });
    }
    if let Some(temperature) = request.target {
        match state.read_hvac_mode(system)? {
            HvacMode::Heat => commands.push(Command::SetHeatingSetpoint { system, zone, temperature }),
            HvacMode::Cool => commands.push(Command::SetCoolingSetpoint { system, zone, temperature }),
            mode @ (HvacMode::HeatCool | HvacMode::Off) => {
                return Err(Error::UnsupportedInMode {
                    mode,
                    what: "target temperature",
                });
            }
        }
    }
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SystemState, ZoneState};

    fn state(mode: &str) -> EvolutionState {
        EvolutionState::new().with_system(
            1,
            SystemState::new("auto", mode, true).with_zone(
                1,
                ZoneState {
                    current_temperature: 70,
                    heating_setpoint: 68,
                    cooling_setpoint: 74,
                },
            ),
        )
    }

    #[test]
    fn target_follows_mode() {
        let heat = plan_set_temperature(&state("HEAT"), 1, 1, TemperatureRequest::target(69)).unwrap();
        assert_eq!(
            heat,
            vec![Command::SetHeatingSetpoint { system: 1, zone: 1, temperature: 69 }]
        );

        let cool = plan_set_temperature(&state("cool"), 1, 1, TemperatureRequest::target(75)).unwrap();
        assert_eq!(
            cool,
            vec![Command::SetCoolingSetpoint { system: 1, zone: 1, temperature: 75 }]
        );
    }

    #[test]
    fn range_writes_cool_then_heat() {
        let cmds = plan_set_temperature(&state("AUTO"), 1, 1, TemperatureRequest::range(66, 78)).unwrap();
        assert_eq!(
            cmds,
            vec![
                Command::SetCoolingSetpoint { system: 1, zone: 1, temperature: 78 },
                Command::SetHeatingSetpoint { system: 1, zone: 1, temperature: 66 },
            ]
        );
    }

    #[test]
    fn target_rejected_in_heat_cool_and_off() {
        for mode in ["AUTO", "OFF"] {
            let err = plan_set_temperature(&state(mode), 1, 1, TemperatureRequest::target(70)).unwrap_err();
            assert!(matches!(err, Error::UnsupportedInMode { .. }), "{mode}: {err:?}");
        }
    }

    #[test]
    fn unknown_zone_rejected() {
        let err = plan_set_temperature(&state("HEAT"), 1, 4, TemperatureRequest::target(70)).unwrap_err();
        assert!(err.is_lookup());
    }

    #[test]
    fn empty_request_is_noop() {
        let cmds = plan_set_temperature(&state("OFF"), 1, 1, TemperatureRequest::default()).unwrap();
        assert!(cmds.is_empty());
    }

    #[test]
    fn fan_mode_validated() {
        assert_eq!(
            plan_set_fan_mode(2, "MED").unwrap(),
            vec![Command::SetFanMode { system: 2, mode: "med".to_string() }]
        );
        assert!(matches!(plan_set_fan_mode(1, "turbo"), Err(Error::InvalidFanMode(_))));
    }

    #[test]
    fn command_log_body() {
        let cmd = Command::SetHvacMode { system: 1, mode: HvacMode::HeatCool };
        assert_eq!(cmd.action(), "set_hvac_mode");
        assert_eq!(cmd.body()["mode"], "AUTO");
        assert_eq!(cmd.zone(), None);
    }
}
