use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::*;
use crate::{Error, Result};

/// Setpoints exposed for a zone in its current mode.
///
/// Heat and cool report a single `target`; heat/cool reports the `low`/`high` band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetTemperatures {
    pub target: Option<i32>,
    pub low: Option<i32>,
    pub high: Option<i32>,
}

/// Everything a climate view renders for one zone. `None` means unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ZoneAttributes {
    pub current_temperature: Option<i32>,
    pub fan_mode: Option<String>,
    pub hvac_mode: Option<HvacMode>,
    pub targets: Option<TargetTemperatures>,
    pub hvac_action: Option<HvacAction>,
}

/// Snapshot of every system behind one SAM.
///
/// Built fresh on each poll and never mutated after it is published; all
/// accessors are pure reads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EvolutionState {
    pub systems: BTreeMap<u8, SystemState>,
}

impl EvolutionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system(mut self, id: u8, system: SystemState) -> Self {
        self.systems.insert(id, system);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn system(&self, system: u8) -> Result<&SystemState> {
        self.systems.get(&system).ok_or(Error::NoSuchSystem(system))
    }

    pub fn zone(&self, system: u8, zone: u8) -> Result<&ZoneState> {
        self.system(system)?
            .zones
            .get(&zone)
            .ok_or(Error::NoSuchZone { system, zone })
    }

    /// All `(system, zone)` pairs, ordered by system then zone.
    pub fn zone_ids(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.systems
            .iter()
            .flat_map(|(s, sys)| sys.zones.keys().map(move |z| (*s, *z)))
    }

    pub fn read_current_temperature(&self, system: u8, zone: u8) -> Result<i32> {
        Ok(self.zone(system, zone)?.current_temperature)
    }

    pub fn read_fan_mode(&self, system: u8) -> Result<&str> {
        Ok(self.system(system)?.fan_mode.as_str())
    }

    pub fn read_hvac_mode(&self, system: u8) -> Result<HvacMode> {
        HvacMode::from_raw(&self.system(system)?.hvac_mode_raw)
    }

    pub fn read_target_temperatures(&self, system: u8, zone: u8) -> Result<TargetTemperatures> {
        let mode = self.read_hvac_mode(system)?;
        let z = self.zone(system, zone)?;
        let targets = match mode {
            HvacMode::Heat => TargetTemperatures {
                target: Some(z.heating_setpoint),
                ..Default::default()
            },
            HvacMode::Cool => TargetTemperatures {
                target: Some(z.cooling_setpoint),
                ..Default::default()
            },
            HvacMode::HeatCool => TargetTemperatures {
                target: None,
                low: Some(z.heating_setpoint),
                high: Some(z.cooling_setpoint),
            },
            HvacMode::Off => TargetTemperatures::default(),
        };
        Ok(targets)
    }

    /// Infer what the equipment is doing.
    ///
    /// The SAM only reports an active flag, so in heat/cool the side of the
    /// cooling setpoint the zone sits on decides: above it is cooling, anything
    /// else is heating. An idle deadband is not detectable.
    ///
    /// `Error::Inconsistent` is defensive: heat/cool always yields a `high`
    /// setpoint, so it only fires if the target mapping is changed.
    pub fn read_hvac_action(&self, system: u8, zone: u8) -> Result<HvacAction> {
        let z = self.zone(system, zone)?;
        if !self.system(system)?.is_active {
            return Ok(HvacAction::Off);
        }
        match self.read_hvac_mode(system)? {
            HvacMode::Heat => Ok(HvacAction::Heating),
            HvacMode::Cool => Ok(HvacAction::Cooling),
            HvacMode::Off => Ok(HvacAction::Off),
            HvacMode::HeatCool => {
                let current = z.current_temperature;
                let Some(high) = self.read_target_temperatures(system, zone)?.high else {
                    return Err(Error::Inconsistent("heat/cool mode without a high setpoint"));
                };
                if current > high {
                    Ok(HvacAction::Cooling)
                } else {
                    Ok(HvacAction::Heating)
                }
            }
        }
    }

    /// Read every attribute of a zone, rendering failures as unavailable.
    pub fn zone_attributes(&self, system: u8, zone: u8) -> ZoneAttributes {
        ZoneAttributes {
            current_temperature: available(
                "current_temperature",
                system,
                zone,
                self.read_current_temperature(system, zone),
            ),
            fan_mode: available(
                "fan_mode",
                system,
                zone,
                self.read_fan_mode(system).map(str::to_string),
            ),
            hvac_mode: available("hvac_mode", system, zone, self.read_hvac_mode(system)),
            targets: available(
                "target_temperatures",
                system,
                zone,
                self.read_target_temperatures(system, zone),
            ),
            hvac_action: available(
                "hvac_action",
                system,
                zone,
                self.read_hvac_action(system, zone),
            ),
        }
    }
}

fn available<T>(attribute: &str, system: u8, zone: u8, value: Result<T>) -> Option<T> {
    match value {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(attribute, system, zone, error = %e, "attribute unavailable");
            None
        }
    }
}
