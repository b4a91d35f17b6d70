use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Fan modes the SAM accepts, in the lowercase form stored in snapshots.
pub const FAN_MODES: [&str; 4] = ["auto", "low", "med", "high"];

/// Fan mode strings are stored lowercased; the SAM reports them in caps.
pub fn normalize_fan_mode(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HvacMode {
    Off,
    Heat,
    Cool,
    HeatCool,
}

impl HvacMode {
    /// Parse the mode token reported by the SAM. Case-insensitive.
    pub fn from_raw(raw: &str) -> Result<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "HEAT" => Ok(HvacMode::Heat),
            "COOL" => Ok(HvacMode::Cool),
            "AUTO" => Ok(HvacMode::HeatCool),
            "OFF" => Ok(HvacMode::Off),
            _ => Err(Error::InvalidMode(raw.to_string())),
        }
    }

    /// Token written back to the SAM.
    pub fn as_raw(&self) -> &'static str {
        match self {
            HvacMode::Off => "OFF",
            HvacMode::Heat => "HEAT",
            HvacMode::Cool => "COOL",
            HvacMode::HeatCool => "AUTO",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HvacMode::Off => "off",
            HvacMode::Heat => "heat",
            HvacMode::Cool => "cool",
            HvacMode::HeatCool => "heat_cool",
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HvacAction {
    Off,
    Heating,
    Cooling,
}

impl HvacAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacAction::Off => "off",
            HvacAction::Heating => "heating",
            HvacAction::Cooling => "cooling",
        }
    }
}

impl fmt::Display for HvacAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Readings for one zone. Temperatures are whole degrees Fahrenheit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ZoneState {
    pub current_temperature: i32,
    pub heating_setpoint: i32,
    pub cooling_setpoint: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemState {
    pub fan_mode: String,
    pub hvac_mode_raw: String,
    pub is_active: bool,
    #[serde(default)]
    pub zones: BTreeMap<u8, ZoneState>,
}

impl SystemState {
    pub fn new(fan_mode: &str, hvac_mode_raw: impl Into<String>, is_active: bool) -> Self {
        Self {
            fan_mode: normalize_fan_mode(fan_mode),
            hvac_mode_raw: hvac_mode_raw.into(),
            is_active,
            zones: BTreeMap::new(),
        }
    }

    pub fn with_zone(mut self, id: u8, zone: ZoneState) -> Self {
        self.zones.insert(id, zone);
        self
    }
}

/// Change notifications produced by comparing consecutive snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SystemAdded { system: u8 },
    SystemRemoved { system: u8 },
    ZoneAdded { system: u8, zone: u8 },
    ZoneRemoved { system: u8, zone: u8 },
    ZoneTemperatureChanged { system: u8, zone: u8, temperature: i32 },
    ZoneSetpointsChanged { system: u8, zone: u8, heat: i32, cool: i32 },
    HvacModeChanged { system: u8, raw: String },
    FanModeChanged { system: u8, mode: String },
    ActiveChanged { system: u8, active: bool },
}
