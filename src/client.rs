use std::future::Future;

use crate::Result;

/// Connection to a SAM, as seen by the coordinator.
///
/// Temperatures are whole degrees Fahrenheit. Mode and fan strings are passed
/// through as the device spells them (`"HEAT"`, `"AUTO"`, ...); normalization
/// happens when the snapshot is built.
pub trait EvolutionClient: Send + Sync {
    fn read_current_temperature(&self, system: u8, zone: u8)
    -> impl Future<Output = Result<i32>> + Send;

    fn read_heating_setpoint(&self, system: u8, zone: u8) -> impl Future<Output = Result<i32>> + Send;

    fn read_cooling_setpoint(&self, system: u8, zone: u8) -> impl Future<Output = Result<i32>> + Send;

    fn read_fan_mode(&self, system: u8) -> impl Future<Output = Result<String>> + Send;

    /// Raw mode token plus whether the equipment is currently running.
    fn read_hvac_mode(&self, system: u8) -> impl Future<Output = Result<(String, bool)>> + Send;

    fn set_hvac_mode(&self, system: u8, mode: &str) -> impl Future<Output = Result<()>> + Send;

    fn set_heating_setpoint(
        &self,
        system: u8,
        zone: u8,
        temperature: i32,
    ) -> impl Future<Output = Result<()>> + Send;

    fn set_cooling_setpoint(
        &self,
        system: u8,
        zone: u8,
        temperature: i32,
    ) -> impl Future<Output = Result<()>> + Send;

    fn set_fan_mode(&self, system: u8, mode: &str) -> impl Future<Output = Result<()>> + Send;
}
