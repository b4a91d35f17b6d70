use std::sync::Mutex;
use std::time::Duration;

use bryant_evolution::{
    Coordinator, EvolutionClient, EvolutionState, MessageLogMode, Result, TemperatureRequest,
    discover,
};

/// Stand-in SAM with one system and two zones drifting toward their setpoints.
struct SimulatedSam {
    zones: Mutex<[(i32, i32, i32); 2]>,
    mode: Mutex<String>,
}

impl SimulatedSam {
    fn new() -> Self {
        Self {
            zones: Mutex::new([(64, 68, 76), (79, 68, 76)]),
            mode: Mutex::new("AUTO".to_string()),
        }
    }

    fn zone(&self, system: u8, zone: u8) -> Result<(i32, i32, i32)> {
        if system != 1 || !(1..=2).contains(&zone) {
            return Err(bryant_evolution::Error::Device(format!("S{system}Z{zone} not present")));
        }
        let mut zones = self.zones.lock().unwrap();
        let z = &mut zones[zone as usize - 1];
        if z.0 < z.1 {
            z.0 += 1;
        } else if z.0 > z.2 {
            z.0 -= 1;
        }
        Ok(*z)
    }
}

impl EvolutionClient for SimulatedSam {
    async fn read_current_temperature(&self, system: u8, zone: u8) -> Result<i32> {
        Ok(self.zone(system, zone)?.0)
    }

    async fn read_heating_setpoint(&self, system: u8, zone: u8) -> Result<i32> {
        Ok(self.zone(system, zone)?.1)
    }

    async fn read_cooling_setpoint(&self, system: u8, zone: u8) -> Result<i32> {
        Ok(self.zone(system, zone)?.2)
    }

    async fn read_fan_mode(&self, _system: u8) -> Result<String> {
        Ok("AUTO".to_string())
    }

    async fn read_hvac_mode(&self, _system: u8) -> Result<(String, bool)> {
        Ok((self.mode.lock().unwrap().clone(), true))
    }

    async fn set_hvac_mode(&self, _system: u8, mode: &str) -> Result<()> {
        *self.mode.lock().unwrap() = mode.to_string();
        Ok(())
    }

    async fn set_heating_setpoint(&self, _system: u8, zone: u8, temperature: i32) -> Result<()> {
        self.zones.lock().unwrap()[zone as usize - 1].1 = temperature;
        Ok(())
    }

    async fn set_cooling_setpoint(&self, _system: u8, zone: u8, temperature: i32) -> Result<()> {
        self.zones.lock().unwrap()[zone as usize - 1].2 = temperature;
        Ok(())
    }

    async fn set_fan_mode(&self, _system: u8, _mode: &str) -> Result<()> {
        Ok(())
    }
}

fn print_snapshot(state: &EvolutionState) {
    for (system, zone) in state.zone_ids() {
        let attrs = state.zone_attributes(system, zone);
        println!(
            "[S{system}Z{zone}] {:?}\u{00b0}F | mode: {:?} | targets: {:?} | action: {:?} | fan: {:?}",
            attrs.current_temperature, attrs.hvac_mode, attrs.targets, attrs.hvac_action, attrs.fan_mode,
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let log_path = std::env::args().nth(1);

    let sam = SimulatedSam::new();
    let zones = discover(&sam).await;
    println!("Discovered zones: {zones:?}");

    let mut builder = Coordinator::builder(sam)
        .zones(&zones)
        .poll_interval(Duration::from_secs(1))
        .on_event(|event| println!("{event:?}"))
        .on_snapshot(print_snapshot);
    if let Some(path) = log_path {
        builder = builder.message_log(MessageLogMode::Diffed, path);
    }
    let mut coordinator = builder.build()?;
    let handle = coordinator.handle();
    let poller = tokio::spawn(async move { coordinator.run().await });

    tokio::time::sleep(Duration::from_secs(3)).await;
    println!("Widening the band on S1Z1 to 66-74");
    if let Err(e) = handle
        .set_temperature(1, 1, TemperatureRequest::range(66, 74))
        .await
    {
        eprintln!("Command failed: {e}");
    }

    tokio::time::sleep(Duration::from_secs(5)).await;
    poller.abort();
    Ok(())
}
