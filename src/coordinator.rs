use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, trace, warn};

use crate::client::EvolutionClient;
use crate::command::{
    Command, TemperatureRequest, plan_set_fan_mode, plan_set_hvac_mode, plan_set_temperature,
};
use crate::diff::diff_states;
use crate::logger::{MessageLogMode, SnapshotLogger};
use crate::state::EvolutionState;
use crate::types::*;
use crate::{Error, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

const DISCOVERY_SYSTEMS: std::ops::RangeInclusive<u8> = 1..=2;
const DISCOVERY_ZONES: std::ops::RangeInclusive<u8> = 1..=8;

type EventCallback = Box<dyn Fn(&Event) + Send + Sync>;
type SnapshotCallback = Box<dyn Fn(&EvolutionState) + Send + Sync>;

const COMMAND_QUEUE: usize = 16;

struct CommandRequest {
    commands: Vec<Command>,
    reply: oneshot::Sender<Result<()>>,
}

pub struct CoordinatorBuilder<C> {
    client: C,
    zones: Vec<(u8, u8)>,
    poll_interval: Duration,
    event_callbacks: Vec<EventCallback>,
    snapshot_callbacks: Vec<SnapshotCallback>,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
}

impl<C: EvolutionClient> CoordinatorBuilder<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            zones: Vec::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            event_callbacks: Vec::new(),
            snapshot_callbacks: Vec::new(),
            log_mode: None,
            log_path: None,
        }
    }

    /// `(system, zone)` pairs to poll, usually the output of [`discover`].
    pub fn zones(mut self, zones: &[(u8, u8)]) -> Self {
        for pair in zones {
            if !self.zones.contains(pair) {
                self.zones.push(*pair);
            }
        }
        self.zones.sort_unstable();
        self
    }

    /// Time between polls in [`Coordinator::run`]. Must be non-zero; zero is
    /// bumped to one millisecond.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn on_event(mut self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.event_callbacks.push(Box::new(f));
        self
    }

    pub fn on_snapshot(mut self, f: impl Fn(&EvolutionState) + Send + Sync + 'static) -> Self {
        self.snapshot_callbacks.push(Box::new(f));
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Coordinator<C>> {
        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => Some(SnapshotLogger::new(mode, &path)?),
            _ => None,
        };

        let (sender, _) = watch::channel(Arc::new(EvolutionState::new()));
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);

        Ok(Coordinator {
            client: self.client,
            zones: self.zones,
            poll_interval: self.poll_interval,
            sender,
            command_tx,
            command_rx,
            last_update_success: false,
            event_callbacks: self.event_callbacks,
            snapshot_callbacks: self.snapshot_callbacks,
            logger,
        })
    }
}

/// Polls one SAM and publishes each result as an immutable snapshot.
///
/// The coordinator is the only writer. Views hold a [`watch::Receiver`] (or an
/// `Arc` from [`Coordinator::snapshot`]) and read without locking; a new poll
/// swaps the whole snapshot.
pub struct Coordinator<C> {
    client: C,
    zones: Vec<(u8, u8)>,
    poll_interval: Duration,
    sender: watch::Sender<Arc<EvolutionState>>,
    command_tx: mpsc::Sender<CommandRequest>,
    command_rx: mpsc::Receiver<CommandRequest>,
    last_update_success: bool,
    event_callbacks: Vec<EventCallback>,
    snapshot_callbacks: Vec<SnapshotCallback>,
    logger: Option<SnapshotLogger>,
}

impl<C: EvolutionClient> Coordinator<C> {
    pub fn builder(client: C) -> CoordinatorBuilder<C> {
        CoordinatorBuilder::new(client)
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn zones(&self) -> &[(u8, u8)] {
        &self.zones
    }

    pub fn snapshot(&self) -> Arc<EvolutionState> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<EvolutionState>> {
        self.sender.subscribe()
    }

    /// Cloneable handle for reading snapshots and sending commands while
    /// [`Coordinator::run`] owns the coordinator.
    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle {
            commands: self.command_tx.clone(),
            snapshots: self.sender.subscribe(),
        }
    }

    pub fn last_update_success(&self) -> bool {
        self.last_update_success
    }

    /// Poll the device once and publish the result.
    ///
    /// On error the previously published snapshot stays in place.
    pub async fn refresh(&mut self) -> Result<()> {
        let state = match self.fetch().await {
            Ok(state) => state,
            Err(e) => {
                self.last_update_success = false;
                if let Some(ref mut logger) = self.logger {
                    logger.log_poll_error(&e);
                }
                return Err(e);
            }
        };

        let next = Arc::new(state);
        let previous = self.sender.send_replace(next.clone());
        self.last_update_success = true;

        if let Some(ref mut logger) = self.logger {
            logger.log_snapshot(&next);
        }

        let events = diff_states(&previous, &next);
        for event in &events {
            for cb in &self.event_callbacks {
                cb(event);
            }
        }
        for cb in &self.snapshot_callbacks {
            cb(next.as_ref());
        }

        if events.is_empty() {
            trace!("poll: no changes");
        } else {
            debug!(count = events.len(), "processed events from poll");
        }
        Ok(())
    }

    /// Refresh on the configured interval until the task is dropped.
    ///
    /// Commands sent through a [`CoordinatorHandle`] are executed between polls.
    pub async fn run(&mut self) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh().await {
                        warn!(error = %e, "poll failed, keeping previous snapshot");
                    }
                }
                Some(request) = self.command_rx.recv() => {
                    let result = self.execute(request.commands).await;
                    if let Err(ref e) = result {
                        warn!(error = %e, "command failed");
                    }
                    // requester may have given up waiting
                    let _ = request.reply.send(result);
                }
            }
        }
    }

    /// Send planned commands, then refresh so the snapshot reflects them.
    ///
    /// A failing command stops the batch. The refresh still runs so writes
    /// that already landed show up, and the command error is returned.
    pub async fn execute(&mut self, commands: Vec<Command>) -> Result<()> {
        let mut failure = None;
        for command in &commands {
            if let Some(ref mut logger) = self.logger {
                logger.log_command(command);
            }
            debug!(action = command.action(), system = command.system(), "sending command");
            if let Err(e) = self.send(command).await {
                failure = Some(e);
                break;
            }
        }
        if commands.is_empty() {
            return Ok(());
        }
        match failure {
            None => self.refresh().await,
            Some(e) => {
                if let Err(refresh_err) = self.refresh().await {
                    warn!(error = %refresh_err, "refresh after failed command failed");
                }
                Err(e)
            }
        }
    }

    async fn send(&self, command: &Command) -> Result<()> {
        match command {
            Command::SetHvacMode { system, mode } => {
                self.client.set_hvac_mode(*system, mode.as_raw()).await
            }
            Command::SetHeatingSetpoint { system, zone, temperature } => {
                self.client
                    .set_heating_setpoint(*system, *zone, *temperature)
                    .await
            }
            Command::SetCoolingSetpoint { system, zone, temperature } => {
                self.client
                    .set_cooling_setpoint(*system, *zone, *temperature)
                    .await
            }
            Command::SetFanMode { system, mode } => {
                self.client
                    .set_fan_mode(*system, &mode.to_ascii_uppercase())
                    .await
            }
        }
    }

    pub async fn set_hvac_mode(&mut self, system: u8, mode: HvacMode) -> Result<()> {
        self.execute(plan_set_hvac_mode(system, mode)).await
    }

    pub async fn set_temperature(
        &mut self,
        system: u8,
        zone: u8,
        request: TemperatureRequest,
    ) -> Result<()> {
        let commands = plan_set_temperature(&self.snapshot(), system, zone, request)?;
        self.execute(commands).await
    }

    pub async fn set_fan_mode(&mut self, system: u8, mode: &str) -> Result<()> {
        self.execute(plan_set_fan_mode(system, mode)?).await
    }

    async fn fetch(&self) -> Result<EvolutionState> {
        let mut state = EvolutionState::new();
        for &(system, zone) in &self.zones {
            if !state.systems.contains_key(&system) {
                let fan = self.client.read_fan_mode(system).await?;
                let (mode, active) = self.client.read_hvac_mode(system).await?;
                state
                    .systems
                    .insert(system, SystemState::new(&fan, mode, active));
            }

            let reading = ZoneState {
                current_temperature: self.client.read_current_temperature(system, zone).await?,
                heating_setpoint: self.client.read_heating_setpoint(system, zone).await?,
                cooling_setpoint: self.client.read_cooling_setpoint(system, zone).await?,
            };
            if let Some(sys) = state.systems.get_mut(&system) {
                sys.zones.insert(zone, reading);
            }
        }
        Ok(state)
    }
}

/// Shared access to a running [`Coordinator`].
#[derive(Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::Sender<CommandRequest>,
    snapshots: watch::Receiver<Arc<EvolutionState>>,
}

impl CoordinatorHandle {
    pub fn snapshot(&self) -> Arc<EvolutionState> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<EvolutionState>> {
        self.snapshots.clone()
    }

    /// Queue commands for the run loop and wait until they are sent and the
    /// follow-up refresh has been published.
    ///
    /// Waits until [`Coordinator::run`] picks the request up; returns
    /// `Error::Stopped` once the coordinator has been dropped.
    pub async fn execute(&self, commands: Vec<Command>) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(CommandRequest { commands, reply })
            .await
            .map_err(|_| Error::Stopped)?;
        response.await.map_err(|_| Error::Stopped)?
    }

    pub async fn set_hvac_mode(&self, system: u8, mode: HvacMode) -> Result<()> {
        self.execute(plan_set_hvac_mode(system, mode)).await
    }

    pub async fn set_temperature(
        &self,
        system: u8,
        zone: u8,
        request: TemperatureRequest,
    ) -> Result<()> {
        let commands = plan_set_temperature(&self.snapshot(), system, zone, request)?;
        self.execute(commands).await
    }

    pub async fn set_fan_mode(&self, system: u8, mode: &str) -> Result<()> {
        self.execute(plan_set_fan_mode(system, mode)?).await
    }
}

/// Find the zones a SAM answers for by reading each candidate's temperature.
pub async fn discover<C: EvolutionClient>(client: &C) -> Vec<(u8, u8)> {
    let mut found = Vec::new();
    for system in DISCOVERY_SYSTEMS {
        for zone in DISCOVERY_ZONES {
            match client.read_current_temperature(system, zone).await {
                Ok(temp) => {
                    debug!(system, zone, temp, "discovered zone");
                    found.push((system, zone));
                }
                Err(e) => debug!(system, zone, error = %e, "zone not found"),
            }
        }
    }
    found
}

