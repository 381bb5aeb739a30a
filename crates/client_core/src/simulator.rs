use std::{sync::Arc, time::Duration};

use anyhow::{bail, Result};
use async_trait::async_trait;
use desk_shared::{
    domain::{mm_to_cm, ConnectionStatus, LogEntry, LogLevel, MAX_HEIGHT_MM, MIN_HEIGHT_MM},
    protocol::DeskEvent,
};
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use crate::DeskBackend;

pub const STEP_MM: i32 = 10;
const ARRIVAL_TOLERANCE_MM: i32 = 2;
const DEFAULT_TRAVEL_PER_TICK_MM: i32 = 8;
const DEFAULT_TICK: Duration = Duration::from_millis(200);
const DEFAULT_DESK_NAME: &str = "Desk 4C2A";

struct SimulatedState {
    connected: bool,
    reachable: bool,
    height_mm: i32,
}

pub struct SimulatedDesk {
    name: String,
    travel_per_tick_mm: i32,
    tick: Duration,
    state: Mutex<SimulatedState>,
    events: broadcast::Sender<DeskEvent>,
}

impl SimulatedDesk {
    pub fn new(start_height_mm: i32) -> Arc<Self> {
        Self::with_motion(start_height_mm, DEFAULT_TRAVEL_PER_TICK_MM, DEFAULT_TICK)
    }

    pub fn with_motion(start_height_mm: i32, travel_per_tick_mm: i32, tick: Duration) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            name: DEFAULT_DESK_NAME.to_string(),
            travel_per_tick_mm: travel_per_tick_mm.max(1),
            tick,
            state: Mutex::new(SimulatedState {
                connected: false,
                reachable: true,
                height_mm: start_height_mm.clamp(MIN_HEIGHT_MM, MAX_HEIGHT_MM),
            }),
            events,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn height_mm(&self) -> i32 {
        self.state.lock().await.height_mm
    }

    pub async fn auto_connect(&self) {
        self.emit_log(LogLevel::Info, "Connecting to desk...");

        if let Err(err) = self.ensure_connected().await {
            self.emit_log(LogLevel::Warn, format!("Auto-connect failed: {err}"));
            return;
        }

        let height_mm = self.height_mm().await;
        self.emit(DeskEvent::Height(height_mm));
        self.emit_log(
            LogLevel::Info,
            format!("Current height: {:.1} cm", mm_to_cm(height_mm)),
        );
    }

    pub async fn disconnect(&self) {
        self.state.lock().await.connected = false;
        self.emit_connection(ConnectionStatus::NotConnected);
    }

    pub async fn set_reachable(&self, reachable: bool) {
        self.state.lock().await.reachable = reachable;
    }

    async fn ensure_connected(&self) -> Result<()> {
        let reachable = {
            let state = self.state.lock().await;
            if state.connected {
                return Ok(());
            }
            state.reachable
        };

        self.emit_log(LogLevel::Info, "Scanning for desk...");
        if !reachable {
            self.emit_log(LogLevel::Warn, "No desk found");
            self.emit_connection(ConnectionStatus::NotConnected);
            bail!("desk not found");
        }

        self.emit_log(LogLevel::Info, format!("Desk found: {}", self.name));
        self.state.lock().await.connected = true;
        self.emit_log(LogLevel::Info, format!("Connected to: {}", self.name));
        self.emit_connection(ConnectionStatus::Connected);
        Ok(())
    }

    fn emit_log(&self, level: LogLevel, message: impl Into<String>) {
        self.emit(DeskEvent::Log(LogEntry::stamped(level, message)));
    }

    fn emit_connection(&self, status: ConnectionStatus) {
        self.emit(DeskEvent::Connection(status.as_str().to_string()));
    }

    fn emit(&self, event: DeskEvent) {
        if self.events.send(event).is_err() {
            debug!("no subscribers for simulated desk event");
        }
    }
}

#[async_trait]
impl DeskBackend for SimulatedDesk {
    async fn check_connection(&self) -> Result<ConnectionStatus> {
        let connected = self.state.lock().await.connected;
        Ok(if connected {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::NotConnected
        })
    }

    async fn get_height(&self) -> Result<i32> {
        self.ensure_connected().await?;
        Ok(self.height_mm().await)
    }

    async fn move_by_step(&self, up: bool) -> Result<()> {
        let current_mm = match self.get_height().await {
            Ok(height_mm) => height_mm,
            Err(err) => {
                self.emit_log(LogLevel::Error, format!("Failed to read height: {err}"));
                return Err(err);
            }
        };

        let offset = if up { STEP_MM } else { -STEP_MM };
        let target_mm = (current_mm + offset).clamp(MIN_HEIGHT_MM, MAX_HEIGHT_MM);
        let direction = if up { "up" } else { "down" };
        self.emit_log(
            LogLevel::Info,
            format!("Moving {direction} to {:.1} cm", mm_to_cm(target_mm)),
        );

        self.move_to_height(target_mm).await
    }

    async fn move_to_height(&self, target_mm: i32) -> Result<()> {
        if !(MIN_HEIGHT_MM..=MAX_HEIGHT_MM).contains(&target_mm) {
            self.emit_log(
                LogLevel::Error,
                format!(
                    "Target height {:.1} cm out of range ({} - {} cm)",
                    mm_to_cm(target_mm),
                    MIN_HEIGHT_MM / 10,
                    MAX_HEIGHT_MM / 10
                ),
            );
            bail!("target height out of range");
        }

        if let Err(err) = self.ensure_connected().await {
            self.emit_log(LogLevel::Error, format!("Connection failed: {err}"));
            return Err(err.context("connect"));
        }

        if (self.height_mm().await - target_mm).abs() < ARRIVAL_TOLERANCE_MM {
            self.emit_log(LogLevel::Info, "Already at target height");
            return Ok(());
        }

        loop {
            let height_mm = {
                let mut state = self.state.lock().await;
                let remaining = target_mm - state.height_mm;
                let travel = remaining.signum() * remaining.abs().min(self.travel_per_tick_mm);
                state.height_mm += travel;
                state.height_mm
            };
            self.emit(DeskEvent::Height(height_mm));

            if height_mm == target_mm {
                self.emit_log(
                    LogLevel::Info,
                    format!("Target height {:.1} cm reached", mm_to_cm(target_mm)),
                );
                return Ok(());
            }
            tokio::time::sleep(self.tick).await;
        }
    }

    fn subscribe_events(&self) -> broadcast::Receiver<DeskEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/simulator_tests.rs"]
mod tests;
