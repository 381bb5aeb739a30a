use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError, Weak,
    },
    time::Duration,
};

use anyhow::Result;
use desk_shared::{
    domain::{mm_to_cm, ConnectionStatus, LogLevel, StepDirection},
    protocol::DeskEvent,
};
use thiserror::Error;
use tokio::{
    sync::{broadcast::error::RecvError, RwLock},
    task::JoinHandle,
};
use tracing::{debug, error, warn};

use crate::{log_store::LogStore, DeskBackend};

pub const DEFAULT_MOVE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Upper bound for a movement command; `None` waits for the backend indefinitely.
    pub move_timeout: Option<Duration>,
    pub log_move_to_height_failures: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            move_timeout: Some(DEFAULT_MOVE_TIMEOUT),
            log_move_to_height_failures: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeskState {
    pub status: ConnectionStatus,
    pub height_cm: Option<f64>,
    pub moving: bool,
}

#[derive(Debug, Error)]
pub enum MoveError {
    #[error("{0}")]
    Backend(String),
    #[error("no response from desk after {}s", .0.as_secs_f64())]
    TimedOut(Duration),
}

#[derive(Debug)]
pub enum MoveOutcome {
    Completed,
    Failed(MoveError),
    /// Another movement was still in flight; nothing was sent.
    Rejected,
}

impl MoveOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

#[derive(Debug, Default)]
struct Readings {
    status: ConnectionStatus,
    height_cm: Option<f64>,
}

pub struct EventSubscription {
    task: JoinHandle<()>,
}

impl EventSubscription {
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct MovingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> MovingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for MovingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct DeskController {
    backend: Arc<dyn DeskBackend>,
    logs: Arc<LogStore>,
    options: ControllerOptions,
    readings: RwLock<Readings>,
    moving: AtomicBool,
    initialized: AtomicBool,
    subscription: Mutex<Option<EventSubscription>>,
}

impl DeskController {
    pub fn new(backend: Arc<dyn DeskBackend>, logs: Arc<LogStore>) -> Arc<Self> {
        Self::with_options(backend, logs, ControllerOptions::default())
    }

    pub fn with_options(
        backend: Arc<dyn DeskBackend>,
        logs: Arc<LogStore>,
        options: ControllerOptions,
    ) -> Arc<Self> {
        Arc::new(Self {
            backend,
            logs,
            options,
            readings: RwLock::new(Readings::default()),
            moving: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
            subscription: Mutex::new(None),
        })
    }

    /// Must run inside a Tokio runtime. Returns `false` when already initialized.
    pub fn initialize(self: &Arc<Self>) -> bool {
        if self.initialized.swap(true, Ordering::AcqRel) {
            debug!("desk controller already initialized");
            return false;
        }

        self.logs.append(LogLevel::Info, "Initializing app...");

        let mut events = self.backend.subscribe_events();
        let controller = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let Some(controller) = Weak::upgrade(&controller) else {
                            break;
                        };
                        controller.apply_event(event).await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "desk event stream lagged, events dropped");
                    }
                    Err(RecvError::Closed) => {
                        debug!("desk event stream closed");
                        break;
                    }
                }
            }
        });

        *self.lock_subscription() = Some(EventSubscription { task });
        true
    }

    pub fn dispose(&self) {
        if self.lock_subscription().take().is_some() {
            debug!("desk event subscription disposed");
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.lock_subscription()
            .as_ref()
            .is_some_and(EventSubscription::is_active)
    }

    pub async fn state(&self) -> DeskState {
        let readings = self.readings.read().await;
        DeskState {
            status: readings.status,
            height_cm: readings.height_cm,
            moving: self.is_moving(),
        }
    }

    pub fn is_moving(&self) -> bool {
        self.moving.load(Ordering::Acquire)
    }

    pub async fn refresh(&self) {
        self.logs.append(LogLevel::Info, "Refreshing status...");
        if let Err(err) = self.try_refresh().await {
            self.logs
                .append(LogLevel::Error, format!("Failed to refresh status: {err:#}"));
        }
    }

    async fn try_refresh(&self) -> Result<()> {
        let status = self.backend.check_connection().await?;
        self.readings.write().await.status = status;

        let height_mm = self.backend.get_height().await?;
        let height_cm = self.store_height(height_mm).await;
        self.logs
            .append(LogLevel::Info, format!("Current height: {height_cm:.1} cm"));
        Ok(())
    }

    pub async fn move_step(&self, direction: StepDirection) -> MoveOutcome {
        let Some(_moving) = MovingGuard::acquire(&self.moving) else {
            debug!(direction = direction.as_str(), "step ignored, desk is moving");
            return MoveOutcome::Rejected;
        };

        let result = async {
            self.bounded(self.backend.move_by_step(direction.is_up()))
                .await?;
            let height_mm = self.bounded(self.backend.get_height()).await?;
            self.store_height(height_mm).await;
            Ok::<_, MoveError>(())
        }
        .await;

        match result {
            Ok(()) => MoveOutcome::Completed,
            Err(err) => {
                self.logs
                    .append(LogLevel::Error, format!("Movement failed: {err}"));
                MoveOutcome::Failed(err)
            }
        }
    }

    pub async fn move_to_height(&self, target_mm: i32, label: Option<&str>) -> MoveOutcome {
        let Some(_moving) = MovingGuard::acquire(&self.moving) else {
            debug!(target_mm, "move ignored, desk is moving");
            return MoveOutcome::Rejected;
        };

        if let Some(label) = label {
            self.logs.append(
                LogLevel::Info,
                format!("Moving to \"{label}\" ({} cm)", mm_to_cm(target_mm)),
            );
        }

        match self.bounded(self.backend.move_to_height(target_mm)).await {
            Ok(()) => MoveOutcome::Completed,
            Err(err) => {
                error!(target_mm, error = %err, "move to height failed");
                if self.options.log_move_to_height_failures {
                    self.logs
                        .append(LogLevel::Error, format!("Move to height failed: {err}"));
                }
                MoveOutcome::Failed(err)
            }
        }
    }

    async fn bounded<T>(&self, command: impl Future<Output = Result<T>>) -> Result<T, MoveError> {
        let result = match self.options.move_timeout {
            Some(limit) => tokio::time::timeout(limit, command)
                .await
                .map_err(|_| MoveError::TimedOut(limit))?,
            None => command.await,
        };
        result.map_err(|err| MoveError::Backend(format!("{err:#}")))
    }

    async fn apply_event(&self, event: DeskEvent) {
        match event {
            DeskEvent::Height(height_mm) => {
                self.store_height(height_mm).await;
            }
            DeskEvent::Log(entry) => self.logs.append_raw(entry),
            DeskEvent::Connection(text) => match text.parse::<ConnectionStatus>() {
                Ok(status) => self.readings.write().await.status = status,
                Err(err) => warn!(error = %err, "dropping connection event"),
            },
        }
    }

    async fn store_height(&self, height_mm: i32) -> f64 {
        let height_cm = mm_to_cm(height_mm);
        self.readings.write().await.height_cm = Some(height_cm);
        height_cm
    }

    fn lock_subscription(&self) -> std::sync::MutexGuard<'_, Option<EventSubscription>> {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
