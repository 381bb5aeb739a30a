use std::sync::Arc;

use desk_shared::domain::{ConnectionStatus, LogEntry, LogLevel, Shortcut, ShortcutId, StepDirection};
use desk_storage::KeyValueStore;
use tracing::info;

use crate::{
    controller::{ControllerOptions, DeskController, MoveOutcome},
    log_store::LogStore,
    shortcut_store::ShortcutStore,
    DeskBackend,
};

#[derive(Debug, Clone, PartialEq)]
pub struct DeskSnapshot {
    pub status: ConnectionStatus,
    pub height_cm: Option<f64>,
    pub moving: bool,
    pub logs: Vec<LogEntry>,
    pub shortcuts: Vec<Shortcut>,
}

pub struct DeskContext {
    controller: Arc<DeskController>,
    logs: Arc<LogStore>,
    shortcuts: ShortcutStore,
}

impl DeskContext {
    /// Must run inside a Tokio runtime.
    pub fn start(
        backend: Arc<dyn DeskBackend>,
        store: Arc<dyn KeyValueStore>,
        options: ControllerOptions,
    ) -> Self {
        let logs = Arc::new(LogStore::load(Arc::clone(&store)));
        let shortcuts = ShortcutStore::load(store);
        let controller = DeskController::with_options(backend, Arc::clone(&logs), options);
        controller.initialize();
        info!(
            shortcuts = shortcuts.list().len(),
            logs = logs.len(),
            "desk context started"
        );

        Self {
            controller,
            logs,
            shortcuts,
        }
    }

    pub fn controller(&self) -> &Arc<DeskController> {
        &self.controller
    }

    pub async fn snapshot(&self) -> DeskSnapshot {
        let state = self.controller.state().await;
        DeskSnapshot {
            status: state.status,
            height_cm: state.height_cm,
            moving: state.moving,
            logs: self.logs.entries(),
            shortcuts: self.shortcuts.list(),
        }
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.logs.entries()
    }

    pub fn shortcuts(&self) -> Vec<Shortcut> {
        self.shortcuts.list()
    }

    pub fn shortcut(&self, id: &ShortcutId) -> Option<Shortcut> {
        self.shortcuts.get(id)
    }

    pub async fn refresh(&self) {
        self.controller.refresh().await;
    }

    pub async fn move_step(&self, direction: StepDirection) -> MoveOutcome {
        self.controller.move_step(direction).await
    }

    pub async fn move_to_height(&self, target_mm: i32, label: Option<&str>) -> MoveOutcome {
        self.controller.move_to_height(target_mm, label).await
    }

    pub async fn activate_shortcut(&self, id: &ShortcutId) -> Option<MoveOutcome> {
        let shortcut = self.shortcuts.get(id)?;
        Some(
            self.controller
                .move_to_height(shortcut.height_mm, Some(&shortcut.name))
                .await,
        )
    }

    pub fn add_shortcut(&self, name: &str, height_mm: i32) -> Shortcut {
        let shortcut = self.shortcuts.add(name, height_mm);
        self.logs
            .append(LogLevel::Info, format!("Shortcut \"{name}\" added"));
        shortcut
    }

    pub fn update_shortcut(&self, id: &ShortcutId, name: &str, height_mm: i32) -> Option<Shortcut> {
        let updated = self.shortcuts.update(id, name, height_mm)?;
        self.logs
            .append(LogLevel::Info, format!("Shortcut \"{name}\" updated"));
        Some(updated)
    }

    pub fn delete_shortcut(&self, id: &ShortcutId) -> Option<Shortcut> {
        let removed = self.shortcuts.delete(id)?;
        self.logs.append(
            LogLevel::Info,
            format!("Shortcut \"{}\" deleted", removed.name),
        );
        Some(removed)
    }

    pub fn clear_logs(&self) {
        self.logs.clear();
    }

    pub fn shutdown(self) {
        self.controller.dispose();
        info!("desk context stopped");
    }
}

#[cfg(test)]
#[path = "tests/context_tests.rs"]
mod tests;
