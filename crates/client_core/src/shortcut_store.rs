use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use desk_shared::domain::{default_shortcuts, Shortcut, ShortcutId};
use desk_storage::KeyValueStore;
use tracing::{error, warn};
use uuid::Uuid;

pub const SHORTCUTS_STORAGE_KEY: &str = "desk-shortcuts";

pub struct ShortcutStore {
    shortcuts: Mutex<Vec<Shortcut>>,
    store: Arc<dyn KeyValueStore>,
}

impl ShortcutStore {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let shortcuts = match read_shortcuts(store.as_ref()) {
            Ok(Some(shortcuts)) => shortcuts,
            Ok(None) => default_shortcuts(),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "failed to load shortcuts, using defaults");
                default_shortcuts()
            }
        };

        Self {
            shortcuts: Mutex::new(shortcuts),
            store,
        }
    }

    pub fn add(&self, name: impl Into<String>, height_mm: i32) -> Shortcut {
        let shortcut = Shortcut {
            id: ShortcutId(Uuid::new_v4().to_string()),
            name: name.into(),
            height_mm,
        };
        let mut shortcuts = self.lock();
        shortcuts.push(shortcut.clone());
        self.persist(&shortcuts);
        shortcut
    }

    pub fn update(&self, id: &ShortcutId, name: impl Into<String>, height_mm: i32) -> Option<Shortcut> {
        let mut shortcuts = self.lock();
        let updated = shortcuts.iter_mut().find(|s| &s.id == id).map(|shortcut| {
            shortcut.name = name.into();
            shortcut.height_mm = height_mm;
            shortcut.clone()
        });
        self.persist(&shortcuts);
        updated
    }

    pub fn delete(&self, id: &ShortcutId) -> Option<Shortcut> {
        let mut shortcuts = self.lock();
        let position = shortcuts.iter().position(|s| &s.id == id);
        let removed = position.map(|index| shortcuts.remove(index));
        self.persist(&shortcuts);
        removed
    }

    pub fn get(&self, id: &ShortcutId) -> Option<Shortcut> {
        self.lock().iter().find(|s| &s.id == id).cloned()
    }

    pub fn list(&self) -> Vec<Shortcut> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Shortcut>> {
        self.shortcuts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, shortcuts: &[Shortcut]) {
        let written = serde_json::to_string(shortcuts)
            .context("failed to serialize shortcuts")
            .and_then(|text| self.store.set_string(SHORTCUTS_STORAGE_KEY, &text));
        if let Err(err) = written {
            error!(error = %format!("{err:#}"), "failed to save shortcuts");
        }
    }
}

fn read_shortcuts(store: &dyn KeyValueStore) -> Result<Option<Vec<Shortcut>>> {
    let Some(text) = store.get_string(SHORTCUTS_STORAGE_KEY)? else {
        return Ok(None);
    };
    let shortcuts =
        serde_json::from_str(&text).context("persisted shortcuts are not valid JSON")?;
    Ok(Some(shortcuts))
}

#[cfg(test)]
#[path = "tests/shortcut_store_tests.rs"]
mod tests;
