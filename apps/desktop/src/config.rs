use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use desk_core::ControllerOptions;
use tracing::warn;

pub const SETTINGS_FILE: &str = "desk.toml";
const APP_DIR_NAME: &str = "desk-controller";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    /// Zero disables the movement timeout.
    pub move_timeout_secs: u64,
    pub log_move_to_height_failures: bool,
    pub simulated_start_height_mm: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            move_timeout_secs: 30,
            log_move_to_height_failures: false,
            simulated_start_height_mm: 900,
        }
    }
}

impl Settings {
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            move_timeout: (self.move_timeout_secs > 0)
                .then(|| Duration::from_secs(self.move_timeout_secs)),
            log_move_to_height_failures: self.log_move_to_height_failures,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|base| base.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

pub(crate) fn apply_file(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, String>>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(error = %err, file = SETTINGS_FILE, "ignoring unreadable settings file");
            return;
        }
    };

    if let Some(v) = file_cfg.get("data_dir") {
        settings.data_dir = PathBuf::from(v);
    }
    if let Some(v) = file_cfg.get("move_timeout_secs") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.move_timeout_secs = parsed;
        }
    }
    if let Some(v) = file_cfg.get("log_move_to_height_failures") {
        if let Some(parsed) = parse_flag(v) {
            settings.log_move_to_height_failures = parsed;
        }
    }
    if let Some(v) = file_cfg.get("simulated_start_height_mm") {
        if let Ok(parsed) = v.parse::<i32>() {
            settings.simulated_start_height_mm = parsed;
        }
    }
}

pub(crate) fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("DESK_DATA_DIR") {
        settings.data_dir = PathBuf::from(v);
    }
    if let Some(v) = var("APP__DATA_DIR") {
        settings.data_dir = PathBuf::from(v);
    }

    if let Some(v) = var("APP__MOVE_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.move_timeout_secs = parsed;
        }
    }

    if let Some(v) = var("APP__LOG_MOVE_TO_HEIGHT_FAILURES") {
        if let Some(parsed) = parse_flag(&v) {
            settings.log_move_to_height_failures = parsed;
        }
    }

    if let Some(v) = var("APP__SIMULATED_START_HEIGHT_MM") {
        if let Ok(parsed) = v.parse::<i32>() {
            settings.simulated_start_height_mm = parsed;
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
