use std::{fmt, str::FromStr};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::UnknownConnectionStatus;

pub const MIN_HEIGHT_MM: i32 = 620;
pub const MAX_HEIGHT_MM: i32 = 1270;
pub const SHORTCUT_NAME_MAX_CHARS: usize = 32;
pub const DEFAULT_SHORTCUT_HEIGHT_CM: f64 = 85.0;

const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

pub fn mm_to_cm(height_mm: i32) -> f64 {
    f64::from(height_mm) / 10.0
}

pub fn cm_to_mm(height_cm: f64) -> i32 {
    (height_cm * 10.0).round() as i32
}

pub fn is_height_in_range(height_mm: i32) -> bool {
    (MIN_HEIGHT_MM..=MAX_HEIGHT_MM).contains(&height_mm)
}

pub fn height_fraction(height_cm: f64) -> f64 {
    let span = f64::from(MAX_HEIGHT_MM - MIN_HEIGHT_MM);
    ((height_cm * 10.0 - f64::from(MIN_HEIGHT_MM)) / span).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Connected,
    NotConnected,
    #[default]
    Unknown,
}

impl ConnectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "CONNECTED",
            Self::NotConnected => "NOT_CONNECTED",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Connected => "Connected",
            Self::NotConnected => "Disconnected",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = UnknownConnectionStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CONNECTED" => Ok(Self::Connected),
            "NOT_CONNECTED" => Ok(Self::NotConnected),
            "UNKNOWN" => Ok(Self::Unknown),
            other => Err(UnknownConnectionStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Wall-clock time of creation as `HH:MM:SS`, fixed once written.
    pub timestamp: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: timestamp.into(),
        }
    }

    pub fn at(level: LogLevel, message: impl Into<String>, time: DateTime<Local>) -> Self {
        Self::new(level, message, time.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn stamped(level: LogLevel, message: impl Into<String>) -> Self {
        Self::at(level, message, Local::now())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortcutId(pub String);

impl ShortcutId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShortcutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShortcutId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    pub id: ShortcutId,
    pub name: String,
    #[serde(rename = "heightMM")]
    pub height_mm: i32,
}

impl Shortcut {
    pub fn height_cm(&self) -> f64 {
        mm_to_cm(self.height_mm)
    }
}

pub fn default_shortcuts() -> Vec<Shortcut> {
    vec![
        Shortcut {
            id: ShortcutId::from("1"),
            name: "Sitting".to_string(),
            height_mm: 850,
        },
        Shortcut {
            id: ShortcutId::from("2"),
            name: "Standing".to_string(),
            height_mm: 1180,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDirection {
    Up,
    Down,
}

impl StepDirection {
    pub fn is_up(self) -> bool {
        matches!(self, Self::Up)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}
