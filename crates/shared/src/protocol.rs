use serde::{Deserialize, Serialize};

use crate::domain::LogEntry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum DeskEvent {
    Height(i32),
    Log(LogEntry),
    /// Connection status as wire text, e.g. `CONNECTED`.
    Connection(String),
}

impl DeskEvent {
    pub fn channel(&self) -> &'static str {
        match self {
            Self::Height(_) => "height",
            Self::Log(_) => "log",
            Self::Connection(_) => "connection",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LogLevel;

    #[test]
    fn events_serialize_with_channel_tag() {
        let event = DeskEvent::Log(LogEntry::new(LogLevel::Info, "Desk found", "08:00:01"));
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "log");
        assert_eq!(json["payload"]["level"], "INFO");
        assert_eq!(event.channel(), "log");

        let parsed: DeskEvent =
            serde_json::from_str(r#"{"type":"height","payload":905}"#).expect("parse");
        assert_eq!(parsed, DeskEvent::Height(905));
    }
}
