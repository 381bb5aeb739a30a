use desk_core::{DeskSnapshot, MoveError, MoveOutcome};
use desk_shared::domain::{height_fraction, LogEntry, Shortcut};

const GAUGE_WIDTH: usize = 20;

pub fn height_text(height_cm: Option<f64>) -> String {
    match height_cm {
        Some(cm) => format!("{cm:.1} cm"),
        None => "--.- cm".to_string(),
    }
}

pub fn height_gauge(height_cm: Option<f64>) -> String {
    let filled = height_cm
        .map(|cm| (height_fraction(cm) * GAUGE_WIDTH as f64).round() as usize)
        .unwrap_or(0);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(GAUGE_WIDTH - filled))
}

pub fn status_block(snapshot: &DeskSnapshot) -> String {
    let mut out = format!(
        "Status:  {}\nHeight:  {} {}",
        snapshot.status.label(),
        height_text(snapshot.height_cm),
        height_gauge(snapshot.height_cm),
    );
    if snapshot.moving {
        out.push_str("\nMoving...");
    }
    out
}

pub fn log_line(entry: &LogEntry) -> String {
    format!("{} [{:<5}] {}", entry.timestamp, entry.level.as_str(), entry.message)
}

pub fn shortcut_line(shortcut: &Shortcut) -> String {
    format!(
        "{:<36}  {:<32}  {:.1} cm",
        shortcut.id.as_str(),
        shortcut.name,
        shortcut.height_cm()
    )
}

pub fn outcome_text(outcome: &MoveOutcome) -> String {
    match outcome {
        MoveOutcome::Completed => "done".to_string(),
        MoveOutcome::Rejected => "desk is already moving".to_string(),
        MoveOutcome::Failed(MoveError::TimedOut(limit)) => {
            format!("timed out after {}s", limit.as_secs())
        }
        MoveOutcome::Failed(err) => format!("failed: {err}"),
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
