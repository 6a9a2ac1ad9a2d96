//! Notification sinks.
//!
//! Controllers report outcomes (success, warnings, failures) as
//! [`Notification`]s rather than printing. Notifications go to **stderr**
//! so stdout stays parseable for scripts.

use std::io::Write;
use std::sync::{Arc, Mutex};

use support_desk_core::notification::{Level, Notification};

/// Receives transient notifications from controllers.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Human-friendly lines on stderr: `[warning] Low confidence response ...`.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notification: Notification) {
        let marker = match notification.level {
            Level::Success => "ok",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "[{}] {}", marker, notification.message);
        let _ = stderr.flush();
    }
}

/// Machine-readable notifications: one JSON object per line on stderr.
pub struct JsonNotifier;

impl Notifier for JsonNotifier {
    fn notify(&self, notification: Notification) {
        let obj = serde_json::json!({
            "event": "notification",
            "level": notification.level.as_str(),
            "message": notification.message,
        });
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

/// Drops every notification.
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Keeps every notification in memory. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    log: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.message)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut log) = self.log.lock() {
            log.push(notification);
        }
    }
}

/// Notification mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NotifyMode {
    Off,
    Human,
    Json,
}

impl NotifyMode {
    /// Default: human notifications when stderr is a TTY, otherwise JSON.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            NotifyMode::Human
        } else {
            NotifyMode::Json
        }
    }

    /// Parse `ui.notifications`; `"auto"` picks based on the terminal.
    pub fn from_setting(setting: &str) -> Self {
        match setting {
            "off" => NotifyMode::Off,
            "human" => NotifyMode::Human,
            "json" => NotifyMode::Json,
            _ => Self::default_for_tty(),
        }
    }

    pub fn notifier(&self) -> Box<dyn Notifier> {
        match self {
            NotifyMode::Off => Box::new(SilentNotifier),
            NotifyMode::Human => Box::new(StderrNotifier),
            NotifyMode::Json => Box::new(JsonNotifier),
        }
    }
}
