//! Run log.
//!
//! Entries are printed to stderr and broadcast to subscribers. Each batch
//! run owns a [`RunLog`] (see `JobContext`) and subscribes to it to collect
//! the warnings it reports; storage and CLI messages go through the
//! process-wide [`GLOBAL_LOG`] helpers.

use once_cell::sync::Lazy;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::TryRecvError};

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn prefix(self) -> &'static str {
        match self {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting level for sub-steps
    pub indent: u8,
}

/// Log sink that prints and fans entries out to subscribers.
#[derive(Debug)]
pub struct RunLog {
    sender: broadcast::Sender<LogEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    fn emit(&self, level: LogLevel, message: String, indent: u8) {
        eprintln!("{}{} {}", "   ".repeat(indent as usize), level.prefix(), message);
        // No receivers is fine
        let _ = self.sender.send(LogEntry { level, message, indent });
    }

    pub fn info(&self, msg: impl Into<String>) {
        self.emit(LogLevel::Info, msg.into(), 0);
    }

    pub fn info_indent(&self, msg: impl Into<String>, indent: u8) {
        self.emit(LogLevel::Info, msg.into(), indent);
    }

    pub fn success(&self, msg: impl Into<String>) {
        self.emit(LogLevel::Success, msg.into(), 0);
    }

    pub fn warning(&self, msg: impl Into<String>) {
        self.emit(LogLevel::Warning, msg.into(), 0);
    }

    pub fn error(&self, msg: impl Into<String>) {
        self.emit(LogLevel::Error, msg.into(), 0);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything currently buffered in `rx`. Entries lost to lag are skipped.
pub fn drain(rx: &mut broadcast::Receiver<LogEntry>) -> Vec<LogEntry> {
    let mut entries = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(entry) => entries.push(entry),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    entries
}

/// Process-wide log for messages outside a batch run.
pub static GLOBAL_LOG: Lazy<RunLog> = Lazy::new(RunLog::new);

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    GLOBAL_LOG.info_indent(msg, indent);
}

pub fn log_success(msg: impl Into<String>) {
    GLOBAL_LOG.success(msg);
}

pub fn log_warning(msg: impl Into<String>) {
    GLOBAL_LOG.warning(msg);
}

pub fn log_error(msg: impl Into<String>) {
    GLOBAL_LOG.error(msg);
}
