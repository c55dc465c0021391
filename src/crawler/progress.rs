//! Status and progress notifications emitted during a run
//!
//! A `Reporter` forwards messages to optional caller-supplied callbacks. The
//! callbacks run on the crawl task, so a front end that needs to touch its own
//! thread must marshal the message itself.

use chrono::{DateTime, Local};
use std::fmt;
use std::sync::Arc;

/// Whether a message replaces the current status line or is appended to the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Status,
    Log,
}

/// A timestamped, human-readable notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub timestamp: DateTime<Local>,
    pub kind: MessageKind,
    pub text: String,
}

impl StatusMessage {
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            kind,
            text: text.into(),
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.text)
    }
}

/// Pages processed against the page budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: u32,
    pub total: u32,
}

impl Progress {
    pub fn new(done: u32, total: u32) -> Self {
        Self { done, total }
    }

    /// Progress for a finished run: always 100%
    pub fn finished(pages: u32) -> Self {
        let pages = pages.max(1);
        Self {
            done: pages,
            total: pages,
        }
    }

    /// Fraction complete, clamped to `[0.0, 1.0]`
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.done as f64 / self.total as f64).clamp(0.0, 1.0)
    }

    pub fn percent(&self) -> u32 {
        (self.ratio() * 100.0).round() as u32
    }

    /// Display label, e.g. `40% (4/10)`
    pub fn label(&self) -> String {
        format!("{}% ({}/{})", self.percent(), self.done, self.total)
    }
}

pub type StatusCallback = Arc<dyn Fn(StatusMessage) + Send + Sync>;
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Fans run notifications out to the registered callbacks
#[derive(Clone, Default)]
pub struct Reporter {
    on_status: Option<StatusCallback>,
    on_progress: Option<ProgressCallback>,
}

impl Reporter {
    /// A reporter with no callbacks; messages only reach `tracing`
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status_callback(mut self, callback: StatusCallback) -> Self {
        self.on_status = Some(callback);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Replaces the current status line
    pub fn status(&self, text: impl Into<String>) {
        self.emit(MessageKind::Status, text.into());
    }

    /// Appends a line to the run log
    pub fn log(&self, text: impl Into<String>) {
        self.emit(MessageKind::Log, text.into());
    }

    pub fn progress(&self, progress: Progress) {
        tracing::debug!(target: "site_mirror::progress", "{}", progress.label());
        if let Some(callback) = &self.on_progress {
            callback(progress);
        }
    }

    fn emit(&self, kind: MessageKind, text: String) {
        tracing::debug!(target: "site_mirror::progress", ?kind, "{}", text);
        if let Some(callback) = &self.on_status {
            callback(StatusMessage::new(kind, text));
        }
    }
}
