//! Notices - the user-facing dialog seam.
//!
//! Every user-visible message goes through the [`Notifier`] trait so the
//! binary can print them, the HTTP facade can queue them for the page, and
//! tests can count them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Informational, e.g. the post-mint confirmation with links.
    Info,
    /// Something went wrong and the user has to act.
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, text: text.into(), at: Utc::now() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, text: text.into(), at: Utc::now() }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Prints notices to stderr, keeping stdout clean for command output.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Info => eprintln!("── {}", notice.text),
            NoticeKind::Error => eprintln!("!! {}", notice.text),
        }
    }
}

/// Buffers notices in memory.
///
/// Backs the HTTP facade (`GET /notices` drains the queue the way the page
/// would poll for dialogs) and doubles as the recording sink in tests.
#[derive(Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot without draining.
    pub fn notices(&self) -> Vec<Notice> {
        self.lock().clone()
    }

    /// Drain all queued notices.
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notice>> {
        self.notices.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        self.lock().push(notice);
    }
}
