//! Non-fatal notices: deprecations and downgraded check failures.
//!
//! Notices go to a [`NoticeSink`]. A process installs its sink once at start
//! up with [`install`]; until then the default board logs through `tracing`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::error::{Error, Result};

/// Category of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// A legacy name was called.
    Deprecation,
    /// A check failed but the caller asked for warnings only.
    CheckFailure,
}

impl NoticeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NoticeKind::Deprecation => "deprecation",
            NoticeKind::CheckFailure => "check_failure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Destination for notices.
pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: &Notice);
}

impl<S: NoticeSink + ?Sized> NoticeSink for Arc<S> {
    fn notify(&self, notice: &Notice) {
        (**self).notify(notice);
    }
}

/// Emits notices as `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NoticeSink for TracingSink {
    fn notify(&self, notice: &Notice) {
        tracing::warn!(kind = notice.kind.label(), "{}", notice.message);
    }
}

/// Keeps notices in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl NoticeSink for CollectingSink {
    fn notify(&self, notice: &Notice) {
        self.notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notice.clone());
    }
}

/// A sink plus the record of which deprecations were already announced.
pub struct NoticeBoard {
    sink: Box<dyn NoticeSink>,
    announced: Mutex<HashSet<String>>,
}

impl NoticeBoard {
    pub fn new(sink: impl NoticeSink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            announced: Mutex::new(HashSet::new()),
        }
    }

    pub fn notify(&self, kind: NoticeKind, message: impl Into<String>) {
        self.sink.notify(&Notice {
            kind,
            message: message.into(),
        });
    }

    /// Announce that `old` was renamed to `new`, once per `old` name.
    pub fn deprecated(&self, old: &str, new: &str) {
        let first = self
            .announced
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(old.to_string());
        if first {
            let message = format!(
                "`{old}` has been renamed to `{new}`; the old name will be removed in a future release"
            );
            self.notify(NoticeKind::Deprecation, message);
        }
    }
}

impl std::fmt::Debug for NoticeBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoticeBoard").finish_non_exhaustive()
    }
}

static BOARD: OnceCell<NoticeBoard> = OnceCell::new();

/// Install the process-wide sink. Fails if a board is already in use.
pub fn install(sink: impl NoticeSink + 'static) -> Result<()> {
    BOARD
        .set(NoticeBoard::new(sink))
        .map_err(|_| Error::Config("notice sink already installed".to_string()))
}

/// The process-wide board, defaulting to [`TracingSink`].
pub fn board() -> &'static NoticeBoard {
    BOARD.get_or_init(|| NoticeBoard::new(TracingSink))
}
