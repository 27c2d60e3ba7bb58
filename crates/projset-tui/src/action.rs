//! All possible UI actions. Actions are the sole mechanism for state mutation.

use projset_core::{CoreError, Props, RouteParams, SavedField, SubmitRequest};

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A status-bar notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Loading ───────────────────────────────────────────────────
    /// Fetch the project at this route.
    Load(RouteParams),
    /// Fetch the current route again.
    Reload,
    ProjectLoaded(Box<Props>),
    LoadFailed(String),

    // ── Saving ────────────────────────────────────────────────────
    /// Send a started save to the server.
    Save(SubmitRequest),
    SaveFinished {
        revision: u64,
        result: Result<Vec<SavedField>, CoreError>,
    },

    // ── Overlays ──────────────────────────────────────────────────
    OpenRoutePrompt,
    CloseRoutePrompt,
    ToggleHelp,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}
