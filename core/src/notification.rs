//! Transient user-facing status messages.

use std::time::{Duration, Instant};

/// How long a notification stays visible.
pub const NOTIFICATION_LIFETIME: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
        }
    }
}

/// A `(kind, message)` pair that expires `NOTIFICATION_LIFETIME` after it
/// was raised. Only the newest one is ever kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    kind: NotificationKind,
    message: String,
    raised_at: Instant,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>, raised_at: Instant) -> Self {
        Self {
            kind,
            message: message.into(),
            raised_at,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message, Instant::now())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message, Instant::now())
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn raised_at(&self) -> Instant {
        self.raised_at
    }

    pub fn expires_at(&self) -> Instant {
        self.raised_at + NOTIFICATION_LIFETIME
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now < self.expires_at()
    }
}
