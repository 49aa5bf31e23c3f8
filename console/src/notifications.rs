use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;

/// Auto-close delay of success toasts.
pub const SUCCESS_AUTO_CLOSE: Duration = Duration::from_secs(3);

/// Auto-close delay of error and info toasts.
pub const DEFAULT_AUTO_CLOSE: Duration = Duration::from_secs(4);

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    /// `None` keeps the notification until dismissed.
    pub auto_close: Option<Duration>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
            auto_close: Some(SUCCESS_AUTO_CLOSE),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
            auto_close: Some(DEFAULT_AUTO_CLOSE),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
            auto_close: Some(DEFAULT_AUTO_CLOSE),
        }
    }
}

struct Shown {
    id: u64,
    at: Instant,
    notification: Notification,
}

impl Shown {
    fn expired(&self, now: Instant) -> bool {
        self.notification
            .auto_close
            .is_some_and(|after| now.saturating_duration_since(self.at) >= after)
    }
}

struct Inner {
    shown: Mutex<Vec<Shown>>,
    next_id: AtomicU64,
    tx: broadcast::Sender<Notification>,
}

/// Transient user-facing messages raised by views and mutations.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("active", &self.active().len())
            .finish()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                shown: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                tx,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Shown>> {
        self.inner.shown.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Show `notification` and return its id for [`NotificationCenter::dismiss`].
    pub fn show(&self, notification: Notification) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(id, level = ?notification.level, "{}", notification.message);
        // No subscribers is fine; `active` still lists it.
        let _ = self.inner.tx.send(notification.clone());
        let now = Instant::now();
        let mut shown = self.lock();
        shown.retain(|s| !s.expired(now));
        shown.push(Shown {
            id,
            at: now,
            notification,
        });
        id
    }

    /// Notifications that have not been dismissed or auto-closed.
    pub fn active(&self) -> Vec<Notification> {
        let now = Instant::now();
        let mut shown = self.lock();
        shown.retain(|s| !s.expired(now));
        shown.iter().map(|s| s.notification.clone()).collect()
    }

    /// Entries still held, expired or not.
    #[cfg(test)]
    fn held(&self) -> usize {
        self.lock().len()
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let mut shown = self.lock();
        let before = shown.len();
        shown.retain(|s| s.id != id);
        shown.len() != before
    }

    /// Hand every active notification to the caller and clear the list.
    pub fn drain(&self) -> Vec<Notification> {
        let now = Instant::now();
        self.lock()
            .drain(..)
            .filter(|shown| !shown.expired(now))
            .map(|shown| shown.notification)
            .collect()
    }

    /// Live feed of notifications shown from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.inner.tx.subscribe()
    }
}
