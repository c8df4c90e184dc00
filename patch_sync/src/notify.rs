use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

pub const DEFAULT_CLEAR_AFTER: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NoticeKind,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Error,
        }
    }
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<S: NotificationSink + ?Sized> NotificationSink for Arc<S> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

impl NotificationSink for Vec<Arc<dyn NotificationSink>> {
    fn notify(&self, notification: Notification) {
        for sink in self {
            sink.notify(notification.clone());
        }
    }
}

/// Status line that shows the latest notification until `clear_after` has
/// elapsed. A newer notification replaces the current one and restarts the
/// interval.
pub struct TransientStatus {
    clear_after: Duration,
    current: Mutex<Option<(Notification, Instant)>>,
}

impl TransientStatus {
    pub fn new(clear_after: Duration) -> Self {
        Self {
            clear_after,
            current: Mutex::new(None),
        }
    }

    pub fn current(&self) -> Option<Notification> {
        self.current_at(Instant::now())
    }

    pub fn current_at(&self, now: Instant) -> Option<Notification> {
        let mut guard = self.current.lock().ok()?;
        match guard.as_ref() {
            Some((n, posted)) if now.saturating_duration_since(*posted) < self.clear_after => {
                Some(n.clone())
            }
            Some(_) => {
                *guard = None;
                None
            }
            None => None,
        }
    }

    fn post_at(&self, notification: Notification, now: Instant) {
        if let Ok(mut guard) = self.current.lock() {
            *guard = Some((notification, now));
        }
    }
}

impl Default for TransientStatus {
    fn default() -> Self {
        Self::new(DEFAULT_CLEAR_AFTER)
    }
}

impl NotificationSink for TransientStatus {
    fn notify(&self, notification: Notification) {
        self.post_at(notification, Instant::now());
    }
}

pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NoticeKind::Success => tracing::info!(message = %notification.message, "notice"),
            NoticeKind::Error => tracing::warn!(message = %notification.message, "notice"),
        }
    }
}

pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_status_clears_after_interval() {
        let status = TransientStatus::new(Duration::from_millis(3000));
        let t0 = Instant::now();
        status.post_at(Notification::success("Patch created"), t0);

        assert_eq!(
            status.current_at(t0 + Duration::from_millis(2999)),
            Some(Notification::success("Patch created"))
        );
        assert_eq!(status.current_at(t0 + Duration::from_millis(3000)), None);
        assert_eq!(status.current_at(t0), None);
    }

    #[test]
    fn newer_notice_restarts_interval() {
        let status = TransientStatus::new(Duration::from_millis(100));
        let t0 = Instant::now();
        status.post_at(Notification::success("first"), t0);
        status.post_at(Notification::error("second"), t0 + Duration::from_millis(80));

        assert_eq!(
            status.current_at(t0 + Duration::from_millis(150)),
            Some(Notification::error("second"))
        );
    }

    #[test]
    fn fan_out_reaches_every_sink() {
        let (a, mut rx_a) = ChannelSink::new();
        let (b, mut rx_b) = ChannelSink::new();
        let sinks: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(a), Arc::new(b)];
        sinks.notify(Notification::error("boom"));
        assert_eq!(rx_a.try_recv().unwrap(), Notification::error("boom"));
        assert_eq!(rx_b.try_recv().unwrap(), Notification::error("boom"));
    }
}
