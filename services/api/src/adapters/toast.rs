//! services/api/src/adapters/toast.rs
//!
//! A `Notifier` that keeps the latest notice visible for a short while, the
//! way a toast pops up and fades in the browser.

use chrono::{DateTime, Utc};
use portal_core::domain::Notice;
use portal_core::ports::Notifier;
use std::sync::RwLock;
use std::time::Duration;
use tracing::info;

pub struct ToastAdapter {
    latest: RwLock<Option<(Notice, DateTime<Utc>)>>,
    ttl: chrono::Duration,
}

impl ToastAdapter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            latest: RwLock::new(None),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(1)),
        }
    }

    /// The notice still on screen at `now`, if any.
    pub fn current(&self, now: DateTime<Utc>) -> Option<Notice> {
        let latest = self.latest.read().ok()?;
        match latest.as_ref() {
            Some((notice, raised_at)) if now - *raised_at < self.ttl => Some(notice.clone()),
            _ => None,
        }
    }
}

impl Notifier for ToastAdapter {
    fn notify(&self, notice: Notice) {
        info!("Toast: {}", notice.message);
        if let Ok(mut latest) = self.latest.write() {
            *latest = Some((notice, Utc::now()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_notice_replaces_the_previous_one_and_expires() {
        let toasts = ToastAdapter::new(Duration::from_secs(3));
        toasts.notify(Notice::success("Assignment created successfully!"));
        toasts.notify(Notice::success("Assignment deleted successfully!"));

        let now = Utc::now();
        assert_eq!(
            toasts.current(now).map(|n| n.message),
            Some("Assignment deleted successfully!".to_string())
        );
        assert_eq!(toasts.current(now + chrono::Duration::seconds(4)), None);
    }
}
