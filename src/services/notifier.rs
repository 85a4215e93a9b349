//! Best-effort notification dispatch.
//!
//! Events are published only after their transaction committed. Delivery
//! errors are logged and dropped; they never reach the caller.

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{DomainEvent, Notification};
use crate::errors::{AppError, AppResult};
use crate::jobs::NotificationJob;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Delivery collaborator for user notifications.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: Notification) -> AppResult<()>;
}

/// Writes notifications to the log. Used when no job queue is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: Notification) -> AppResult<()> {
        tracing::info!(
            user_id = %notification.user_id,
            kind = ?notification.kind,
            title = %notification.title,
            "{}",
            notification.message
        );
        Ok(())
    }
}

/// Enqueues notifications for the background worker.
pub struct JobNotifier {
    storage: PostgresStorage<NotificationJob>,
}

impl JobNotifier {
    pub fn new(storage: PostgresStorage<NotificationJob>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Notifier for JobNotifier {
    async fn send(&self, notification: Notification) -> AppResult<()> {
        let mut storage = self.storage.clone();
        storage
            .push(NotificationJob::from(notification))
            .await
            .map_err(|e| AppError::internal(format!("Failed to enqueue notification: {}", e)))?;
        Ok(())
    }
}

/// Fans domain events out to the notifier.
#[derive(Clone)]
pub struct EventDispatcher {
    notifier: Arc<dyn Notifier>,
    detached: bool,
}

impl EventDispatcher {
    /// Dispatcher that delivers on a spawned task.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            detached: true,
        }
    }

    /// Dispatcher that delivers before `publish` returns.
    pub fn inline(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            detached: false,
        }
    }

    /// Publish committed events.
    pub async fn publish(&self, events: Vec<DomainEvent>) {
        if events.is_empty() {
            return;
        }

        if self.detached {
            let notifier = self.notifier.clone();
            tokio::spawn(async move {
                deliver(notifier.as_ref(), &events).await;
            });
        } else {
            deliver(self.notifier.as_ref(), &events).await;
        }
    }
}

/// Send every notification owed for the events; returns how many went out.
pub async fn deliver(notifier: &dyn Notifier, events: &[DomainEvent]) -> usize {
    let mut sent = 0;
    for event in events {
        for notification in event.notifications() {
            let user_id = notification.user_id;
            match notifier.send(notification).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    tracing::warn!(
                        event = event.name(),
                        user_id = %user_id,
                        error = %e,
                        "Notification delivery failed"
                    );
                }
            }
        }
    }
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PurchasedCourse;
    use uuid::Uuid;

    fn order_placed() -> DomainEvent {
        DomainEvent::OrderPlaced {
            order_id: 1,
            customer_user_id: Uuid::new_v4(),
            customer_name: "sam".into(),
            courses: vec![PurchasedCourse {
                course_id: 1,
                title: "Rust".into(),
                instructor_id: Uuid::new_v4(),
                instructor_name: "Ada".into(),
            }],
        }
    }

    #[tokio::test]
    async fn test_deliver_sends_every_notification() {
        let mut notifier = MockNotifier::new();
        notifier.expect_send().times(2).returning(|_| Ok(()));

        let sent = deliver(&notifier, &[order_placed()]).await;
        assert_eq!(sent, 2);
    }

    #[tokio::test]
    async fn test_delivery_failures_are_swallowed() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send()
            .times(2)
            .returning(|_| Err(AppError::internal("queue down")));

        let sent = deliver(&notifier, &[order_placed()]).await;
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn test_inline_publish_skips_empty_batches() {
        let mut notifier = MockNotifier::new();
        notifier.expect_send().never();

        EventDispatcher::inline(Arc::new(notifier)).publish(Vec::new()).await;
    }
}
