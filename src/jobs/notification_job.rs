//! Notification delivery job.
//!
//! Checkout and progress tracking enqueue one job per notification after
//! their transaction commits. The worker hands each one to the delivery
//! collaborator; a failed job stays in the queue and never affects the
//! request that produced it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Notification, NotificationKind};
use crate::errors::AppError;

/// Notification job payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationJob {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
}

impl From<Notification> for NotificationJob {
    fn from(n: Notification) -> Self {
        Self {
            user_id: n.user_id,
            title: n.title,
            message: n.message,
            kind: n.kind,
        }
    }
}

impl From<NotificationJob> for Notification {
    fn from(job: NotificationJob) -> Self {
        Self {
            user_id: job.user_id,
            title: job.title,
            message: job.message,
            kind: job.kind,
        }
    }
}

/// Notification job handler
pub async fn notification_job_handler(job: NotificationJob) -> Result<(), AppError> {
    if job.title.trim().is_empty() {
        return Err(AppError::validation("Notification without a title"));
    }

    tracing::info!(
        user_id = %job.user_id,
        kind = ?job.kind,
        title = %job.title,
        message = %job.message,
        "Notification delivered"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str) -> NotificationJob {
        NotificationJob {
            user_id: Uuid::new_v4(),
            title: title.to_string(),
            message: "sam has purchased your course Rust".to_string(),
            kind: NotificationKind::Alert,
        }
    }

    #[tokio::test]
    async fn test_handler_accepts_well_formed_job() {
        assert!(notification_job_handler(job("New Course Purchase")).await.is_ok());
    }

    #[tokio::test]
    async fn test_handler_rejects_blank_title() {
        assert!(notification_job_handler(job("  ")).await.is_err());
    }

    #[test]
    fn test_payload_survives_the_queue() {
        let original = job("Course Completed");
        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains("\"kind\":\"ALERT\""));
        let restored: NotificationJob = serde_json::from_str(&json).unwrap();
        assert_eq!(Notification::from(restored.clone()).title, "Course Completed");
        assert_eq!(restored, original);
    }
}
