//! Domain events and the notifications they fan out to.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification category understood by the delivery collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationKind {
    Alert,
    Message,
}

/// One message for one recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchasedCourse {
    pub course_id: i32,
    pub title: String,
    pub instructor_id: Uuid,
    pub instructor_name: String,
}

/// Facts emitted after a committed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    OrderPlaced {
        order_id: i32,
        customer_user_id: Uuid,
        customer_name: String,
        courses: Vec<PurchasedCourse>,
    },
    CourseCompleted {
        student_id: Uuid,
        student_name: String,
        course_id: i32,
        course_title: String,
        instructor_id: Uuid,
    },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::OrderPlaced { .. } => "order_placed",
            DomainEvent::CourseCompleted { .. } => "course_completed",
        }
    }

    /// Notifications owed for this event.
    pub fn notifications(&self) -> Vec<Notification> {
        match self {
            DomainEvent::OrderPlaced {
                customer_user_id,
                customer_name,
                courses,
                ..
            } => courses
                .iter()
                .flat_map(|course| {
                    [
                        Notification {
                            user_id: course.instructor_id,
                            title: "New Course Purchase".to_string(),
                            message: format!(
                                "{} has purchased your course {}",
                                customer_name, course.title
                            ),
                            kind: NotificationKind::Alert,
                        },
                        Notification {
                            user_id: *customer_user_id,
                            title: "Purchase Confirmation".to_string(),
                            message: format!(
                                "You have successfully purchased the course {} by instructor {}",
                                course.title, course.instructor_name
                            ),
                            kind: NotificationKind::Message,
                        },
                    ]
                })
                .collect(),
            DomainEvent::CourseCompleted {
                student_name,
                course_title,
                instructor_id,
                ..
            } => vec![Notification {
                user_id: *instructor_id,
                title: "Course Completed".to_string(),
                message: format!("{} has completed the course {}.", student_name, course_title),
                kind: NotificationKind::Alert,
            }],
        }
    }
}
