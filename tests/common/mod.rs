//! Shared fixtures for the integration tests.
//!
//! Every test gets its own in-memory SQLite database with all migrations
//! applied, and a notifier that records what would have been delivered.

#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use course_engine::config::Config;
use course_engine::domain::{
    Actor, Course, Currency, Lesson, Level, NewCourse, NewLesson, NewOption, NewQuestion,
    NewSection, Notification, PaymentPolicy, QuestionView, Section, UserRole,
};
use course_engine::errors::AppResult;
use course_engine::infra::Migrator;
use course_engine::services::{EventDispatcher, Notifier, ServiceContainer, Services};

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-32chars";

// =============================================================================
// Recording notifier
// =============================================================================

/// Notifier that keeps every notification in memory
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("notifier lock").clone()
    }

    pub fn titles_for(&self, user_id: Uuid) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|n| n.user_id == user_id)
            .map(|n| n.title)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: Notification) -> AppResult<()> {
        self.sent.lock().expect("notifier lock").push(notification);
        Ok(())
    }
}

// =============================================================================
// Engine fixture
// =============================================================================

pub struct Engine {
    pub services: Services,
    pub notifier: Arc<RecordingNotifier>,
    pub connection: DatabaseConnection,
}

/// Fresh in-memory database with the schema applied.
///
/// A single pooled connection keeps every transaction on the same database.
pub async fn connect() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let connection = sea_orm::Database::connect(options)
        .await
        .expect("sqlite connects");
    Migrator::up(&connection, None)
        .await
        .expect("migrations apply");
    connection
}

pub async fn engine() -> Engine {
    engine_with_policy(PaymentPolicy::SettleImmediately).await
}

pub async fn engine_with_policy(policy: PaymentPolicy) -> Engine {
    let connection = connect().await;
    let mut config = Config::for_tests(TEST_SECRET);
    config.payment_policy = policy;

    let notifier = Arc::new(RecordingNotifier::default());
    let dispatcher = EventDispatcher::inline(notifier.clone());
    let services = Services::from_connection(connection.clone(), &config, dispatcher);

    Engine {
        services,
        notifier,
        connection,
    }
}

impl Engine {
    /// Provision a caller the way the auth middleware does.
    pub async fn actor(&self, name: &str, role: UserRole) -> Actor {
        let actor = Actor::new(
            Uuid::new_v4(),
            format!("{}@example.com", name),
            name.to_string(),
            role,
        );
        self.services
            .accounts()
            .provision(&actor)
            .await
            .expect("provisioning succeeds");
        actor
    }

    pub async fn course(&self, instructor: &Actor, title: &str, price: Decimal) -> Course {
        let collection = self
            .services
            .catalog()
            .create_collection(instructor, format!("{} collection", title))
            .await
            .expect("collection created");

        self.services
            .catalog()
            .create_course(
                instructor,
                NewCourse {
                    title: title.to_string(),
                    description: format!("All about {}", title),
                    price,
                    currency: Currency::Usd,
                    level: Level::Beginner,
                    collection_id: collection.id,
                    preview: format!("previews/{}.mp4", title.to_lowercase().replace(' ', "-")),
                },
            )
            .await
            .expect("course created")
    }

    pub async fn section(&self, instructor: &Actor, course_id: i32, title: &str) -> Section {
        self.services
            .catalog()
            .create_section(
                instructor,
                course_id,
                NewSection {
                    title: title.to_string(),
                    locked: true,
                    is_default: false,
                },
            )
            .await
            .expect("section created")
    }

    pub async fn lesson(
        &self,
        instructor: &Actor,
        course_id: i32,
        section_id: i32,
        file: &str,
        duration: i64,
    ) -> Lesson {
        self.services
            .catalog()
            .create_lesson(
                instructor,
                course_id,
                section_id,
                NewLesson {
                    title: format!("Lesson {}", file),
                    file: Some(file.to_string()),
                    duration,
                    is_active: true,
                },
            )
            .await
            .expect("lesson created")
    }

    /// Two-option question; the first option is the correct one.
    pub async fn question(&self, instructor: &Actor, course_id: i32, section_id: i32, text: &str) -> QuestionView {
        self.services
            .catalog()
            .create_question(
                instructor,
                course_id,
                section_id,
                NewQuestion {
                    text: text.to_string(),
                    options: vec![
                        NewOption {
                            text: "right".to_string(),
                            is_correct: true,
                        },
                        NewOption {
                            text: "wrong".to_string(),
                            is_correct: false,
                        },
                    ],
                },
            )
            .await
            .expect("question created")
    }

    /// Put the courses in the buyer's cart and check out.
    pub async fn buy(&self, buyer: &Actor, course_ids: &[i32]) {
        let cart = self.services.carts().get_cart(buyer).await.expect("cart");
        for course_id in course_ids {
            self.services
                .carts()
                .add_item(buyer, cart.id, Some(*course_id))
                .await
                .expect("item added");
        }
        self.services.checkout().checkout(buyer).await.expect("checkout succeeds");
    }
}

pub fn option_id(question: &QuestionView, correct: bool) -> i32 {
    let wanted = if correct { "right" } else { "wrong" };
    question
        .options
        .iter()
        .find(|o| o.text == wanted)
        .map(|o| o.id)
        .expect("option present")
}
