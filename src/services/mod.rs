//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! Every use case runs in one Unit of Work transaction. Derived aggregates
//! are recomputed inside that transaction; notifications are published
//! only after it committed.

pub mod access;
mod account_service;
mod cart_service;
mod catalog_service;
mod checkout_service;
pub mod container;
mod earnings_service;
pub mod notifier;
mod progress_service;
mod quiz_service;
mod rating_service;
pub mod recompute;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use account_service::{AccountManager, AccountService};
pub use cart_service::{CartManager, CartService};
pub use catalog_service::{CatalogManager, CatalogService, CourseStatistics};
pub use checkout_service::{CheckoutManager, CheckoutService};
pub use earnings_service::{EarningsManager, EarningsService};
pub use progress_service::{LessonSnapshot, ProgressManager, ProgressService};
pub use quiz_service::{
    AnswerInput, AnswerOutcome, QuizManager, QuizProgress, QuizResult, QuizService, RetakeOutcome,
};
pub use rating_service::{RatingManager, RatingService};

// Notification delivery
pub use notifier::{EventDispatcher, JobNotifier, LogNotifier, Notifier};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use notifier::MockNotifier;
