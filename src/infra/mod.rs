//! Infrastructure layer - External systems integration
//!
//! - Database connection, migrations and transaction-scoped repositories
//! - Redis for rate limiting and the checkout lock
//! - Unit of Work for transaction management

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::{checkout_lock_resource, Cache, LockGuard};
pub use db::{Database, Migrator};
pub use repositories::{LessonRecord, PurchaseLine};
pub use unit_of_work::{Persistence, TransactionContext, UnitOfWork};
