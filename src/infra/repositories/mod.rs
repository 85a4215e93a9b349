//! Repository layer - Data access abstraction
//!
//! Each repository borrows the open transaction of a unit of work, so every
//! read and write of a use case sees the same snapshot and commits together.

mod account_repository;
mod cart_repository;
mod catalog_repository;
mod earnings_repository;
pub(crate) mod entities;
mod order_repository;
mod progress_repository;
mod quiz_repository;
mod rating_repository;

pub use account_repository::TxAccountRepository;
pub use cart_repository::TxCartRepository;
pub use catalog_repository::{LessonRecord, TxCatalogRepository};
pub use earnings_repository::TxEarningsRepository;
pub use order_repository::{PurchaseLine, TxOrderRepository};
pub use progress_repository::TxProgressRepository;
pub use quiz_repository::TxQuizRepository;
pub use rating_repository::TxRatingRepository;
