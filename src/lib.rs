//! Course Engine - commerce and progression backend for a course marketplace
//!
//! Turns carts into purchase records exactly once per course and customer,
//! gates lessons and quizzes on purchases and prior quiz results, scores
//! quizzes, and keeps derived aggregates (ratings, durations, enrollment
//! counts, instructor earnings) consistent with the facts they summarize.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and rules
//! - **services**: Application use cases
//! - **infra**: Database, Redis and transaction management
//! - **jobs**: Background notification delivery
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Process queued notifications
//! cargo run -- jobs work
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Actor, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
