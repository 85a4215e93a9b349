//! HTTP request handlers.

pub mod cart_handler;
pub mod catalog_handler;
pub mod instructor_handler;
pub mod order_handler;
pub mod progress_handler;
pub mod quiz_handler;
pub mod rating_handler;

pub use cart_handler::cart_routes;
pub use catalog_handler::catalog_routes;
pub use instructor_handler::instructor_routes;
pub use order_handler::{checkout_routes, order_routes};
pub use progress_handler::progress_routes;
pub use quiz_handler::quiz_routes;
pub use rating_handler::rating_routes;
