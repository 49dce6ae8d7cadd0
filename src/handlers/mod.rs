pub mod cart;
pub mod catalog;
pub mod common;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

pub use cart::{cart_routes, CartSummary};
pub use catalog::catalog_routes;
