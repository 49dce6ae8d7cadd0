pub mod cart_service;

pub use cart_service::{AddOutcome, AddToCartInput, CartService};
