pub mod cart_item;

pub use cart_item::{Entity as CartItem, Model as CartLine, NewCartLine};
