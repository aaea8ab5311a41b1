pub mod basket;
pub mod category;
pub mod order;
pub mod product;
pub mod review;

pub use basket::BasketEntry;
pub use category::Category;
pub use order::Order;
pub use product::{Discount, Product};
pub use review::Review;
