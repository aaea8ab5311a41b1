pub mod basket;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;
pub mod reviews;
