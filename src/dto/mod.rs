pub mod address;
pub mod auth;
pub mod cart;
pub mod comments;
pub mod orders;
pub mod products;
pub mod profile;
