pub mod admin;
pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod profile;
pub mod reviews;
pub mod sellers;
