//! SeaORM entities for database tables

pub mod cart_item;
pub mod category;
pub mod cuisine;
pub mod meal;
pub mod order;
pub mod order_item;
pub mod provider_profile;
pub mod review;
pub mod session;
pub mod user;
