pub mod auth;
pub mod catalog;
pub mod query;
pub mod token;
