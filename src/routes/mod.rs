pub mod auth;
pub mod bug;
pub mod error;
pub mod health;
pub mod toy;
pub mod user;
