pub mod health;
pub mod query;
pub mod record;
pub mod session;
pub mod user;
