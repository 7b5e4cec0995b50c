pub mod json_file;
pub mod record;
pub mod user;
