use rocket::serde::Serialize;
use schemars::JsonSchema;

#[derive(Serialize, JsonSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub bugs: usize,
    pub toys: usize,
    pub users: usize,
}
