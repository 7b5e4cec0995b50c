use crate::database::record::{Bugs, RecordStore, Toys};
use crate::database::user::UserStore;
use crate::models::health::HealthResponse;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;

/// Liveness probe with the size of every store
#[openapi(tag = "Health")]
#[get("/")]
pub async fn healthcheck(bugs: &State<RecordStore<Bugs>>, toys: &State<RecordStore<Toys>>, users: &State<UserStore>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        bugs: bugs.len().await,
        toys: toys.len().await,
        users: users.len().await,
    })
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![healthcheck]
}
