use crate::auth::CurrentUser;
use crate::database::user::UserStore;
use crate::error::app_error::AppError;
use crate::models::user::{UserResponse, UserSummary};
use crate::service::auth::ensure_admin;
use rocket::serde::json::Json;
use rocket::{State, delete, get};
use rocket_okapi::openapi;

#[openapi(tag = "Users")]
#[get("/")]
pub async fn list_users(users: &State<UserStore>) -> Json<Vec<UserSummary>> {
    Json(users.list().await)
}

#[openapi(tag = "Users")]
#[get("/<id>")]
pub async fn get_user(users: &State<UserStore>, id: &str) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(users.get_by_id(id).await?))
}

/// Remove a user (admin only)
#[openapi(tag = "Users")]
#[delete("/<id>")]
pub async fn delete_user(users: &State<UserStore>, current_user: CurrentUser, id: &str) -> Result<&'static str, AppError> {
    ensure_admin(current_user.identity())?;
    users.remove(id).await?;
    Ok("User removed")
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_users, get_user, delete_user]
}
