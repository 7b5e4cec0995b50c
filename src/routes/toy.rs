use crate::auth::CurrentUser;
use crate::database::record::{RecordStore, Toys};
use crate::error::app_error::AppError;
use crate::middleware::view_throttle::ViewThrottle;
use crate::models::query::RecordQuery;
use crate::models::record::{Msg, MsgRequest, Record, RecordRequest};
use crate::service::catalog::CatalogService;
use rocket::http::CookieJar;
use rocket::serde::json::Json;
use rocket::{State, delete, get, post, put};
use rocket_okapi::openapi;

#[openapi(tag = "Toys")]
#[get("/?<query..>")]
pub async fn list_toys(store: &State<RecordStore<Toys>>, query: RecordQuery) -> Json<Vec<Record>> {
    Json(CatalogService::new(store.inner()).list(&query).await)
}

#[openapi(tag = "Toys")]
#[get("/<id>")]
pub async fn get_toy(store: &State<RecordStore<Toys>>, throttle: &State<ViewThrottle>, cookies: &CookieJar<'_>, id: &str) -> Result<Json<Record>, AppError> {
    let toy = CatalogService::new(store.inner()).view(throttle, cookies, id).await?;
    Ok(Json(toy))
}

#[openapi(tag = "Toys")]
#[post("/", data = "<payload>")]
pub async fn save_toy(store: &State<RecordStore<Toys>>, current_user: CurrentUser, payload: Json<RecordRequest>) -> Result<Json<Record>, AppError> {
    let toy = CatalogService::new(store.inner()).save(current_user.identity(), payload.into_inner()).await?;
    Ok(Json(toy))
}

#[openapi(tag = "Toys")]
#[put("/<id>", data = "<payload>")]
pub async fn put_toy(store: &State<RecordStore<Toys>>, current_user: CurrentUser, id: &str, payload: Json<RecordRequest>) -> Result<Json<Record>, AppError> {
    let toy = CatalogService::new(store.inner()).update(current_user.identity(), id, payload.into_inner()).await?;
    Ok(Json(toy))
}

#[openapi(tag = "Toys")]
#[delete("/<id>")]
pub async fn delete_toy(store: &State<RecordStore<Toys>>, current_user: CurrentUser, id: &str) -> Result<&'static str, AppError> {
    CatalogService::new(store.inner()).remove(current_user.identity(), id).await?;
    Ok("Toy removed")
}

/// Leave a msg on a toy
#[openapi(tag = "Toys")]
#[post("/<id>/msg", data = "<payload>")]
pub async fn add_toy_msg(store: &State<RecordStore<Toys>>, current_user: CurrentUser, id: &str, payload: Json<MsgRequest>) -> Result<Json<Msg>, AppError> {
    let msg = CatalogService::new(store.inner()).add_msg(current_user.identity(), id, payload.into_inner()).await?;
    Ok(Json(msg))
}

#[openapi(tag = "Toys")]
#[delete("/<id>/msg/<msg_id>")]
pub async fn remove_toy_msg(store: &State<RecordStore<Toys>>, current_user: CurrentUser, id: &str, msg_id: &str) -> Result<&'static str, AppError> {
    CatalogService::new(store.inner()).remove_msg(current_user.identity(), id, msg_id).await?;
    Ok("Msg removed")
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_toys, get_toy, save_toy, put_toy, delete_toy, add_toy_msg, remove_toy_msg]
}
