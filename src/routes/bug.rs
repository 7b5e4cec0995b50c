use crate::auth::CurrentUser;
use crate::database::record::{Bugs, RecordStore};
use crate::error::app_error::AppError;
use crate::middleware::view_throttle::ViewThrottle;
use crate::models::query::RecordQuery;
use crate::models::record::{Record, RecordRequest};
use crate::service::catalog::CatalogService;
use rocket::http::CookieJar;
use rocket::serde::json::Json;
use rocket::{State, delete, get, post, put};
use rocket_okapi::openapi;

/// List bugs, filtered, sorted and paged by the query string
#[openapi(tag = "Bugs")]
#[get("/?<query..>")]
pub async fn list_bugs(store: &State<RecordStore<Bugs>>, query: RecordQuery) -> Json<Vec<Record>> {
    Json(CatalogService::new(store.inner()).list(&query).await)
}

/// Get a bug by id
///
/// Counts towards the per-client view throttle.
#[openapi(tag = "Bugs")]
#[get("/<id>")]
pub async fn get_bug(store: &State<RecordStore<Bugs>>, throttle: &State<ViewThrottle>, cookies: &CookieJar<'_>, id: &str) -> Result<Json<Record>, AppError> {
    let bug = CatalogService::new(store.inner()).view(throttle, cookies, id).await?;
    Ok(Json(bug))
}

/// Create a bug, or update one when the body carries its `_id`
#[openapi(tag = "Bugs")]
#[post("/", data = "<payload>")]
pub async fn save_bug(store: &State<RecordStore<Bugs>>, current_user: CurrentUser, payload: Json<RecordRequest>) -> Result<Json<Record>, AppError> {
    let bug = CatalogService::new(store.inner()).save(current_user.identity(), payload.into_inner()).await?;
    Ok(Json(bug))
}

#[openapi(tag = "Bugs")]
#[put("/<id>", data = "<payload>")]
pub async fn put_bug(store: &State<RecordStore<Bugs>>, current_user: CurrentUser, id: &str, payload: Json<RecordRequest>) -> Result<Json<Record>, AppError> {
    let bug = CatalogService::new(store.inner()).update(current_user.identity(), id, payload.into_inner()).await?;
    Ok(Json(bug))
}

#[openapi(tag = "Bugs")]
#[delete("/<id>")]
pub async fn delete_bug(store: &State<RecordStore<Bugs>>, current_user: CurrentUser, id: &str) -> Result<&'static str, AppError> {
    CatalogService::new(store.inner()).remove(current_user.identity(), id).await?;
    Ok("Bug removed")
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_bugs, get_bug, save_bug, put_bug, delete_bug]
}

#[cfg(test)]
mod tests {
    use crate::build_rocket;
    use crate::database::record::{Bugs, Catalog};
    use crate::models::record::Record;
    use crate::test_utils::{sample_record, seed_records, seed_users, test_config};
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;
    use serde_json::json;
    use std::path::Path;

    async fn client(dir: &Path) -> Client {
        seed_users(dir, &[("u101", "puki", "puki-pass", false), ("u202", "muki", "muki-pass", false)]);
        Client::tracked(build_rocket(test_config(dir))).await.expect("valid rocket instance")
    }

    async fn login(client: &Client, username: &str, password: &str) {
        let response = client
            .post("/api/auth/login")
            .header(ContentType::JSON)
            .body(json!({ "username": username, "password": password }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn create_requires_login_and_stamps_creator() {
        let dir = tempfile::tempdir().expect("temp dir");
        let client = client(dir.path()).await;
        let body = json!({ "title": "Crash on save", "description": "boom", "severity": 3, "labels": ["critical"] }).to_string();

        let response = client.post("/api/bug").header(ContentType::JSON).body(&body).dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);

        login(&client, "puki", "puki-pass").await;
        let response = client.post("/api/bug").header(ContentType::JSON).body(&body).dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        let bug: Record = response.into_json().await.expect("bug json");
        assert_eq!(bug.title, "Crash on save");
        assert_eq!(bug.creator.id, "u101");
        assert_eq!(bug.creator.fullname, "puki Fullname");
        assert!(bug.created_at > 0);

        let persisted = std::fs::read_to_string(dir.path().join(Bugs::FILE_NAME)).expect("bug file");
        assert!(persisted.contains("Crash on save"));
    }

    #[rocket::async_test]
    async fn list_applies_query_string() {
        let dir = tempfile::tempdir().expect("temp dir");
        seed_records(
            dir.path(),
            Bugs::FILE_NAME,
            &[
                sample_record("AAA111", "alpha", 1, &["ui"]),
                sample_record("BBB222", "beta", 4, &["backend"]),
                sample_record("CCC333", "gamma", 5, &["ui", "backend"]),
            ],
        );
        let client = client(dir.path()).await;

        let response = client.get("/api/bug?minSeverity=4&sortBy=severity&sortDir=-1").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let bugs: Vec<Record> = response.into_json().await.expect("bugs json");
        assert_eq!(bugs.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(), vec!["CCC333", "BBB222"]);

        let response = client.get("/api/bug?labels=ui&txt=ALP").dispatch().await;
        let bugs: Vec<Record> = response.into_json().await.expect("bugs json");
        assert_eq!(bugs.len(), 1);
        assert_eq!(bugs[0].id, "AAA111");

        let response = client.get("/api/bug?pageSize=2&pageIdx=1").dispatch().await;
        let bugs: Vec<Record> = response.into_json().await.expect("bugs json");
        assert_eq!(bugs.len(), 1);
    }

    #[rocket::async_test]
    async fn fourth_distinct_view_is_throttled() {
        let dir = tempfile::tempdir().expect("temp dir");
        seed_records(
            dir.path(),
            Bugs::FILE_NAME,
            &[
                sample_record("AAA111", "one", 1, &[]),
                sample_record("BBB222", "two", 1, &[]),
                sample_record("CCC333", "three", 1, &[]),
                sample_record("DDD444", "four", 1, &[]),
            ],
        );
        let client = client(dir.path()).await;

        for id in ["AAA111", "BBB222", "CCC333"] {
            let response = client.get(format!("/api/bug/{}", id)).dispatch().await;
            assert_eq!(response.status(), Status::Ok);
        }

        let response = client.get("/api/bug/DDD444").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(response.into_string().await.as_deref(), Some("Wait for a bit"));

        let response = client.get("/api/bug/BBB222").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn unknown_bug_is_not_found() {
        let dir = tempfile::tempdir().expect("temp dir");
        let client = client(dir.path()).await;

        let response = client.get("/api/bug/NOPE00").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.into_string().await.as_deref(), Some("Bug NOPE00 not found"));
    }

    #[rocket::async_test]
    async fn only_creator_may_update_or_delete() {
        let dir = tempfile::tempdir().expect("temp dir");
        seed_records(dir.path(), Bugs::FILE_NAME, &[sample_record("AAA111", "owned by puki", 2, &[])]);
        let client = client(dir.path()).await;
        let update = json!({ "title": "renamed", "severity": 1 }).to_string();

        login(&client, "muki", "muki-pass").await;
        let response = client.put("/api/bug/AAA111").header(ContentType::JSON).body(&update).dispatch().await;
        assert_eq!(response.status(), Status::Forbidden);
        let response = client.delete("/api/bug/AAA111").dispatch().await;
        assert_eq!(response.status(), Status::Forbidden);

        login(&client, "puki", "puki-pass").await;
        let response = client.put("/api/bug/AAA111").header(ContentType::JSON).body(&update).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let bug: Record = response.into_json().await.expect("bug json");
        assert_eq!(bug.title, "renamed");

        let response = client.delete("/api/bug/AAA111").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.as_deref(), Some("Bug removed"));

        let response = client.delete("/api/bug/AAA111").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }
}
