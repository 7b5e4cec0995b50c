use crate::auth::{build_auth_cookie, clear_auth_cookie};
use crate::config::Config;
use crate::database::user::UserStore;
use crate::error::app_error::AppError;
use crate::models::session::Identity;
use crate::models::user::{LoginRequest, SignupRequest, UserResponse};
use crate::service::auth::AuthService;
use crate::service::token::TokenCodec;
use rocket::http::CookieJar;
use rocket::serde::json::Json;
use rocket::{State, post};
use rocket_okapi::openapi;
use validator::Validate;

/// Log in with username and password
///
/// Sets the http-only `loginToken` cookie on success.
#[openapi(tag = "Authentication")]
#[post("/login", data = "<payload>")]
pub async fn post_login(
    config: &State<Config>,
    users: &State<UserStore>,
    tokens: &State<TokenCodec>,
    cookies: &CookieJar<'_>,
    payload: Json<LoginRequest>,
) -> Result<Json<Identity>, AppError> {
    let auth = AuthService::new(users.inner(), tokens.inner());
    let identity = auth.authenticate(&payload).await?;
    let token = auth.login_token(&identity)?;
    cookies.add(build_auth_cookie(&config.auth.cookie_name, token));
    Ok(Json(identity))
}

/// Register a new user and log them in
#[openapi(tag = "Authentication")]
#[post("/signup", data = "<payload>")]
pub async fn post_signup(
    config: &State<Config>,
    users: &State<UserStore>,
    tokens: &State<TokenCodec>,
    cookies: &CookieJar<'_>,
    payload: Json<SignupRequest>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    let user = users.add(&payload).await?;
    let identity = Identity {
        id: user.id.clone(),
        fullname: user.fullname.clone(),
        is_admin: user.is_admin,
    };
    let token = AuthService::new(users.inner(), tokens.inner()).login_token(&identity)?;
    cookies.add(build_auth_cookie(&config.auth.cookie_name, token));
    Ok(Json(user))
}

#[openapi(tag = "Authentication")]
#[post("/logout")]
pub fn post_logout(config: &State<Config>, cookies: &CookieJar<'_>) -> &'static str {
    clear_auth_cookie(cookies, &config.auth.cookie_name);
    "Logged out"
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![post_login, post_signup, post_logout]
}

#[cfg(test)]
mod tests {
    use crate::build_rocket;
    use crate::models::session::Identity;
    use crate::models::user::UserResponse;
    use crate::test_utils::{seed_users, test_config};
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;
    use serde_json::json;

    async fn client(dir: &std::path::Path) -> Client {
        Client::tracked(build_rocket(test_config(dir))).await.expect("valid rocket instance")
    }

    #[rocket::async_test]
    async fn signup_logs_in_and_rejects_duplicates() {
        let dir = tempfile::tempdir().expect("temp dir");
        let client = client(dir.path()).await;
        let body = json!({ "username": "puki", "password": "secret", "fullname": "Puki Ja" }).to_string();

        let response = client.post("/api/auth/signup").header(ContentType::JSON).body(&body).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let user: UserResponse = response.into_json().await.expect("user json");
        assert_eq!(user.username, "puki");
        assert!(!user.is_admin);
        assert!(client.cookies().get("loginToken").is_some());

        let response = client.post("/api/auth/signup").header(ContentType::JSON).body(&body).dispatch().await;
        assert_eq!(response.status(), Status::Conflict);
    }

    #[rocket::async_test]
    async fn signup_rejects_empty_fields() {
        let dir = tempfile::tempdir().expect("temp dir");
        let client = client(dir.path()).await;

        let response = client
            .post("/api/auth/signup")
            .header(ContentType::JSON)
            .body(json!({ "username": "", "password": "secret", "fullname": "Nobody" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        assert!(client.cookies().get("loginToken").is_none());
    }

    #[rocket::async_test]
    async fn login_returns_identity_and_logout_clears_cookie() {
        let dir = tempfile::tempdir().expect("temp dir");
        seed_users(dir.path(), &[("u101", "puki", "puki-pass", false)]);
        let client = client(dir.path()).await;

        let response = client
            .post("/api/auth/login")
            .header(ContentType::JSON)
            .body(json!({ "username": "puki", "password": "puki-pass" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let set_cookie = response.headers().get_one("Set-Cookie").expect("cookie issued").to_string();
        assert!(set_cookie.starts_with("loginToken="));
        assert!(set_cookie.contains("HttpOnly"));

        let identity: Identity = response.into_json().await.expect("identity json");
        assert_eq!(identity.id, "u101");
        assert_eq!(identity.fullname, "puki Fullname");

        let response = client.post("/api/auth/logout").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.as_deref(), Some("Logged out"));
        assert!(client.cookies().get("loginToken").is_none());

        let response = client.post("/api/bug").header(ContentType::JSON).body(r#"{"title":"x"}"#).dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn login_rejects_bad_credentials() {
        let dir = tempfile::tempdir().expect("temp dir");
        seed_users(dir.path(), &[("u101", "puki", "puki-pass", false)]);
        let client = client(dir.path()).await;

        for (username, password) in [("puki", "wrong"), ("ghost", "puki-pass")] {
            let response = client
                .post("/api/auth/login")
                .header(ContentType::JSON)
                .body(json!({ "username": username, "password": password }).to_string())
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Unauthorized);
            assert_eq!(response.into_string().await.as_deref(), Some("Invalid username or password"));
        }
        assert!(client.cookies().get("loginToken").is_none());
    }
}
