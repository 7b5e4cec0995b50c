use crate::config::{Config, DEFAULT_COOKIE_NAME};
use crate::database::user::UserStore;
use crate::error::app_error::AppError;
use crate::models::session::Identity;
use crate::service::auth::AuthService;
use crate::service::token::TokenCodec;
use rocket::http::{Cookie, CookieJar, Status};
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{Object, Responses, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};

/// Identity carried by a valid session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser(Identity);

impl From<Identity> for CurrentUser {
    fn from(identity: Identity) -> Self {
        Self(identity)
    }
}

impl CurrentUser {
    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

pub(crate) fn build_auth_cookie(cookie_name: &str, token: String) -> Cookie<'static> {
    Cookie::build((cookie_name.to_string(), token)).path("/").http_only(true).build()
}

pub(crate) fn clear_auth_cookie(cookies: &CookieJar<'_>, cookie_name: &str) {
    cookies.remove(Cookie::build(cookie_name.to_string()).path("/").build());
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let rocket = req.rocket();
        let Some(config) = rocket.state::<Config>() else {
            return Outcome::Error((Status::InternalServerError, AppError::MissingState("Config")));
        };
        let Some(users) = rocket.state::<UserStore>() else {
            return Outcome::Error((Status::InternalServerError, AppError::MissingState("UserStore")));
        };
        let Some(tokens) = rocket.state::<TokenCodec>() else {
            return Outcome::Error((Status::InternalServerError, AppError::MissingState("TokenCodec")));
        };

        let token = req.cookies().get(&config.auth.cookie_name).map(|cookie| cookie.value().to_string());
        match AuthService::new(users, tokens).identify(token.as_deref()) {
            Ok(identity) => {
                let current_user = CurrentUser::from(identity);
                req.local_cache(|| Some(current_user.clone()));
                Outcome::Success(current_user)
            }
            Err(e) => Outcome::Error((Status::Unauthorized, e)),
        }
    }
}

/// The cookie name documented here is the default; `build_rocket` rewrites
/// it to `auth.cookie_name` in the merged document.
impl<'a> OpenApiFromRequest<'a> for CurrentUser {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        let security_scheme = SecurityScheme {
            description: Some("Cookie-based authentication. Log in via POST /api/auth/login to obtain the session cookie.".to_string()),
            data: SecuritySchemeData::ApiKey {
                name: DEFAULT_COOKIE_NAME.to_string(),
                location: "cookie".to_string(),
            },
            extensions: Object::default(),
        };

        let mut security_req = SecurityRequirement::new();
        security_req.insert("cookieAuth".to_string(), Vec::new());

        Ok(RequestHeaderInput::Security("cookieAuth".to_string(), security_scheme, security_req))
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response};
        let mut responses = Responses::default();
        responses.responses.insert(
            "401".to_string(),
            RefOr::Object(Response {
                description: "Unauthorized - Authentication required".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::local::asynchronous::Client;
    use rocket::{get, routes};

    #[get("/whoami")]
    fn whoami(current_user: CurrentUser) -> String {
        current_user.identity().fullname.clone()
    }

    fn identity() -> Identity {
        Identity {
            id: "u101".to_string(),
            fullname: "Puki Ja".to_string(),
            is_admin: false,
        }
    }

    async fn client(dir: &std::path::Path, codec: TokenCodec) -> Client {
        let users = UserStore::load(dir, crate::test_utils::create_missing()).await.expect("user store");
        let rocket = rocket::build().manage(Config::default()).manage(users).manage(codec).mount("/", routes![whoami]);
        Client::tracked(rocket).await.expect("valid rocket instance")
    }

    #[rocket::async_test]
    async fn valid_cookie_resolves_current_user() {
        let codec = TokenCodec::new("guard-secret", 60);
        let token = codec.encode(&identity()).expect("token");
        let dir = tempfile::tempdir().expect("temp dir");
        let client = client(dir.path(), codec).await;

        let response = client.get("/whoami").cookie(Cookie::new("loginToken", token)).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.as_deref(), Some("Puki Ja"));
    }

    #[rocket::async_test]
    async fn missing_or_bad_cookie_is_unauthorized() {
        let dir = tempfile::tempdir().expect("temp dir");
        let client = client(dir.path(), TokenCodec::new("guard-secret", 60)).await;

        let response = client.get("/whoami").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);

        let response = client.get("/whoami").cookie(Cookie::new("loginToken", "forged")).dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    async fn missing_user_store_is_a_server_error() {
        let codec = TokenCodec::new("guard-secret", 60);
        let token = codec.encode(&identity()).expect("token");
        let rocket = rocket::build().manage(Config::default()).manage(codec).mount("/", routes![whoami]);
        let client = Client::tracked(rocket).await.expect("valid rocket instance");

        let response = client.get("/whoami").cookie(Cookie::new("loginToken", token)).dispatch().await;
        assert_eq!(response.status(), Status::InternalServerError);
    }

    #[test]
    fn current_user_wraps_identity() {
        let current_user = CurrentUser::from(identity());
        assert_eq!(current_user.identity(), &identity());
    }
}
