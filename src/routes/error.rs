use rocket::{Request, catch};

#[catch(400)]
pub fn bad_request(_: &Request) -> &'static str {
    "Bad request"
}

#[catch(401)]
pub fn unauthorized(_: &Request) -> &'static str {
    "Not logged in"
}

#[catch(403)]
pub fn forbidden(_: &Request) -> &'static str {
    "Unauthorized"
}

#[catch(404)]
pub fn not_found(_: &Request) -> &'static str {
    "Not found"
}

#[catch(409)]
pub fn conflict(_: &Request) -> &'static str {
    "Conflict"
}

#[catch(422)]
pub fn unprocessable_entity(_: &Request) -> &'static str {
    "Malformed request body"
}

#[catch(429)]
pub fn too_many_requests(_: &Request) -> &'static str {
    "Wait for a bit"
}

#[catch(500)]
pub fn internal_error(_: &Request) -> &'static str {
    "Internal server error"
}

#[cfg(test)]
mod tests {
    use crate::build_rocket;
    use crate::test_utils::test_config;
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;

    #[rocket::async_test]
    async fn catchers_answer_in_plain_text() {
        let dir = tempfile::tempdir().expect("temp dir");
        let client = Client::tracked(build_rocket(test_config(dir.path()))).await.expect("valid rocket instance");

        let response = client.get("/api/nowhere").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        assert_eq!(response.content_type(), Some(ContentType::Plain));
        assert_eq!(response.into_string().await.as_deref(), Some("Not found"));

        let response = client.post("/api/bug").header(ContentType::JSON).body("{}").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
        assert_eq!(response.into_string().await.as_deref(), Some("Not logged in"));
    }
}
