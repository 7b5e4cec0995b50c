use crate::models::session::Identity;
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use validator::Validate;

/// Persisted user. `password` holds an Argon2 PHC string.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub password: String,
    pub fullname: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Public view of a user, never carries the password.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub fullname: String,
    pub is_admin: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct UserSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub fullname: String,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 128))]
    pub fullname: String,
}

#[derive(Deserialize, Debug, JsonSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            fullname: user.fullname.clone(),
            is_admin: user.is_admin,
        }
    }
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            fullname: user.fullname.clone(),
        }
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            fullname: user.fullname.clone(),
            is_admin: user.is_admin,
        }
    }
}
