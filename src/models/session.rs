use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// The identity subset embedded in a login token.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(rename = "_id")]
    pub id: String,
    pub fullname: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Plaintext of a login token.
#[derive(Serialize, Deserialize, Debug)]
pub struct SessionClaims {
    #[serde(flatten)]
    pub identity: Identity,
    /// Expiry, epoch seconds.
    pub exp: i64,
}
