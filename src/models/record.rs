use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use validator::Validate;

/// Owner reference stored on every catalog record.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct Creator {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub fullname: String,
}

/// A bug or a toy. Both catalogs persist exactly this shape.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: i64,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Epoch milliseconds, set once on creation.
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub creator: Creator,
    /// Comments left on a toy, oldest first. Bugs never carry any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub msgs: Vec<Msg>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Msg {
    #[serde(rename = "_id")]
    pub id: String,
    pub txt: String,
    pub by: Creator,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct MsgRequest {
    #[validate(length(min = 1, max = 500))]
    pub txt: String,
}

/// Body of `POST` and `PUT`. A present `_id` turns a `POST` into an update.
#[derive(Deserialize, Debug, Clone, Default, JsonSchema)]
pub struct RecordRequest {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: i64,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl RecordRequest {
    /// Labels form a set; keep the first occurrence of each.
    pub fn label_set(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::with_capacity(self.labels.len());
        for label in &self.labels {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
        labels
    }
}

impl Record {
    pub fn has_any_label(&self, wanted: &[&str]) -> bool {
        self.labels.iter().any(|label| wanted.contains(&label.as_str()))
    }

    pub fn msg(&self, msg_id: &str) -> Option<&Msg> {
        self.msgs.iter().find(|msg| msg.id == msg_id)
    }
}
