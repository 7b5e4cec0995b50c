use crate::config::Config;
use crate::database::json_file::FileOptions;
use crate::database::user::USER_FILE_NAME;
use crate::models::record::{Creator, Record};
use serde_json::json;
use std::path::Path;

pub fn sample_creator() -> Creator {
    Creator {
        id: "u101".to_string(),
        fullname: "Puki Ja".to_string(),
    }
}

pub fn sample_record(id: &str, title: &str, severity: i64, labels: &[&str]) -> Record {
    Record {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{} description", title),
        severity,
        labels: labels.iter().map(|label| label.to_string()).collect(),
        created_at: 1_700_000_000_000,
        creator: sample_creator(),
        msgs: Vec::new(),
    }
}

/// Store options that start from an empty collection when no file exists.
pub fn create_missing() -> FileOptions {
    FileOptions {
        create_if_missing: true,
        ..FileOptions::default()
    }
}

pub fn seed_records(dir: &Path, file_name: &str, records: &[Record]) {
    std::fs::create_dir_all(dir).expect("create data dir");
    let body = serde_json::to_string_pretty(records).expect("serialize records");
    std::fs::write(dir.join(file_name), body).expect("seed records");
}

/// Seeds `user.json` with plaintext passwords; the store hashes them on load.
/// Each entry is `(id, username, password, is_admin)`.
pub fn seed_users(dir: &Path, users: &[(&str, &str, &str, bool)]) {
    std::fs::create_dir_all(dir).expect("create data dir");
    let users: Vec<_> = users
        .iter()
        .map(|(id, username, password, is_admin)| {
            json!({
                "_id": id,
                "username": username,
                "password": password,
                "fullname": format!("{} Fullname", username),
                "isAdmin": is_admin,
            })
        })
        .collect();
    let body = serde_json::to_string_pretty(&users).expect("serialize users");
    std::fs::write(dir.join(USER_FILE_NAME), body).expect("seed users");
}

/// Config whose stores live in `dir` (created on demand), with Swagger off
/// and a fixed secret.
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.store.data_dir = dir.to_string_lossy().into_owned();
    config.store.create_if_missing = true;
    config.auth.secret = "test-secret".to_string();
    config.api.enable_swagger = false;
    config
}
