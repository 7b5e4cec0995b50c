use rand::Rng;
use rand::distributions::Alphanumeric;

pub const ID_LENGTH: usize = 6;

/// Random opaque identifier drawn from `[A-Za-z0-9]`.
pub fn make_id(length: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(length).map(char::from).collect()
}

/// Draws identifiers until one is not rejected by `taken`.
pub fn make_unique_id(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = make_id(ID_LENGTH);
        if !taken(&id) {
            return id;
        }
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
