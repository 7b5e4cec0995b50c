use crate::database::json_file::{FileOptions, JsonFile};
use crate::error::app_error::AppError;
use crate::models::query::RecordQuery;
use crate::models::record::{Creator, Msg, Record, RecordRequest};
use crate::service::query::run_query;
use crate::util::{make_unique_id, now_millis};
use std::marker::PhantomData;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::info;

/// Compile-time description of one catalog.
pub trait Catalog: Send + Sync + 'static {
    /// Singular resource name used in paths and messages.
    const RESOURCE: &'static str;
    const LABEL: &'static str;
    const FILE_NAME: &'static str;
    /// Cookie tracking recently viewed record ids.
    const VISITED_COOKIE: &'static str;
}

pub enum Bugs {}

pub enum Toys {}

impl Catalog for Bugs {
    const RESOURCE: &'static str = "bug";
    const LABEL: &'static str = "Bug";
    const FILE_NAME: &'static str = "bug.json";
    const VISITED_COOKIE: &'static str = "visitedBugs";
}

impl Catalog for Toys {
    const RESOURCE: &'static str = "toy";
    const LABEL: &'static str = "Toy";
    const FILE_NAME: &'static str = "toy.json";
    const VISITED_COOKIE: &'static str = "visitedToys";
}

/// In-memory collection of one catalog, newest first, mirrored to its file.
///
/// Writers hold the write lock across the flush; a failed flush leaves the
/// in-memory collection untouched.
pub struct RecordStore<K: Catalog> {
    file: JsonFile,
    records: RwLock<Vec<Record>>,
    _catalog: PhantomData<fn() -> K>,
}

impl<K: Catalog> RecordStore<K> {
    pub async fn load(data_dir: impl AsRef<Path>, options: FileOptions) -> Result<Self, AppError> {
        let file = JsonFile::new(data_dir, K::FILE_NAME, options);
        let records = file.load::<Record>().await?;
        Ok(Self {
            file,
            records: RwLock::new(records),
            _catalog: PhantomData,
        })
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn query(&self, query: &RecordQuery) -> Vec<Record> {
        let records = self.records.read().await;
        run_query(&records, query)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Record, AppError> {
        let records = self.records.read().await;
        records
            .iter()
            .find(|record| record.id == id)
            .cloned()
            .ok_or_else(|| missing::<K>(id))
    }

    /// Updates the record named by `request.id`, or creates a new one owned
    /// by `creator` when the request carries no id.
    pub async fn save(&self, request: RecordRequest, creator: Creator) -> Result<Record, AppError> {
        match request.id.clone() {
            Some(id) => self.replace(&id, request).await,
            None => self.create(request, creator).await,
        }
    }

    async fn create(&self, request: RecordRequest, creator: Creator) -> Result<Record, AppError> {
        let mut records = self.records.write().await;

        let record = Record {
            id: make_unique_id(|candidate| records.iter().any(|record| record.id == candidate)),
            labels: request.label_set(),
            title: request.title,
            description: request.description,
            severity: request.severity,
            created_at: now_millis(),
            creator,
            msgs: Vec::new(),
        };

        let mut next = Vec::with_capacity(records.len() + 1);
        next.push(record.clone());
        next.extend(records.iter().cloned());

        self.file.persist(&next).await?;
        *records = next;

        info!(resource = K::RESOURCE, id = %record.id, "record created");
        Ok(record)
    }

    /// Replaces content fields in place; id, position, `createdAt`, creator
    /// and msgs are kept.
    async fn replace(&self, id: &str, request: RecordRequest) -> Result<Record, AppError> {
        let mut records = self.records.write().await;
        let idx = records.iter().position(|record| record.id == id).ok_or_else(|| missing::<K>(id))?;

        let current = &records[idx];
        let updated = Record {
            id: current.id.clone(),
            labels: request.label_set(),
            title: request.title,
            description: request.description,
            severity: request.severity,
            created_at: current.created_at,
            creator: current.creator.clone(),
            msgs: current.msgs.clone(),
        };

        let mut next = records.clone();
        next[idx] = updated.clone();

        self.file.persist(&next).await?;
        *records = next;

        info!(resource = K::RESOURCE, id = %id, "record updated");
        Ok(updated)
    }

    pub async fn remove(&self, id: &str) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        let idx = records.iter().position(|record| record.id == id).ok_or_else(|| missing::<K>(id))?;

        let mut next = records.clone();
        next.remove(idx);

        self.file.persist(&next).await?;
        *records = next;

        info!(resource = K::RESOURCE, id = %id, "record removed");
        Ok(())
    }

    /// Appends a msg by `by` to the record's msgs.
    pub async fn add_msg(&self, id: &str, txt: String, by: Creator) -> Result<Msg, AppError> {
        let mut records = self.records.write().await;
        let idx = records.iter().position(|record| record.id == id).ok_or_else(|| missing::<K>(id))?;

        let msgs = &records[idx].msgs;
        let msg = Msg {
            id: make_unique_id(|candidate| msgs.iter().any(|msg| msg.id == candidate)),
            txt,
            by,
            created_at: now_millis(),
        };

        let mut next = records.clone();
        next[idx].msgs.push(msg.clone());

        self.file.persist(&next).await?;
        *records = next;

        info!(resource = K::RESOURCE, id = %id, msg_id = %msg.id, "msg added");
        Ok(msg)
    }

    pub async fn remove_msg(&self, id: &str, msg_id: &str) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        let idx = records.iter().position(|record| record.id == id).ok_or_else(|| missing::<K>(id))?;
        let msg_idx = records[idx]
            .msgs
            .iter()
            .position(|msg| msg.id == msg_id)
            .ok_or_else(|| missing_msg(msg_id))?;

        let mut next = records.clone();
        next[idx].msgs.remove(msg_idx);

        self.file.persist(&next).await?;
        *records = next;

        info!(resource = K::RESOURCE, id = %id, msg_id = %msg_id, "msg removed");
        Ok(())
    }
}

fn missing<K: Catalog>(id: &str) -> AppError {
    AppError::not_found(format!("{} {}", K::LABEL, id))
}

pub(crate) fn missing_msg(msg_id: &str) -> AppError {
    AppError::not_found(format!("Msg {}", msg_id))
}
