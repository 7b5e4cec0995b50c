use crate::database::record::{Catalog, RecordStore, missing_msg};
use crate::error::app_error::AppError;
use crate::middleware::view_throttle::ViewThrottle;
use crate::models::query::RecordQuery;
use crate::models::record::{Creator, Msg, MsgRequest, Record, RecordRequest};
use crate::models::session::Identity;
use crate::service::auth::ensure_owner;
use rocket::http::CookieJar;
use validator::Validate;

/// Catalog operations with the session rules applied on top of the store.
pub struct CatalogService<'a, K: Catalog> {
    store: &'a RecordStore<K>,
}

impl<'a, K: Catalog> CatalogService<'a, K> {
    pub fn new(store: &'a RecordStore<K>) -> Self {
        CatalogService { store }
    }

    pub async fn list(&self, query: &RecordQuery) -> Vec<Record> {
        self.store.query(query).await
    }

    /// The throttle runs before the lookup, so unknown ids count as views too.
    pub async fn view(&self, throttle: &ViewThrottle, cookies: &CookieJar<'_>, id: &str) -> Result<Record, AppError> {
        throttle.check(cookies, K::VISITED_COOKIE, id)?;
        self.store.get_by_id(id).await
    }

    /// Creates a record owned by `identity`, or updates the one named by
    /// `request.id` when its creator is `identity`.
    pub async fn save(&self, identity: &Identity, request: RecordRequest) -> Result<Record, AppError> {
        if let Some(id) = request.id.as_deref() {
            let current = self.store.get_by_id(id).await?;
            ensure_owner(identity, &current.creator.id)?;
        }

        self.store.save(request, creator_of(identity)).await
    }

    /// A body `_id`, when present, must name the same record as the path.
    pub async fn update(&self, identity: &Identity, id: &str, mut request: RecordRequest) -> Result<Record, AppError> {
        if let Some(body_id) = request.id.as_deref()
            && body_id != id
        {
            return Err(AppError::BadRequest(format!("Body _id {} does not match {}", body_id, id)));
        }
        request.id = Some(id.to_string());
        self.save(identity, request).await
    }

    pub async fn remove(&self, identity: &Identity, id: &str) -> Result<(), AppError> {
        let current = self.store.get_by_id(id).await?;
        ensure_owner(identity, &current.creator.id)?;
        self.store.remove(id).await
    }

    /// Any logged-in user may comment.
    pub async fn add_msg(&self, identity: &Identity, id: &str, request: MsgRequest) -> Result<Msg, AppError> {
        request.validate()?;
        self.store.add_msg(id, request.txt, creator_of(identity)).await
    }

    /// The msg author, the record owner and admins may delete a msg.
    pub async fn remove_msg(&self, identity: &Identity, id: &str, msg_id: &str) -> Result<(), AppError> {
        let current = self.store.get_by_id(id).await?;
        let msg = current.msg(msg_id).ok_or_else(|| missing_msg(msg_id))?;
        ensure_owner(identity, &msg.by.id).or_else(|_| ensure_owner(identity, &current.creator.id))?;
        self.store.remove_msg(id, msg_id).await
    }
}

fn creator_of(identity: &Identity) -> Creator {
    Creator {
        id: identity.id.clone(),
        fullname: identity.fullname.clone(),
    }
}
