use crate::config::StoreConfig;
use crate::database::json_file::FileOptions;
use crate::database::record::{Bugs, RecordStore, Toys};
use crate::database::user::UserStore;
use crate::error::app_error::AppError;
use rocket::fairing::AdHoc;

struct Stores {
    bugs: RecordStore<Bugs>,
    toys: RecordStore<Toys>,
    users: UserStore,
}

async fn load_stores(store_config: &StoreConfig) -> Result<Stores, AppError> {
    let options = FileOptions::from(store_config);
    let data_dir = store_config.data_dir.as_str();

    Ok(Stores {
        bugs: RecordStore::load(data_dir, options).await?,
        toys: RecordStore::load(data_dir, options).await?,
        users: UserStore::load(data_dir, options).await?,
    })
}

/// Loads every JSON store before launch; a missing or unreadable store
/// aborts ignition unless `store.create_if_missing` is set.
pub fn stage_stores(store_config: StoreConfig) -> AdHoc {
    AdHoc::try_on_ignite("JSON stores", |rocket| async move {
        match load_stores(&store_config).await {
            Ok(stores) => {
                tracing::info!(data_dir = %store_config.data_dir, "JSON stores loaded");
                Ok(rocket.manage(stores.bugs).manage(stores.toys).manage(stores.users))
            }
            Err(e) => {
                tracing::error!(error = ?e, data_dir = %store_config.data_dir, "Failed to load JSON stores");
                Err(rocket)
            }
        }
    })
}
