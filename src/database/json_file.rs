use crate::config::StoreConfig;
use crate::error::app_error::AppError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct FileOptions {
    /// Flushes slower than this are logged; the write itself always completes.
    pub write_timeout: Duration,
    /// Start from an empty collection when the file does not exist yet.
    pub create_if_missing: bool,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            write_timeout: Duration::from_secs(5),
            create_if_missing: false,
        }
    }
}

impl From<&StoreConfig> for FileOptions {
    fn from(store_config: &StoreConfig) -> Self {
        Self {
            write_timeout: Duration::from_millis(store_config.write_timeout_ms),
            create_if_missing: store_config.create_if_missing,
        }
    }
}

/// A JSON array persisted as a single pretty-printed file.
///
/// Every flush rewrites the whole file through a temporary sibling that is
/// renamed over the target, so readers never observe a truncated file.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
    options: FileOptions,
}

impl JsonFile {
    pub fn new(dir: impl AsRef<Path>, file_name: &str, options: FileOptions) -> Self {
        Self {
            path: dir.as_ref().join(file_name),
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the collection. A missing file is an error unless
    /// `create_if_missing` is set, in which case it is created empty.
    pub async fn load<T: DeserializeOwned + Serialize>(&self) -> Result<Vec<T>, AppError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && self.options.create_if_missing => {
                info!(path = %self.path.display(), "data file missing, creating an empty collection");
                if let Some(dir) = parent_dir(&self.path) {
                    tokio::fs::create_dir_all(dir)
                        .await
                        .map_err(|e| AppError::store_io(format!("Failed to create {}", dir.display()), e))?;
                }
                let empty: Vec<T> = Vec::new();
                self.persist(&empty).await?;
                return Ok(empty);
            }
            Err(e) => return Err(AppError::store_io(format!("Failed to read {}", self.path.display()), e)),
        };

        let items: Vec<T> =
            serde_json::from_str(&raw).map_err(|e| AppError::serialization(format!("Failed to parse {}", self.path.display()), e))?;

        info!(path = %self.path.display(), count = items.len(), "collection loaded");
        Ok(items)
    }

    /// Serializes and atomically replaces the file.
    ///
    /// The blocking write is always awaited to completion, even past the
    /// write timeout.
    pub async fn persist<T: Serialize>(&self, items: &[T]) -> Result<(), AppError> {
        let bytes = serde_json::to_vec_pretty(items).map_err(|e| AppError::serialization(format!("Failed to serialize {}", self.path.display()), e))?;

        let path = self.path.clone();
        let mut write = tokio::task::spawn_blocking(move || write_atomic(&path, &bytes));

        let timed = tokio::time::timeout(self.options.write_timeout, &mut write).await;
        let outcome = match timed {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    path = %self.path.display(),
                    timeout_ms = self.options.write_timeout.as_millis() as u64,
                    "flush is slower than the write timeout, waiting for it to finish"
                );
                write.await
            }
        };

        match outcome {
            Ok(Ok(())) => {
                debug!(path = %self.path.display(), count = items.len(), "collection flushed");
                Ok(())
            }
            Ok(Err(e)) => Err(AppError::store_io(format!("Failed to write {}", self.path.display()), e)),
            Err(join_error) => Err(AppError::store_io(
                format!("Write task for {} failed", self.path.display()),
                std::io::Error::other(join_error.to_string()),
            )),
        }
    }
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|dir| !dir.as_os_str().is_empty())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = parent_dir(path).unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
