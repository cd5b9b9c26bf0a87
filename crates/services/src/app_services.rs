use std::path::Path;
use std::sync::Arc;

use storage::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::remote::{HttpRemoteStore, RemoteStore};
use crate::store_service::StoreService;
use crate::sync::SyncController;

/// Which Remote Store the controller talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// In-process store over a JSON document on disk.
    JsonFile(std::path::PathBuf),
    /// A tracker server reached over HTTP.
    Http(String),
}

/// Assembles the Remote Store and the Sync Controller in front of it.
#[derive(Clone)]
pub struct AppServices {
    backend: Backend,
    controller: Arc<SyncController>,
}

impl AppServices {
    /// Build services backed by a JSON file, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the file cannot be created.
    pub async fn new_json_file(path: &Path, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::json_file(path).await?;
        let remote: Arc<dyn RemoteStore> =
            Arc::new(StoreService::new(clock, Arc::clone(&storage.study)));
        Ok(Self::assemble(
            Backend::JsonFile(path.to_path_buf()),
            remote,
            clock,
        ))
    }

    /// Build services backed by a tracker server.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the base URL is invalid.
    pub fn new_http(base_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let remote: Arc<dyn RemoteStore> = Arc::new(HttpRemoteStore::new(base_url)?);
        Ok(Self::assemble(
            Backend::Http(base_url.to_string()),
            remote,
            clock,
        ))
    }

    fn assemble(backend: Backend, remote: Arc<dyn RemoteStore>, clock: Clock) -> Self {
        Self {
            backend,
            controller: Arc::new(SyncController::new(remote, clock)),
        }
    }

    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    #[must_use]
    pub fn controller(&self) -> Arc<SyncController> {
        Arc::clone(&self.controller)
    }
}
