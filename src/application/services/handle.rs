//! Serialized access to the persisted catalog.

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::infrastructure::traits::CatalogRepository;
use crate::infrastructure::Catalog;

/// Shared gateway to the catalog.
///
/// Every write runs load, change, save while holding one lock, so two saves
/// through the same handle never both act on a stale snapshot.
pub struct CatalogHandle {
    repo: Arc<dyn CatalogRepository>,
    write_lock: Mutex<()>,
}

impl CatalogHandle {
    pub fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self {
            repo,
            write_lock: Mutex::new(()),
        }
    }

    /// Current snapshot.
    pub fn read(&self) -> ApplicationResult<Catalog> {
        self.repo
            .load()
            .with_context("load catalog", self.repo.location())
    }

    /// Apply `change` to a fresh snapshot and persist it if `change` succeeds.
    ///
    /// On error nothing is written.
    pub fn modify<T>(
        &self,
        change: impl FnOnce(&mut Catalog) -> ApplicationResult<T>,
    ) -> ApplicationResult<T> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ApplicationError::OperationFailed {
                context: "acquire catalog write lock".to_string(),
                source: "lock poisoned".into(),
            })?;
        let mut catalog = self.read()?;
        let result = change(&mut catalog);
        match &result {
            Ok(_) => {
                self.repo
                    .save(&catalog)
                    .with_context("save catalog", self.repo.location())?;
            }
            Err(e) => debug!("modify: change rejected, nothing saved: {}", e),
        }
        result
    }
}
