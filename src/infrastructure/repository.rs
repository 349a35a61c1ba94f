//! Catalog repositories: TOML data file and in-memory.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::infrastructure::catalog::Catalog;
use crate::infrastructure::traits::{CatalogRepository, FileSystem};

/// Catalog stored as a single TOML file.
pub struct TomlCatalogRepository {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl TomlCatalogRepository {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
        }
    }
}

impl CatalogRepository for TomlCatalogRepository {
    fn load(&self) -> io::Result<Catalog> {
        if !self.fs.exists(&self.path) {
            debug!("load: {} absent, starting empty", self.path.display());
            return Ok(Catalog::default());
        }
        let content = self.fs.read_to_string(&self.path)?;
        Catalog::from_toml(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn save(&self, catalog: &Catalog) -> io::Result<()> {
        let content = catalog
            .to_toml()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.fs.ensure_parent(&self.path)?;
        self.fs.write_atomic(&self.path, &content)?;
        debug!(
            "save: {} nodes written to {}",
            catalog.node_count(),
            self.path.display()
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Catalog held in memory, for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryCatalogRepository {
    catalog: Mutex<Catalog>,
}

impl InMemoryCatalogRepository {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Mutex::new(catalog),
        }
    }
}

impl CatalogRepository for InMemoryCatalogRepository {
    fn load(&self) -> io::Result<Catalog> {
        self.catalog
            .lock()
            .map(|c| c.clone())
            .map_err(|_| io::Error::other("catalog lock poisoned"))
    }

    fn save(&self, catalog: &Catalog) -> io::Result<()> {
        let mut guard = self
            .catalog
            .lock()
            .map_err(|_| io::Error::other("catalog lock poisoned"))?;
        *guard = catalog.clone();
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
