//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{CatalogHandle, NetworkService, ProductService};
use crate::config::Settings;
use crate::domain::HierarchyValidator;
use crate::infrastructure::traits::{CatalogRepository, FileSystem, RealFileSystem};
use crate::infrastructure::TomlCatalogRepository;

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Network node service
    pub network: NetworkService,

    /// Product service
    pub products: ProductService,
}

impl ServiceContainer {
    /// Create a new service container backed by the configured data file.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let repo = Arc::new(TomlCatalogRepository::new(settings.data_file.clone(), fs));
        Self::with_repository(settings, repo)
    }

    /// Create a service container with a custom repository (for testing).
    pub fn with_repository(settings: Settings, repo: Arc<dyn CatalogRepository>) -> Self {
        let settings = Arc::new(settings);
        let catalog = Arc::new(CatalogHandle::new(repo));
        let validator = HierarchyValidator::new(settings.hierarchy);

        Self {
            network: NetworkService::new(Arc::clone(&catalog), validator),
            products: ProductService::new(catalog),
            settings,
        }
    }
}
