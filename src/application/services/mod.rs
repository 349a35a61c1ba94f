//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (CatalogRepository, FileSystem)
//! but are themselves concrete structs, not traits.

mod handle;
mod network;
mod product;
mod query;

pub use handle::CatalogHandle;
pub use network::{NetworkService, NodeView};
pub use product::{ProductService, ProductView};
pub use query::{NodeQuery, NodeSortKey, ProductQuery, ProductSortKey, SortKey, SortOrder};
