//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod hierarchy;

pub use entities::*;
pub use error::{DomainError, HierarchyViolation};
pub use hierarchy::{
    Candidate, HierarchyLimits, HierarchyValidator, NodeStore, MAX_LEVEL, WALK_CAP,
};
