//! Domain-level errors (no I/O concerns)

use itertools::Itertools;
use thiserror::Error;

use crate::domain::entities::{NodeId, ProductId};

/// Rejection of a proposed supplier link.
///
/// All variants concern the `supplier` field and are correctable by the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyViolation {
    #[error("supplier: cycle not allowed, node {node} would be its own ancestor via {supplier}")]
    CycleDetected { node: NodeId, supplier: NodeId },

    #[error("supplier: at most {tiers} tiers (levels 0..={max_level}), {supplier} is too deep")]
    HierarchyTooDeep {
        supplier: NodeId,
        max_level: usize,
        tiers: usize,
    },

    #[error("supplier: node {0} does not exist")]
    UnknownSupplier(NodeId),
}

/// Domain errors represent business logic violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    Hierarchy(#[from] HierarchyViolation),

    #[error("{field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("node {id} still supplies {} client(s): {}", clients.len(), join_ids(clients))]
    NodeHasClients { id: NodeId, clients: Vec<NodeId> },
}

impl DomainError {
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }

    /// Whether the caller can fix the request and try again.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::Hierarchy(_)
                | DomainError::InvalidField { .. }
                | DomainError::NodeHasClients { .. }
        )
    }
}

fn join_ids(ids: &[NodeId]) -> String {
    ids.iter().join(", ")
}
