//! Network node service
//!
//! CRUD over supplier network nodes. Every create and update runs the
//! hierarchy validator against the persisted catalog before anything is saved.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use itertools::Itertools;
use termtree::Tree;
use tracing::{debug, info, instrument};

use crate::application::services::handle::CatalogHandle;
use crate::application::services::query::NodeQuery;
use crate::application::ApplicationResult;
use crate::domain::{
    level_name, Candidate, Debt, DomainError, HierarchyValidator, Node, NodeDraft, NodeId,
    NodePatch, NodeStore, Product,
};
use crate::infrastructure::Catalog;

/// A node together with its derived level and owned products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeView {
    pub node: Node,
    pub level: usize,
    pub level_name: String,
    pub products: Vec<Product>,
}

/// Service for managing network nodes.
pub struct NetworkService {
    catalog: Arc<CatalogHandle>,
    validator: HierarchyValidator,
}

impl NetworkService {
    pub fn new(catalog: Arc<CatalogHandle>, validator: HierarchyValidator) -> Self {
        Self { catalog, validator }
    }

    /// Create a node. Debt may be set here and nowhere else except clear-debt.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub fn create(&self, draft: NodeDraft) -> ApplicationResult<NodeView> {
        self.catalog.modify(|catalog| {
            let node = Node::from_draft(catalog.next_node_id(), draft, Utc::now());
            node.validate_fields()?;
            self.validator
                .validate(&Candidate::fresh(node.supplier), &*catalog)
                .map_err(DomainError::from)?;

            let id = node.id;
            catalog.insert_node(node);
            info!("created node {}", id);
            Ok(self.view(catalog, id)?)
        })
    }

    /// Apply a partial update. Supplier changes are validated before saving.
    #[instrument(skip(self, patch))]
    pub fn update(&self, id: NodeId, patch: NodePatch) -> ApplicationResult<NodeView> {
        self.catalog.modify(|catalog| {
            let current = catalog.node(id).ok_or(DomainError::NodeNotFound(id))?;
            let updated = patch.apply(current);
            updated.validate_fields()?;
            self.validator
                .validate(&Candidate::from(&updated), &*catalog)
                .map_err(DomainError::from)?;

            catalog.insert_node(updated);
            info!("updated node {}", id);
            Ok(self.view(catalog, id)?)
        })
    }

    /// Delete a node and its products. Refused while it still supplies clients.
    #[instrument(skip(self))]
    pub fn delete(&self, id: NodeId) -> ApplicationResult<Node> {
        self.catalog.modify(|catalog| {
            if !catalog.contains(id) {
                return Err(DomainError::NodeNotFound(id).into());
            }
            let clients = catalog.clients_of(id);
            if !clients.is_empty() {
                return Err(DomainError::NodeHasClients { id, clients }.into());
            }
            let (node, products) = catalog
                .remove_node(id)
                .ok_or(DomainError::NodeNotFound(id))?;
            info!("deleted node {} with {} product(s)", id, products.len());
            Ok(node)
        })
    }

    pub fn get(&self, id: NodeId) -> ApplicationResult<NodeView> {
        let catalog = self.catalog.read()?;
        Ok(self.view(&catalog, id)?)
    }

    pub fn list(&self, query: &NodeQuery) -> ApplicationResult<Vec<NodeView>> {
        let catalog = self.catalog.read()?;
        let views = catalog
            .nodes()
            .filter(|n| query.matches(n))
            .sorted_by(|a, b| query.compare(a, b))
            .map(|n| self.view_of(&catalog, n))
            .collect::<Vec<_>>();
        debug!("list: {} of {} nodes", views.len(), catalog.node_count());
        Ok(views)
    }

    /// Derived level of a node (0 = factory).
    pub fn level(&self, id: NodeId) -> ApplicationResult<usize> {
        let catalog = self.catalog.read()?;
        let node = catalog.node(id).ok_or(DomainError::NodeNotFound(id))?;
        Ok(self.validator.level(node, &catalog))
    }

    /// Zero the debt of every listed node.
    ///
    /// Supplier links are untouched, so the hierarchy is not re-validated.
    /// Unknown ids abort the whole action.
    #[instrument(skip(self))]
    pub fn clear_debt(&self, ids: &[NodeId]) -> ApplicationResult<Vec<NodeId>> {
        self.catalog.modify(|catalog| {
            if let Some(missing) = ids.iter().find(|id| !catalog.contains(**id)) {
                return Err(DomainError::NodeNotFound(*missing).into());
            }
            let mut cleared = Vec::new();
            for id in ids.iter().unique() {
                if let Some(node) = catalog.node_mut(*id) {
                    node.debt = Debt::ZERO;
                    cleared.push(*id);
                }
            }
            info!("cleared debt of {} node(s)", cleared.len());
            Ok(cleared)
        })
    }

    /// The supplier forest, one tree per root, roots in default listing order.
    pub fn forest(&self) -> ApplicationResult<Vec<Tree<String>>> {
        let catalog = self.catalog.read()?;
        let query = NodeQuery::default();
        let mut seen = HashSet::new();
        let trees = catalog
            .nodes()
            .filter(|n| n.supplier.map_or(true, |s| !catalog.contains(s)))
            .sorted_by(|a, b| query.compare(a, b))
            .map(|root| self.subtree(&catalog, root, 0, &mut seen))
            .collect();
        Ok(trees)
    }

    fn subtree(
        &self,
        catalog: &Catalog,
        node: &Node,
        level: usize,
        seen: &mut HashSet<NodeId>,
    ) -> Tree<String> {
        seen.insert(node.id);
        let label = format!("#{} {} [{}]", node.id, node, level_name(level));
        if level >= self.validator.limits().walk_cap {
            return Tree::new(label);
        }
        let query = NodeQuery::default();
        let clients: Vec<&Node> = catalog
            .clients_of(node.id)
            .into_iter()
            .filter(|id| !seen.contains(id))
            .filter_map(|id| catalog.node(id))
            .sorted_by(|a, b| query.compare(a, b))
            .collect();
        let leaves: Vec<Tree<String>> = clients
            .into_iter()
            .map(|client| self.subtree(catalog, client, level + 1, seen))
            .collect();
        Tree::new(label).with_leaves(leaves)
    }

    fn view(&self, catalog: &Catalog, id: NodeId) -> Result<NodeView, DomainError> {
        let node = catalog.node(id).ok_or(DomainError::NodeNotFound(id))?;
        Ok(self.view_of(catalog, node))
    }

    fn view_of(&self, catalog: &Catalog, node: &Node) -> NodeView {
        let level = self.validator.level(node, catalog);
        NodeView {
            node: node.clone(),
            level,
            level_name: level_name(level),
            products: catalog.products_of(node.id).into_iter().cloned().collect(),
        }
    }
}
