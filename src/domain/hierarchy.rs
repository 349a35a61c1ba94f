//! Supplier hierarchy integrity: cycle and depth checks, derived levels.
//!
//! The supplier graph is a forest of single-parent links. Before a node is
//! saved, the proposed supplier chain is walked one hop at a time through a
//! [`NodeStore`]; the walk never holds more than the current id.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::domain::entities::{Node, NodeId};
use crate::domain::error::HierarchyViolation;

/// Deepest permitted level: 0 factory, 1 retail chain, 2 sole proprietor.
pub const MAX_LEVEL: usize = 2;

/// Upper bound on supplier hops followed in one walk.
///
/// Guards against a corrupted store. Not a depth limit.
pub const WALK_CAP: usize = 10;

/// Tunable hierarchy limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyLimits {
    pub max_level: usize,
    pub walk_cap: usize,
}

impl Default for HierarchyLimits {
    fn default() -> Self {
        Self {
            max_level: MAX_LEVEL,
            walk_cap: WALK_CAP,
        }
    }
}

impl HierarchyLimits {
    /// Number of tiers, root included.
    pub fn tiers(&self) -> usize {
        self.max_level + 1
    }
}

/// Read access to persisted supplier links.
pub trait NodeStore {
    /// Whether a node with this id is persisted.
    fn contains(&self, id: NodeId) -> bool;

    /// Persisted supplier of `id`; `None` for roots and unknown ids.
    fn supplier_of(&self, id: NodeId) -> Option<NodeId>;

    /// Nodes whose persisted supplier is `id`.
    fn clients_of(&self, id: NodeId) -> Vec<NodeId>;
}

/// Node about to be saved, reduced to what the checks need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Persisted id, `None` for an insert
    pub id: Option<NodeId>,
    /// Proposed supplier
    pub supplier: Option<NodeId>,
}

impl Candidate {
    /// A node that is not persisted yet.
    pub fn fresh(supplier: Option<NodeId>) -> Self {
        Self { id: None, supplier }
    }

    /// A persisted node with a (possibly changed) supplier.
    pub fn existing(id: NodeId, supplier: Option<NodeId>) -> Self {
        Self {
            id: Some(id),
            supplier,
        }
    }
}

impl From<&Node> for Candidate {
    fn from(node: &Node) -> Self {
        Self::existing(node.id, node.supplier)
    }
}

/// Stateless checker for proposed supplier links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HierarchyValidator {
    limits: HierarchyLimits,
}

impl HierarchyValidator {
    pub fn new(limits: HierarchyLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> HierarchyLimits {
        self.limits
    }

    /// Approve or reject `candidate` against the persisted state in `store`.
    ///
    /// The cycle check runs first and only for persisted nodes; the depth
    /// check always runs. A persisted node brings its clients along, so their
    /// depth below it counts too. The first violation found is returned.
    pub fn validate<S: NodeStore + ?Sized>(
        &self,
        candidate: &Candidate,
        store: &S,
    ) -> Result<(), HierarchyViolation> {
        debug!(
            "validate: id={:?}, supplier={:?}",
            candidate.id, candidate.supplier
        );
        let Some(supplier) = candidate.supplier else {
            return Ok(());
        };
        if let Some(id) = candidate.id {
            self.check_cycle(id, supplier, store)?;
        }
        self.check_depth(candidate.id, supplier, store)
    }

    fn check_cycle<S: NodeStore + ?Sized>(
        &self,
        id: NodeId,
        supplier: NodeId,
        store: &S,
    ) -> Result<(), HierarchyViolation> {
        let cycle = HierarchyViolation::CycleDetected { node: id, supplier };
        for (step, hop) in SupplierWalk::new(store, supplier).enumerate() {
            if step >= self.limits.walk_cap {
                debug!("check_cycle: walk cap {} reached", self.limits.walk_cap);
                return Err(cycle);
            }
            let hop = hop?;
            trace!("check_cycle: step={}, hop={}", step, hop);
            if hop == id {
                return Err(cycle);
            }
        }
        Ok(())
    }

    fn check_depth<S: NodeStore + ?Sized>(
        &self,
        id: Option<NodeId>,
        supplier: NodeId,
        store: &S,
    ) -> Result<(), HierarchyViolation> {
        let too_deep = HierarchyViolation::HierarchyTooDeep {
            supplier,
            max_level: self.limits.max_level,
            tiers: self.limits.tiers(),
        };
        let mut level = 0;
        for hop in SupplierWalk::new(store, supplier) {
            hop?;
            level += 1;
            if level > self.limits.max_level {
                return Err(too_deep);
            }
        }
        if let Some(id) = id {
            let below = self.subtree_height(id, store);
            trace!("check_depth: level={}, below={}", level, below);
            if level + below > self.limits.max_level {
                return Err(too_deep);
            }
        }
        Ok(())
    }

    /// Levels of clients hanging below `id`. Saturates at the walk cap.
    fn subtree_height<S: NodeStore + ?Sized>(&self, id: NodeId, store: &S) -> usize {
        let mut height = 0;
        let mut frontier = store.clients_of(id);
        while !frontier.is_empty() && height < self.limits.walk_cap {
            height += 1;
            frontier = frontier
                .into_iter()
                .flat_map(|client| store.clients_of(client))
                .collect();
        }
        height
    }

    /// Hops from `node` to its root. Saturates at the walk cap.
    pub fn level<S: NodeStore + ?Sized>(&self, node: &Node, store: &S) -> usize {
        self.level_of_supplier(node.supplier, store)
    }

    /// Level a node would have with `supplier` as its supplier.
    pub fn level_of_supplier<S: NodeStore + ?Sized>(
        &self,
        supplier: Option<NodeId>,
        store: &S,
    ) -> usize {
        let mut level = 0;
        let mut current = supplier;
        while let Some(id) = current {
            if level == self.limits.walk_cap {
                break;
            }
            level += 1;
            current = store.supplier_of(id);
        }
        level
    }
}

/// Iterator over a supplier chain, starting at (and including) `start`.
///
/// Yields `UnknownSupplier` once and stops if a link points nowhere.
struct SupplierWalk<'a, S: ?Sized> {
    store: &'a S,
    next: Option<NodeId>,
}

impl<'a, S: NodeStore + ?Sized> SupplierWalk<'a, S> {
    fn new(store: &'a S, start: NodeId) -> Self {
        Self {
            store,
            next: Some(start),
        }
    }
}

impl<S: NodeStore + ?Sized> Iterator for SupplierWalk<'_, S> {
    type Item = Result<NodeId, HierarchyViolation>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if !self.store.contains(current) {
            return Some(Err(HierarchyViolation::UnknownSupplier(current)));
        }
        self.next = self.store.supplier_of(current);
        Some(Ok(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// id -> supplier
    struct Links(BTreeMap<u64, Option<u64>>);

    impl Links {
        fn new(links: &[(u64, Option<u64>)]) -> Self {
            Self(links.iter().copied().collect())
        }
    }

    impl NodeStore for Links {
        fn contains(&self, id: NodeId) -> bool {
            self.0.contains_key(&id.0)
        }

        fn supplier_of(&self, id: NodeId) -> Option<NodeId> {
            self.0.get(&id.0).copied().flatten().map(NodeId)
        }

        fn clients_of(&self, id: NodeId) -> Vec<NodeId> {
            self.0
                .iter()
                .filter(|(_, supplier)| **supplier == Some(id.0))
                .map(|(client, _)| NodeId(*client))
                .collect()
        }
    }

    #[test]
    fn given_no_supplier_when_validating_then_ok() {
        let store = Links::new(&[(1, None)]);
        let validator = HierarchyValidator::default();

        assert_eq!(validator.validate(&Candidate::fresh(None), &store), Ok(()));
        assert_eq!(
            validator.validate(&Candidate::existing(NodeId(1), None), &store),
            Ok(())
        );
    }

    #[test]
    fn given_unknown_supplier_when_validating_then_reports_referential_error() {
        let store = Links::new(&[(1, None)]);
        let validator = HierarchyValidator::default();

        let result = validator.validate(&Candidate::fresh(Some(NodeId(42))), &store);

        assert_eq!(result, Err(HierarchyViolation::UnknownSupplier(NodeId(42))));
    }

    #[test]
    fn given_self_reference_when_validating_then_cycle_detected() {
        let store = Links::new(&[(1, None)]);
        let validator = HierarchyValidator::default();

        let result = validator.validate(&Candidate::existing(NodeId(1), Some(NodeId(1))), &store);

        assert!(matches!(result, Err(HierarchyViolation::CycleDetected { .. })));
    }

    #[test]
    fn given_cycle_and_too_deep_when_validating_then_cycle_reported_first() {
        // 1 <- 2 <- 3 <- 4; making 1 a client of 4 is both cyclic and too deep
        let store = Links::new(&[(1, None), (2, Some(1)), (3, Some(2)), (4, Some(3))]);
        let validator = HierarchyValidator::new(HierarchyLimits {
            max_level: 5,
            walk_cap: WALK_CAP,
        });
        let strict = HierarchyValidator::default();
        let candidate = Candidate::existing(NodeId(1), Some(NodeId(4)));

        assert!(matches!(
            validator.validate(&candidate, &store),
            Err(HierarchyViolation::CycleDetected { .. })
        ));
        assert!(matches!(
            strict.validate(&candidate, &store),
            Err(HierarchyViolation::CycleDetected { .. })
        ));
    }

    #[test]
    fn given_corrupted_loop_above_candidate_when_validating_then_fails_safe() {
        // 2 <-> 3 loop not involving the candidate
        let store = Links::new(&[(1, None), (2, Some(3)), (3, Some(2))]);
        let validator = HierarchyValidator::new(HierarchyLimits {
            max_level: 100,
            walk_cap: WALK_CAP,
        });

        let result = validator.validate(&Candidate::existing(NodeId(1), Some(NodeId(2))), &store);

        assert!(matches!(result, Err(HierarchyViolation::CycleDetected { .. })));
    }

    #[test]
    fn given_corrupted_loop_when_inserting_then_depth_check_bounds_walk() {
        let store = Links::new(&[(2, Some(3)), (3, Some(2))]);
        let validator = HierarchyValidator::default();

        let result = validator.validate(&Candidate::fresh(Some(NodeId(2))), &store);

        assert!(matches!(result, Err(HierarchyViolation::HierarchyTooDeep { .. })));
    }

    #[test]
    fn given_node_with_clients_when_moved_below_retailer_then_too_deep() {
        // factory 1 <- retailer 2; factory 3 <- retailer 4 <- sole proprietor 5
        let store = Links::new(&[
            (1, None),
            (2, Some(1)),
            (3, None),
            (4, Some(3)),
            (5, Some(4)),
        ]);
        let validator = HierarchyValidator::default();

        // 4 would become level 2, pushing 5 to level 3
        let result = validator.validate(&Candidate::existing(NodeId(4), Some(NodeId(2))), &store);
        assert!(matches!(result, Err(HierarchyViolation::HierarchyTooDeep { .. })));

        // 4 under factory 1 keeps 5 at level 2
        let result = validator.validate(&Candidate::existing(NodeId(4), Some(NodeId(1))), &store);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn given_chain_when_computing_level_then_counts_hops() {
        let store = Links::new(&[(1, None), (2, Some(1)), (3, Some(2))]);
        let validator = HierarchyValidator::default();

        assert_eq!(validator.level_of_supplier(None, &store), 0);
        assert_eq!(validator.level_of_supplier(Some(NodeId(1)), &store), 1);
        assert_eq!(validator.level_of_supplier(Some(NodeId(2)), &store), 2);
        assert_eq!(validator.level_of_supplier(Some(NodeId(3)), &store), 3);
    }

    #[test]
    fn given_corrupted_loop_when_computing_level_then_saturates_at_cap() {
        let store = Links::new(&[(2, Some(3)), (3, Some(2))]);
        let validator = HierarchyValidator::default();

        assert_eq!(validator.level_of_supplier(Some(NodeId(2)), &store), WALK_CAP);
    }

    #[test]
    fn given_default_limits_then_three_tiers() {
        let limits = HierarchyLimits::default();
        assert_eq!(limits.max_level, MAX_LEVEL);
        assert_eq!(limits.walk_cap, WALK_CAP);
        assert_eq!(limits.tiers(), 3);
    }
}
