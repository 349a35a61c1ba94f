//! In-memory snapshot of the persisted nodes and products.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Node, NodeId, NodeStore, Product, ProductId};

/// All nodes and products, plus id counters.
///
/// Serialized as TOML:
/// ```toml
/// next_node_id = 3
/// next_product_id = 1
///
/// [[nodes]]
/// id = 1
/// name = "Factory"
/// # ...
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CatalogFile", into = "CatalogFile")]
pub struct Catalog {
    nodes: BTreeMap<NodeId, Node>,
    products: BTreeMap<ProductId, Product>,
    next_node_id: u64,
    next_product_id: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct CatalogFile {
    next_node_id: u64,
    next_product_id: u64,
    nodes: Vec<Node>,
    products: Vec<Product>,
}

impl From<CatalogFile> for Catalog {
    fn from(file: CatalogFile) -> Self {
        let mut catalog = Catalog {
            next_node_id: file.next_node_id,
            next_product_id: file.next_product_id,
            ..Default::default()
        };
        for node in file.nodes {
            catalog.insert_node(node);
        }
        for product in file.products {
            catalog.insert_product(product);
        }
        catalog
    }
}

impl From<Catalog> for CatalogFile {
    fn from(catalog: Catalog) -> Self {
        CatalogFile {
            next_node_id: catalog.next_node_id,
            next_product_id: catalog.next_product_id,
            nodes: catalog.nodes.into_values().collect(),
            products: catalog.products.into_values().collect(),
        }
    }
}

impl Catalog {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    // ---- nodes ----

    /// Id the next inserted node will get. Ids start at 1.
    pub fn next_node_id(&self) -> NodeId {
        NodeId(self.next_node_id.max(1))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert or replace a node, keeping the id counter ahead of it.
    pub fn insert_node(&mut self, node: Node) {
        self.next_node_id = self.next_node_id.max(node.id.0.saturating_add(1));
        self.nodes.insert(node.id, node);
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Remove a node together with the products it owns.
    pub fn remove_node(&mut self, id: NodeId) -> Option<(Node, Vec<Product>)> {
        let node = self.nodes.remove(&id)?;
        let owned: Vec<ProductId> = self
            .products
            .values()
            .filter(|p| p.owner == id)
            .map(|p| p.id)
            .collect();
        let products = owned
            .into_iter()
            .filter_map(|pid| self.products.remove(&pid))
            .collect();
        Some((node, products))
    }

    // ---- products ----

    pub fn next_product_id(&self) -> ProductId {
        ProductId(self.next_product_id.max(1))
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn products_of(&self, owner: NodeId) -> Vec<&Product> {
        self.products.values().filter(|p| p.owner == owner).collect()
    }

    pub fn insert_product(&mut self, product: Product) {
        self.next_product_id = self.next_product_id.max(product.id.0.saturating_add(1));
        self.products.insert(product.id, product);
    }

    pub fn remove_product(&mut self, id: ProductId) -> Option<Product> {
        self.products.remove(&id)
    }
}

impl NodeStore for Catalog {
    fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn supplier_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.supplier)
    }

    fn clients_of(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.supplier == Some(id))
            .map(|n| n.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Debt;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn node(id: u64, supplier: Option<u64>) -> Node {
        Node {
            id: NodeId(id),
            name: format!("Node {id}"),
            email: format!("node{id}@test.com"),
            country: "Test".to_string(),
            city: "Test".to_string(),
            street: "Test".to_string(),
            house_number: id.to_string(),
            supplier: supplier.map(NodeId),
            debt: Debt::from_cents(12_345).unwrap(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    fn product(id: u64, owner: u64) -> Product {
        Product {
            id: ProductId(id),
            owner: NodeId(owner),
            title: "Phone".to_string(),
            model: format!("X{id}"),
            release_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        }
    }

    #[test]
    fn given_empty_catalog_then_ids_start_at_one() {
        let catalog = Catalog::default();
        assert_eq!(catalog.next_node_id(), NodeId(1));
        assert_eq!(catalog.next_product_id(), ProductId(1));
    }

    #[test]
    fn given_inserted_nodes_then_counter_stays_ahead() {
        let mut catalog = Catalog::default();
        catalog.insert_node(node(5, None));
        assert_eq!(catalog.next_node_id(), NodeId(6));
        catalog.insert_node(node(2, None));
        assert_eq!(catalog.next_node_id(), NodeId(6));
    }

    #[test]
    fn given_largest_ids_when_inserting_then_counters_saturate() {
        let mut catalog = Catalog::default();
        catalog.insert_node(node(u64::MAX, None));
        catalog.insert_product(product(u64::MAX, u64::MAX));

        assert_eq!(catalog.next_node_id(), NodeId(u64::MAX));
        assert_eq!(catalog.next_product_id(), ProductId(u64::MAX));
    }

    #[test]
    fn given_catalog_when_serialized_then_loads_back_identical() {
        let mut catalog = Catalog::default();
        catalog.insert_node(node(1, None));
        catalog.insert_node(node(2, Some(1)));
        catalog.insert_product(product(1, 2));

        let text = catalog.to_toml().unwrap();
        let loaded = Catalog::from_toml(&text).unwrap();

        assert_eq!(loaded, catalog);
        assert!(text.contains("[[nodes]]"));
        assert!(text.contains("debt = \"123.45\""));
    }

    #[test]
    fn given_node_with_products_when_removed_then_products_cascade() {
        let mut catalog = Catalog::default();
        catalog.insert_node(node(1, None));
        catalog.insert_node(node(2, None));
        catalog.insert_product(product(1, 1));
        catalog.insert_product(product(2, 2));

        let (removed, products) = catalog.remove_node(NodeId(1)).unwrap();

        assert_eq!(removed.id, NodeId(1));
        assert_eq!(products.len(), 1);
        assert!(catalog.product(ProductId(1)).is_none());
        assert!(catalog.product(ProductId(2)).is_some());
    }

    #[test]
    fn given_links_then_node_store_answers_lookups() {
        let mut catalog = Catalog::default();
        catalog.insert_node(node(1, None));
        catalog.insert_node(node(2, Some(1)));
        catalog.insert_node(node(3, Some(1)));

        assert!(catalog.contains(NodeId(1)));
        assert!(!catalog.contains(NodeId(9)));
        assert_eq!(catalog.supplier_of(NodeId(2)), Some(NodeId(1)));
        assert_eq!(catalog.supplier_of(NodeId(1)), None);
        assert_eq!(catalog.clients_of(NodeId(1)), vec![NodeId(2), NodeId(3)]);
    }
}
