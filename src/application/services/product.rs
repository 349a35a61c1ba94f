//! Product service
//!
//! Products hang off exactly one node and disappear with it.

use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::application::services::handle::CatalogHandle;
use crate::application::services::query::{contains_ignore_case, ProductQuery, ProductSortKey};
use crate::application::ApplicationResult;
use crate::domain::{
    DomainError, NodeId, NodeStore, Product, ProductDraft, ProductId, ProductPatch,
};
use crate::infrastructure::Catalog;

/// A product with its owner's name resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductView {
    pub product: Product,
    pub owner_name: String,
}

/// Service for managing products.
pub struct ProductService {
    catalog: Arc<CatalogHandle>,
}

impl ProductService {
    pub fn new(catalog: Arc<CatalogHandle>) -> Self {
        Self { catalog }
    }

    #[instrument(skip(self, draft), fields(owner = %draft.owner))]
    pub fn create(&self, draft: ProductDraft) -> ApplicationResult<ProductView> {
        self.catalog.modify(|catalog| {
            let product = Product::from_draft(catalog.next_product_id(), draft);
            Self::check(catalog, &product)?;
            let id = product.id;
            catalog.insert_product(product);
            info!("created product {}", id);
            Ok(Self::view(catalog, id)?)
        })
    }

    #[instrument(skip(self, patch))]
    pub fn update(&self, id: ProductId, patch: ProductPatch) -> ApplicationResult<ProductView> {
        self.catalog.modify(|catalog| {
            let current = catalog
                .product(id)
                .ok_or(DomainError::ProductNotFound(id))?;
            let updated = patch.apply(current);
            Self::check(catalog, &updated)?;
            catalog.insert_product(updated);
            info!("updated product {}", id);
            Ok(Self::view(catalog, id)?)
        })
    }

    #[instrument(skip(self))]
    pub fn delete(&self, id: ProductId) -> ApplicationResult<Product> {
        self.catalog.modify(|catalog| {
            let product = catalog
                .remove_product(id)
                .ok_or(DomainError::ProductNotFound(id))?;
            info!("deleted product {}", id);
            Ok(product)
        })
    }

    pub fn get(&self, id: ProductId) -> ApplicationResult<ProductView> {
        let catalog = self.catalog.read()?;
        Ok(Self::view(&catalog, id)?)
    }

    pub fn list(&self, query: &ProductQuery) -> ApplicationResult<Vec<ProductView>> {
        let catalog = self.catalog.read()?;
        let views = catalog
            .products()
            .map(|p| Self::view_of(&catalog, p))
            .filter(|v| Self::matches(&catalog, query, v))
            .sorted_by(|a, b| {
                let (a, b) = (&a.product, &b.product);
                match query.ordering {
                    Some(order) => {
                        let ordering = match order.key {
                            ProductSortKey::ReleaseDate => a.release_date.cmp(&b.release_date),
                            ProductSortKey::Title => a.title.cmp(&b.title),
                        };
                        order.directed(ordering).then_with(|| a.id.cmp(&b.id))
                    }
                    None => b
                        .release_date
                        .cmp(&a.release_date)
                        .then_with(|| a.title.cmp(&b.title))
                        .then_with(|| a.id.cmp(&b.id)),
                }
            })
            .collect::<Vec<_>>();
        debug!("list: {} products", views.len());
        Ok(views)
    }

    fn check(catalog: &Catalog, product: &Product) -> Result<(), DomainError> {
        product.validate_fields()?;
        if !catalog.contains(product.owner) {
            return Err(DomainError::invalid_field(
                "owner",
                format!("node {} does not exist", product.owner),
            ));
        }
        Ok(())
    }

    fn matches(catalog: &Catalog, query: &ProductQuery, view: &ProductView) -> bool {
        let product = &view.product;
        if let Some(owner) = query.owner {
            if product.owner != owner {
                return false;
            }
        }
        if let Some(term) = &query.search {
            let owner_city = Self::owner_city(catalog, product.owner);
            let fields = [&product.title, &product.model, &view.owner_name, &owner_city];
            if !fields.iter().any(|f| contains_ignore_case(f, term)) {
                return false;
            }
        }
        true
    }

    fn owner_city(catalog: &Catalog, owner: NodeId) -> String {
        catalog
            .node(owner)
            .map(|n| n.city.clone())
            .unwrap_or_default()
    }

    fn view(catalog: &Catalog, id: ProductId) -> Result<ProductView, DomainError> {
        let product = catalog
            .product(id)
            .ok_or(DomainError::ProductNotFound(id))?;
        Ok(Self::view_of(catalog, product))
    }

    fn view_of(catalog: &Catalog, product: &Product) -> ProductView {
        ProductView {
            product: product.clone(),
            owner_name: catalog
                .node(product.owner)
                .map(|n| n.name.clone())
                .unwrap_or_default(),
        }
    }
}
