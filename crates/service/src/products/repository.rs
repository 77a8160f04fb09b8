use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{Owner, Product, ProductFields, ProductListing};
use crate::errors::ServiceError;

/// Repository abstraction for product persistence.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Make sure the owner exists locally so products can reference it.
    async fn ensure_owner(&self, owner: &Owner) -> Result<(), ServiceError>;
    /// Zero-based page of listings, newest first, and the total product count.
    async fn latest_page(&self, page_index: u64, per_page: u64) -> Result<(Vec<ProductListing>, u64), ServiceError>;
    async fn insert(&self, owner_id: Uuid, fields: &ProductFields) -> Result<Product, ServiceError>;
    async fn find(&self, id: i32) -> Result<Option<Product>, ServiceError>;
    /// Replace the editable fields; `None` when the product no longer exists.
    async fn overwrite(&self, id: i32, fields: &ProductFields) -> Result<Option<Product>, ServiceError>;
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;

    use chrono::Utc;

    use crate::products::domain::OwnerRef;

    #[derive(Default)]
    struct State {
        last_id: i32,
        owners: HashMap<Uuid, Owner>,
        products: BTreeMap<i32, Product>,
    }

    #[derive(Default)]
    pub struct MockProductRepository {
        state: Mutex<State>,
    }

    impl MockProductRepository {
        pub fn product_count(&self) -> usize { self.state.lock().unwrap().products.len() }

        pub fn owner(&self, id: Uuid) -> Option<Owner> { self.state.lock().unwrap().owners.get(&id).cloned() }
    }

    #[async_trait]
    impl ProductRepository for MockProductRepository {
        async fn ensure_owner(&self, owner: &Owner) -> Result<(), ServiceError> {
            let mut state = self.state.lock().unwrap();
            state.owners.insert(owner.id, owner.clone());
            Ok(())
        }

        async fn latest_page(&self, page_index: u64, per_page: u64) -> Result<(Vec<ProductListing>, u64), ServiceError> {
            let state = self.state.lock().unwrap();
            let mut all: Vec<&Product> = state.products.values().collect();
            all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            let rows = all
                .into_iter()
                .skip((page_index * per_page) as usize)
                .take(per_page as usize)
                .map(|p| ProductListing {
                    product: p.clone(),
                    user: state.owners.get(&p.user_id).map(OwnerRef::from),
                })
                .collect();
            Ok((rows, state.products.len() as u64))
        }

        async fn insert(&self, owner_id: Uuid, fields: &ProductFields) -> Result<Product, ServiceError> {
            let mut state = self.state.lock().unwrap();
            state.last_id += 1;
            let now = Utc::now().fixed_offset();
            let p = Product {
                id: state.last_id,
                user_id: owner_id,
                name: fields.name().to_string(),
                price: fields.price(),
                description: fields.description().map(str::to_string),
                created_at: now,
                updated_at: now,
            };
            state.products.insert(p.id, p.clone());
            Ok(p)
        }

        async fn find(&self, id: i32) -> Result<Option<Product>, ServiceError> {
            Ok(self.state.lock().unwrap().products.get(&id).cloned())
        }

        async fn overwrite(&self, id: i32, fields: &ProductFields) -> Result<Option<Product>, ServiceError> {
            let mut state = self.state.lock().unwrap();
            let Some(p) = state.products.get_mut(&id) else { return Ok(None) };
            p.name = fields.name().to_string();
            p.price = fields.price();
            p.description = fields.description().map(str::to_string);
            p.updated_at = Utc::now().fixed_offset();
            Ok(Some(p.clone()))
        }

        async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
            Ok(self.state.lock().unwrap().products.remove(&id).is_some())
        }
    }
}
