use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::products::domain::{Owner, OwnerRef, Product, ProductFields, ProductListing};
use crate::products::repository::ProductRepository;

pub struct SeaOrmProductRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmProductRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait::async_trait]
impl ProductRepository for SeaOrmProductRepository {
    async fn ensure_owner(&self, owner: &Owner) -> Result<(), ServiceError> {
        models::user::upsert(&self.db, owner.id, &owner.email, &owner.name).await?;
        Ok(())
    }

    async fn latest_page(&self, page_index: u64, per_page: u64) -> Result<(Vec<ProductListing>, u64), ServiceError> {
        let (rows, total) = models::product::latest_page(&self.db, page_index, per_page).await?;
        let listings = rows
            .into_iter()
            .map(|(p, u)| ProductListing { product: p.into(), user: u.map(OwnerRef::from) })
            .collect();
        Ok((listings, total))
    }

    async fn insert(&self, owner_id: Uuid, fields: &ProductFields) -> Result<Product, ServiceError> {
        let created = models::product::create(&self.db, owner_id, fields).await?;
        Ok(created.into())
    }

    async fn find(&self, id: i32) -> Result<Option<Product>, ServiceError> {
        Ok(models::product::find(&self.db, id).await?.map(Product::from))
    }

    async fn overwrite(&self, id: i32, fields: &ProductFields) -> Result<Option<Product>, ServiceError> {
        let Some(existing) = models::product::find(&self.db, id).await? else { return Ok(None) };
        let updated = models::product::overwrite(&self.db, existing, fields).await?;
        Ok(Some(updated.into()))
    }

    async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(models::product::delete(&self.db, id).await?)
    }
}
