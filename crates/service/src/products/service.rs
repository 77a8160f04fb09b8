use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::domain::{updated_status, Mutation, Owner, Product, ProductInput, ProductListing, STATUS_CREATED, STATUS_DELETED};
use super::repository::ProductRepository;
use crate::errors::ServiceError;
use crate::pagination::{Paginated, Pagination};

/// Product service settings
#[derive(Clone, Copy, Debug, Default)]
pub struct ProductPolicy {
    /// Restrict edits and deletions to the product's owner.
    pub enforce_ownership: bool,
}

/// Product catalog business service independent of web framework
pub struct ProductService<R: ProductRepository> {
    repo: Arc<R>,
    policy: ProductPolicy,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repo: Arc<R>, policy: ProductPolicy) -> Self { Self { repo, policy } }

    /// One page of products, newest first, each with its owner.
    ///
    /// Pages past the end are returned empty rather than rejected.
    #[instrument(skip(self), fields(page = pagination.page, per_page = pagination.per_page))]
    pub async fn list(&self, pagination: Pagination, path: &str) -> Result<Paginated<ProductListing>, ServiceError> {
        let (index, per_page) = pagination.normalize();
        let (rows, total) = self.repo.latest_page(index, per_page).await?;
        debug!(total, rows = rows.len(), "products_listed");
        Ok(Paginated::new(rows, total, pagination, path))
    }

    /// Validate and store a new product owned by `owner`.
    ///
    /// # Examples
    /// ```
    /// use service::products::{ProductPolicy, ProductService, repository::mock::MockProductRepository};
    /// use service::products::domain::{Owner, ProductInput};
    /// use std::sync::Arc;
    /// let svc = ProductService::new(Arc::new(MockProductRepository::default()), ProductPolicy::default());
    /// let owner = Owner { id: uuid::Uuid::new_v4(), email: "a@example.com".into(), name: "Alice".into() };
    /// let input = ProductInput::from_strings(Some("Widget".into()), Some("9.99".into()), None);
    /// let done = tokio_test::block_on(svc.create(&owner, &input)).unwrap();
    /// assert_eq!(done.status, "Product created successfully.");
    /// ```
    #[instrument(skip(self, input), fields(owner_id = %owner.id))]
    pub async fn create(&self, owner: &Owner, input: &ProductInput) -> Result<Mutation, ServiceError> {
        let fields = models::product::validate(input).map_err(|errs| {
            debug!(errors = %errs, "product_rejected");
            ServiceError::Validation(errs)
        })?;
        self.repo.ensure_owner(owner).await?;
        let created = self.repo.insert(owner.id, &fields).await?;
        info!(product_id = created.id, name = %created.name, "product_created");
        Ok(Mutation { product_id: created.id, status: STATUS_CREATED.to_string() })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<Product, ServiceError> {
        self.repo.find(id).await?.ok_or_else(|| ServiceError::not_found("product", id))
    }

    /// Replace name, price and description of an existing product.
    ///
    /// A missing product is reported before the input is looked at.
    #[instrument(skip(self, input), fields(actor_id = %actor.id))]
    pub async fn update(&self, actor: &Owner, id: i32, input: &ProductInput) -> Result<Mutation, ServiceError> {
        let existing = self.get(id).await?;
        self.authorize(actor, &existing)?;
        let fields = models::product::validate(input).map_err(ServiceError::Validation)?;
        let updated = self
            .repo
            .overwrite(id, &fields)
            .await?
            .ok_or_else(|| ServiceError::not_found("product", id))?;
        info!(product_id = updated.id, "product_updated");
        Ok(Mutation { product_id: updated.id, status: updated_status(fields.name()) })
    }

    #[instrument(skip(self), fields(actor_id = %actor.id))]
    pub async fn delete(&self, actor: &Owner, id: i32) -> Result<Mutation, ServiceError> {
        let existing = self.get(id).await?;
        self.authorize(actor, &existing)?;
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("product", id));
        }
        info!(product_id = id, "product_deleted");
        Ok(Mutation { product_id: id, status: STATUS_DELETED.to_string() })
    }

    fn authorize(&self, actor: &Owner, product: &Product) -> Result<(), ServiceError> {
        if self.policy.enforce_ownership && product.user_id != actor.id {
            warn!(product_id = product.id, owner_id = %product.user_id, "product_access_denied");
            return Err(ServiceError::Forbidden(format!("product {} belongs to another user", product.id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::repository::mock::MockProductRepository;
    use crate::test_support::owner;
    use serde_json::json;

    fn svc(policy: ProductPolicy) -> (ProductService<MockProductRepository>, Arc<MockProductRepository>) {
        let repo = Arc::new(MockProductRepository::default());
        (ProductService::new(repo.clone(), policy), repo)
    }

    fn input(v: serde_json::Value) -> ProductInput { serde_json::from_value(v).unwrap() }

    #[tokio::test]
    async fn widget_lifecycle() {
        let (svc, repo) = svc(ProductPolicy::default());
        let alice = owner("Alice");

        let created = svc
            .create(&alice, &input(json!({"name": "Widget", "price": "9.99", "description": "A widget"})))
            .await
            .unwrap();
        assert_eq!(created.status, "Product created successfully.");
        assert_eq!(repo.owner(alice.id).map(|o| o.name), Some("Alice".to_string()));

        let page = svc.list(Pagination::default(), "/products").await.unwrap();
        assert_eq!(page.total, 1);
        let row = &page.data[0];
        assert_eq!(row.product.name, "Widget");
        assert_eq!(row.product.price, 9.99);
        assert_eq!(row.product.description.as_deref(), Some("A widget"));
        assert_eq!(row.user.as_ref().map(|u| u.name.as_str()), Some("Alice"));

        let edited = svc
            .update(&alice, created.product_id, &input(json!({"name": "Gadget", "price": 14})))
            .await
            .unwrap();
        assert_eq!(edited.status, "Product Gadget updated successfully.");
        let p = svc.get(created.product_id).await.unwrap();
        assert_eq!(p.name, "Gadget");
        assert_eq!(p.price, 14.0);
        assert_eq!(p.description, None);
        assert_eq!(p.user_id, alice.id);

        let gone = svc.delete(&alice, created.product_id).await.unwrap();
        assert_eq!(gone.status, "Product deleted successfully.");
        assert_eq!(repo.product_count(), 0);
        assert!(matches!(svc.get(created.product_id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn invalid_create_stores_nothing() {
        let (svc, repo) = svc(ProductPolicy::default());
        let err = svc.create(&owner("A"), &input(json!({"name": "", "price": "-1"}))).await.unwrap_err();
        match err {
            ServiceError::Validation(errs) => {
                assert_eq!(errs.first("name"), Some("The name field is required."));
                assert_eq!(errs.first("price"), Some("The price field must be at least 0."));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(repo.product_count(), 0);
    }

    #[tokio::test]
    async fn invalid_update_leaves_product_untouched() {
        let (svc, _) = svc(ProductPolicy::default());
        let a = owner("A");
        let id = svc.create(&a, &input(json!({"name": "Widget", "price": 1}))).await.unwrap().product_id;
        let err = svc.update(&a, id, &input(json!({"name": "X", "price": "abc"}))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref e) if e.first("price") == Some("The price field must be a number.")));
        assert_eq!(svc.get(id).await.unwrap().name, "Widget");
    }

    #[tokio::test]
    async fn missing_product_wins_over_bad_input() {
        let (svc, _) = svc(ProductPolicy::default());
        let err = svc.update(&owner("A"), 77, &ProductInput::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        let err = svc.delete(&owner("A"), 77).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn any_user_may_edit_when_ownership_not_enforced() {
        let (svc, _) = svc(ProductPolicy::default());
        let id = svc.create(&owner("A"), &input(json!({"name": "W", "price": 1}))).await.unwrap().product_id;
        let other = owner("B");
        svc.update(&other, id, &input(json!({"name": "W2", "price": 2}))).await.unwrap();
        let p = svc.get(id).await.unwrap();
        assert_ne!(p.user_id, other.id);
        svc.delete(&other, id).await.unwrap();
    }

    #[tokio::test]
    async fn ownership_enforced_rejects_other_users() {
        let (svc, repo) = svc(ProductPolicy { enforce_ownership: true });
        let a = owner("A");
        let id = svc.create(&a, &input(json!({"name": "W", "price": 1}))).await.unwrap().product_id;
        let b = owner("B");
        assert!(matches!(svc.update(&b, id, &input(json!({"name": "W2", "price": 2}))).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(svc.delete(&b, id).await, Err(ServiceError::Forbidden(_))));
        assert_eq!(repo.product_count(), 1);
        svc.delete(&a, id).await.unwrap();
    }

    #[tokio::test]
    async fn list_pages_newest_first() {
        let (svc, _) = svc(ProductPolicy::default());
        let a = owner("A");
        for i in 0..12 {
            svc.create(&a, &input(json!({"name": format!("P{i}"), "price": i}))).await.unwrap();
        }
        let first = svc.list(Pagination::new(1, 10), "/products").await.unwrap();
        assert_eq!(first.data.len(), 10);
        assert_eq!(first.data[0].product.name, "P11");
        assert_eq!(first.last_page, 2);
        let second = svc.list(Pagination::new(2, 10), "/products").await.unwrap();
        assert_eq!(second.data.len(), 2);
        assert_eq!(second.data[1].product.name, "P0");
        let beyond = svc.list(Pagination::new(5, 10), "/products").await.unwrap();
        assert!(beyond.is_empty());
        assert_eq!(beyond.total, 12);
    }
}
