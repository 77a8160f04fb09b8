use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use models::product::{FieldErrors, ProductFields, ProductInput};

pub const STATUS_CREATED: &str = "Product created successfully.";
pub const STATUS_DELETED: &str = "Product deleted successfully.";

pub fn updated_status(name: &str) -> String { format!("Product {name} updated successfully.") }

/// The acting user, as vouched for by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Owner summary embedded in product listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&Owner> for OwnerRef {
    fn from(o: &Owner) -> Self { Self { id: o.id, name: o.name.clone(), email: o.email.clone() } }
}

impl From<models::user::Model> for OwnerRef {
    fn from(u: models::user::Model) -> Self { Self { id: u.id, name: u.name, email: u.email } }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: i32,
    pub user_id: Uuid,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<models::product::Model> for Product {
    fn from(m: models::product::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            name: m.name,
            price: m.price,
            description: m.description,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// A product row of the list page with its owner attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductListing {
    #[serde(flatten)]
    pub product: Product,
    pub user: Option<OwnerRef>,
}

/// Result of a successful write: the affected product and the status message to flash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mutation {
    pub product_id: i32,
    pub status: String,
}
