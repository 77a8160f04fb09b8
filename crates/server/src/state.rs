use std::sync::Arc;

use sea_orm::DatabaseConnection;
use service::products::{repo::seaorm::SeaOrmProductRepository, ProductPolicy, ProductService};

pub type Products = ProductService<SeaOrmProductRepository>;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

/// Catalog settings the handlers need at request time.
#[derive(Clone)]
pub struct CatalogSettings {
    pub per_page: u32,
    pub asset_version: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub auth: ServerAuthConfig,
    pub catalog: CatalogSettings,
    pub products: Arc<Products>,
    /// Origins besides our own that may send cookie-authenticated writes.
    pub allowed_origins: Arc<Vec<String>>,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, auth: &configs::AuthConfig, catalog: &configs::CatalogConfig) -> Self {
        let repo = Arc::new(SeaOrmProductRepository::new(db));
        let policy = ProductPolicy { enforce_ownership: catalog.enforce_ownership };
        Self {
            auth: ServerAuthConfig { jwt_secret: auth.jwt_secret.clone() },
            catalog: CatalogSettings { per_page: catalog.per_page, asset_version: catalog.asset_version.clone() },
            products: Arc::new(ProductService::new(repo, policy)),
            allowed_origins: Arc::new(Vec::new()),
        }
    }

    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = Arc::new(origins);
        self
    }
}
