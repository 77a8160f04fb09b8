use axum::Json;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

/// Product fields as submitted by a form or JSON body.
#[derive(ToSchema)]
pub struct ProductInputDoc {
    /// Required, at most 255 characters.
    pub name: String,
    /// Required, numeric, at least 0.
    pub price: f64,
    pub description: Option<String>,
}

#[derive(ToSchema)]
pub struct ProductDoc {
    pub id: i32,
    pub user_id: uuid::Uuid,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
}

/// Returned instead of HTML when the request carries `X-Inertia: true`.
#[derive(ToSchema)]
pub struct PageObjectDoc {
    /// `products/index`, `products/create` or `products/edit`.
    pub component: String,
    /// Page props plus the shared `auth`, `flash` and `errors` props.
    #[schema(value_type = Object)]
    pub props: serde_json::Value,
    pub url: String,
    pub version: String,
}

#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String, pub message: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::products::index,
        crate::products::create,
        crate::products::store,
        crate::products::edit,
        crate::products::update,
        crate::products::destroy,
    ),
    components(
        schemas(
            HealthResponse,
            ProductInputDoc,
            ProductDoc,
            PageObjectDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "products")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_product_routes() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = doc["paths"].as_object().unwrap();
        for p in ["/health", "/products", "/products/create", "/products/{id}", "/products/{id}/edit"] {
            assert!(paths.contains_key(p), "missing {p}");
        }
        assert!(doc["components"]["schemas"]["ProductInputDoc"].is_object());
    }
}
