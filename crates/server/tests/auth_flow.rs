use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use service::products::domain::Owner;
use tower::Service;
use uuid::Uuid;

use server::{auth, routes, state::ServerState};

const SECRET: &str = "test-secret";

fn cors() -> tower_http::cors::CorsLayer { server::origin::build_cors(&[]) }

async fn build_app() -> anyhow::Result<Router> {
    let db = models::db::connect_in_memory().await?;
    let state = ServerState::new(
        db,
        &configs::AuthConfig { jwt_secret: SECRET.into() },
        &configs::CatalogConfig::default(),
    );
    Ok(routes::build_router(state, cors(), "public"))
}

fn owner() -> Owner {
    Owner { id: Uuid::new_v4(), email: "tester@example.com".into(), name: "Tester".into() }
}

async fn body_json(resp: axum::response::Response) -> anyhow::Result<serde_json::Value> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn test_cookie_token_is_accepted() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let token = auth::issue_token(SECRET, &owner(), chrono::Duration::hours(1))?;

    let req = Request::builder()
        .uri("/products")
        .header(header::COOKIE, format!("{}={}", auth::AUTH_COOKIE, token))
        .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_expired_token_is_rejected() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let token = auth::issue_token(SECRET, &owner(), chrono::Duration::hours(-3))?;

    let req = Request::builder()
        .uri("/products")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await?;
    assert_eq!(body["error"], "Unauthorized");
    Ok(())
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let token = auth::issue_token("someone-else", &owner(), chrono::Duration::hours(1))?;

    let req = Request::builder()
        .uri("/products/create")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_first_write_mirrors_owner() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let me = owner();
    let token = auth::issue_token(SECRET, &me, chrono::Duration::hours(1))?;

    let req = Request::builder()
        .method("POST")
        .uri("/products")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("name=Lamp&price=12.50"))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let req = Request::builder()
        .uri("/products")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header("X-Inertia", "true")
        .header("X-Inertia-Version", "1")
        .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = body_json(resp).await?;
    let row = &page["props"]["products"]["data"][0];
    assert_eq!(row["name"], "Lamp");
    assert_eq!(row["price"], 12.5);
    assert_eq!(row["user"]["email"], "tester@example.com");
    Ok(())
}

#[tokio::test]
async fn test_unknown_method_override_is_rejected() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let token = auth::issue_token(SECRET, &owner(), chrono::Duration::hours(1))?;

    let req = Request::builder()
        .method("POST")
        .uri("/products/1")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("_method=PATCHY"))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}
