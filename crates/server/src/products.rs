use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;
use service::errors::ServiceError;
use service::pagination::Pagination;
use service::products::domain::Owner;

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::flash;
use crate::pages::{Page, PageRequest, SharedProps, Submission};
use crate::state::ServerState;
use crate::views::{CreateView, EditView, FormFields, IndexView};

pub const INDEX_PATH: &str = "/products";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
}

/// Ids that are not integers can't name a product.
fn parse_id(raw: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| AppError::NotFound(format!("product {raw} not found")))
}

fn back_to_index(jar: CookieJar, status: &str) -> Response {
    (flash::put(jar, status), Redirect::to(INDEX_PATH)).into_response()
}

#[utoipa::path(get, path = "/products", tag = "products",
    params(("page" = Option<u32>, Query, description = "1-based page number; invalid values mean 1")),
    responses((status = 200, description = "Product list page", body = crate::openapi::PageObjectDoc), (status = 401, description = "Unauthorized", body = crate::openapi::ErrorDoc)))]
pub async fn index(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    page: PageRequest,
    jar: CookieJar,
    Query(q): Query<ListQuery>,
) -> Result<Response, AppError> {
    let pagination = Pagination::new(Pagination::page_from_query(q.page.as_deref()), state.catalog.per_page);
    let products = state.products.list(pagination, INDEX_PATH).await?;
    let (jar, status) = flash::take(jar);
    let view = IndexView::new(&user.name, status.clone(), &products);
    let resp = Page::new("products/index", SharedProps::new(&user, status), json!({ "products": products }), view)
        .render(&page, &state.catalog.asset_version)?;
    Ok((jar, resp).into_response())
}

#[utoipa::path(get, path = "/products/create", tag = "products",
    responses((status = 200, description = "Empty product form", body = crate::openapi::PageObjectDoc), (status = 401, description = "Unauthorized", body = crate::openapi::ErrorDoc)))]
pub async fn create(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    page: PageRequest,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let (jar, status) = flash::take(jar);
    let view = CreateView { user_name: user.name.clone(), status: status.clone(), form: FormFields::create() };
    let resp = Page::new("products/create", SharedProps::new(&user, status), json!({}), view)
        .render(&page, &state.catalog.asset_version)?;
    Ok((jar, resp).into_response())
}

#[utoipa::path(post, path = "/products", tag = "products",
    request_body(content = crate::openapi::ProductInputDoc, description = "JSON or urlencoded form"),
    responses(
        (status = 303, description = "Created; redirects to the list with a status message"),
        (status = 422, description = "Invalid input; the form is shown again with errors"),
        (status = 401, description = "Unauthorized", body = crate::openapi::ErrorDoc)))]
pub async fn store(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    page: PageRequest,
    jar: CookieJar,
    submission: Submission,
) -> Result<Response, AppError> {
    match state.products.create(&user, &submission.input).await {
        Ok(done) => Ok(back_to_index(jar, &done.status)),
        Err(ServiceError::Validation(errors)) => {
            let view = CreateView {
                user_name: user.name.clone(),
                status: None,
                form: FormFields::create().refill(&submission.old, &errors),
            };
            let shared = SharedProps::new(&user, None).with_errors(&errors);
            Page::new("products/create", shared, json!({ "old": submission.old }), view)
                .with_html_status(StatusCode::UNPROCESSABLE_ENTITY)
                .render(&page, &state.catalog.asset_version)
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(get, path = "/products/{id}/edit", tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    responses((status = 200, description = "Product form filled with the product", body = crate::openapi::PageObjectDoc), (status = 404, description = "No such product", body = crate::openapi::ErrorDoc)))]
pub async fn edit(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    page: PageRequest,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let product = state.products.get(parse_id(&raw_id)?).await?;
    let (jar, status) = flash::take(jar);
    let view = EditView {
        user_name: user.name.clone(),
        status: status.clone(),
        product_name: product.name.clone(),
        form: FormFields::edit(&product),
    };
    let resp = Page::new("products/edit", SharedProps::new(&user, status), json!({ "product": product }), view)
        .render(&page, &state.catalog.asset_version)?;
    Ok((jar, resp).into_response())
}

#[utoipa::path(put, path = "/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    request_body(content = crate::openapi::ProductInputDoc, description = "JSON or urlencoded form"),
    responses(
        (status = 303, description = "Updated; redirects to the list with a status message"),
        (status = 422, description = "Invalid input; the form is shown again with errors"),
        (status = 403, description = "Not the owner", body = crate::openapi::ErrorDoc),
        (status = 404, description = "No such product", body = crate::openapi::ErrorDoc)))]
pub async fn update(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    page: PageRequest,
    jar: CookieJar,
    Path(raw_id): Path<String>,
    submission: Submission,
) -> Result<Response, AppError> {
    apply_update(&state, &user, &page, jar, parse_id(&raw_id)?, submission).await
}

#[utoipa::path(delete, path = "/products/{id}", tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 303, description = "Deleted; redirects to the list with a status message"),
        (status = 403, description = "Not the owner", body = crate::openapi::ErrorDoc),
        (status = 404, description = "No such product", body = crate::openapi::ErrorDoc)))]
pub async fn destroy(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    apply_delete(&state, &user, jar, parse_id(&raw_id)?).await
}

/// HTML forms can only POST; `_method` says what they meant.
pub async fn spoofed(
    State(state): State<ServerState>,
    CurrentUser(user): CurrentUser,
    page: PageRequest,
    jar: CookieJar,
    Path(raw_id): Path<String>,
    submission: Submission,
) -> Result<Response, AppError> {
    let id = parse_id(&raw_id)?;
    let method = submission.method.as_deref().map(str::to_ascii_uppercase);
    match method.as_deref() {
        Some("PUT") | Some("PATCH") => apply_update(&state, &user, &page, jar, id, submission).await,
        Some("DELETE") => apply_delete(&state, &user, jar, id).await,
        other => Err(AppError::MethodNotAllowed(format!(
            "POST /products/{id} needs _method PUT or DELETE, got {}",
            other.unwrap_or("nothing")
        ))),
    }
}

async fn apply_update(
    state: &ServerState,
    user: &Owner,
    page: &PageRequest,
    jar: CookieJar,
    id: i32,
    submission: Submission,
) -> Result<Response, AppError> {
    match state.products.update(user, id, &submission.input).await {
        Ok(done) => Ok(back_to_index(jar, &done.status)),
        Err(ServiceError::Validation(errors)) => {
            let product = state.products.get(id).await?;
            let view = EditView {
                user_name: user.name.clone(),
                status: None,
                product_name: product.name.clone(),
                form: FormFields::edit(&product).refill(&submission.old, &errors),
            };
            let shared = SharedProps::new(user, None).with_errors(&errors);
            Page::new("products/edit", shared, json!({ "product": product, "old": submission.old }), view)
                .with_html_status(StatusCode::UNPROCESSABLE_ENTITY)
                .render(page, &state.catalog.asset_version)
        }
        Err(e) => Err(e.into()),
    }
}

async fn apply_delete(state: &ServerState, user: &Owner, jar: CookieJar, id: i32) -> Result<Response, AppError> {
    let done = state.products.delete(user, id).await?;
    Ok(back_to_index(jar, &done.status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_numeric_ids_are_not_found() {
        assert_eq!(parse_id("12").unwrap(), 12);
        assert!(matches!(parse_id("abc"), Err(AppError::NotFound(_))));
        assert!(matches!(parse_id("99999999999"), Err(AppError::NotFound(_))));
    }
}
