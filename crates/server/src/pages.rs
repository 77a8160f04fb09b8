//! Page renderer.
//!
//! Every page is described by a component name plus props. Requests sent by
//! the client-side view layer (`X-Inertia: true`) get the page object as
//! JSON; plain browser requests get the server-rendered HTML view instead.

use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;

use askama::Template;
use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Request, State};
use axum::http::{header, request::Parts, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use serde::Serialize;
use serde_json::{Map, Value};
use service::products::domain::{FieldErrors, Owner, OwnerRef, ProductInput};

use crate::errors::AppError;
use crate::state::ServerState;

pub const INERTIA_HEADER: &str = "x-inertia";
pub const VERSION_HEADER: &str = "x-inertia-version";
pub const LOCATION_HEADER: &str = "x-inertia-location";

fn wants_page_object(headers: &axum::http::HeaderMap) -> bool {
    headers
        .get(INERTIA_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// How the current request wants its page delivered.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub page_object: bool,
    pub url: String,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for PageRequest {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let url = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());
        Ok(Self { page_object: wants_page_object(&parts.headers), url })
    }
}

#[derive(Debug, Serialize)]
pub struct PageObject {
    pub component: &'static str,
    pub props: Value,
    pub url: String,
    pub version: String,
}

#[derive(Debug, Default, Serialize)]
pub struct AuthProps {
    pub user: Option<OwnerRef>,
}

#[derive(Debug, Default, Serialize)]
pub struct FlashProps {
    pub status: Option<String>,
}

/// Props carried by every page.
#[derive(Debug, Default, Serialize)]
pub struct SharedProps {
    pub auth: AuthProps,
    pub flash: FlashProps,
    /// First message per invalid field.
    pub errors: BTreeMap<String, String>,
}

impl SharedProps {
    pub fn new(user: &Owner, status: Option<String>) -> Self {
        Self { auth: AuthProps { user: Some(OwnerRef::from(user)) }, flash: FlashProps { status }, errors: BTreeMap::new() }
    }

    pub fn with_errors(mut self, errors: &FieldErrors) -> Self {
        self.errors = errors.to_first_messages();
        self
    }
}

/// A page ready to be delivered in either mode.
pub struct Page<V: Template> {
    pub component: &'static str,
    pub shared: SharedProps,
    pub props: Value,
    pub view: V,
    /// Status used for the HTML rendition; page objects are always 200.
    pub html_status: StatusCode,
}

impl<V: Template> Page<V> {
    pub fn new(component: &'static str, shared: SharedProps, props: Value, view: V) -> Self {
        Self { component, shared, props, view, html_status: StatusCode::OK }
    }

    pub fn with_html_status(mut self, status: StatusCode) -> Self {
        self.html_status = status;
        self
    }

    pub fn render(self, req: &PageRequest, version: &str) -> Result<Response, AppError> {
        if !req.page_object {
            let html = self.view.render()?;
            return Ok((self.html_status, Html(html)).into_response());
        }
        let mut props = match serde_json::to_value(&self.shared)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let Value::Object(own) = self.props {
            props.extend(own);
        }
        let page = PageObject {
            component: self.component,
            props: Value::Object(props),
            url: req.url.clone(),
            version: version.to_string(),
        };
        let mut resp = Json(page).into_response();
        resp.headers_mut().insert(INERTIA_HEADER, HeaderValue::from_static("true"));
        resp.headers_mut().insert(header::VARY, HeaderValue::from_static("X-Inertia"));
        Ok(resp)
    }
}

/// Asks page-object clients holding stale assets to reload the page.
pub async fn check_version(State(state): State<ServerState>, req: Request, next: Next) -> Response {
    if req.method() == Method::GET && wants_page_object(req.headers()) {
        let client = req.headers().get(VERSION_HEADER).and_then(|v| v.to_str().ok()).unwrap_or("");
        if client != state.catalog.asset_version {
            let location = req.uri().to_string();
            tracing::debug!(%location, client_version = %client, "asset version mismatch");
            let mut resp = StatusCode::CONFLICT.into_response();
            if let Ok(v) = HeaderValue::from_str(&location) {
                resp.headers_mut().insert(LOCATION_HEADER, v);
            }
            return resp;
        }
    }
    next.run(req).await
}

/// Submitted values echoed back to a form after a failed validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OldInput {
    pub name: String,
    pub price: String,
    pub description: String,
}

/// A product form submission, from a JSON body or an urlencoded form.
#[derive(Debug, Default)]
pub struct Submission {
    /// `_method` override sent by plain HTML forms.
    pub method: Option<String>,
    pub input: ProductInput,
    pub old: OldInput,
}

fn echo(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl Submission {
    fn from_json(mut map: Map<String, Value>) -> Self {
        let method = map.get("_method").and_then(Value::as_str).map(str::to_string);
        let old = OldInput {
            name: echo(map.get("name")),
            price: echo(map.get("price")),
            description: echo(map.get("description")),
        };
        let input = ProductInput {
            name: map.remove("name"),
            price: map.remove("price"),
            description: map.remove("description"),
        };
        Self { method, input, old }
    }

    fn from_form(mut fields: HashMap<String, String>) -> Self {
        let method = fields.remove("_method");
        let old = OldInput {
            name: fields.get("name").cloned().unwrap_or_default(),
            price: fields.get("price").cloned().unwrap_or_default(),
            description: fields.get("description").cloned().unwrap_or_default(),
        };
        let input = ProductInput::from_strings(fields.remove("name"), fields.remove("price"), fields.remove("description"));
        Self { method, input, old }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for Submission {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false);
        if is_json {
            let Json(map) = Json::<Map<String, Value>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(Self::from_json(map))
        } else {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(Self::from_form(fields))
        }
    }
}
