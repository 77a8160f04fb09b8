//! Server-rendered client views: product list, create form and edit form.

use askama::Template;
use service::pagination::{PageLink, Paginated, NEXT_LABEL, PREVIOUS_LABEL};
use service::products::domain::{FieldErrors, Product, ProductListing};

use crate::pages::OldInput;

pub const EMPTY_CAPTION: &str = "There is nothing here";
pub const LIST_CAPTION: &str = "List of products";

pub struct RowView {
    pub name: String,
    pub description: String,
    pub price: String,
    pub edit_url: String,
    pub action_url: String,
}

impl From<&ProductListing> for RowView {
    fn from(l: &ProductListing) -> Self {
        let p = &l.product;
        Self {
            name: p.name.clone(),
            description: p.description.clone().unwrap_or_default(),
            price: format!("${:.2}", p.price),
            edit_url: format!("/products/{}/edit", p.id),
            action_url: format!("/products/{}", p.id),
        }
    }
}

pub struct LinkView {
    pub href: Option<String>,
    pub text: String,
    pub active: bool,
}

impl From<&PageLink> for LinkView {
    fn from(l: &PageLink) -> Self {
        let text = match l.label.as_str() {
            PREVIOUS_LABEL => "\u{2039} Previous".to_string(),
            NEXT_LABEL => "Next \u{203a}".to_string(),
            other => other.to_string(),
        };
        // the current page is not a link to itself
        let href = if l.active { None } else { l.url.clone() };
        Self { href, text, active: l.active }
    }
}

#[derive(Template)]
#[template(path = "products/index.html")]
pub struct IndexView {
    pub user_name: String,
    pub status: Option<String>,
    pub caption: &'static str,
    pub rows: Vec<RowView>,
    pub show_pagination: bool,
    pub links: Vec<LinkView>,
    pub from: String,
    pub to: String,
    pub total: u64,
}

impl IndexView {
    pub fn new(user_name: &str, status: Option<String>, page: &Paginated<ProductListing>) -> Self {
        Self {
            user_name: user_name.to_string(),
            status,
            caption: if page.is_empty() { EMPTY_CAPTION } else { LIST_CAPTION },
            rows: page.data.iter().map(RowView::from).collect(),
            show_pagination: page.has_pages(),
            links: page.links.iter().map(LinkView::from).collect(),
            from: page.from.map(|n| n.to_string()).unwrap_or_default(),
            to: page.to.map(|n| n.to_string()).unwrap_or_default(),
            total: page.total,
        }
    }
}

#[derive(Default)]
pub struct FieldView {
    pub value: String,
    pub error: Option<String>,
}

/// Values and inline errors of the product form.
pub struct FormFields {
    pub action: String,
    pub method_override: Option<&'static str>,
    pub submit_label: &'static str,
    pub name: FieldView,
    pub price: FieldView,
    pub description: FieldView,
}

impl FormFields {
    pub fn create() -> Self {
        Self {
            action: "/products".into(),
            method_override: None,
            submit_label: "Create",
            name: FieldView::default(),
            price: FieldView::default(),
            description: FieldView::default(),
        }
    }

    pub fn edit(product: &Product) -> Self {
        Self {
            action: format!("/products/{}", product.id),
            method_override: Some("PUT"),
            submit_label: "Update",
            name: FieldView { value: product.name.clone(), error: None },
            price: FieldView { value: product.price.to_string(), error: None },
            description: FieldView { value: product.description.clone().unwrap_or_default(), error: None },
        }
    }

    /// Put the submitted values back and attach the first error of each field.
    pub fn refill(mut self, old: &OldInput, errors: &FieldErrors) -> Self {
        let field = |value: &str, key: &str| FieldView { value: value.to_string(), error: errors.first(key).map(str::to_string) };
        self.name = field(&old.name, "name");
        self.price = field(&old.price, "price");
        self.description = field(&old.description, "description");
        self
    }
}

#[derive(Template)]
#[template(path = "products/create.html")]
pub struct CreateView {
    pub user_name: String,
    pub status: Option<String>,
    pub form: FormFields,
}

#[derive(Template)]
#[template(path = "products/edit.html")]
pub struct EditView {
    pub user_name: String,
    pub status: Option<String>,
    pub product_name: String,
    pub form: FormFields,
}
