//! `product` entity, its input validation, and persistence helpers.
//!
//! Validation turns loosely typed request input into [`ProductFields`], the
//! only shape the write helpers accept, so a stored product always has a
//! non-empty name of at most 255 characters and a finite, non-negative price.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, PaginatorTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{errors, user};

pub const NAME_MAX_CHARS: usize = 255;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Raw submission as it arrives from a form or JSON body.
///
/// Values stay untyped so that "wrong type" and "missing" can be reported
/// separately from range violations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
}

impl ProductInput {
    /// Input made of plain strings, the shape HTML forms submit.
    pub fn from_strings(name: Option<String>, price: Option<String>, description: Option<String>) -> Self {
        Self {
            name: name.map(Value::String),
            price: price.map(Value::String),
            description: description.map(Value::String),
        }
    }
}

/// Validated product values.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProductFields {
    name: String,
    price: f64,
    description: Option<String>,
}

impl ProductFields {
    pub fn name(&self) -> &str { &self.name }
    pub fn price(&self) -> f64 { self.price }
    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
}

/// Messages per field, in rule order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn len(&self) -> usize { self.0.values().map(Vec::len).sum() }

    pub fn contains(&self, field: &str) -> bool { self.0.contains_key(field) }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(|m| m.first()).map(String::as_str)
    }

    /// First message of every field, the shape client views display.
    pub fn to_first_messages(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter_map(|(field, msgs)| msgs.first().map(|m| (field.clone(), m.clone())))
            .collect()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut all = self.0.values().flatten();
        match all.next() {
            None => write!(f, "no errors"),
            Some(first) => {
                let rest = self.len() - 1;
                match rest {
                    0 => write!(f, "{first}"),
                    1 => write!(f, "{first} (and 1 more error)"),
                    n => write!(f, "{first} (and {n} more errors)"),
                }
            }
        }
    }
}

/// Strings are trimmed and blank strings count as absent, like null.
fn present(v: Option<&Value>) -> Option<Value> {
    match v {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            let t = s.trim();
            if t.is_empty() { None } else { Some(Value::String(t.to_string())) }
        }
        Some(other) => Some(other.clone()),
    }
}

pub fn validate_name(v: Option<&Value>) -> Result<String, String> {
    let Some(v) = present(v) else { return Err("The name field is required.".into()); };
    let Value::String(s) = v else { return Err("The name field must be a string.".into()); };
    if s.chars().count() > NAME_MAX_CHARS {
        return Err(format!("The name field must not be greater than {NAME_MAX_CHARS} characters."));
    }
    Ok(s)
}

pub fn validate_price(v: Option<&Value>) -> Result<f64, String> {
    let Some(v) = present(v) else { return Err("The price field is required.".into()); };
    let parsed = match &v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric(s),
        _ => None,
    };
    let Some(price) = parsed.filter(|p| p.is_finite()) else {
        return Err("The price field must be a number.".into());
    };
    if price < 0.0 {
        return Err("The price field must be at least 0.".into());
    }
    // -0.0 is stored as 0
    Ok(if price == 0.0 { 0.0 } else { price })
}

/// Decimal or exponent notation only; `inf`/`nan` spellings are not numbers here.
fn parse_numeric(s: &str) -> Option<f64> {
    let ok = s.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && s.chars().any(|c| c.is_ascii_digit());
    if !ok { return None; }
    s.parse::<f64>().ok()
}

pub fn validate_description(v: Option<&Value>) -> Result<Option<String>, String> {
    match present(v) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err("The description field must be a string.".into()),
    }
}

/// Apply every field rule, collecting all failures.
pub fn validate(input: &ProductInput) -> Result<ProductFields, FieldErrors> {
    let mut errors = FieldErrors::default();
    let name = validate_name(input.name.as_ref()).map_err(|m| errors.add("name", m)).ok();
    let price = validate_price(input.price.as_ref()).map_err(|m| errors.add("price", m)).ok();
    let description = validate_description(input.description.as_ref()).map_err(|m| errors.add("description", m)).ok();
    match (name, price, description) {
        (Some(name), Some(price), Some(description)) => Ok(ProductFields { name, price, description }),
        _ => Err(errors),
    }
}

pub async fn create(db: &DatabaseConnection, owner_id: Uuid, fields: &ProductFields) -> Result<Model, errors::ModelError> {
    let now = Utc::now().into();
    let am = ActiveModel {
        user_id: Set(owner_id),
        name: Set(fields.name.clone()),
        price: Set(fields.price),
        description: Set(fields.description.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

/// Overwrite name, price and description; id, owner and created_at are kept.
pub async fn overwrite(db: &DatabaseConnection, existing: Model, fields: &ProductFields) -> Result<Model, errors::ModelError> {
    let mut am: ActiveModel = existing.into();
    am.name = Set(fields.name.clone());
    am.price = Set(fields.price);
    am.description = Set(fields.description.clone());
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Hard delete; returns true if a row was removed.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

/// One page of products with their owners, newest first, plus the total row count.
///
/// `page_index` is zero-based; an index past the end yields an empty page.
pub async fn latest_page(
    db: &DatabaseConnection,
    page_index: u64,
    per_page: u64,
) -> Result<(Vec<(Model, Option<user::Model>)>, u64), errors::ModelError> {
    let paginator = Entity::find()
        .find_also_related(user::Entity)
        .order_by_desc(Column::CreatedAt)
        .order_by_desc(Column::Id)
        .paginate(db, per_page);
    let total = paginator.num_items().await?;
    let rows = paginator.fetch_page(page_index).await?;
    Ok((rows, total))
}
