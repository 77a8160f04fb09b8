use sea_orm::{entity::prelude::*, sea_query::OnConflict, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Product,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Product => Entity::has_many(crate::product::Entity).into() }
    }
}

impl Related<crate::product::Entity> for Entity {
    fn to() -> RelationDef { Relation::Product.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    if !email.contains('@') { return Err(errors::ModelError::Validation("invalid email".into())); }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    Ok(())
}

/// Insert the user, or refresh email/name when the identity provider reports new values.
///
/// A single `INSERT .. ON CONFLICT (id) DO UPDATE`, so concurrent first
/// writes by the same identity both succeed.
pub async fn upsert(db: &DatabaseConnection, id: Uuid, email: &str, name: &str) -> Result<Model, errors::ModelError> {
    validate_email(email)?;
    validate_name(name)?;
    if let Some(existing) = Entity::find_by_id(id).one(db).await? {
        if existing.email == email && existing.name == name {
            return Ok(existing);
        }
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(id),
        email: Set(email.to_string()),
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Entity::insert(am)
        .on_conflict(
            OnConflict::column(Column::Id)
                .update_columns([Column::Email, Column::Name, Column::UpdatedAt])
                .to_owned(),
        )
        .exec(db)
        .await?;
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| errors::ModelError::Db(format!("user {id} missing after upsert")))
}
