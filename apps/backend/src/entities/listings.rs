use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    #[sea_orm(string_value = "litter")]
    Litter,
    #[sea_orm(string_value = "individual")]
    Individual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "reserved")]
    Reserved,
    #[sea_orm(string_value = "sold")]
    Sold,
    #[sea_orm(string_value = "archived")]
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum PetSex {
    #[sea_orm(string_value = "male")]
    Male,
    #[sea_orm(string_value = "female")]
    Female,
    #[sea_orm(string_value = "mixed")]
    Mixed,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "breeder_id")]
    pub breeder_id: i64,
    #[sea_orm(column_name = "breed_id")]
    pub breed_id: i64,
    pub kind: ListingKind,
    pub title: String,
    pub description: Option<String>,
    pub sex: Option<PetSex>,
    pub location: Option<String>,
    /// Minor units
    pub price: i64,
    #[sea_orm(column_name = "reservation_fee")]
    pub reservation_fee: i64,
    pub currency: String,
    #[sea_orm(column_name = "total_count")]
    pub total_count: i32,
    #[sea_orm(column_name = "available_count")]
    pub available_count: i32,
    pub status: ListingStatus,
    #[sea_orm(column_name = "available_from")]
    pub available_from: Option<OffsetDateTime>,
    #[sea_orm(column_name = "published_at")]
    pub published_at: Option<OffsetDateTime>,
    #[sea_orm(column_name = "lock_version")]
    pub lock_version: i32,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::BreederId",
        to = "super::users::Column::Id"
    )]
    Breeder,
    #[sea_orm(
        belongs_to = "super::breeds::Entity",
        from = "Column::BreedId",
        to = "super::breeds::Column::Id"
    )]
    Breed,
    #[sea_orm(has_many = "super::applications::Entity")]
    Applications,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Breeder.def()
    }
}

impl Related<super::breeds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Breed.def()
    }
}

impl Related<super::applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
