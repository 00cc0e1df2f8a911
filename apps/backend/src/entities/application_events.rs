use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::applications::ApplicationStatus;

/// Who performed a transition. `System` is the payment flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    #[sea_orm(string_value = "seeker")]
    Seeker,
    #[sea_orm(string_value = "breeder")]
    Breeder,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "system")]
    System,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "application_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "application_id")]
    pub application_id: i64,
    /// `None` for the submission event
    #[sea_orm(column_name = "from_status")]
    pub from_status: Option<ApplicationStatus>,
    #[sea_orm(column_name = "to_status")]
    pub to_status: ApplicationStatus,
    #[sea_orm(column_name = "actor_id")]
    pub actor_id: Option<i64>,
    #[sea_orm(column_name = "actor_role")]
    pub actor_role: ActorRole,
    pub note: Option<String>,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::applications::Entity",
        from = "Column::ApplicationId",
        to = "super::applications::Column::Id"
    )]
    Application,
}

impl Related<super::applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
