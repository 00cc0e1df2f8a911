use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "failed")]
    Failed,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payouts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "breeder_id")]
    pub breeder_id: i64,
    pub currency: String,
    #[sea_orm(column_name = "gross_amount")]
    pub gross_amount: i64,
    #[sea_orm(column_name = "commission_amount")]
    pub commission_amount: i64,
    #[sea_orm(column_name = "net_amount")]
    pub net_amount: i64,
    #[sea_orm(column_name = "commission_bps")]
    pub commission_bps: i32,
    pub status: PayoutStatus,
    #[sea_orm(column_name = "transfer_reference", unique)]
    pub transfer_reference: String,
    #[sea_orm(column_name = "transfer_code")]
    pub transfer_code: Option<String>,
    #[sea_orm(column_name = "failure_reason")]
    pub failure_reason: Option<String>,
    #[sea_orm(column_name = "created_by")]
    pub created_by: Option<i64>,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
    #[sea_orm(column_name = "processed_at")]
    pub processed_at: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
