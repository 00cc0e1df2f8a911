use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    #[sea_orm(string_value = "reservation_fee")]
    ReservationFee,
    #[sea_orm(string_value = "final_payment")]
    FinalPayment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "success")]
    Success,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "abandoned")]
    Abandoned,
    /// Money received for an application that could no longer use it;
    /// never paid out to the breeder.
    #[sea_orm(string_value = "refund_due")]
    RefundDue,
}

impl TransactionStatus {
    pub fn is_final(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "application_id")]
    pub application_id: i64,
    #[sea_orm(column_name = "payer_id")]
    pub payer_id: i64,
    #[sea_orm(column_name = "breeder_id")]
    pub breeder_id: i64,
    pub kind: TransactionKind,
    /// Minor units
    pub amount: i64,
    pub currency: String,
    #[sea_orm(unique)]
    pub reference: String,
    pub status: TransactionStatus,
    #[sea_orm(column_name = "authorization_url")]
    pub authorization_url: Option<String>,
    /// Last raw status string reported by the gateway
    #[sea_orm(column_name = "gateway_status")]
    pub gateway_status: Option<String>,
    #[sea_orm(column_name = "failure_reason")]
    pub failure_reason: Option<String>,
    #[sea_orm(column_name = "verify_attempts")]
    pub verify_attempts: i32,
    #[sea_orm(column_name = "paid_at")]
    pub paid_at: Option<OffsetDateTime>,
    #[sea_orm(column_name = "payout_id")]
    pub payout_id: Option<i64>,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::applications::Entity",
        from = "Column::ApplicationId",
        to = "super::applications::Column::Id"
    )]
    Application,
    #[sea_orm(
        belongs_to = "super::payouts::Entity",
        from = "Column::PayoutId",
        to = "super::payouts::Column::Id"
    )]
    Payout,
}

impl Related<super::applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

impl Related<super::payouts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payout.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
