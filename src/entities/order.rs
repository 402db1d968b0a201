use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Workflow status ids shared with the rest of the rental system.
pub mod status {
    pub const RENTAL: i32 = 2;
    pub const RETURNED: i32 = 9;
    pub const PAYMENT: i32 = 19;
    pub const CHOOSE_CLOTHES: i32 = 44;
    pub const CHOOSE_ADDRESS: i32 = 45;
    pub const PAYMENT_DONE: i32 = 46;
    pub const WAITING_DEPOSIT: i32 = 47;
    pub const PAYBACK: i32 = 48;
    pub const SHIPPED: i32 = 49;
    pub const DELIVERED: i32 = 50;

    /// States in which an online order has no garments assigned yet and its
    /// lines are still category placeholders.
    pub const EARLY_STAGE: [i32; 6] = [
        CHOOSE_CLOTHES,
        CHOOSE_ADDRESS,
        PAYMENT,
        PAYMENT_DONE,
        WAITING_DEPOSIT,
        PAYBACK,
    ];

    pub fn is_early_stage(status_id: i32) -> bool {
        EARLY_STAGE.contains(&status_id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub coupon_id: Option<i32>,
    pub status_id: i32,
    /// Placed through the web shop rather than at the counter.
    pub online: bool,
    /// Rental extension in days.
    pub additional_day: i32,
    /// Free-text staff memo; coupon moves are appended here.
    pub desc: Option<String>,
    pub create_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::coupon::Entity",
        from = "Column::CouponId",
        to = "super::coupon::Column::Id"
    )]
    Coupon,
    #[sea_orm(has_many = "super::order_detail::Entity")]
    OrderDetails,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::coupon::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Coupon.def()
    }
}

impl Related<super::order_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
