use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Tag carried by discount lines generated on top of the rental lines.
pub const ADDITIONAL: &str = "additional";

/// A single line of an order: a garment, a category placeholder or a discount.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub order_id: i32,
    pub clothes_code: Option<String>,
    pub name: String,
    pub price: i64,
    pub final_price: i64,
    pub desc: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::clothes::Entity",
        from = "Column::ClothesCode",
        to = "super::clothes::Column::Code"
    )]
    Clothes,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::clothes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Clothes.def()
    }
}

impl Model {
    /// Category placeholders use lowercase names (`jacket`, `pants`, ...);
    /// everything else is labelled for humans.
    pub fn is_category_line(&self) -> bool {
        self.name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase())
    }

    pub fn is_clothes_line(&self) -> bool {
        self.clothes_code.is_some()
    }
}

impl ActiveModelBehavior for ActiveModel {}
