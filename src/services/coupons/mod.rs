//! Coupon handling for rental orders: validate a code, move the coupon onto
//! the order, then turn it into discount lines.

use sea_orm::{DatabaseConnection, EntityTrait, ModelTrait, QueryOrder};
use std::sync::Arc;

use crate::config::CouponConfig;
use crate::entities::{order, order_detail};
use crate::errors::ServiceError;

pub mod audit;
pub mod code;
pub mod discount;
mod transfer;
mod validator;

pub use audit::{AuditMemo, CouponMove};
pub use code::CouponCode;
pub use discount::{discount_base, discount_lines, extended_price, DiscountLine};
pub use transfer::TransferOutcome;
pub use validator::ValidatedCoupon;

#[derive(Clone)]
pub struct CouponService {
    db: Arc<DatabaseConnection>,
    config: CouponConfig,
}

impl CouponService {
    pub fn new(db: Arc<DatabaseConnection>, config: CouponConfig) -> Self {
        Self { db, config }
    }

    pub fn config(&self) -> &CouponConfig {
        &self.config
    }

    pub async fn find_order(&self, order_id: i32) -> Result<order::Model, ServiceError> {
        order::Entity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }

    /// Lines of `order`, oldest first.
    pub async fn order_details(
        &self,
        order: &order::Model,
    ) -> Result<Vec<order_detail::Model>, ServiceError> {
        let details = order
            .find_related(order_detail::Entity)
            .order_by_asc(order_detail::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(details)
    }
}
