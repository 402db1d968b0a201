use super::apply_coupon_command::publish;
use crate::{
    commands::Command,
    db::DbPool,
    errors::{CouponError, ServiceError},
    events::{Event, EventSender},
    services::coupons::{CouponCode, CouponService, TransferOutcome},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

/// Moves a coupon to another order, or only releases it when no order is
/// given. Unlike [`ApplyCouponCommand`](super::ApplyCouponCommand) no
/// validity checks run and no discount lines are written.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransferCouponCommand {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    #[validate(range(min = 1))]
    pub order_id: Option<i32>,
}

#[async_trait]
impl Command for TransferCouponCommand {
    type Result = TransferOutcome;

    #[instrument(skip(self, db_pool, event_sender))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()?;

        let service = CouponService::new(db_pool, Default::default());
        let code = CouponCode::parse(&self.code)?;
        let coupon = service
            .find_by_code(&code)
            .await?
            .ok_or(CouponError::NotFound)?;

        let destination = match self.order_id {
            Some(id) => Some(service.find_order(id).await?),
            None => None,
        };

        let outcome = service.transfer(&coupon, destination.as_ref()).await?;
        if !outcome.detached.is_empty() || outcome.attached_to.is_some() {
            publish(
                &event_sender,
                Event::CouponTransferred {
                    coupon_id: outcome.coupon.id,
                    from_orders: outcome.detached.clone(),
                    to_order: outcome.attached_to,
                },
            )
            .await?;
        }

        Ok(outcome)
    }
}
