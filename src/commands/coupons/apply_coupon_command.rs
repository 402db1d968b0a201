use crate::{
    commands::Command,
    config::CouponConfig,
    db::DbPool,
    entities::{coupon, order_detail},
    errors::{CouponError, ResultExt, ServiceError},
    events::{Event, EventSender},
    services::coupons::{CouponService, TransferOutcome, ValidatedCoupon},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use validator::Validate;

/// Validates a coupon code, moves the coupon onto an order and adds the
/// matching discount lines.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApplyCouponCommand {
    #[validate(range(min = 1))]
    pub order_id: i32,
    #[validate(length(min = 1, max = 64))]
    pub code: String,
    #[serde(skip)]
    pub config: CouponConfig,
}

/// The coupon as stored after the command, and the order lines it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedCoupon {
    pub coupon: coupon::Model,
    /// False when the order already carried this coupon's discount.
    pub applied: bool,
    pub details: Vec<order_detail::Model>,
}

impl ApplyCouponCommand {
    pub fn new(order_id: i32, code: impl Into<String>) -> Self {
        Self {
            order_id,
            code: code.into(),
            config: CouponConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CouponConfig) -> Self {
        self.config = config;
        self
    }
}

#[async_trait]
impl Command for ApplyCouponCommand {
    type Result = AppliedCoupon;

    #[instrument(skip(self, db_pool, event_sender), fields(order_id = self.order_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate().map_err_to_service()?;

        let service = CouponService::new(db_pool, self.config.clone());
        let order = service.find_order(self.order_id).await?;

        let ValidatedCoupon {
            coupon,
            released_from,
        } = match service.validate_with_release(&self.code).await {
            Ok(validated) => validated,
            Err(ServiceError::Coupon(CouponError::Expired)) => {
                publish(
                    &event_sender,
                    Event::CouponExpired {
                        code: self.code.clone(),
                    },
                )
                .await?;
                return Err(CouponError::Expired.into());
            }
            Err(e) => return Err(e),
        };

        let TransferOutcome {
            coupon,
            detached,
            attached_to,
        } = service.transfer(&coupon, Some(&order)).await?;

        let mut from_orders = released_from;
        from_orders.extend(detached);
        from_orders.sort_unstable();
        from_orders.dedup();
        publish(
            &event_sender,
            Event::CouponTransferred {
                coupon_id: coupon.id,
                from_orders,
                to_order: attached_to,
            },
        )
        .await?;

        let applied = service.apply(order.id).await?;
        if applied {
            info!("Coupon {} applied to order {}", coupon.code, order.id);
            publish(
                &event_sender,
                Event::CouponApplied {
                    coupon_id: coupon.id,
                    order_id: order.id,
                },
            )
            .await?;
        }

        let details = service.order_details(&order).await?;

        Ok(AppliedCoupon {
            coupon,
            applied,
            details,
        })
    }
}

pub(super) async fn publish(event_sender: &EventSender, event: Event) -> Result<(), ServiceError> {
    event_sender.send(event).await.map_err(|e| {
        error!("Failed to publish coupon event: {}", e);
        ServiceError::EventError(e)
    })
}
