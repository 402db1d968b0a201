use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, Set};
use tracing::{debug, info, instrument};

use super::code::CouponCode;
use super::CouponService;
use crate::common::format_date;
use crate::entities::{coupon, event, CouponStatus};
use crate::errors::{CouponError, ServiceError};

/// A coupon that passed validation, with the orders it was released from on
/// the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCoupon {
    pub coupon: coupon::Model,
    /// Holders the coupon was detached from, in id order.
    pub released_from: Vec<i32>,
}

impl CouponService {
    /// Checks that `raw` names a coupon that can be applied right now.
    ///
    /// Not read-only: a coupon already handed out or held by an order is
    /// released from its orders, and a coupon past its own expiry is marked
    /// expired before the refusal is returned.
    pub async fn validate(&self, raw: &str) -> Result<coupon::Model, ServiceError> {
        self.validate_at(raw, Utc::now()).await
    }

    /// [`validate`](Self::validate) against an explicit clock reading.
    pub async fn validate_at(
        &self,
        raw: &str,
        now: DateTime<Utc>,
    ) -> Result<coupon::Model, ServiceError> {
        Ok(self.validate_with_release_at(raw, now).await?.coupon)
    }

    /// [`validate`](Self::validate), also reporting which orders lost the
    /// coupon.
    pub async fn validate_with_release(&self, raw: &str) -> Result<ValidatedCoupon, ServiceError> {
        self.validate_with_release_at(raw, Utc::now()).await
    }

    #[instrument(skip(self, now))]
    pub async fn validate_with_release_at(
        &self,
        raw: &str,
        now: DateTime<Utc>,
    ) -> Result<ValidatedCoupon, ServiceError> {
        let code = CouponCode::parse(raw).map_err(|e| {
            debug!("Rejected malformed coupon code");
            e
        })?;

        let mut coupon = self
            .find_by_code(&code)
            .await?
            .ok_or(CouponError::NotFound)?;

        if coupon.status.is_spent() {
            info!("Coupon {} is not usable: {}", coupon.code, coupon.status);
            return Err(CouponError::NotUsable(coupon.status).into());
        }

        let mut released_from = Vec::new();
        if coupon.status.is_assigned() {
            let outcome = self.transfer(&coupon, None).await?;
            coupon = outcome.coupon;
            released_from = outcome.detached;
        }

        if coupon.is_expired_at(now) {
            let code = coupon.code.clone();
            let mut active: coupon::ActiveModel = coupon.into();
            active.status = Set(CouponStatus::Expired);
            active.update_date = Set(now);
            active.update(&*self.db).await?;
            info!("Coupon {} expired", code);
            return Err(CouponError::Expired.into());
        }

        if let Some(event) = coupon.find_related(event::Entity).one(&*self.db).await? {
            if event.has_ended_at(now) {
                info!("Event {} for coupon {} has ended", event.name, coupon.code);
                return Err(CouponError::EventEnded {
                    title: event.title,
                    start: format_date(event.start_date),
                    end: format_date(event.end_date),
                }
                .into());
            }
        }

        Ok(ValidatedCoupon {
            coupon,
            released_from,
        })
    }

    pub async fn find_by_code(
        &self,
        code: &CouponCode,
    ) -> Result<Option<coupon::Model>, ServiceError> {
        let coupon = coupon::Entity::find()
            .filter(coupon::Column::Code.eq(code.as_str()))
            .one(&*self.db)
            .await?;
        Ok(coupon)
    }
}
