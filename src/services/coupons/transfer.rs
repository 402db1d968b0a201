use chrono::Utc;
use serde::Serialize;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, instrument, warn};

use super::audit::{AuditMemo, CouponMove};
use super::CouponService;
use crate::entities::{coupon, order, CouponStatus};
use crate::errors::ServiceError;

/// Result of a reassignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    /// The coupon as stored after the call.
    pub coupon: coupon::Model,
    /// Orders the coupon was taken away from, in id order.
    pub detached: Vec<i32>,
    /// Order now holding the coupon, if any.
    pub attached_to: Option<i32>,
}

impl TransferOutcome {
    fn unchanged(coupon: &coupon::Model) -> Self {
        Self {
            coupon: coupon.clone(),
            detached: Vec::new(),
            attached_to: None,
        }
    }
}

impl CouponService {
    /// Moves `coupon` off whatever orders hold it and onto `destination`.
    ///
    /// With no destination a reserved coupon is only released. Spent coupons
    /// are left alone. Detaching and attaching are separate writes; a failure
    /// in between leaves the coupon reserved with no owner.
    #[instrument(skip(self, coupon, destination), fields(coupon = %coupon.code, status = %coupon.status))]
    pub async fn transfer(
        &self,
        coupon: &coupon::Model,
        destination: Option<&order::Model>,
    ) -> Result<TransferOutcome, ServiceError> {
        match coupon.status {
            CouponStatus::Used | CouponStatus::Discarded | CouponStatus::Expired => {
                info!("Coupon {} is {}; nothing to transfer", coupon.code, coupon.status);
                Ok(TransferOutcome::unchanged(coupon))
            }
            CouponStatus::Reserved => self.reassign_reserved(coupon, destination).await,
            CouponStatus::Unused | CouponStatus::Provided => {
                let mut active: coupon::ActiveModel = coupon.clone().into();
                active.status = Set(CouponStatus::Reserved);
                active.update_date = Set(Utc::now());
                let reserved = active.update(&*self.db).await?;
                info!("Coupon {} reserved", reserved.code);

                let attached_to = match destination {
                    Some(dest) => Some(self.attach(&reserved, dest.id, None).await?),
                    None => None,
                };

                Ok(TransferOutcome {
                    coupon: reserved,
                    detached: Vec::new(),
                    attached_to,
                })
            }
        }
    }

    async fn reassign_reserved(
        &self,
        coupon: &coupon::Model,
        destination: Option<&order::Model>,
    ) -> Result<TransferOutcome, ServiceError> {
        let db = &*self.db;

        let holders = order::Entity::find()
            .filter(order::Column::CouponId.eq(coupon.id))
            .order_by_asc(order::Column::Id)
            .all(db)
            .await?;

        if holders.is_empty() {
            warn!("Reserved coupon {} is not held by any order", coupon.code);
        }

        let mut detached = Vec::with_capacity(holders.len());
        for holder in holders {
            let holder_id = holder.id;
            let entry = match destination {
                Some(dest) => CouponMove::MovedTo {
                    code: &coupon.code,
                    destination: dest.id,
                },
                None => CouponMove::Released { code: &coupon.code },
            };

            let mut memo = AuditMemo::from_stored(holder.desc.clone());
            memo.append(entry);

            let mut active: order::ActiveModel = holder.into();
            active.coupon_id = Set(None);
            active.desc = Set(memo.into_stored());
            active.update_date = Set(Utc::now());
            active.update(db).await?;

            info!("Coupon {} detached from order {}", coupon.code, holder_id);
            detached.push(holder_id);
        }

        let attached_to = match destination {
            Some(dest) => {
                let entry = if detached.is_empty() {
                    CouponMove::Attached { code: &coupon.code }
                } else {
                    CouponMove::TransferredFrom {
                        code: &coupon.code,
                        sources: &detached,
                    }
                };
                Some(self.attach(coupon, dest.id, Some(entry)).await?)
            }
            None => None,
        };

        Ok(TransferOutcome {
            coupon: coupon.clone(),
            detached,
            attached_to,
        })
    }

    /// Points order `order_id` at `coupon`, optionally recording `entry` in its
    /// memo. The order is re-read so memo lines written moments ago survive.
    async fn attach(
        &self,
        coupon: &coupon::Model,
        order_id: i32,
        entry: Option<CouponMove<'_>>,
    ) -> Result<i32, ServiceError> {
        let db = &*self.db;
        let order = self.find_order(order_id).await?;

        let memo = entry.map(|entry| {
            let mut memo = AuditMemo::from_stored(order.desc.clone());
            memo.append(entry);
            memo.into_stored()
        });

        let mut active: order::ActiveModel = order.into();
        active.coupon_id = Set(Some(coupon.id));
        if let Some(memo) = memo {
            active.desc = Set(memo);
        }
        active.update_date = Set(Utc::now());
        active.update(db).await?;

        info!("Coupon {} attached to order {}", coupon.code, order_id);
        Ok(order_id)
    }
}
