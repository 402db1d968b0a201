use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, Set};
use tracing::{debug, info, instrument, warn};

use super::CouponService;
use crate::common::{commify, round_won};
use crate::config::CouponConfig;
use crate::entities::order::status;
use crate::entities::order_detail::ADDITIONAL;
use crate::entities::{clothes, coupon, event, order, order_detail, user, CouponType, Gender};
use crate::errors::ServiceError;

/// Any line whose name contains this already is a coupon discount.
pub const COUPON_MARKER: &str = "coupon";
/// Automatic loyalty discount on online orders; it never stacks with a coupon.
pub const LOYALTY_DISCOUNT_NAME: &str = "3+ rental discount";
/// Prefix of the tag counter staff put on lines discounted for loyalty.
pub const LOYALTY_TAG: &str = "3+ rental";
pub const FREE_SHIPPING_NAME: &str = "free shipping coupon";
pub const SUIT_DISCOUNT_NAME: &str = "single-item discount coupon";

/// A discount line to append to an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountLine {
    pub name: String,
    pub price: i64,
    pub final_price: i64,
    pub desc: Option<String>,
}

/// Sums of `(price, final_price)` over the lines a percentage or single-item
/// coupon applies to.
pub fn discount_base(order: &order::Model, details: &[order_detail::Model]) -> (i64, i64) {
    let categories_only = order.online && status::is_early_stage(order.status_id);
    details
        .iter()
        .filter(|detail| {
            if categories_only {
                detail.is_category_line()
            } else {
                detail.is_clothes_line()
            }
        })
        .fold((0, 0), |(price, final_price), detail| {
            (price + detail.price, final_price + detail.final_price)
        })
}

/// Base price grown by the late-fee rate for each extension day.
pub fn extended_price(base_price: i64, additional_day: i32, extension_rate: Decimal) -> i64 {
    let factor = Decimal::ONE + extension_rate * Decimal::from(additional_day);
    round_won(Decimal::from(base_price) * factor)
}

fn percent_of(amount: i64, rate: i64) -> i64 {
    round_won(Decimal::from(amount) * Decimal::from(rate) / Decimal::ONE_HUNDRED)
}

/// Lines produced by `coupon` for `order`, given its remaining `details`.
pub fn discount_lines(
    coupon: &coupon::Model,
    event_free_shipping: bool,
    order: &order::Model,
    details: &[order_detail::Model],
    gender: Option<Gender>,
    config: &CouponConfig,
) -> Vec<DiscountLine> {
    let online_tag = order.online.then(|| ADDITIONAL.to_string());
    let mut lines = Vec::with_capacity(2);

    match coupon.kind {
        CouponType::Default => lines.push(DiscountLine {
            name: format!("{} won discount coupon", commify(coupon.price)),
            price: -coupon.price,
            final_price: -coupon.price,
            desc: None,
        }),
        CouponType::Rate => {
            let (price_sum, final_price_sum) = discount_base(order, details);
            lines.push(DiscountLine {
                name: format!("{}% discount coupon", coupon.price),
                price: -percent_of(price_sum, coupon.price),
                final_price: -percent_of(final_price_sum, coupon.price),
                desc: online_tag.clone(),
            });
        }
        CouponType::Suit => {
            let (mut price_sum, mut final_price_sum) = discount_base(order, details);
            let cap = config.suit_cap(coupon.price, gender);
            if price_sum > cap {
                price_sum = cap;
                final_price_sum = cap;
            }
            lines.push(DiscountLine {
                name: SUIT_DISCOUNT_NAME.to_string(),
                price: -price_sum,
                final_price: -final_price_sum,
                desc: online_tag.clone(),
            });
        }
    }

    if order.online && (coupon.free_shipping || event_free_shipping) {
        lines.push(DiscountLine {
            name: FREE_SHIPPING_NAME.to_string(),
            price: -config.shipping_fee,
            final_price: -config.shipping_fee,
            desc: Some(ADDITIONAL.to_string()),
        });
    }

    lines
}

fn is_online_loyalty_discount(detail: &order_detail::Model) -> bool {
    detail.name == LOYALTY_DISCOUNT_NAME && detail.desc.as_deref() == Some(ADDITIONAL)
}

fn has_loyalty_tag(detail: &order_detail::Model) -> bool {
    detail
        .desc
        .as_deref()
        .is_some_and(|desc| desc.starts_with(LOYALTY_TAG))
}

impl CouponService {
    /// Turns the coupon held by order `order_id` into discount lines.
    ///
    /// Returns `Ok(false)` without touching the order when it holds no coupon,
    /// the coupon is spent, or a coupon line is already present, so repeated
    /// calls add the discount once.
    #[instrument(skip(self))]
    pub async fn apply(&self, order_id: i32) -> Result<bool, ServiceError> {
        let db = &*self.db;

        let order = self.find_order(order_id).await?;

        let Some(coupon) = order.find_related(coupon::Entity).one(db).await? else {
            debug!("Order {} holds no coupon", order.id);
            return Ok(false);
        };

        if coupon.status.is_spent() {
            info!("Coupon {} on order {} is {}", coupon.code, order.id, coupon.status);
            return Ok(false);
        }

        let details = self.order_details(&order).await?;

        if details.iter().any(|d| d.name.contains(COUPON_MARKER)) {
            debug!("Order {} already carries a coupon discount", order.id);
            return Ok(false);
        }

        let mut remaining = Vec::with_capacity(details.len());
        for detail in details {
            if is_online_loyalty_discount(&detail) {
                info!("Removing loyalty discount line {} from order {}", detail.id, order.id);
                detail.delete(db).await?;
            } else if has_loyalty_tag(&detail) {
                remaining.push(self.restore_loyalty_line(&order, detail).await?);
            } else {
                remaining.push(detail);
            }
        }

        let gender = match coupon.kind {
            CouponType::Suit => order
                .find_related(user::Entity)
                .one(db)
                .await?
                .and_then(|u| u.gender),
            _ => None,
        };

        let event_free_shipping = coupon
            .find_related(event::Entity)
            .one(db)
            .await?
            .is_some_and(|e| e.free_shipping);

        let lines = discount_lines(
            &coupon,
            event_free_shipping,
            &order,
            &remaining,
            gender,
            &self.config,
        );

        for line in lines {
            info!(
                order_id = order.id,
                coupon = %coupon.code,
                price = line.price,
                final_price = line.final_price,
                "Adding discount line {}",
                line.name
            );
            order_detail::ActiveModel {
                order_id: Set(order.id),
                clothes_code: Set(None),
                name: Set(line.name),
                price: Set(line.price),
                final_price: Set(line.final_price),
                desc: Set(line.desc),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }

        Ok(true)
    }

    /// Puts a loyalty-discounted counter line back to its garment's price
    /// including extension days, and drops the tag. A line without a known
    /// garment keeps its price.
    async fn restore_loyalty_line(
        &self,
        order: &order::Model,
        detail: order_detail::Model,
    ) -> Result<order_detail::Model, ServiceError> {
        let clothes = match &detail.clothes_code {
            Some(code) => clothes::Entity::find_by_id(code.clone())
                .one(&*self.db)
                .await?,
            None => None,
        };
        let Some(clothes) = clothes else {
            warn!(
                "Loyalty line {} on order {} has no garment to price from; dropping tag only",
                detail.id, order.id
            );
            let mut active: order_detail::ActiveModel = detail.into();
            active.desc = Set(None);
            return Ok(active.update(&*self.db).await?);
        };

        let price = extended_price(clothes.price, order.additional_day, self.config.extension_rate);
        let mut active: order_detail::ActiveModel = detail.into();
        active.price = Set(price);
        active.final_price = Set(price);
        active.desc = Set(None);
        let restored = active.update(&*self.db).await?;
        debug!("Restored line {} to {}", restored.id, price);
        Ok(restored)
    }
}
