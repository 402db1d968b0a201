// Coupon validation, reassignment and discount application
pub mod coupons;
