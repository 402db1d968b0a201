mod apply_coupon_command;
mod transfer_coupon_command;

pub use apply_coupon_command::{AppliedCoupon, ApplyCouponCommand};
pub use transfer_coupon_command::TransferCouponCommand;
