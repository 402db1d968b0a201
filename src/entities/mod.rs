pub mod clothes;
pub mod coupon;
pub mod event;
pub mod order;
pub mod order_detail;
pub mod user;

pub use coupon::{CouponStatus, CouponType};
pub use user::Gender;

pub use clothes::{Entity as Clothes, Model as ClothesModel};
pub use coupon::{Entity as Coupon, Model as CouponModel};
pub use event::{Entity as Event, Model as EventModel};
pub use order::{Entity as Order, Model as OrderModel};
pub use order_detail::{Entity as OrderDetail, Model as OrderDetailModel};
pub use user::{Entity as User, Model as UserModel};
