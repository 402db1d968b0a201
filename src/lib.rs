//! Rental Coupons Library
//!
//! Coupon codes for a clothing-rental service: checking a code, moving the
//! coupon between orders, and turning it into discount lines on an order.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod commands;
pub mod common;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod migrator;
pub mod services;

pub use errors::{CouponError, ServiceError};
pub use services::coupons::{CouponCode, CouponService};
