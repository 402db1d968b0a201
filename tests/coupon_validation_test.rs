//! Validation of coupon codes against the store.

mod common;

use assert_matches::assert_matches;
use chrono::{Duration, TimeZone, Utc};
use common::TestDb;
use rental_coupons::{
    entities::{order::status, CouponStatus, CouponType},
    errors::{CouponError, ServiceError},
};
use sea_orm::Set;

const CODE: &str = "ABCT-123F-XYQV";

#[tokio::test]
async fn malformed_code_is_rejected_before_lookup() {
    let db = TestDb::new().await;
    let err = db.service().validate("ABCD-1234-XYZQ").await.unwrap_err();
    assert_matches!(err, ServiceError::Coupon(CouponError::InvalidFormat));
    assert_eq!(err.to_string(), "유효하지 않은 코드");
}

#[tokio::test]
async fn unknown_code_is_not_found() {
    let db = TestDb::new().await;
    let err = db.service().validate(CODE).await.unwrap_err();
    assert_matches!(err, ServiceError::Coupon(CouponError::NotFound));
}

#[tokio::test]
async fn lenient_input_finds_the_coupon() {
    let db = TestDb::new().await;
    let stored = db.coupon("K7RK-M2P1-9WT6", CouponType::Default, 5_000).await;

    let found = db.service().validate("k7rk m2pi 9wt6").await.unwrap();
    assert_eq!(found.id, stored.id);
    assert_eq!(found.status, CouponStatus::Unused);
}

#[tokio::test]
async fn spent_coupons_are_refused_without_changes() {
    let db = TestDb::new().await;
    for (code, spent) in [
        ("ABCT-123F-XYQV", CouponStatus::Used),
        ("K7RK-M2P1-9WT6", CouponStatus::Discarded),
        ("55QA-HN87-CJ3L", CouponStatus::Expired),
    ] {
        let coupon = db
            .coupon_with(code, CouponType::Default, 5_000, |c| c.status = Set(spent))
            .await;

        let err = db.service().validate(code).await.unwrap_err();
        assert_matches!(err, ServiceError::Coupon(CouponError::NotUsable(s)) if s == spent);
        assert_eq!(db.reload_coupon(coupon.id).await, coupon);
    }
}

#[tokio::test]
async fn past_expiry_marks_coupon_expired() {
    let db = TestDb::new().await;
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let coupon = db
        .coupon_with(CODE, CouponType::Rate, 10, |c| {
            c.expires_date = Set(Some(now - Duration::days(1)))
        })
        .await;

    let err = db.service().validate_at(CODE, now).await.unwrap_err();
    assert_matches!(err, ServiceError::Coupon(CouponError::Expired));
    assert_eq!(db.reload_coupon(coupon.id).await.status, CouponStatus::Expired);

    // The second attempt sees a spent coupon.
    let err = db.service().validate_at(CODE, now).await.unwrap_err();
    assert_matches!(
        err,
        ServiceError::Coupon(CouponError::NotUsable(CouponStatus::Expired))
    );
}

#[tokio::test]
async fn expiry_in_the_future_is_accepted() {
    let db = TestDb::new().await;
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    db.coupon_with(CODE, CouponType::Rate, 10, |c| {
        c.expires_date = Set(Some(now + Duration::hours(1)))
    })
    .await;

    let coupon = db.service().validate_at(CODE, now).await.unwrap();
    assert_eq!(coupon.status, CouponStatus::Unused);
}

#[tokio::test]
async fn ended_event_is_refused_without_changes() {
    let db = TestDb::new().await;
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
    let event = db.event("Spring Sale", Some(start), Some(end), false).await;
    let coupon = db
        .coupon_with(CODE, CouponType::Default, 10_000, |c| c.event_id = Set(Some(event.id)))
        .await;

    let err = db.service().validate_at(CODE, now).await.unwrap_err();
    assert_eq!(
        err.coupon_error(),
        Some(&CouponError::EventEnded {
            title: "Spring Sale".into(),
            start: "2024-03-01".into(),
            end: "2024-03-31".into(),
        })
    );
    assert_eq!(
        err.to_string(),
        "Spring Sale 이벤트가 종료되었습니다 (2024-03-01 ~ 2024-03-31)"
    );
    assert_eq!(db.reload_coupon(coupon.id).await, coupon);
}

#[tokio::test]
async fn expiry_is_checked_before_event_end() {
    let db = TestDb::new().await;
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let event = db
        .event("Closed", None, Some(now - Duration::days(3)), false)
        .await;
    db.coupon_with(CODE, CouponType::Default, 10_000, |c| {
        c.event_id = Set(Some(event.id));
        c.expires_date = Set(Some(now - Duration::days(1)));
    })
    .await;

    let err = db.service().validate_at(CODE, now).await.unwrap_err();
    assert_matches!(err, ServiceError::Coupon(CouponError::Expired));
}

#[tokio::test]
async fn reserved_coupon_is_released_from_its_order() {
    let db = TestDb::new().await;
    let user = db.user(None).await;
    let coupon = db
        .coupon_with(CODE, CouponType::Default, 10_000, |c| {
            c.status = Set(CouponStatus::Reserved)
        })
        .await;
    let holder = db
        .order_with(&user, false, status::RENTAL, |o| o.coupon_id = Set(Some(coupon.id)))
        .await;

    let validated = db.service().validate(CODE).await.unwrap();
    assert_eq!(validated.status, CouponStatus::Reserved);

    let holder = db.reload_order(holder.id).await;
    assert_eq!(holder.coupon_id, None);
    assert_eq!(
        holder.desc.as_deref(),
        Some("coupon ABCT-123F-XYQV released")
    );
}

#[tokio::test]
async fn provided_coupon_becomes_reserved() {
    let db = TestDb::new().await;
    db.coupon_with(CODE, CouponType::Default, 10_000, |c| {
        c.status = Set(CouponStatus::Provided)
    })
    .await;

    let validated = db.service().validate(CODE).await.unwrap();
    assert_eq!(validated.status, CouponStatus::Reserved);
}

#[tokio::test]
async fn blank_legacy_status_reads_as_unused() {
    let db = TestDb::new().await;
    let user = db.user(None).await;
    let coupon = db.legacy_coupon("55QA-HN87-CJ3L", "").await;
    assert_eq!(coupon.status, CouponStatus::Unused);

    let validated = db.service().validate("55QA-HN87-CJ3L").await.unwrap();
    assert_eq!(validated.id, coupon.id);
    assert_eq!(validated.status, CouponStatus::Unused);

    let order = db.order(&user, false, status::RENTAL).await;
    db.service().transfer(&validated, Some(&order)).await.unwrap();
    assert_eq!(db.stored_status(coupon.id).await, "reserved");
}

#[tokio::test]
async fn uppercase_legacy_status_is_not_usable() {
    let db = TestDb::new().await;
    let coupon = db.legacy_coupon("55QA-HN87-CJ3L", "USED").await;
    assert_eq!(coupon.status, CouponStatus::Used);

    let err = db.service().validate("55QA-HN87-CJ3L").await.unwrap_err();
    assert_matches!(
        err,
        ServiceError::Coupon(CouponError::NotUsable(CouponStatus::Used))
    );
    assert_eq!(db.stored_status(coupon.id).await, "USED");
}

#[tokio::test]
async fn loose_legacy_spent_status_blocks_discount() {
    let db = TestDb::new().await;
    let user = db.user(None).await;
    let coupon = db.legacy_coupon("55QA-HN87-CJ3L", "Discarded ").await;
    let order = db
        .order_with(&user, false, status::RENTAL, |o| o.coupon_id = Set(Some(coupon.id)))
        .await;

    assert!(!db.service().apply(order.id).await.unwrap());
    assert!(db.details(&order).await.is_empty());
}

#[tokio::test]
async fn release_reports_former_holders() {
    let db = TestDb::new().await;
    let user = db.user(None).await;
    let coupon = db
        .coupon_with(CODE, CouponType::Rate, 10, |c| c.status = Set(CouponStatus::Reserved))
        .await;
    let first = db
        .order_with(&user, false, status::RENTAL, |o| o.coupon_id = Set(Some(coupon.id)))
        .await;
    let second = db
        .order_with(&user, true, status::PAYMENT, |o| o.coupon_id = Set(Some(coupon.id)))
        .await;

    let validated = db.service().validate_with_release(CODE).await.unwrap();
    assert_eq!(validated.coupon.id, coupon.id);
    assert_eq!(validated.released_from, vec![first.id, second.id]);

    let again = db.service().validate_with_release(CODE).await.unwrap();
    assert!(again.released_from.is_empty());
}
