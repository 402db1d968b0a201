#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rental_coupons::{
    config::CouponConfig,
    db::{self, DbConfig, DbPool},
    entities::{
        clothes, coupon, event, order, order_detail, user, CouponStatus, CouponType, Gender,
    },
    events::{Event, EventSender},
    services::coupons::CouponService,
};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseBackend, EntityTrait, Set, Statement, Value,
};
use tokio::sync::mpsc;

/// Fresh in-memory store with the schema applied, plus seeding helpers.
pub struct TestDb {
    pub db: Arc<DbPool>,
}

impl TestDb {
    pub async fn new() -> Self {
        let pool = db::establish_connection_with_config(&DbConfig::in_memory())
            .await
            .expect("failed to open in-memory database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        Self { db: Arc::new(pool) }
    }

    pub fn service(&self) -> CouponService {
        CouponService::new(self.db.clone(), CouponConfig::default())
    }

    pub async fn user(&self, gender: Option<Gender>) -> user::Model {
        user::ActiveModel {
            name: Set("Test Renter".to_string()),
            email: Set(Some("renter@example.com".to_string())),
            gender: Set(gender),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("insert user")
    }

    pub async fn event(
        &self,
        title: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        free_shipping: bool,
    ) -> event::Model {
        event::ActiveModel {
            name: Set(title.to_lowercase().replace(' ', "-")),
            title: Set(title.to_string()),
            desc: Set(None),
            start_date: Set(start),
            end_date: Set(end),
            free_shipping: Set(free_shipping),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("insert event")
    }

    pub async fn coupon(&self, code: &str, kind: CouponType, price: i64) -> coupon::Model {
        self.coupon_with(code, kind, price, |_| {}).await
    }

    /// Inserts an unused coupon after letting `tweak` adjust it.
    pub async fn coupon_with(
        &self,
        code: &str,
        kind: CouponType,
        price: i64,
        tweak: impl FnOnce(&mut coupon::ActiveModel),
    ) -> coupon::Model {
        let now = Utc::now();
        let mut active = coupon::ActiveModel {
            code: Set(code.to_string()),
            status: Set(CouponStatus::Unused),
            kind: Set(kind),
            price: Set(price),
            free_shipping: Set(false),
            desc: Set(None),
            event_id: Set(None),
            expires_date: Set(None),
            create_date: Set(now),
            update_date: Set(now),
            ..Default::default()
        };
        tweak(&mut active);
        active.insert(&*self.db).await.expect("insert coupon")
    }

    /// Inserts a flat coupon with `status` written verbatim, the way older
    /// tooling stored it.
    pub async fn legacy_coupon(&self, code: &str, status: &str) -> coupon::Model {
        let now = Utc::now();
        let result = self
            .db
            .execute(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                "INSERT INTO coupons (code, status, type, price, free_shipping, create_date, update_date) \
                 VALUES (?, ?, 'default', 5000, 0, ?, ?)",
                [
                    Value::from(code),
                    Value::from(status),
                    Value::from(now),
                    Value::from(now),
                ],
            ))
            .await
            .expect("insert legacy coupon");
        self.reload_coupon(result.last_insert_id() as i32).await
    }

    /// The status column exactly as stored.
    pub async fn stored_status(&self, coupon_id: i32) -> String {
        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                "SELECT status FROM coupons WHERE id = ?",
                [Value::from(coupon_id)],
            ))
            .await
            .expect("query status")
            .expect("coupon exists");
        row.try_get("", "status").expect("status column")
    }

    pub async fn clothes(&self, code: &str, category: &str, price: i64) -> clothes::Model {
        clothes::ActiveModel {
            code: Set(code.to_string()),
            category: Set(category.to_string()),
            price: Set(price),
        }
        .insert(&*self.db)
        .await
        .expect("insert clothes")
    }

    pub async fn order(&self, user: &user::Model, online: bool, status_id: i32) -> order::Model {
        self.order_with(user, online, status_id, |_| {}).await
    }

    pub async fn order_with(
        &self,
        user: &user::Model,
        online: bool,
        status_id: i32,
        tweak: impl FnOnce(&mut order::ActiveModel),
    ) -> order::Model {
        let now = Utc::now();
        let mut active = order::ActiveModel {
            user_id: Set(user.id),
            coupon_id: Set(None),
            status_id: Set(status_id),
            online: Set(online),
            additional_day: Set(0),
            desc: Set(None),
            create_date: Set(now),
            update_date: Set(now),
            ..Default::default()
        };
        tweak(&mut active);
        active.insert(&*self.db).await.expect("insert order")
    }

    pub async fn detail(
        &self,
        order: &order::Model,
        clothes_code: Option<&str>,
        name: &str,
        price: i64,
        final_price: i64,
        desc: Option<&str>,
    ) -> order_detail::Model {
        order_detail::ActiveModel {
            order_id: Set(order.id),
            clothes_code: Set(clothes_code.map(str::to_string)),
            name: Set(name.to_string()),
            price: Set(price),
            final_price: Set(final_price),
            desc: Set(desc.map(str::to_string)),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("insert order detail")
    }

    pub async fn reload_coupon(&self, id: i32) -> coupon::Model {
        coupon::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .expect("query coupon")
            .expect("coupon exists")
    }

    pub async fn reload_order(&self, id: i32) -> order::Model {
        order::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .expect("query order")
            .expect("order exists")
    }

    pub async fn details(&self, order: &order::Model) -> Vec<order_detail::Model> {
        self.service()
            .order_details(order)
            .await
            .expect("query order details")
    }
}

/// Event sender whose receiving end the test keeps for inspection.
pub fn event_channel() -> (Arc<EventSender>, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(32);
    (Arc::new(EventSender::new(tx)), rx)
}

pub fn drain(rx: &mut mpsc::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
