use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{ArrayType, Nullable, StringLen, ValueType, ValueTypeErr};
use sea_orm::{ColIdx, ColumnType, DbErr, QueryResult, TryGetError, TryGetable, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a coupon. Once spent (`Used`, `Discarded`, `Expired`) a coupon
/// is never attached to an order again.
///
/// Stored as text. Reads go through the lenient [`FromStr`] so rows written by
/// older tooling load; writes always use the lowercase name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponStatus {
    Unused,
    Reserved,
    Provided,
    Used,
    Discarded,
    Expired,
}

impl CouponStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unused => "unused",
            Self::Reserved => "reserved",
            Self::Provided => "provided",
            Self::Used => "used",
            Self::Discarded => "discarded",
            Self::Expired => "expired",
        }
    }

    /// Consumed, thrown away or timed out.
    pub fn is_spent(&self) -> bool {
        matches!(self, Self::Used | Self::Discarded | Self::Expired)
    }

    /// Handed out to a customer or held by an order.
    pub fn is_assigned(&self) -> bool {
        matches!(self, Self::Reserved | Self::Provided)
    }
}

impl fmt::Display for CouponStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored status string cannot be classified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised coupon status: {0:?}")]
pub struct ParseCouponStatusError(pub String);

/// Parses status text written by older tooling, where an empty value means
/// the coupon is still available and spent states were matched loosely
/// ("USED", "discard", "expiration" ...).
impl FromStr for CouponStatus {
    type Err = ParseCouponStatusError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let lower = raw.trim().to_ascii_lowercase();
        if lower.is_empty() || lower == "unused" {
            return Ok(Self::Unused);
        }

        let status = if lower.contains("reserv") {
            Self::Reserved
        } else if lower.contains("provid") {
            Self::Provided
        } else if lower.contains("used") {
            Self::Used
        } else if lower.contains("discard") {
            Self::Discarded
        } else if lower.contains("expir") {
            Self::Expired
        } else {
            return Err(ParseCouponStatusError(raw.to_string()));
        };
        Ok(status)
    }
}

impl From<CouponStatus> for Value {
    fn from(status: CouponStatus) -> Self {
        Value::String(Some(Box::new(status.as_str().to_owned())))
    }
}

impl TryGetable for CouponStatus {
    fn try_get_by<I: ColIdx>(res: &QueryResult, index: I) -> Result<Self, TryGetError> {
        let raw = <Option<String> as TryGetable>::try_get_by(res, index)?;
        raw.as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|e: ParseCouponStatusError| TryGetError::DbErr(DbErr::Type(e.to_string())))
    }
}

impl ValueType for CouponStatus {
    fn try_from(v: Value) -> Result<Self, ValueTypeErr> {
        match v {
            Value::String(Some(raw)) => raw.parse().map_err(|_| ValueTypeErr),
            Value::String(None) => Ok(Self::Unused),
            _ => Err(ValueTypeErr),
        }
    }

    fn type_name() -> String {
        "CouponStatus".to_owned()
    }

    fn array_type() -> ArrayType {
        ArrayType::String
    }

    fn column_type() -> ColumnType {
        ColumnType::String(StringLen::N(16))
    }
}

impl Nullable for CouponStatus {
    fn null() -> Value {
        Value::String(None)
    }
}

/// How `price` is interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum CouponType {
    /// Flat amount off the order.
    #[sea_orm(string_value = "default")]
    Default,
    /// Percentage off the clothing lines.
    #[sea_orm(string_value = "rate")]
    Rate,
    /// Clothing lines discounted up to a cap.
    #[sea_orm(string_value = "suit")]
    Suit,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(column_type = "String(StringLen::N(16))")]
    pub status: CouponStatus,
    #[sea_orm(column_name = "type")]
    pub kind: CouponType,
    pub price: i64,
    pub free_shipping: bool,
    pub desc: Option<String>,
    pub event_id: Option<i32>,
    pub expires_date: Option<DateTime<Utc>>,
    pub create_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id"
    )]
    Event,
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Model {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_date.is_some_and(|expires| expires < now)
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", CouponStatus::Unused)]
    #[case("  ", CouponStatus::Unused)]
    #[case("unused", CouponStatus::Unused)]
    #[case("reserved", CouponStatus::Reserved)]
    #[case("Provided", CouponStatus::Provided)]
    #[case("USED", CouponStatus::Used)]
    #[case("discard", CouponStatus::Discarded)]
    #[case("Discarded", CouponStatus::Discarded)]
    #[case("expiration", CouponStatus::Expired)]
    #[case("EXPIRED", CouponStatus::Expired)]
    fn parses_legacy_status_text(#[case] raw: &str, #[case] expected: CouponStatus) {
        assert_eq!(raw.parse::<CouponStatus>().unwrap(), expected);
    }

    #[test]
    fn value_conversion_writes_canonical_name() {
        assert_eq!(
            Value::from(CouponStatus::Discarded),
            Value::String(Some(Box::new("discarded".to_owned())))
        );
        let read = <CouponStatus as ValueType>::try_from(Value::String(Some(Box::new(
            "USED".to_owned(),
        ))));
        assert_eq!(read.ok(), Some(CouponStatus::Used));
        let blank = <CouponStatus as ValueType>::try_from(Value::String(None));
        assert_eq!(blank.ok(), Some(CouponStatus::Unused));
    }

    #[test]
    fn rejects_unknown_status_text() {
        assert!("pending".parse::<CouponStatus>().is_err());
    }

    #[test]
    fn spent_and_assigned_are_disjoint() {
        use sea_orm::Iterable;
        for status in CouponStatus::iter() {
            assert!(!(status.is_spent() && status.is_assigned()), "{status}");
        }
        assert!(!CouponStatus::Unused.is_spent());
        assert!(!CouponStatus::Unused.is_assigned());
    }
}
