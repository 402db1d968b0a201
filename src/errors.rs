use http::StatusCode;
use sea_orm::error::DbErr;
use serde::Serialize;

use crate::entities::CouponStatus;

/// Reasons a coupon code is refused. Every variant is shown to the requester
/// as-is, so the messages are localized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponError {
    #[error("유효하지 않은 코드")]
    InvalidFormat,

    #[error("없는 쿠폰입니다")]
    NotFound,

    #[error("사용할 수 없는 쿠폰입니다: {0}")]
    NotUsable(CouponStatus),

    #[error("유효기간이 지난 쿠폰입니다")]
    Expired,

    #[error("{title} 이벤트가 종료되었습니다 ({start} ~ {end})")]
    EventEnded {
        title: String,
        start: String,
        end: String,
    },
}

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        DbErr,
    ),

    #[error("{0}")]
    Coupon(#[from] CouponError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

pub trait IntoDbErr {
    fn into_db_err(self) -> DbErr;
}

impl IntoDbErr for DbErr {
    fn into_db_err(self) -> DbErr {
        self
    }
}

impl IntoDbErr for String {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self)
    }
}

impl IntoDbErr for &str {
    fn into_db_err(self) -> DbErr {
        DbErr::Custom(self.to_string())
    }
}

impl ServiceError {
    /// Generic constructor that normalizes any supported database error input.
    pub fn db_error<E: IntoDbErr>(error: E) -> Self {
        ServiceError::DatabaseError(error.into_db_err())
    }

    /// The refusal reason, when this error is a refused coupon.
    pub fn coupon_error(&self) -> Option<&CouponError> {
        match self {
            Self::Coupon(err) => Some(err),
            _ => None,
        }
    }

    /// Coupon refusals and bad requests are recoverable and go back to the
    /// requester; everything else is for the framework's generic handler.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Coupon(_) | Self::NotFound(_) | Self::InvalidInput(_)
        )
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Coupon(CouponError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Coupon(_) | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::DatabaseError(_) | Self::EventError(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message for the requester. Store failures are not described.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::EventError(_) | Self::InternalError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

// Result extensions for easier error handling
pub trait ResultExt<T> {
    fn map_err_to_service(self) -> Result<T, ServiceError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<ServiceError>,
{
    fn map_err_to_service(self) -> Result<T, ServiceError> {
        self.map_err(|e| e.into())
    }
}
