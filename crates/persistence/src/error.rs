//! Conversion of driver errors into store failures.

use domain::services::StoreError;

/// Map a database error onto the store failure reported to the services.
pub fn from_sqlx(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotApplied("row not found".to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::InvalidResponse(err.to_string())
        }
        other => StoreError::Unavailable(other.to_string()),
    }
}

pub fn from_redis(err: redis::RedisError) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

pub fn from_json(err: serde_json::Error) -> StoreError {
    StoreError::Serialization(err.to_string())
}

pub fn from_http(err: reqwest::Error) -> StoreError {
    if err.is_decode() {
        StoreError::InvalidResponse(err.to_string())
    } else {
        StoreError::Unavailable(err.to_string())
    }
}
