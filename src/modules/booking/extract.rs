use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header::CONTENT_TYPE, request::Parts, HeaderMap},
};
use serde::de::DeserializeOwned;

use crate::booking::BookingError;
use crate::error::AppError;

const UNREADABLE_BODY: &str = "Please send the booking form as JSON";

/// JSON body whose rejections come back as booking errors. A bad `date` or
/// `time` is an invalid slot; any other bad field is reported on that field.
pub struct BookingJson<T>(pub T);

/// Query string whose rejections come back as an invalid slot.
pub struct BookingQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for BookingJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json(req.headers()) {
            return Err(unreadable_body().into());
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|err| {
            tracing::debug!(error = %err, "Failed to read booking body");
            unreadable_body()
        })?;

        let deserializer = &mut serde_json::Deserializer::from_slice(&bytes);
        serde_path_to_error::deserialize(deserializer)
            .map(BookingJson)
            .map_err(|err| field_error(err).into())
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for BookingQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| BookingQuery(value))
            .map_err(|err| BookingError::InvalidSlot(err.body_text()).into())
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

fn unreadable_body() -> BookingError {
    BookingError::InvalidContact {
        field: "body".to_string(),
        reason: UNREADABLE_BODY.to_string(),
    }
}

fn field_error(err: serde_path_to_error::Error<serde_json::Error>) -> BookingError {
    let path = err.path().to_string();
    let inner = err.into_inner();

    // "." is the document root and "[n]" a top-level array element.
    if inner.is_syntax() || inner.is_eof() || path == "." || path.starts_with('[') {
        return unreadable_body();
    }

    match path.as_str() {
        "date" | "time" => BookingError::InvalidSlot(format!("{path}: {inner}")),
        _ => BookingError::InvalidContact {
            reason: format!("Please enter a valid {path}"),
            field: path,
        },
    }
}
