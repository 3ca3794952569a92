//! Error types for the extraction service.
//!
//! Every failure a request can hit is a [`ServiceError`] variant. Each variant
//! maps to exactly one HTTP status and an HTTP/1 reason phrase, and the
//! response body is always empty.
//!
//! # Example
//!
//! ```rust
//! use axum::http::StatusCode;
//! use calo_readability::ServiceError;
//!
//! assert_eq!(ServiceError::NotFound.status(), StatusCode::INTERNAL_SERVER_ERROR);
//! assert_eq!(
//!     ServiceError::ExtractionFailed { cause: "boom".into() }.status(),
//!     StatusCode::NOT_IMPLEMENTED
//! );
//! ```

use std::time::Duration;

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hyper::ext::ReasonPhrase;
use thiserror::Error;

const SUPPLY_URL: &[u8] = b"Supply url parameter";
const NO_CONTENT: &[u8] = b"Could not extract content";
const ONLY_POST: &[u8] = b"Only accepts POST";
const TOO_LARGE: &[u8] = b"Request body too large";
const UNREADABLE_BODY: &[u8] = b"Could not read request body";
const TIMED_OUT: &[u8] = b"Extraction timed out";

/// Failure kinds of a single extraction request.
///
/// None of these are retried by the service and none of them outlive the
/// request that produced them.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Anything other than `POST`.
    #[error("only POST is accepted")]
    MethodNotAllowed,

    /// The `href` query parameter was absent or empty.
    #[error("missing href query parameter")]
    MissingHref,

    /// The `href` query parameter could not be parsed as an absolute URL.
    #[error("invalid href query parameter: {0}")]
    InvalidHref(String),

    /// The request body exceeded the configured ceiling.
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// The request body could not be read to the end.
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// The document parsed but no main content was identified.
    #[error("could not extract content")]
    NotFound,

    /// The extraction algorithm failed internally.
    #[error("extraction failed: {cause}")]
    ExtractionFailed { cause: String },

    /// Extraction did not finish within the configured timeout.
    #[error("extraction timed out after {limit:?}")]
    TimedOut { limit: Duration },
}

impl ServiceError {
    /// HTTP status reported for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingHref | Self::InvalidHref(_) | Self::NotFound => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ExtractionFailed { .. } => StatusCode::NOT_IMPLEMENTED,
            Self::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BodyRead(_) => StatusCode::BAD_REQUEST,
            Self::TimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Reason phrase written on the HTTP/1 status line.
    pub fn reason(&self) -> &'static [u8] {
        match self {
            Self::MethodNotAllowed => ONLY_POST,
            Self::MissingHref | Self::InvalidHref(_) => SUPPLY_URL,
            Self::NotFound | Self::ExtractionFailed { .. } => NO_CONTENT,
            Self::BodyTooLarge { .. } => TOO_LARGE,
            Self::BodyRead(_) => UNREADABLE_BODY,
            Self::TimedOut { .. } => TIMED_OUT,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = self.status();
        response.extensions_mut().insert(ReasonPhrase::from_static(self.reason()));
        response
    }
}
