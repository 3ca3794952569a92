//! The extraction endpoint.
//!
//! Every path and method lands in [`extract_handler`], which walks a request
//! through method check, `href` check, body buffering, extraction and
//! classification. Failures stop the walk and become a [`ServiceError`]
//! response.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, Request, State};
use axum::http::Method;
use axum::response::Html;
use http_body_util::LengthLimitError;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use url::Url;

use crate::extract::{Extractor, ReadabilityExtractor, run_extraction};
use crate::{ServiceConfig, ServiceError};

/// Read-only state shared by all requests.
#[derive(Clone)]
pub struct AppState {
    extractor: Arc<dyn Extractor>,
    max_body_bytes: Option<usize>,
    extract_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self { extractor, max_body_bytes: None, extract_timeout: None }
    }

    /// Builds the production state: the readability extractor plus the
    /// configured limits.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(Arc::new(ReadabilityExtractor::new(config.extract_config())))
            .with_max_body_bytes(config.max_body_bytes)
            .with_extract_timeout(config.extract_timeout())
    }

    pub fn with_max_body_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn with_extract_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.extract_timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ExtractParams {
    href: Option<String>,
}

/// Routes every request to [`extract_handler`].
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .fallback(extract_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn extract_handler(State(state): State<AppState>, request: Request) -> Result<Html<String>, ServiceError> {
    if request.method() != Method::POST {
        warn!(method = %request.method(), "Only accepts POST");
        return Err(ServiceError::MethodNotAllowed);
    }

    info!(query = request.uri().query().unwrap_or_default(), "POST");
    let base_url = base_url_from(&request)?;

    let body = read_body(request, state.max_body_bytes).await?;
    let html = String::from_utf8_lossy(&body).into_owned();

    let extraction = run_extraction(state.extractor.clone(), html, base_url, state.extract_timeout).await?;
    match extraction.into_result() {
        Ok((title, content)) => {
            info!(%title, "extracted");
            Ok(Html(content))
        }
        Err(err @ ServiceError::NotFound) => {
            info!("Could not extract content");
            Err(err)
        }
        Err(err) => {
            warn!(error = %err, "Readability threw");
            Err(err)
        }
    }
}

fn base_url_from(request: &Request) -> Result<Url, ServiceError> {
    let href = Query::<ExtractParams>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(params)| params.href)
        .filter(|href| !href.is_empty());

    let Some(href) = href else {
        info!("Supply url parameter");
        return Err(ServiceError::MissingHref);
    };

    Url::parse(&href).map_err(|e| {
        info!(%href, error = %e, "Supply url parameter");
        ServiceError::InvalidHref(e.to_string())
    })
}

async fn read_body(request: Request, limit: Option<usize>) -> Result<Bytes, ServiceError> {
    axum::body::to_bytes(request.into_body(), limit.unwrap_or(usize::MAX))
        .await
        .map_err(|e| {
            let inner = e.into_inner();
            match limit {
                Some(limit) if inner.is::<LengthLimitError>() => {
                    warn!(limit, "request body too large");
                    ServiceError::BodyTooLarge { limit }
                }
                _ => ServiceError::BodyRead(inner.to_string()),
            }
        })
}
