//! Endpoint handlers
//!
//! One function per route. Each returns either a ready response or a
//! [`ServiceError`] that the router turns into an error response.

use std::time::Duration;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::config::{AppState, SecretConfig};
use crate::error::ServiceError;
use crate::http;
use crate::secret;

type HandlerResult = Result<Response<Full<Bytes>>, ServiceError>;

const HEALTHCHECK_BODY: &str = "Hello World!";
const WELCOME_BODY: &str = "Welcome to my home";

/// `GET /healthcheck`
pub fn healthcheck(is_head: bool) -> Response<Full<Bytes>> {
    http::build_text_response(HEALTHCHECK_BODY, is_head)
}

/// `GET /`
pub fn welcome(is_head: bool) -> Response<Full<Bytes>> {
    http::build_text_response(WELCOME_BODY, is_head)
}

/// `GET /sleep/{secs}`
///
/// Suspends only this request's task; the decoded `secs` text is echoed back.
pub async fn sleep(secs: &str, is_head: bool) -> HandlerResult {
    let duration = parse_seconds(secs)?;
    tokio::time::sleep(duration).await;
    Ok(http::build_text_response(
        format!("sleep for {secs} secs"),
        is_head,
    ))
}

/// Parse a non-negative, finite number of seconds
pub fn parse_seconds(secs: &str) -> Result<Duration, ServiceError> {
    let value: f64 = secs
        .parse()
        .map_err(|_| ServiceError::InvalidArgument(format!("'{secs}' is not a number")))?;

    Duration::try_from_secs_f64(value).map_err(|_| {
        ServiceError::InvalidArgument(format!(
            "'{secs}' is not a non-negative, finite number of seconds"
        ))
    })
}

/// `GET /secret`
///
/// Re-reads the secret config and calls both upstreams on every request.
pub async fn get_secret(state: &AppState, is_head: bool) -> HandlerResult {
    let config = SecretConfig::load(&state.secret_config_path).await?;
    let secret = secret::fetch_secret(
        &config,
        state.parameter_store.as_ref(),
        state.key_management.as_ref(),
    )
    .await?;

    Ok(http::build_json_response(StatusCode::OK, &secret, is_head))
}
