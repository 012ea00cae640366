//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route resolution, dispatch to the
//! endpoint handlers, error mapping and access logging.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_LENGTH, REFERER, SERVER, USER_AGENT};
use hyper::{Method, Request, Response};

use crate::config::AppState;
use crate::error::ServiceError;
use crate::handler::endpoints;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{Endpoint, RouteMatch};

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: Option<SocketAddr>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();

    let mut entry = state.config.logging.access_log.then(|| {
        let mut entry = AccessLogEntry::start(remote_addr, &parts.method, &parts.uri, parts.version);
        entry.referer = header_string(&parts.headers, REFERER);
        entry.user_agent = header_string(&parts.headers, USER_AGENT);
        entry
    });

    let path = parts.uri.path().to_string();
    let mut response = route_request(&parts.method, &path, &state).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        entry.elapsed = started.elapsed();
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Resolve the route and run its handler
async fn route_request(method: &Method, path: &str, state: &AppState) -> Response<Full<Bytes>> {
    let is_head = *method == Method::HEAD;

    let (endpoint, params) = match state.routes.resolve(method, path) {
        RouteMatch::Found { endpoint, params } => (endpoint, params),
        RouteMatch::MethodNotAllowed => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            return http::build_405_response(is_head);
        }
        RouteMatch::NotFound => return http::build_404_response(is_head),
    };

    let result = match endpoint {
        Endpoint::Healthcheck => Ok(endpoints::healthcheck(is_head)),
        Endpoint::Welcome => Ok(endpoints::welcome(is_head)),
        Endpoint::Sleep => match params.get("secs") {
            Some(Ok(secs)) => endpoints::sleep(&secs, is_head).await,
            Some(Err(e)) => Err(ServiceError::InvalidArgument(format!(
                "sleep duration is not valid UTF-8: {e}"
            ))),
            None => Err(ServiceError::InvalidArgument("missing sleep duration".into())),
        },
        Endpoint::Secret => endpoints::get_secret(state, is_head).await,
    };

    result.unwrap_or_else(|err| {
        logger::log_request_failed(path, &err);
        http::build_error_response(&err, state.config.http.expose_error_details, is_head)
    })
}

fn header_string(headers: &hyper::HeaderMap, name: hyper::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
