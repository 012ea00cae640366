//! Route table
//!
//! Routes are checked in registration order; the first path match wins.

use hyper::Method;

use super::matcher::{Params, PathPattern};

/// Handlers the service knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Welcome,
    Healthcheck,
    Sleep,
    Secret,
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    pattern: PathPattern,
    endpoint: Endpoint,
}

/// Result of resolving a request against the table
#[derive(Debug, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    Found {
        endpoint: Endpoint,
        params: Params<'a>,
    },
    /// Path exists but not for this method
    MethodNotAllowed,
    NotFound,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route
    #[must_use]
    pub fn route(mut self, method: Method, pattern: &str, endpoint: Endpoint) -> Self {
        self.routes.push(Route {
            method,
            pattern: PathPattern::parse(pattern),
            endpoint,
        });
        self
    }

    /// The service's public surface
    pub fn service_routes() -> Self {
        Self::new()
            .route(Method::GET, "/healthcheck", Endpoint::Healthcheck)
            .route(Method::GET, "/sleep/{secs}", Endpoint::Sleep)
            .route(Method::GET, "/secret", Endpoint::Secret)
            .route(Method::GET, "/", Endpoint::Welcome)
    }

    /// Resolve a request. `HEAD` is served by the matching `GET` route.
    pub fn resolve<'a>(&'a self, method: &Method, path: &'a str) -> RouteMatch<'a> {
        let is_head = *method == Method::HEAD;

        let mut path_matched = false;
        for route in &self.routes {
            let Some(params) = route.pattern.matches(path) else {
                continue;
            };
            if route.method == *method || (is_head && route.method == Method::GET) {
                return RouteMatch::Found {
                    endpoint: route.endpoint,
                    params,
                };
            }
            path_matched = true;
        }

        if path_matched {
            RouteMatch::MethodNotAllowed
        } else {
            RouteMatch::NotFound
        }
    }

    /// Registered patterns, for startup logging
    pub fn patterns(&self) -> impl Iterator<Item = (&Method, &str)> {
        self.routes
            .iter()
            .map(|r| (&r.method, r.pattern.as_str()))
    }
}
