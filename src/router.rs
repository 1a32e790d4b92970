//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. Router-wide layers run
//! for every matched route; unmatched requests get a structured 404 or 405
//! without touching the layers. `HEAD` falls back to the `GET` route and is
//! answered without a body.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;
use tracing::Level;

use crate::handler::Handler;
use crate::logger::{SharedSink, TracingSink};
use crate::middleware::{BoxedStage, Stage};
use crate::pipeline::{self, Outcome, Phase, Route};
use crate::problem::StructuredError;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Every builder method returns `self` so registrations chain:
///
/// ```rust
/// use http::Method;
/// use sessions_fixture::middleware::{InjectMetadata, Validate};
/// use sessions_fixture::validator::Constraint;
/// use sessions_fixture::{Request, Route, Router, StructuredError};
///
/// async fn deny(_req: Request) -> StructuredError { StructuredError::forbidden() }
///
/// let app = Router::new()
///     .layer(InjectMetadata::new(true))
///     .route(
///         Method::GET,
///         "/v1/things/{id}",
///         Route::new(deny).before(Validate::cookies(&[("session_id", Constraint::Optional)])),
///     );
/// ```
pub struct Router {
    layers: Vec<BoxedStage>,
    routes: HashMap<Method, MatchitRouter<Arc<Route>>>,
    sink: SharedSink,
}

impl Router {
    /// An empty router logging through [`TracingSink`].
    pub fn new() -> Self {
        Self { layers: Vec::new(), routes: HashMap::new(), sink: TracingSink::shared() }
    }

    /// Replaces the sink used for rejections and fallback errors.
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    /// Adds a stage that runs for every matched route, in registration order.
    pub fn layer(mut self, stage: impl Stage) -> Self {
        self.layers.push(Arc::new(stage));
        self
    }

    /// Registers a bare handler for a method + path pair.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.route(method, path, Route::new(handler))
    }

    /// Registers a route with its own stages.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are static, so this is a startup bug.
    pub fn route(mut self, method: Method, path: &str, route: Route) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, Arc::new(route))
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Runs `req` through the matching pipeline and reports how it ended.
    pub async fn handle(&self, mut req: Request) -> Outcome {
        let head = *req.method() == Method::HEAD;
        let outcome = match self.lookup(req.method(), req.path()) {
            Some((route, params)) => {
                req.set_params(params);
                pipeline::run(&self.layers, &route, req, &self.sink).await
            }
            None => Outcome::new(Phase::Rejected, self.no_match(&req)),
        };
        if head { outcome.without_body() } else { outcome }
    }

    /// [`handle`](Self::handle), keeping only the response.
    pub async fn dispatch(&self, req: Request) -> Response {
        self.handle(req).await.into_response()
    }

    /// Structured error for a request no route accepted, logged at `info`.
    fn no_match(&self, req: &Request) -> Response {
        let path_known = self.routes.values().any(|tree| tree.at(req.path()).is_ok());
        let err = if path_known {
            StructuredError::method_not_allowed()
        } else {
            StructuredError::not_found()
        };
        self.sink.log(Level::INFO, &err);
        err.into_response()
    }

    pub(crate) fn sink(&self) -> &SharedSink {
        &self.sink
    }

    fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(Arc<Route>, HashMap<String, String>)> {
        let matched = self
            .routes
            .get(method)
            .and_then(|tree| tree.at(path).ok())
            .or_else(|| {
                if *method != Method::HEAD {
                    return None;
                }
                self.routes.get(&Method::GET)?.at(path).ok()
            })?;
        let route = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((route, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
