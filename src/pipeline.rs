//! Per-request pipeline: stages, then the handler.
//!
//! ```text
//! Pending ──(every stage Ok)──▶ Validated ──(handler)──▶ Handled
//!    │
//!    └──(first stage Err)──▶ Rejected
//! ```
//!
//! A rejected request never reaches its handler. The rejection is logged at
//! `info` through the router's sink and serialized as the response.

use std::sync::Arc;

use tracing::{Level, debug};

use crate::handler::{BoxedHandler, Handler};
use crate::logger::SharedSink;
use crate::middleware::{BoxedStage, Stage};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// Where a request ended up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Pending,
    Validated,
    Handled,
    Rejected,
}

/// Route-level stages plus the terminal handler.
///
/// ```rust
/// use sessions_fixture::{Request, Route, StructuredError};
/// use sessions_fixture::middleware::Validate;
/// use sessions_fixture::validator::Constraint;
///
/// async fn login(_req: Request) -> StructuredError {
///     StructuredError::unauthorized()
/// }
///
/// let route = Route::new(login)
///     .before(Validate::body(&[("email", Constraint::Required)]));
/// ```
pub struct Route {
    stages: Vec<BoxedStage>,
    handler: BoxedHandler,
}

impl Route {
    pub fn new(handler: impl Handler) -> Self {
        Self { stages: Vec::new(), handler: handler.into_boxed_handler() }
    }

    /// Appends a stage that runs after the router layers, before the handler.
    pub fn before(mut self, stage: impl Stage) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }
}

/// Final phase and response of one request.
#[derive(Debug)]
pub struct Outcome {
    phase: Phase,
    response: Response,
}

impl Outcome {
    pub(crate) fn new(phase: Phase, response: Response) -> Self {
        Self { phase, response }
    }

    pub(crate) fn without_body(self) -> Self {
        Self { phase: self.phase, response: self.response.without_body() }
    }

    pub fn phase(&self) -> Phase { self.phase }
    pub fn response(&self) -> &Response { &self.response }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response { self.response }
}

/// Drives `req` through `layers`, then `route`'s stages, then its handler.
pub(crate) async fn run(
    layers: &[BoxedStage],
    route: &Route,
    mut req: Request,
    sink: &SharedSink,
) -> Outcome {
    for stage in layers.iter().chain(route.stages.iter()) {
        if let Err(rejection) = stage.run(&mut req) {
            debug!(
                phase = ?Phase::Rejected,
                path = req.path(),
                error = rejection.kind().name(),
                "request rejected"
            );
            sink.log(Level::INFO, &rejection);
            return Outcome::new(Phase::Rejected, rejection.into_response());
        }
    }
    debug!(phase = ?Phase::Validated, path = req.path(), "request validated");

    let response = route.handler.call(req).await;

    debug!(phase = ?Phase::Handled, status = response.status_code().as_u16(), "request handled");
    Outcome::new(Phase::Handled, response)
}
