//! Middleware stages.
//!
//! A [`Stage`] runs before a handler and either lets the request through or
//! rejects it with a [`StructuredError`] that becomes the response. Stages
//! are registered router-wide with [`Router::layer`](crate::Router::layer)
//! or per route with [`Route::before`](crate::Route::before), and execute in
//! registration order, layers first.
//!
//! Built-in stages:
//! - [`InjectMetadata`]: resolves the client address
//! - [`RateLimitAlarm`]: logs a synthetic `TooManyRequestsError` per request
//! - [`Validate`]: checks body or cookie fields against a rule set

use std::sync::Arc;

use crate::problem::StructuredError;
use crate::request::Request;

mod alarm;
mod metadata;
mod validate;

pub use alarm::{RateLimitAlarm, RequestContext};
pub use metadata::InjectMetadata;
pub use validate::{Source, Validate};

/// One step of the request pipeline.
///
/// Stages are synchronous: they inspect or annotate the request and return.
/// Anything that needs to wait belongs in the handler.
pub trait Stage: Send + Sync + 'static {
    fn run(&self, req: &mut Request) -> Result<(), StructuredError>;
}

/// A type-erased stage shared across concurrent requests.
pub type BoxedStage = Arc<dyn Stage>;

/// Wraps a closure as a [`Stage`].
///
/// ```rust
/// use sessions_fixture::middleware::from_fn;
/// use sessions_fixture::StructuredError;
///
/// let deny_all = from_fn(|_req| Err(StructuredError::forbidden()));
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: Fn(&mut Request) -> Result<(), StructuredError> + Send + Sync + 'static,
{
    FromFn(f)
}

/// Stage returned by [`from_fn`].
pub struct FromFn<F>(F);

impl<F> Stage for FromFn<F>
where
    F: Fn(&mut Request) -> Result<(), StructuredError> + Send + Sync + 'static,
{
    fn run(&self, req: &mut Request) -> Result<(), StructuredError> {
        (self.0)(req)
    }
}
