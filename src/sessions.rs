//! `/v1/sessions` in its permanently rate-limited form.
//!
//! Every request logs a `TooManyRequestsError` tagged `sessions`, then:
//!
//! | Method | Validation | Response |
//! |---|---|---|
//! | `GET` | `session_id` cookie, if sent, must be non-empty | `403` after no delay |
//! | `POST` | body `email` and `password` must be non-empty strings | `401` after 100–999 ms |
//!
//! Neither handler looks at a session store or checks a credential. The
//! endpoint exists so clients can exercise their handling of these errors.

use std::sync::Arc;

use http::Method;
use tracing::Level;

use crate::latency::Latency;
use crate::logger::SharedSink;
use crate::middleware::{InjectMetadata, RateLimitAlarm, Validate};
use crate::pipeline::Route;
use crate::problem::StructuredError;
use crate::request::Request;
use crate::router::Router;
use crate::validator::Constraint;

pub const PATH: &str = "/v1/sessions";

/// Value of `context.type` on the rate-limit event.
pub const TAG: &str = "sessions";

pub const GET_LOCATION_CODE: &str = "MODEL:AUTHORIZATION:CAN_REQUEST:FEATURE_NOT_FOUND";
pub const POST_LOCATION_CODE: &str = "CONTROLLER:SESSIONS:POST_HANDLER:DATA_MISMATCH";

const GET_RULES: &[(&str, Constraint)] = &[("session_id", Constraint::Optional)];
const POST_RULES: &[(&str, Constraint)] =
    &[("email", Constraint::Required), ("password", Constraint::Required)];

/// Knobs for [`router`].
#[derive(Clone, Copy, Debug)]
pub struct Options {
    pub latency: Latency,
    pub trust_proxy: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { latency: Latency::default(), trust_proxy: true }
    }
}

/// The complete application: metadata, alarm, then the two routes.
pub fn router(options: Options, sink: SharedSink) -> Router {
    let get_sink = Arc::clone(&sink);
    let post_sink = Arc::clone(&sink);
    let latency = options.latency;

    Router::new()
        .with_sink(Arc::clone(&sink))
        .layer(InjectMetadata::new(options.trust_proxy))
        .layer(RateLimitAlarm::new(TAG, sink))
        .route(
            Method::GET,
            PATH,
            Route::new(move |req| get(req, Arc::clone(&get_sink)))
                .before(Validate::cookies(GET_RULES)),
        )
        .route(
            Method::POST,
            PATH,
            Route::new(move |req| post(req, latency, Arc::clone(&post_sink)))
                .before(Validate::body(POST_RULES)),
        )
}

async fn get(_req: Request, sink: SharedSink) -> StructuredError {
    let err = StructuredError::forbidden()
        .with_message("Usuário não pode executar esta operação.")
        .with_action("Verifique se este usuário possui a feature \"read:session\".")
        .with_location_code(GET_LOCATION_CODE);
    sink.log(Level::INFO, &err);
    err
}

async fn post(_req: Request, latency: Latency, sink: SharedSink) -> StructuredError {
    let err = StructuredError::unauthorized()
        .with_message("Dados não conferem.")
        .with_action("Verifique se os dados enviados estão corretos.")
        .with_location_code(POST_LOCATION_CODE);

    let delay = latency.wait().await;
    tracing::debug!(delay_ms = delay.as_millis() as u64, "simulated latency elapsed");

    sink.log(Level::INFO, &err);
    err
}
