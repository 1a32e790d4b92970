//! # sessions-fixture
//!
//! A simulated `/v1/sessions` endpoint that is always rate limited, for
//! exercising how clients deal with authentication errors.
//!
//! - `GET /v1/sessions` answers `403 Forbidden`.
//! - `POST /v1/sessions` answers `401 Unauthorized` after 100–999 ms.
//! - Every routed request logs one synthetic `TooManyRequestsError`.
//! - Malformed input is rejected with `400` before the handler runs.
//!
//! Every error body is a snake_case [`StructuredError`] carrying fresh
//! correlation ids.
//!
//! Underneath sits a small hyper-based framework: a radix-tree [`Router`],
//! ordered [`middleware`] stages with short-circuit semantics, and a
//! [`Server`] with graceful shutdown.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use sessions_fixture::{Server, logger, sessions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sessions_fixture::Error> {
//!     logger::init(logger::LogFormat::Pretty)?;
//!
//!     let app = sessions::router(sessions::Options::default(), logger::TracingSink::shared());
//!     Server::bind("0.0.0.0:3000".parse().unwrap()).serve(app).await
//! }
//! ```

mod error;
mod handler;
mod pipeline;
mod problem;
mod request;
mod response;
mod router;
mod server;

pub mod config;
pub mod ip;
pub mod latency;
pub mod logger;
pub mod middleware;
pub mod sessions;
pub mod validator;

pub use error::Error;
pub use handler::Handler;
pub use pipeline::{Outcome, Phase, Route};
pub use problem::{ErrorKind, StructuredError};
pub use request::{Request, RequestMetadata};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
