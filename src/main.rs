//! Serves the simulated sessions endpoint.
//!
//! ```text
//! RUST_LOG=debug sessions-fixture --addr 127.0.0.1:3000
//!
//! curl -i http://localhost:3000/v1/sessions
//! curl -i -X POST http://localhost:3000/v1/sessions \
//!      -H 'content-type: application/json' \
//!      -d '{"email":"a@b.c","password":"hunter22"}'
//! ```

use clap::Parser;
use sessions_fixture::config::Config;
use sessions_fixture::logger::{self, TracingSink};
use sessions_fixture::{Error, Server, sessions};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::parse();
    logger::init(config.log_format)?;

    let options = sessions::Options {
        latency: config.latency()?,
        trust_proxy: config.trust_proxy,
    };
    tracing::info!(
        min_ms = config.latency_min_ms,
        max_ms = config.latency_max_ms,
        trust_proxy = config.trust_proxy,
        "configured"
    );

    let app = sessions::router(options, TracingSink::shared());
    Server::bind(config.addr).serve(app).await
}
