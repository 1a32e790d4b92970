//! Runtime configuration: command-line flags with environment fallbacks.

use std::net::SocketAddr;

use clap::{ArgAction, Parser};

use crate::error::Error;
use crate::latency::Latency;
use crate::logger::LogFormat;

#[derive(Clone, Debug, Parser)]
#[command(name = "sessions-fixture", version, about = "Simulated rate-limited /v1/sessions endpoint")]
pub struct Config {
    /// Socket address to listen on.
    #[arg(long, env = "SESSIONS_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: SocketAddr,

    /// Lower bound of the POST delay, inclusive.
    #[arg(long, env = "SESSIONS_LATENCY_MIN_MS", default_value_t = 100)]
    pub latency_min_ms: u64,

    /// Upper bound of the POST delay, exclusive.
    #[arg(long, env = "SESSIONS_LATENCY_MAX_MS", default_value_t = 1000)]
    pub latency_max_ms: u64,

    /// Read the client address from `x-real-ip` / `x-forwarded-for`.
    #[arg(long, env = "SESSIONS_TRUST_PROXY", default_value_t = true, action = ArgAction::Set)]
    pub trust_proxy: bool,

    #[arg(long, env = "SESSIONS_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Config {
    pub fn latency(&self) -> Result<Latency, Error> {
        Latency::new(self.latency_min_ms, self.latency_max_ms)
    }
}
