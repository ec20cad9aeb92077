//! Gauge Server
//!
//! Line-delimited JSON over stdin/stdout. Each input line is one request
//! `{"id", "method", "params"}`; each response is one line. Requests
//! without an id are notifications and get no response.
//!
//! Configuration:
//! - GAUGE_PRESETS: preset groups loaded at start (default "all")
//! - GAUGE_SHOW_UNITS: default for show_units in convert (default true)
//! - RUST_LOG: log filter (default "info"); logs go to stderr

mod config;
mod handler;

use std::io::{self, BufRead, Write};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use config::ServerConfig;
use handler::Session;

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = ServerConfig::from_env();
    info!(version = SERVER_VERSION, presets = ?config.presets, show_units = config.show_units, "gauge server starting");

    let mut session = Session::new(&config);

    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin.lock());

    info!("ready, waiting for requests");

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                info!("client disconnected (EOF)");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                debug!(bytes = line.len(), "received request");

                let Some(response) = session.handle_line(line) else {
                    continue;
                };

                let mut stdout = io::stdout().lock();
                if let Err(e) = writeln!(stdout, "{}", response) {
                    error!(error = %e, "failed to write response");
                    break;
                }
                if let Err(e) = stdout.flush() {
                    error!(error = %e, "failed to flush stdout");
                    break;
                }
            }
            Err(e) => {
                error!(error = %e, "failed to read input");
                break;
            }
        }
    }

    info!("server shutting down");
}
