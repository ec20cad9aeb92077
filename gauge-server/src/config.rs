//! Server configuration from the environment

use std::env;
use tracing::warn;

/// Comma-separated preset groups loaded at start
pub const PRESETS_VAR: &str = "GAUGE_PRESETS";
/// Default for `show_units` when a convert request leaves it out
pub const SHOW_UNITS_VAR: &str = "GAUGE_SHOW_UNITS";

const DEFAULT_PRESETS: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub presets: Vec<String>,
    pub show_units: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_vars(None, None)
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_vars(
            env::var(PRESETS_VAR).ok().as_deref(),
            env::var(SHOW_UNITS_VAR).ok().as_deref(),
        )
    }

    /// Build from raw variable values; `None` means unset
    pub fn from_vars(presets: Option<&str>, show_units: Option<&str>) -> Self {
        let presets = presets
            .unwrap_or(DEFAULT_PRESETS)
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(String::from)
            .collect();

        let show_units = match show_units {
            None => true,
            Some(raw) => parse_flag(raw).unwrap_or_else(|| {
                warn!(var = SHOW_UNITS_VAR, value = raw, "not a boolean, using true");
                true
            }),
        };

        ServerConfig { presets, show_units }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
