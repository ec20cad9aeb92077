//! Request handling
//!
//! Methods:
//! - define: {symbol, basis?} -> {unit, name}
//! - define_conversion: {from, to, factor} or {from, to, scale, offset} -> {edge}
//! - make_metric: {basis} -> {ok}
//! - find: {symbol} -> {unit | null}
//! - convert: {value, to, show_units?} -> {result}
//! - convert_value: {from, to, value} -> {value}
//! - add_presets: {group} -> {ok, units}
//! - list_units, list_presets
//!
//! Units in `basis`, `from` and `to` may be given by id or by symbol.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info, warn};
use gauge_core::{ErrorReport, UnitsError};
use gauge_units::{preset_groups, Conversion, Registry, UnitId};
use crate::config::ServerConfig;

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

#[derive(Debug, Deserialize)]
pub struct Request {
    pub id: Option<JsonValue>,
    pub method: String,
    #[serde(default)]
    pub params: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ProtocolError>,
}

impl Response {
    fn new(id: Option<JsonValue>, result: Result<JsonValue, ProtocolError>) -> Self {
        let (result, error) = match result {
            Ok(r) => (Some(r), None),
            Err(e) => (None, Some(e)),
        };
        Response {
            jsonrpc: "2.0".to_string(),
            id,
            result,
            error,
        }
    }
}

/// Error object of a response: a protocol failure or an engine error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProtocolError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ProtocolError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        ProtocolError {
            code,
            message: message.into(),
            kind: None,
            suggestion: None,
        }
    }

    fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }
}

impl From<UnitsError> for ProtocolError {
    fn from(err: UnitsError) -> Self {
        let report = ErrorReport::from(err);
        ProtocolError {
            code: report.code,
            message: report.message,
            kind: Some(report.kind),
            suggestion: report.suggestion,
        }
    }
}

/// One client session: a registry plus the defaults it was started with
pub struct Session {
    registry: Registry,
    show_units: bool,
}

impl Session {
    /// New session with the configured preset groups loaded
    pub fn new(config: &ServerConfig) -> Self {
        let mut registry = Registry::new();
        for group in &config.presets {
            if let Err(e) = registry.add_presets(group) {
                warn!(group = %group, error = %e, "skipping preset group");
            }
        }
        info!(groups = ?config.presets, units = registry.len(), "presets loaded");

        Session {
            registry,
            show_units: config.show_units,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Handle one input line; `None` when no response is due (notifications)
    pub fn handle_line(&mut self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => {
                let response = self.handle(&request);
                if request.id.is_none() {
                    debug!(method = %request.method, "notification processed");
                    return None;
                }
                response
            }
            Err(e) => {
                warn!(error = %e, "unparsable request");
                Response::new(None, Err(ProtocolError::new(PARSE_ERROR, format!("Parse error: {}", e))))
            }
        };

        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "failed to serialize response");
                None
            }
        }
    }

    pub fn handle(&mut self, request: &Request) -> Response {
        debug!(method = %request.method, "handling request");
        let params = request.params.clone().unwrap_or_else(|| json!({}));

        let result = match request.method.as_str() {
            "define" => self.define(&params),
            "define_conversion" => self.define_conversion(&params),
            "make_metric" => self.make_metric(&params),
            "find" => self.find(&params),
            "convert" => self.convert(&params),
            "convert_value" => self.convert_value(&params),
            "add_presets" => self.add_presets(&params),
            "list_units" => Ok(self.list_units()),
            "list_presets" => Ok(json!({ "groups": preset_groups() })),
            _ => Err(ProtocolError::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )),
        };

        Response::new(request.id.clone(), result)
    }

    fn define(&mut self, params: &JsonValue) -> Result<JsonValue, ProtocolError> {
        let symbol = str_param(params, "symbol")?;
        let basis = match params.get("basis") {
            None | Some(JsonValue::Null) => None,
            Some(_) => Some(self.unit_param(params, "basis")?),
        };

        let id = self.registry.define(symbol, basis);
        Ok(json!({ "unit": id, "name": self.registry.describe(id) }))
    }

    fn define_conversion(&mut self, params: &JsonValue) -> Result<JsonValue, ProtocolError> {
        let from = self.unit_param(params, "from")?;
        let to = self.unit_param(params, "to")?;

        let conversion = match (f64_param(params, "factor"), f64_param(params, "scale")) {
            (Some(factor), _) => Conversion::linear(invertible(factor, "factor")?),
            (None, Some(scale)) => {
                let offset = f64_param(params, "offset").unwrap_or(0.0);
                if !offset.is_finite() {
                    return Err(ProtocolError::invalid_params("offset must be finite"));
                }
                Conversion::affine(invertible(scale, "scale")?, offset)
            }
            (None, None) => {
                return Err(ProtocolError::invalid_params("Missing factor or scale"));
            }
        };

        let edge = self.registry.define_conversion(from, to, conversion)?;
        Ok(json!({ "edge": edge }))
    }

    fn make_metric(&mut self, params: &JsonValue) -> Result<JsonValue, ProtocolError> {
        let basis = self.unit_param(params, "basis")?;
        let ok = self.registry.make_metric(Some(basis));
        Ok(json!({ "ok": ok }))
    }

    fn find(&self, params: &JsonValue) -> Result<JsonValue, ProtocolError> {
        let symbol = str_param(params, "symbol")?;
        Ok(json!({ "unit": self.registry.find(symbol) }))
    }

    fn convert(&self, params: &JsonValue) -> Result<JsonValue, ProtocolError> {
        let value = str_param(params, "value")?;
        let to = params.get("to").and_then(|v| v.as_str()).unwrap_or("");
        let show_units = params
            .get("show_units")
            .and_then(|v| v.as_bool())
            .unwrap_or(self.show_units);

        let result = self.registry.convert(value, to, show_units)?;
        Ok(json!({ "result": result }))
    }

    fn convert_value(&self, params: &JsonValue) -> Result<JsonValue, ProtocolError> {
        let from = self.unit_param(params, "from")?;
        let to = self.unit_param(params, "to")?;
        let value = f64_param(params, "value")
            .ok_or_else(|| ProtocolError::invalid_params("Missing numeric value"))?;

        let result = self.registry.convert_value(from, to, value)?;
        Ok(json!({ "value": result }))
    }

    fn add_presets(&mut self, params: &JsonValue) -> Result<JsonValue, ProtocolError> {
        let group = str_param(params, "group")?;
        self.registry.add_presets(group)?;
        info!(group, units = self.registry.len(), "preset group loaded on request");
        Ok(json!({ "ok": true, "units": self.registry.len() }))
    }

    fn list_units(&self) -> JsonValue {
        let units: Vec<JsonValue> = self
            .registry
            .units()
            .map(|(id, record)| {
                json!({
                    "unit": id,
                    "name": record.name(),
                    "basis": record.basis().and_then(|b| self.registry.describe(b)),
                })
            })
            .collect();
        json!({ "units": units })
    }

    /// A unit given by id (number) or by registered symbol (string)
    fn unit_param(&self, params: &JsonValue, key: &str) -> Result<UnitId, ProtocolError> {
        match params.get(key) {
            Some(JsonValue::Number(n)) => {
                let raw = n
                    .as_u64()
                    .and_then(|raw| u32::try_from(raw).ok())
                    .ok_or_else(|| ProtocolError::invalid_params(format!("Invalid unit id for {}", key)))?;
                let id = UnitId::from_raw(raw);
                self.registry
                    .unit(id)
                    .map(|_| id)
                    .ok_or_else(|| UnitsError::InvalidHandle(raw).into())
            }
            Some(JsonValue::String(symbol)) => self
                .registry
                .find(symbol)
                .ok_or_else(|| UnitsError::UnknownUnit(symbol.clone()).into()),
            _ => Err(ProtocolError::invalid_params(format!("Missing {} argument", key))),
        }
    }
}

fn str_param<'a>(params: &'a JsonValue, key: &str) -> Result<&'a str, ProtocolError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ProtocolError::invalid_params(format!("Missing {} argument", key)))
}

fn f64_param(params: &JsonValue, key: &str) -> Option<f64> {
    params.get(key).and_then(|v| v.as_f64())
}

/// A multiplier usable in both directions: finite and nonzero
fn invertible(value: f64, key: &str) -> Result<f64, ProtocolError> {
    if value.is_finite() && value != 0.0 {
        Ok(value)
    } else {
        Err(ProtocolError::invalid_params(format!("{} must be finite and nonzero", key)))
    }
}
