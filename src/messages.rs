//! Request/response payloads for running [`compute`](crate::compute) behind a
//! message boundary, such as the `kquant-worker` binary.
//!
//! A request carries a raw byte buffer and a loosely typed JSON config. The
//! config is checked field by field here so that each defect maps onto the
//! matching [`QuantizeError`] instead of a generic parse failure.

use crate::color::Color;
use crate::config::{Config, DEFAULT_K, QuantizeOptions, RecolorOptions};
use crate::error::{QuantizeError, Result};
use crate::kmeans::KMeansOptions;
use crate::pixel_buffer::PixelBuffer;
use crate::random::RandomSource;
use crate::{Quantized, compute_with_rng};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Default, Deserialize)]
pub struct Request {
    /// Echoed back untouched so callers can match responses.
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub buffer: Option<Vec<u8>>,
    #[serde(default)]
    pub config: Option<Value>,
}

/// `result` is `null` whenever the request could not be served.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub result: Option<Quantized>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    fn ok(id: Option<Value>, result: Quantized) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failed(id: Option<Value>, error: &QuantizeError) -> Self {
        Self {
            id,
            result: None,
            error: Some(error.to_string()),
        }
    }
}

/// Serve one request.
pub fn handle<R: RandomSource + ?Sized>(request: Request, rng: &mut R) -> Response {
    let id = request.id.clone();
    match run(request, rng) {
        Ok(result) => Response::ok(id, result),
        Err(e) => Response::failed(id, &e),
    }
}

/// Serve one JSON-encoded request and encode the response.
pub fn handle_json<R: RandomSource + ?Sized>(line: &str, rng: &mut R) -> String {
    let response = match serde_json::from_str::<Request>(line) {
        Ok(request) => handle(request, rng),
        Err(e) => Response::failed(None, &QuantizeError::MalformedRequest(e.to_string())),
    };
    serde_json::to_string(&response).unwrap_or_else(|_| r#"{"result":null}"#.to_string())
}

fn run<R: RandomSource + ?Sized>(request: Request, rng: &mut R) -> Result<Quantized> {
    let (bytes, raw_config) = match (request.buffer, request.config) {
        (Some(bytes), Some(config)) if !config.is_null() => (bytes, config),
        (None, _) => return Err(QuantizeError::MalformedRequest("missing buffer".to_string())),
        _ => return Err(QuantizeError::MalformedRequest("missing config".to_string())),
    };
    let buffer = PixelBuffer::new(bytes)
        .map_err(|e| QuantizeError::MalformedRequest(e.to_string()))?;
    let config = parse_config(&raw_config)?;
    compute_with_rng(&buffer, &config, rng)
}

/// Turn a JSON config object into a [`Config`].
///
/// `mode` selects the variant (`"quantize"` or `"recolor"`). A missing `k`
/// falls back to [`DEFAULT_K`].
pub fn parse_config(value: &Value) -> Result<Config> {
    let map = value
        .as_object()
        .ok_or_else(|| QuantizeError::MalformedRequest("config must be an object".to_string()))?;

    match map.get("mode").and_then(Value::as_str) {
        Some("quantize") => parse_quantize(map).map(Config::Quantize),
        Some("recolor") => parse_recolor(map).map(Config::Recolor),
        Some(other) => Err(QuantizeError::MalformedRequest(format!(
            "unknown mode {:?}",
            other
        ))),
        None => Err(QuantizeError::MalformedRequest(
            "config needs a \"mode\" of \"quantize\" or \"recolor\"".to_string(),
        )),
    }
}

fn parse_quantize(map: &Map<String, Value>) -> Result<QuantizeOptions> {
    let k = match map.get("k") {
        None | Some(Value::Null) => DEFAULT_K,
        Some(v) => parse_positive_integer("k", v)?,
    };
    let grayscale = match map.get("grayscale") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(QuantizeError::InvalidConfig(format!(
                "grayscale must be a boolean, got {}",
                other
            )));
        }
    };
    let mut rest = map.clone();
    let max_iterations = rest.remove("max_iterations");
    let mut kmeans: KMeansOptions = serde_json::from_value(Value::Object(rest))
        .map_err(|e| QuantizeError::InvalidConfig(e.to_string()))?;
    match max_iterations {
        None | Some(Value::Null) => {}
        Some(v) => kmeans.max_iterations = parse_positive_integer("max_iterations", &v)?,
    }

    Ok(QuantizeOptions { k, grayscale, kmeans })
}

/// Accept a positive integer, written either as an integer or as an
/// integral float such as `4.0`.
fn parse_positive_integer(name: &str, value: &Value) -> Result<usize> {
    let invalid = || {
        QuantizeError::InvalidConfig(format!("{} must be a positive integer, got {}", name, value))
    };
    if let Some(k) = value.as_u64() {
        return usize::try_from(k).ok().filter(|&k| k >= 1).ok_or_else(invalid);
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= 1.0 && f <= usize::MAX as f64 => Ok(f as usize),
        _ => Err(invalid()),
    }
}

fn parse_recolor(map: &Map<String, Value>) -> Result<RecolorOptions> {
    let entries = map
        .get("palette")
        .and_then(Value::as_array)
        .ok_or_else(|| QuantizeError::InvalidPalette("palette must be an array".to_string()))?;
    if entries.is_empty() {
        return Err(QuantizeError::InvalidPalette("palette is empty".to_string()));
    }

    let palette = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| parse_color(i, entry))
        .collect::<Result<Vec<_>>>()?;
    Ok(RecolorOptions::new(palette))
}

fn parse_color(index: usize, entry: &Value) -> Result<Color> {
    let channel = |name: &str| -> Result<u8> {
        entry
            .get(name)
            .and_then(Value::as_u64)
            .and_then(|v| u8::try_from(v).ok())
            .ok_or_else(|| {
                QuantizeError::InvalidPalette(format!(
                    "entry {} has a missing or invalid {:?} channel",
                    index, name
                ))
            })
    };
    Ok(Color::new(channel("r")?, channel("g")?, channel("b")?))
}
