//! Inbound event shapes and body decoding.
//!
//! Two wire shapes are accepted. Shape A is the gateway-wrapped event: the
//! payload lives in a `body` field (raw JSON text, base64-encoded text, or
//! an already-decoded object) and the user identity is preferentially read
//! from the `requestContext.authorizer` sub-object. Shape B is a direct
//! invocation: the event itself is the payload. The `body` key is the
//! structural discriminator between the two.

use base64::Engine as _;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Case-insensitive name of the distributed-trace propagation header.
pub const TRACE_HEADER: &str = "x-amzn-trace-id";

/// A decoded inbound event, tagged by wire shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// Gateway-wrapped event (shape A).
    Gateway {
        /// Decoded request payload.
        payload: Map<String, Value>,
        /// User identity from the authorizer context, when present.
        authorizer_user_id: Option<String>,
        /// Trace header carried in the event's `headers` map, when present.
        trace_header: Option<String>,
    },
    /// Direct invocation (shape B): the event is the payload.
    Direct {
        /// The payload object.
        payload: Map<String, Value>,
    },
}

impl SearchEvent {
    /// Decodes a raw event value into its tagged shape.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the event is not a JSON object or its
    /// body cannot be decoded per the body-decoding policy.
    pub fn from_value(event: &Value) -> Result<Self> {
        let Some(object) = event.as_object() else {
            return Err(Error::validation("Event payload must be a JSON object"));
        };

        if object.contains_key("body") {
            parse_gateway_event(object)
        } else {
            parse_direct_event(object)
        }
    }

    /// Returns the payload object for field extraction.
    #[must_use]
    pub fn payload(&self) -> &Map<String, Value> {
        match self {
            Self::Gateway { payload, .. } | Self::Direct { payload } => payload,
        }
    }

    /// Returns the authorizer-sourced user id, if the shape carries one.
    #[must_use]
    pub fn authorizer_user_id(&self) -> Option<&str> {
        match self {
            Self::Gateway {
                authorizer_user_id, ..
            } => authorizer_user_id.as_deref(),
            Self::Direct { .. } => None,
        }
    }

    /// Returns the trace header embedded in the event, if any.
    #[must_use]
    pub fn trace_header(&self) -> Option<&str> {
        match self {
            Self::Gateway { trace_header, .. } => trace_header.as_deref(),
            Self::Direct { .. } => None,
        }
    }
}

/// Parses a gateway-wrapped event (shape A).
fn parse_gateway_event(event: &Map<String, Value>) -> Result<SearchEvent> {
    let payload = decode_body(event)?;

    let authorizer_user_id = event
        .get("requestContext")
        .and_then(|ctx| ctx.get("authorizer"))
        .and_then(|auth| auth.get("userId"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    let trace_header = event
        .get("headers")
        .and_then(Value::as_object)
        .and_then(trace_header_from_map);

    Ok(SearchEvent::Gateway {
        payload,
        authorizer_user_id,
        trace_header,
    })
}

/// Parses a direct-invocation event (shape B).
fn parse_direct_event(event: &Map<String, Value>) -> Result<SearchEvent> {
    Ok(SearchEvent::Direct {
        payload: event.clone(),
    })
}

/// Decodes the `body` field of a gateway-wrapped event.
///
/// A base64-flagged body is decoded to UTF-8 text first. Blank text becomes
/// an empty object (required-field validation then fails downstream rather
/// than here). Non-empty text must parse as a JSON object.
fn decode_body(event: &Map<String, Value>) -> Result<Map<String, Value>> {
    let body = event.get("body").cloned().unwrap_or(Value::Null);
    let is_base64 = event
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let body = match body {
        Value::String(text) if is_base64 => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(text.trim())
                .map_err(|_| Error::validation("Request body must be valid base64"))?;
            let text = String::from_utf8(bytes)
                .map_err(|_| Error::validation("Request body must be UTF-8 text"))?;
            Value::String(text)
        }
        other => other,
    };

    match body {
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(Map::new());
            }
            let parsed: Value = serde_json::from_str(text)
                .map_err(|_| Error::validation("Request body must be valid JSON"))?;
            match parsed {
                Value::Object(map) => Ok(map),
                _ => Err(Error::validation("Unsupported request body format")),
            }
        }
        Value::Object(map) => Ok(map),
        _ => Err(Error::validation("Unsupported request body format")),
    }
}

fn trace_header_from_map(headers: &Map<String, Value>) -> Option<String> {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(TRACE_HEADER))
        .and_then(|(_, value)| value.as_str())
        .map(str::to_string)
}
