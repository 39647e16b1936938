//! Normalization of inbound events into validated execution requests.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::event::SearchEvent;
use crate::flags::{SearchFlagOverrides, SearchFlags};

/// A validated, normalized search-execution request.
///
/// Constructed exactly once per inbound event by [`parse_event`]; the search
/// id is minted here and never accepted from the caller.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchExecutionRequest {
    /// Freshly generated unique search identifier.
    pub search_id: String,
    /// Non-empty user identifier (authorizer context preferred).
    pub user_id: String,
    /// Non-empty search text.
    pub query: String,
    /// Merged pipeline flags (defaults plus caller overrides).
    pub flags: SearchFlags,
    /// Time the request was accepted, UTC.
    pub initiated_at: DateTime<Utc>,
}

impl SearchExecutionRequest {
    /// Renders the flat execution input payload for the workflow service.
    #[must_use]
    pub fn to_execution_input(&self) -> Value {
        serde_json::json!({
            "searchId": self.search_id,
            "userId": self.user_id,
            "query": self.query,
            "flags": self.flags,
            "initiatedAt": self.initiated_at,
        })
    }
}

/// Normalizes a raw inbound event into a [`SearchExecutionRequest`].
///
/// Accepts both wire shapes (see [`SearchEvent`]), validates required
/// fields, merges flag defaults under caller overrides, mints a fresh
/// search id, and stamps the current UTC time.
///
/// # Errors
///
/// Returns a validation error when the event cannot be decoded or a
/// required field is missing or empty.
pub fn parse_event(event: &Value, default_provider: &str) -> Result<SearchExecutionRequest> {
    let event = SearchEvent::from_value(event)?;
    let payload = event.payload();

    let user_id = match event.authorizer_user_id() {
        Some(id) => id.to_string(),
        None => require_non_empty_string(payload, "userId")?,
    };
    let query = require_non_empty_string(payload, "query")?;

    let overrides = flag_overrides(payload)?;
    let flags = SearchFlags::with_overrides(default_provider, overrides);

    Ok(SearchExecutionRequest {
        search_id: Uuid::new_v4().to_string(),
        user_id,
        query,
        flags,
        initiated_at: Utc::now(),
    })
}

fn flag_overrides(payload: &Map<String, Value>) -> Result<SearchFlagOverrides> {
    match payload.get("flags") {
        None | Some(Value::Null) => Ok(SearchFlagOverrides::default()),
        Some(value @ Value::Object(_)) => serde_json::from_value(value.clone())
            .map_err(|e| Error::validation(format!("flags are invalid: {e}"))),
        Some(_) => Err(Error::validation("flags must be an object")),
    }
}

/// Extracts a required field, coercing scalar values to trimmed strings.
fn require_non_empty_string(payload: &Map<String, Value>, field: &str) -> Result<String> {
    let rendered = match payload.get(field) {
        None | Some(Value::Null) => {
            return Err(Error::validation(format!("{field} is required")));
        }
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(_) | Value::Object(_)) => {
            return Err(Error::validation(format!("{field} must be a string")));
        }
    };

    if rendered.is_empty() {
        return Err(Error::validation(format!("{field} cannot be empty")));
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use serde_json::json;

    const PROVIDER: &str = "groq_llama";

    #[test]
    fn direct_event_normalizes() {
        let event = json!({"query": "find ml experts", "userId": "u1"});
        let request = parse_event(&event, PROVIDER).unwrap();
        assert_eq!(request.query, "find ml experts");
        assert_eq!(request.user_id, "u1");
        assert_eq!(request.flags.hyde_provider, "groq_llama");
        assert!(!request.search_id.is_empty());
    }

    #[test]
    fn gateway_event_prefers_authorizer_user_id() {
        let event = json!({
            "body": "{\"query\": \"q\", \"userId\": \"from-body\"}",
            "requestContext": {"authorizer": {"userId": "from-authorizer"}}
        });
        let request = parse_event(&event, PROVIDER).unwrap();
        assert_eq!(request.user_id, "from-authorizer");
    }

    #[test]
    fn gateway_event_falls_back_to_body_user_id() {
        let event = json!({"body": "{\"query\": \"q\", \"userId\": \"u9\"}"});
        let request = parse_event(&event, PROVIDER).unwrap();
        assert_eq!(request.user_id, "u9");
    }

    #[test]
    fn base64_body_normalizes_like_plain_body() {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(r#"{"query":"x","userId":"u3"}"#);
        let wrapped = json!({"body": encoded, "isBase64Encoded": true});
        let plain = json!({"body": r#"{"query":"x","userId":"u3"}"#});

        let from_wrapped = parse_event(&wrapped, PROVIDER).unwrap();
        let from_plain = parse_event(&plain, PROVIDER).unwrap();
        assert_eq!(from_wrapped.query, from_plain.query);
        assert_eq!(from_wrapped.user_id, from_plain.user_id);
        assert_eq!(from_wrapped.flags, from_plain.flags);
    }

    #[test]
    fn missing_query_names_the_field() {
        let event = json!({"userId": "u1"});
        let err = parse_event(&event, PROVIDER).unwrap_err();
        assert_eq!(err.to_string(), "query is required");
    }

    #[test]
    fn whitespace_query_is_empty() {
        let event = json!({"query": "   ", "userId": "u1"});
        let err = parse_event(&event, PROVIDER).unwrap_err();
        assert_eq!(err.to_string(), "query cannot be empty");
    }

    #[test]
    fn missing_user_id_without_authorizer_fails() {
        let event = json!({"body": "{\"query\": \"q\"}"});
        let err = parse_event(&event, PROVIDER).unwrap_err();
        assert_eq!(err.to_string(), "userId is required");
    }

    #[test]
    fn numeric_user_id_is_coerced() {
        let event = json!({"query": "q", "userId": 42});
        let request = parse_event(&event, PROVIDER).unwrap();
        assert_eq!(request.user_id, "42");
    }

    #[test]
    fn object_query_is_rejected() {
        let event = json!({"query": {"nested": true}, "userId": "u1"});
        let err = parse_event(&event, PROVIDER).unwrap_err();
        assert_eq!(err.to_string(), "query must be a string");
    }

    #[test]
    fn flag_overrides_merge_under_defaults() {
        let event = json!({
            "query": "q",
            "userId": "u1",
            "flags": {"reasoning": true, "hyde_provider": "openai", "custom": 1}
        });
        let request = parse_event(&event, PROVIDER).unwrap();
        assert!(request.flags.reasoning);
        assert_eq!(request.flags.hyde_provider, "openai");
        assert_eq!(request.flags.description_provider, "groq_llama");
        assert_eq!(request.flags.extra.get("custom"), Some(&json!(1)));
    }

    #[test]
    fn non_object_flags_are_rejected() {
        let event = json!({"query": "q", "userId": "u1", "flags": [1, 2]});
        let err = parse_event(&event, PROVIDER).unwrap_err();
        assert_eq!(err.to_string(), "flags must be an object");
    }

    #[test]
    fn search_ids_are_distinct_across_calls() {
        let event = json!({"query": "q", "userId": "u1"});
        let a = parse_event(&event, PROVIDER).unwrap();
        let b = parse_event(&event, PROVIDER).unwrap();
        assert_ne!(a.search_id, b.search_id);
    }

    #[test]
    fn execution_input_uses_camel_case_wire_keys() {
        let event = json!({"query": "q", "userId": "u1"});
        let request = parse_event(&event, PROVIDER).unwrap();
        let input = request.to_execution_input();
        assert_eq!(input["searchId"], json!(request.search_id));
        assert_eq!(input["userId"], json!("u1"));
        assert_eq!(input["flags"]["hyde_provider"], json!("groq_llama"));
        // RFC3339 UTC timestamp.
        let stamp = input["initiatedAt"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
    }
}
