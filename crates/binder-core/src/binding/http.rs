//! Composite-request variant and name-based child resolution.
//!
//! `HttpInput` wraps a decoded composite request. It converts two ways:
//! an explicit handler assembles the generic [`HttpRequest`] message from
//! the request's own fields, and a fallback conversion delegates every other
//! target to the nested body variant. It also exposes the request's field
//! namespaces (headers, query, params) for name-based child lookup.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::input::{InputData, NullInput, TextInput};
use super::registry::ConversionRegistry;
use super::value::{TargetType, TypedValue};
use crate::domain::{BindError, HttpPayload};

/// The generic request-message type handlers can declare as a parameter.
///
/// Assembled from the composite payload's fields; the body is carried as
/// best-effort text (a body that cannot convert to text is simply absent
/// here, never an error).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: String,
    pub uri: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub query_params: HashMap<String, String>,
}

/// Composite-request input variant.
#[derive(Debug)]
pub struct HttpInput {
    name: Option<String>,
    payload: Arc<HttpPayload>,
    body: Arc<InputData>,
    registry: ConversionRegistry,
}

impl HttpInput {
    /// Classifies the nested body (substituting a null variant when absent),
    /// then registers: the explicit `HttpRequest` handler, and the fallback
    /// conversion that delegates to the body.
    pub fn new(name: Option<String>, payload: HttpPayload) -> Result<Self, BindError> {
        let payload = Arc::new(payload);
        let body = Arc::new(match payload.body.clone() {
            Some(data) => InputData::classify(None, *data)?,
            None => InputData::Null(NullInput),
        });

        let mut registry = ConversionRegistry::new();
        {
            let payload = Arc::clone(&payload);
            let body = Arc::clone(&body);
            registry.register_assignment::<HttpRequest, _>(move || {
                Ok(TypedValue::new(assemble_request(&payload, &body)))
            });
        }
        {
            let body = Arc::clone(&body);
            registry.set_or_else_conversion(move |target| body.convert_to(target));
        }

        Ok(Self {
            name,
            payload,
            body,
            registry,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn body(&self) -> &InputData {
        &self.body
    }

    pub fn convert_to(&self, target: &TargetType) -> Result<Option<TypedValue>, BindError> {
        self.registry.convert_to(target)
    }

    /// Resolve a named child against the field namespaces.
    ///
    /// Search order is the declared namespace order: headers, then query
    /// parameters, then route parameters. A name present in more than one
    /// namespace resolves to the first hit; later namespaces are never
    /// consulted for a conflicting second match. This first-match policy is
    /// the contract, not an accident of iteration order.
    pub fn lookup_child(&self, child: &str) -> Option<InputData> {
        self.field_maps().into_iter().find_map(|map| {
            map.get(child).map(|value| {
                InputData::Text(TextInput::new(Some(child.to_string()), value.clone()))
            })
        })
    }

    /// Field namespaces in declared (and therefore search) order.
    fn field_maps(&self) -> [&HashMap<String, String>; 3] {
        [
            &self.payload.headers,
            &self.payload.query,
            &self.payload.params,
        ]
    }
}

/// Build the generic request message from the composite payload.
///
/// The body is converted to text best-effort: a conversion failure is
/// swallowed and treated as "no body content".
fn assemble_request(payload: &HttpPayload, body: &InputData) -> HttpRequest {
    let body_text = body
        .convert_to(&TargetType::of::<String>())
        .ok()
        .flatten()
        .and_then(|value| value.downcast::<String>().ok());

    HttpRequest {
        method: payload.method.clone(),
        uri: payload.url.clone(),
        body: body_text,
        headers: payload.headers.clone(),
        query_params: payload.query.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WireData;
    use rstest::rstest;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct RunRequest {
        job: String,
    }

    fn request_payload() -> HttpPayload {
        HttpPayload {
            method: "POST".to_string(),
            url: "http://localhost:8080/api/run".to_string(),
            headers: HashMap::from([("X".to_string(), "1".to_string())]),
            query: HashMap::from([("q".to_string(), "2".to_string())]),
            params: HashMap::from([("id".to_string(), "3".to_string())]),
            body: Some(Box::new(WireData::Text(r#"{"job":"nightly"}"#.to_string()))),
        }
    }

    #[test]
    fn assembles_generic_request_message() {
        let input = HttpInput::new(None, request_payload()).unwrap();

        let value = input
            .convert_to(&TargetType::of::<HttpRequest>())
            .unwrap()
            .unwrap();
        let request = value.downcast::<HttpRequest>().unwrap();

        assert_eq!(request.method, "POST");
        assert_eq!(request.uri, "http://localhost:8080/api/run");
        assert_eq!(request.body.as_deref(), Some(r#"{"job":"nightly"}"#));
        assert_eq!(request.headers.get("X").map(String::as_str), Some("1"));
        assert_eq!(request.query_params.get("q").map(String::as_str), Some("2"));
    }

    #[test]
    fn delegates_other_targets_to_body() {
        let input = HttpInput::new(None, request_payload()).unwrap();

        let value = input
            .convert_to(&TargetType::of::<RunRequest>())
            .unwrap()
            .unwrap();
        assert_eq!(
            value.downcast::<RunRequest>().unwrap(),
            RunRequest {
                job: "nightly".to_string()
            }
        );
    }

    #[test]
    fn bodyless_request_still_yields_message_with_absent_body() {
        let payload = HttpPayload {
            body: None,
            ..request_payload()
        };
        let input = HttpInput::new(None, payload).unwrap();

        // body-dependent fallback has nothing to delegate to
        assert!(input.convert_to(&TargetType::of::<RunRequest>()).unwrap().is_none());

        // the explicit message handler still succeeds
        let value = input
            .convert_to(&TargetType::of::<HttpRequest>())
            .unwrap()
            .unwrap();
        assert_eq!(value.downcast::<HttpRequest>().unwrap().body, None);
    }

    #[rstest]
    #[case::binary(WireData::Bytes(vec![0xFF, 0xFE]))]
    #[case::json_object(WireData::Json(r#"{"job":"nightly"}"#.to_string()))]
    fn untextual_body_is_swallowed_as_no_body_content(#[case] body: WireData) {
        // bytes have no text conversion at all; a JSON object tree fails to
        // decode as a string; both end up as an absent body, not an error
        let payload = HttpPayload {
            body: Some(Box::new(body)),
            ..request_payload()
        };
        let input = HttpInput::new(None, payload).unwrap();

        let value = input
            .convert_to(&TargetType::of::<HttpRequest>())
            .unwrap()
            .unwrap();
        assert_eq!(value.downcast::<HttpRequest>().unwrap().body, None);
    }

    #[rstest]
    #[case::header("X", "1")]
    #[case::query("q", "2")]
    #[case::route_param("id", "3")]
    fn lookup_finds_child_in_each_namespace(#[case] name: &str, #[case] expected: &str) {
        let input = HttpInput::new(None, request_payload()).unwrap();

        let child = input.lookup_child(name).unwrap();
        assert_eq!(child.name(), Some(name));

        let value = child
            .convert_to(&TargetType::of::<String>())
            .unwrap()
            .unwrap();
        assert_eq!(value.downcast::<String>().unwrap(), expected);
    }

    #[test]
    fn lookup_is_first_match_in_declared_namespace_order() {
        let mut payload = request_payload();
        payload.headers.insert("dup".to_string(), "from-headers".to_string());
        payload.query.insert("dup".to_string(), "from-query".to_string());
        payload.params.insert("dup".to_string(), "from-params".to_string());
        let input = HttpInput::new(None, payload).unwrap();

        let value = input
            .lookup_child("dup")
            .unwrap()
            .convert_to(&TargetType::of::<String>())
            .unwrap()
            .unwrap();
        assert_eq!(value.downcast::<String>().unwrap(), "from-headers");

        // query shadows params once headers no longer match
        let mut payload = request_payload();
        payload.query.insert("dup".to_string(), "from-query".to_string());
        payload.params.insert("dup".to_string(), "from-params".to_string());
        let input = HttpInput::new(None, payload).unwrap();

        let value = input
            .lookup_child("dup")
            .unwrap()
            .convert_to(&TargetType::of::<String>())
            .unwrap()
            .unwrap();
        assert_eq!(value.downcast::<String>().unwrap(), "from-query");
    }

    #[test]
    fn lookup_miss_returns_none() {
        let input = HttpInput::new(None, request_payload()).unwrap();
        assert!(input.lookup_child("absent").is_none());
    }

    #[test]
    fn malformed_json_body_fails_at_construction() {
        let payload = HttpPayload {
            body: Some(Box::new(WireData::Json("{broken".to_string()))),
            ..request_payload()
        };
        let err = HttpInput::new(None, payload).unwrap_err();
        assert!(matches!(err, BindError::MalformedJson { .. }));
    }
}
