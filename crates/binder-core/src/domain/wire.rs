//! Decoded wire payload model.
//!
//! This module is transport-agnostic: it does not assume gRPC, framing, or
//! any particular session protocol. It only defines the "shape" of a payload
//! after the transport collaborator has decoded the wire bytes, which is the
//! boundary this crate starts from.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One decoded payload, tagged with its wire kind.
///
/// The transport decodes a oneof-style message into this enum. `Unknown`
/// carries the tag of a case introduced by a newer protocol revision than
/// this worker understands; classification treats it as fatal rather than
/// coercing it into one of the supported kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum WireData {
    /// Plain text payload.
    Text(String),

    /// Structured text (JSON) payload, still in its serialized form.
    Json(String),

    /// Raw binary payload.
    Bytes(Vec<u8>),

    /// Composite request payload with nested body and field namespaces.
    Http(HttpPayload),

    /// A wire case this worker does not support (yet).
    Unknown { kind: String },
}

/// Composite-request record: method, URL, an optional nested body payload,
/// and three name-to-text field namespaces.
///
/// The namespace declaration order (headers, query, params) is load-bearing:
/// it is also the child-lookup search order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpPayload {
    pub method: String,
    pub url: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub query: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub params: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Box<WireData>>,
}

/// One parameter's worth of input, as handed over by the transport.
///
/// `name` is the binding name from the invocation request; top-level
/// payloads may be unnamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub data: WireData,
}

impl ParameterPayload {
    pub fn named(name: impl Into<String>, data: WireData) -> Self {
        Self {
            name: Some(name.into()),
            data,
        }
    }

    pub fn unnamed(data: WireData) -> Self {
        Self { name: None, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_data_is_tagged_enum() {
        let d = WireData::Text("hello".to_string());
        let v: serde_json::Value = serde_json::to_value(&d).unwrap();
        assert_eq!(v["kind"], "text");
        assert_eq!(v["value"], "hello");
    }

    #[test]
    fn http_payload_roundtrip_json() {
        let p = HttpPayload {
            method: "POST".to_string(),
            url: "http://localhost/api/run".to_string(),
            headers: HashMap::from([("X-Id".to_string(), "1".to_string())]),
            body: Some(Box::new(WireData::Json("{\"n\":1}".to_string()))),
            ..Default::default()
        };

        let s = serde_json::to_string(&p).unwrap();
        let back: HttpPayload = serde_json::from_str(&s).unwrap();
        assert_eq!(back, p);
    }
}
