//! InputData - 復号済み payload の variant 階層
//!
//! wire kind ごとに 1 variant の closed sum type です。分類は網羅的 match
//! で行い、新しい kind の追加はコンパイル時チェックになります
//! （runtime の default 分岐では吸収しません）。
//!
//! # Variants
//! - **Text**: 生文字列。String へはそのまま、他の型へは generic decoder で再デコード
//! - **Json**: 構築時に一度だけ parse した tree。割り当て fallback で decode
//! - **Bytes**: `Vec<u8>` のみ。それ以外は「変換手段なし」
//! - **Http**: composite request（`http.rs` 参照）
//! - **Null**: body 不在の代役。absence を許す target のみ満たせる
//!
//! variant は 1 invocation につき 1 回構築され、構築後は不変です。

use std::sync::Arc;

use super::http::HttpInput;
use super::registry::ConversionRegistry;
use super::value::{TargetType, TypedValue};
use crate::domain::{BindError, WireData};

/// One decoded payload, classified and ready to convert.
#[derive(Debug)]
pub enum InputData {
    Text(TextInput),
    Json(JsonInput),
    Bytes(BytesInput),
    Http(HttpInput),
    Null(NullInput),
}

impl InputData {
    /// Classify a decoded wire payload into its variant.
    ///
    /// Exhaustive over the four supported kinds; an `Unknown` kind is a
    /// fatal construction error for the current invocation attempt.
    pub fn classify(name: Option<String>, data: WireData) -> Result<Self, BindError> {
        match data {
            WireData::Text(raw) => Ok(Self::Text(TextInput::new(name, raw))),
            WireData::Json(raw) => Ok(Self::Json(JsonInput::new(name, &raw)?)),
            WireData::Bytes(raw) => Ok(Self::Bytes(BytesInput::new(name, raw))),
            WireData::Http(payload) => Ok(Self::Http(HttpInput::new(name, payload)?)),
            WireData::Unknown { kind } => Err(BindError::UnsupportedPayloadKind(kind)),
        }
    }

    /// Binding name, if any. Top-level payloads may be unnamed; children
    /// produced by `lookup_child` always carry the looked-up name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Text(v) => v.name.as_deref(),
            Self::Json(v) => v.name.as_deref(),
            Self::Bytes(v) => v.name.as_deref(),
            Self::Http(v) => v.name(),
            Self::Null(_) => None,
        }
    }

    /// Ask this variant to produce a value of `target`'s type.
    ///
    /// `Ok(None)` = no conversion available; `Err` = a conversion ran and
    /// failed, propagated unchanged.
    pub fn convert_to(&self, target: &TargetType) -> Result<Option<TypedValue>, BindError> {
        match self {
            Self::Text(v) => v.registry.convert_to(target),
            Self::Json(v) => v.registry.convert_to(target),
            Self::Bytes(v) => v.registry.convert_to(target),
            Self::Http(v) => v.convert_to(target),
            Self::Null(v) => v.convert_to(target),
        }
    }

    /// Resolve a named child. Only the composite variant has children.
    pub fn lookup_child(&self, child: &str) -> Option<InputData> {
        match self {
            Self::Http(v) => v.lookup_child(child),
            _ => None,
        }
    }
}

/// Plain text payload.
#[derive(Debug)]
pub struct TextInput {
    name: Option<String>,
    raw: Arc<str>,
    registry: ConversionRegistry,
}

impl TextInput {
    pub fn new(name: Option<String>, raw: impl Into<Arc<str>>) -> Self {
        let raw: Arc<str> = raw.into();
        let mut registry = ConversionRegistry::new();

        // String target gets the raw text as-is; anything else goes through
        // the generic decoder, treating the raw text as serialized JSON.
        {
            let raw = Arc::clone(&raw);
            registry
                .register_assignment::<String, _>(move || Ok(TypedValue::new(raw.to_string())));
        }
        {
            let raw = Arc::clone(&raw);
            registry.set_or_else_conversion(move |target| {
                let tree = serde_json::from_str(&raw).map_err(|source| BindError::Decode {
                    target: target.name(),
                    source,
                })?;
                target.decode_tree(tree).map(Some)
            });
        }

        Self { name, raw, registry }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// Structured-text payload, parsed once at construction.
#[derive(Debug)]
pub struct JsonInput {
    name: Option<String>,
    tree: Arc<serde_json::Value>,
    registry: ConversionRegistry,
}

impl JsonInput {
    /// Parses eagerly; malformed input fails here, not at first conversion.
    pub fn new(name: Option<String>, raw: &str) -> Result<Self, BindError> {
        let tree: Arc<serde_json::Value> = Arc::new(
            serde_json::from_str(raw).map_err(|source| BindError::MalformedJson { source })?,
        );

        let mut registry = ConversionRegistry::new();
        {
            let tree = Arc::clone(&tree);
            registry.set_or_else_assignment(move |target| {
                target.decode_tree((*tree).clone()).map(Some)
            });
        }

        Ok(Self { name, tree, registry })
    }

    pub fn tree(&self) -> &serde_json::Value {
        &self.tree
    }
}

/// Raw binary payload. Assignable only to `Vec<u8>`.
#[derive(Debug)]
pub struct BytesInput {
    name: Option<String>,
    bytes: Arc<[u8]>,
    registry: ConversionRegistry,
}

impl BytesInput {
    pub fn new(name: Option<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes: Arc<[u8]> = bytes.into();
        let mut registry = ConversionRegistry::new();
        {
            let bytes = Arc::clone(&bytes);
            registry
                .register_assignment::<Vec<u8>, _>(move || Ok(TypedValue::new(bytes.to_vec())));
        }

        Self { name, bytes, registry }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Stand-in for an absent composite body.
///
/// Converts only to targets that declare an absent value
/// (`TargetType::optional`); every other request is "no conversion
/// available", never an error.
#[derive(Debug)]
pub struct NullInput;

impl NullInput {
    pub fn convert_to(&self, target: &TargetType) -> Result<Option<TypedValue>, BindError> {
        Ok(target.absent_value())
    }
}
