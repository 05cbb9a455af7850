//! Errors - バインディングのエラー分類
//!
//! # 分類
//! - UnsupportedPayloadKind: 分類時の致命的エラー（未知の wire kind）
//! - MalformedJson: StructuredText の eager parse 失敗（構築時）
//! - Decode: 変換実行時の失敗（そのまま伝播、リトライなし）
//! - UnsatisfiedParameter: 必須パラメータに変換手段がない（バインド時）
//!
//! 「変換手段がない」こと自体はエラーではなく `Ok(None)` です。
//! この enum に入るのは、呼び出しの継続が不可能になった時点のみです。
//!
//! Builder の誤用（method 二重設定など）はここに含めません。
//! 入力の問題ではなく配線バグなので panic で落とします。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BindError {
    /// The wire carried a payload kind this worker does not understand.
    /// Fatal for the invocation attempt; never coerced into another kind.
    #[error("unsupported payload kind \"{0}\"")]
    UnsupportedPayloadKind(String),

    /// A structured-text payload failed to parse at variant construction.
    #[error("malformed structured-text payload: {source}")]
    MalformedJson {
        #[source]
        source: serde_json::Error,
    },

    /// A conversion was attempted and the generic decoder rejected the
    /// payload for the requested type. Distinct from "no conversion
    /// available", which is an empty result, not an error.
    #[error("cannot decode payload into {target}: {source}")]
    Decode {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// No conversion produced a value for a declared handler parameter.
    #[error("no conversion available for parameter {name} (target {target})")]
    UnsatisfiedParameter {
        name: String,
        target: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_offender() {
        let e = BindError::UnsupportedPayloadKind("collection_bytes".to_string());
        assert_eq!(
            e.to_string(),
            "unsupported payload kind \"collection_bytes\""
        );

        let e = BindError::UnsatisfiedParameter {
            name: "req".to_string(),
            target: "alloc::string::String",
        };
        assert!(e.to_string().contains("req"));
        assert!(e.to_string().contains("alloc::string::String"));
    }
}
