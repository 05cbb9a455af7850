//! Domain model (wire payloads, errors).
//!
//! - **wire**: transport が復号済みの payload 形状（WireData, HttpPayload）
//! - **errors**: バインディングのエラー分類（BindError）

pub mod errors;
pub mod wire;

pub use self::errors::BindError;
pub use self::wire::{HttpPayload, ParameterPayload, WireData};
