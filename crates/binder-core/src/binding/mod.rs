//! Binding - 型付き入力データモデル
//!
//! transport が渡してきた復号済み payload を variant に分類し、handler の
//! 宣言型に合わせて遅延変換するレイヤーです。
//!
//! # 二層構造
//! - **表層（Typed）**: `TargetType::of::<T>()` - 型安全
//! - **内部（Dyn）**: `TypedValue` / `ConversionRegistry` - type erasure
//!
//! # モジュール
//! - **value**: TypedValue, TypeInfo, TargetType
//! - **registry**: ConversionRegistry（explicit → assignment → conversion）
//! - **input**: InputData の closed sum（Text / Json / Bytes / Http / Null）
//! - **http**: composite request variant と名前解決

pub mod http;
pub mod input;
pub mod registry;
pub mod value;

pub use self::http::{HttpInput, HttpRequest};
pub use self::input::{BytesInput, InputData, JsonInput, NullInput, TextInput};
pub use self::registry::ConversionRegistry;
pub use self::value::{TargetType, TypeInfo, TypedValue};
