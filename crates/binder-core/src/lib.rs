//! binder-core
//!
//! Core building blocks for the binder worker: converts decoded wire
//! payloads into the strongly-typed values a handler method declares, then
//! performs the call.
//!
//! # モジュール構成
//! - **domain**: 復号済み wire payload の形状とエラー分類（WireData, BindError）
//! - **binding**: 型付き入力データモデル（InputData variants, ConversionRegistry, TargetType）
//! - **invoke**: 呼び出し記述子と builder（MethodHandle, InvocationBuilder）
//! - **broker**: 宣言パラメータと payload のバインドから invoke まで（FunctionMethod）
//!
//! # スコープ外（collaborator 側の責務）
//! - RPC transport / streaming session（wire bytes の復号まで）
//! - function 名から handler method への routing
//! - invocation をまたぐ並行制御（この core は 1 invocation = 1 thread）

pub mod binding;
pub mod broker;
pub mod domain;
pub mod invoke;
