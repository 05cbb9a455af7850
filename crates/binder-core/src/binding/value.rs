//! Typed values and target types.
//!
//! A `TypedValue` is the terminal artifact every conversion produces: the
//! concrete value paired with the type it was declared as. A `TargetType` is
//! what a handler parameter declares, expressed the only way a static
//! language can express "decode into whatever class the method wants": the
//! decode step for `T` is captured as a closure when the target is created,
//! so the registry side stays fully type-erased.
//!
//! # Type erasure
//! - 表層: `TargetType::of::<T>()` - 型安全（T は呼び出し側が静的に知っている）
//! - 内部: `TypedValue { Box<dyn Any>, TypeInfo }` - object-safe, type erasure

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::domain::BindError;

/// Runtime identity of a Rust type: `TypeId` for exact matching plus the
/// type name for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A successfully converted value together with its declared type.
///
/// Invariant: `actual` downcasts to `declared`. The only constructor
/// (`new::<T>`) makes both from the same `T`, so holders can trust the pair;
/// they still check `declared_type()` against their own requested type
/// before reading `actual`.
pub struct TypedValue {
    actual: Box<dyn Any + Send>,
    declared: TypeInfo,
}

impl TypedValue {
    pub fn new<T: Any + Send>(actual: T) -> Self {
        Self {
            actual: Box::new(actual),
            declared: TypeInfo::of::<T>(),
        }
    }

    pub fn declared_type(&self) -> TypeInfo {
        self.declared
    }

    pub fn is<T: Any>(&self) -> bool {
        self.declared.id == TypeId::of::<T>()
    }

    /// Take the value out as `T`. Returns `self` back on a type mismatch so
    /// the caller can report the declared type.
    pub fn downcast<T: Any>(self) -> Result<T, TypedValue> {
        let declared = self.declared;
        match self.actual.downcast::<T>() {
            Ok(v) => Ok(*v),
            Err(actual) => Err(TypedValue { actual, declared }),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.actual.downcast_ref()
    }

    /// Type-erased view, used when appending to an invocation descriptor.
    pub fn into_boxed(self) -> Box<dyn Any + Send> {
        self.actual
    }
}

impl fmt::Debug for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedValue")
            .field("declared", &self.declared.name)
            .finish_non_exhaustive()
    }
}

type DecodeFn = Arc<dyn Fn(serde_json::Value) -> Result<TypedValue, BindError> + Send + Sync>;
type AbsentFn = Arc<dyn Fn() -> TypedValue + Send + Sync>;

/// The type a handler parameter declares, as seen by the conversion side.
///
/// Carries the type identity, the generic-decoder entry point for that type
/// (`serde_json::Value` tree -> value), and, for `Option<T>` parameters, a
/// producer of the absent value.
#[derive(Clone)]
pub struct TargetType {
    info: TypeInfo,
    decode: DecodeFn,
    absent: Option<AbsentFn>,
}

impl TargetType {
    /// Target for a concrete parameter type.
    pub fn of<T>() -> Self
    where
        T: DeserializeOwned + Any + Send,
    {
        let info = TypeInfo::of::<T>();
        Self {
            info,
            decode: Arc::new(move |tree| {
                serde_json::from_value::<T>(tree)
                    .map(TypedValue::new)
                    .map_err(|source| BindError::Decode {
                        target: info.name(),
                        source,
                    })
            }),
            absent: None,
        }
    }

    /// Target for an `Option<T>` parameter. Same decode path as
    /// `of::<Option<T>>()`, but additionally compatible with absence: a
    /// null-like input may satisfy it with `None`.
    pub fn optional<T>() -> Self
    where
        T: DeserializeOwned + Any + Send,
    {
        let mut target = Self::of::<Option<T>>();
        target.absent = Some(Arc::new(|| TypedValue::new(None::<T>)));
        target
    }

    pub fn info(&self) -> TypeInfo {
        self.info
    }

    pub fn id(&self) -> TypeId {
        self.info.id()
    }

    pub fn name(&self) -> &'static str {
        self.info.name()
    }

    /// Run the generic decoder against a parsed tree.
    pub(crate) fn decode_tree(&self, tree: serde_json::Value) -> Result<TypedValue, BindError> {
        (self.decode)(tree)
    }

    /// The value representing "nothing was provided", if this target admits
    /// one. Plain targets return `None` here.
    pub(crate) fn absent_value(&self) -> Option<TypedValue> {
        self.absent.as_ref().map(|make| make())
    }
}

impl fmt::Debug for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetType")
            .field("name", &self.info.name)
            .finish_non_exhaustive()
    }
}
