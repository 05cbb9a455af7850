//! ConversionRegistry - variant ごとの変換ルール表
//!
//! # 三つの登録機構
//! - explicit per-type handler: `TypeId` 完全一致、変換済み値の supplier
//! - fallback assignment: パース済みツリーの割り当て向け catch-all
//! - fallback conversion: 生データ再デコード向け catch-all
//!
//! # 解決順序（固定・契約の一部）
//! 1. explicit handler（登録順に最初の一致）
//! 2. fallback assignment
//! 3. fallback conversion
//!
//! fallback が `Ok(None)` を返した場合は次の機構に進みます。
//! `Err` は「変換を試みて失敗した」であり、そのまま伝播します。
//!
//! # ライフサイクル
//! variant の構築中にのみ登録し、構築後は読み取り専用です
//! （built during construction, used during conversion）。

use std::any::{Any, TypeId};

use super::value::{TargetType, TypedValue};
use crate::domain::BindError;

type Supplier = Box<dyn Fn() -> Result<TypedValue, BindError> + Send + Sync>;
type Fallback = Box<dyn Fn(&TargetType) -> Result<Option<TypedValue>, BindError> + Send + Sync>;

/// Ordered conversion rules owned by one input variant.
#[derive(Default)]
pub struct ConversionRegistry {
    explicit: Vec<(TypeId, Supplier)>,
    assign_or_else: Option<Fallback>,
    convert_or_else: Option<Fallback>,
}

impl std::fmt::Debug for ConversionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionRegistry")
            .field("explicit", &self.explicit.len())
            .field("assign_or_else", &self.assign_or_else.is_some())
            .field("convert_or_else", &self.convert_or_else.is_some())
            .finish()
    }
}

impl ConversionRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register an exact-match handler for target type `T`.
    pub(crate) fn register_assignment<T, F>(&mut self, supplier: F)
    where
        T: Any,
        F: Fn() -> Result<TypedValue, BindError> + Send + Sync + 'static,
    {
        self.explicit.push((TypeId::of::<T>(), Box::new(supplier)));
    }

    /// Register the assignment-style catch-all (consulted before the
    /// conversion-style one).
    pub(crate) fn set_or_else_assignment<F>(&mut self, fallback: F)
    where
        F: Fn(&TargetType) -> Result<Option<TypedValue>, BindError> + Send + Sync + 'static,
    {
        self.assign_or_else = Some(Box::new(fallback));
    }

    /// Register the conversion-style catch-all (last resort).
    pub(crate) fn set_or_else_conversion<F>(&mut self, fallback: F)
    where
        F: Fn(&TargetType) -> Result<Option<TypedValue>, BindError> + Send + Sync + 'static,
    {
        self.convert_or_else = Some(Box::new(fallback));
    }

    /// Resolve a conversion for `target`.
    ///
    /// `Ok(None)` means no mechanism could satisfy the target, and is not
    /// an error. `Err` means a mechanism ran and failed; callers must not
    /// collapse the two.
    pub fn convert_to(&self, target: &TargetType) -> Result<Option<TypedValue>, BindError> {
        for (id, supply) in &self.explicit {
            if *id == target.id() {
                return supply().map(Some);
            }
        }
        if let Some(fallback) = &self.assign_or_else
            && let Some(value) = fallback(target)?
        {
            return Ok(Some(value));
        }
        if let Some(fallback) = &self.convert_or_else
            && let Some(value) = fallback(target)?
        {
            return Ok(Some(value));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::value::TargetType;

    fn registry_with_all_three() -> ConversionRegistry {
        let mut registry = ConversionRegistry::new();
        registry.register_assignment::<String, _>(|| Ok(TypedValue::new("explicit".to_string())));
        registry.set_or_else_assignment(|target| {
            if target.id() == std::any::TypeId::of::<i64>() {
                Ok(Some(TypedValue::new(1_i64)))
            } else {
                Ok(None)
            }
        });
        registry.set_or_else_conversion(|target| {
            if target.id() == std::any::TypeId::of::<i64>()
                || target.id() == std::any::TypeId::of::<bool>()
            {
                Ok(Some(TypedValue::new(true)))
            } else {
                Ok(None)
            }
        });
        registry
    }

    #[test]
    fn explicit_handler_wins_over_fallbacks() {
        let registry = registry_with_all_three();
        let value = registry.convert_to(&TargetType::of::<String>()).unwrap().unwrap();
        assert_eq!(value.downcast::<String>().unwrap(), "explicit");
    }

    #[test]
    fn assignment_fallback_runs_before_conversion_fallback() {
        let registry = registry_with_all_three();
        // both fallbacks claim i64; assignment must win
        let value = registry.convert_to(&TargetType::of::<i64>()).unwrap().unwrap();
        assert_eq!(value.downcast::<i64>().unwrap(), 1);
    }

    #[test]
    fn conversion_fallback_is_last_resort() {
        let registry = registry_with_all_three();
        let value = registry.convert_to(&TargetType::of::<bool>()).unwrap().unwrap();
        assert!(value.downcast::<bool>().unwrap());
    }

    #[test]
    fn no_mechanism_yields_empty_not_error() {
        let registry = registry_with_all_three();
        let result = registry.convert_to(&TargetType::of::<f64>()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn empty_registry_converts_nothing() {
        let registry = ConversionRegistry::new();
        assert!(registry.convert_to(&TargetType::of::<String>()).unwrap().is_none());
    }

    #[test]
    fn fallback_failure_propagates_as_error() {
        let mut registry = ConversionRegistry::new();
        registry.set_or_else_conversion(|target| {
            let bad = serde_json::from_str::<i64>("not json").unwrap_err();
            Err(crate::domain::BindError::Decode {
                target: target.name(),
                source: bad,
            })
        });

        let err = registry.convert_to(&TargetType::of::<i64>()).unwrap_err();
        assert!(matches!(err, BindError::Decode { .. }));
    }
}
