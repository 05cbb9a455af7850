//! Broker - 宣言パラメータと入力 payload の突き合わせ
//!
//! routing 済みの handler method（callable + 宣言パラメータ列）と、
//! transport が渡した payload 列から 1 回の呼び出しを組み立てます。
//!
//! # バインド手順（パラメータ宣言順）
//! 1. payload を全て variant に分類（失敗は即 abort）
//! 2. パラメータごとに入力元を選ぶ:
//!    名前一致 → 位置対応の順。名前付きで一致が無い/変換できない場合は
//!    composite 入力の子（headers / query / params）を名前で探す
//! 3. 宣言型へ変換。「変換手段なし」は UnsatisfiedParameter（致命的）
//! 4. 変換済み値を宣言順に builder へ積んで invoke
//!
//! リトライはしません。handler のエラーはそのまま持ち帰ります。

use thiserror::Error;

use crate::binding::{InputData, TargetType};
use crate::domain::{BindError, ParameterPayload};
use crate::invoke::{BoxedValue, HandlerError, InstanceSupplier, InvocationBuilder, MethodHandle};

/// One declared handler parameter.
pub struct ParameterSpec {
    /// Binding name, when the parameter is bound by name (e.g. a trigger
    /// payload or a request field). Unnamed parameters bind by position.
    pub name: Option<String>,
    pub target: TargetType,
}

impl ParameterSpec {
    pub fn named(name: impl Into<String>, target: TargetType) -> Self {
        Self {
            name: Some(name.into()),
            target,
        }
    }

    pub fn positional(target: TargetType) -> Self {
        Self { name: None, target }
    }
}

/// A routed handler method: the stored callable plus its declared
/// parameter list, in declaration order.
pub struct FunctionMethod {
    pub handle: MethodHandle,
    pub params: Vec<ParameterSpec>,
}

/// Failure leaving the broker: either this crate's binding error, or the
/// handler's own error carried verbatim (recover it with
/// [`DispatchError::into_handler_error`] to downcast).
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("{0}")]
    Handler(HandlerError),
}

impl DispatchError {
    /// Take the handler's original failure back out, untouched.
    pub fn into_handler_error(self) -> Result<HandlerError, DispatchError> {
        match self {
            Self::Handler(err) => Ok(err),
            other => Err(other),
        }
    }
}

impl FunctionMethod {
    /// Bind `payloads` to the declared parameters and invoke.
    ///
    /// One invocation, one thread; the instance supplier is only consulted
    /// when the underlying method needs an instance.
    pub fn dispatch(
        &self,
        payloads: Vec<ParameterPayload>,
        instance_supplier: &dyn InstanceSupplier,
    ) -> Result<BoxedValue, DispatchError> {
        let mut inputs = Vec::with_capacity(payloads.len());
        for payload in payloads {
            inputs.push(InputData::classify(payload.name, payload.data)?);
        }

        let mut builder = InvocationBuilder::new();
        builder.set_method(self.handle.clone());

        for (index, param) in self.params.iter().enumerate() {
            let value = bind_parameter(&inputs, index, param)?;
            builder.append_argument(value);
        }

        builder
            .build()
            .invoke(instance_supplier)
            .map_err(DispatchError::Handler)
    }
}

/// Resolve one declared parameter against the classified inputs.
fn bind_parameter(
    inputs: &[InputData],
    index: usize,
    param: &ParameterSpec,
) -> Result<BoxedValue, BindError> {
    if let Some(name) = &param.name {
        // a payload with the matching binding name wins
        if let Some(input) = inputs.iter().find(|input| input.name() == Some(name.as_str()))
            && let Some(value) = input.convert_to(&param.target)?
        {
            return Ok(value.into_boxed());
        }

        // otherwise probe composite inputs for a named child
        for input in inputs {
            if let Some(child) = input.lookup_child(name)
                && let Some(value) = child.convert_to(&param.target)?
            {
                return Ok(value.into_boxed());
            }
        }

        return Err(BindError::UnsatisfiedParameter {
            name: name.clone(),
            target: param.target.name(),
        });
    }

    let converted = match inputs.get(index) {
        Some(input) => input.convert_to(&param.target)?,
        None => None,
    };
    converted
        .map(|value| value.into_boxed())
        .ok_or_else(|| BindError::UnsatisfiedParameter {
            name: format!("#{index}"),
            target: param.target.name(),
        })
}
