//! Method invocation descriptor and builder.
//!
//! Runs the bound handler method with the accumulated arguments. The
//! reflective call of the original worker becomes an explicit call through a
//! stored callable here, so there is no "invocation failed" envelope to
//! unwrap: whatever error the handler returns is handed back verbatim, and
//! upstream reporting sees the handler's own error semantics.
//!
//! Thread-Safety: single thread. One builder, one descriptor, one
//! invocation; no internal synchronization.

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// A failure raised by a handler or an instance supplier, carried verbatim.
pub type HandlerError = Box<dyn Error + Send + Sync>;

/// Type-erased argument, instance, or return value.
pub type BoxedValue = Box<dyn Any + Send>;

/// Supplies the owning instance for instance methods.
///
/// The supplier may fail (instance construction can); that failure
/// propagates unchanged and the method is never invoked. Static methods
/// ignore the supplier entirely.
pub trait InstanceSupplier {
    fn get(&self) -> Result<BoxedValue, HandlerError>;
}

impl<F> InstanceSupplier for F
where
    F: Fn() -> Result<BoxedValue, HandlerError>,
{
    fn get(&self) -> Result<BoxedValue, HandlerError> {
        self()
    }
}

/// Supplier for methods that take no instance. Asking it for one is a
/// wiring bug surfaced as an error, not a panic, since it reaches the
/// caller through the normal failure path.
pub struct NoInstance;

impl InstanceSupplier for NoInstance {
    fn get(&self) -> Result<BoxedValue, HandlerError> {
        Err("no instance available for an instance method".into())
    }
}

type StaticFn = Arc<dyn Fn(Vec<BoxedValue>) -> Result<BoxedValue, HandlerError> + Send + Sync>;
type InstanceFn =
    Arc<dyn Fn(BoxedValue, Vec<BoxedValue>) -> Result<BoxedValue, HandlerError> + Send + Sync>;

/// The stored callable standing in for a reflective method handle.
///
/// The callable owns its parameter checking: an argument count or type
/// mismatch surfaces as its own invocation-time error, never at build time.
#[derive(Clone)]
pub enum MethodHandle {
    /// Free function; needs no instance.
    Static(StaticFn),

    /// Method on an owning instance.
    Instance(InstanceFn),
}

impl MethodHandle {
    pub fn of_static<F>(call: F) -> Self
    where
        F: Fn(Vec<BoxedValue>) -> Result<BoxedValue, HandlerError> + Send + Sync + 'static,
    {
        Self::Static(Arc::new(call))
    }

    pub fn of_instance<F>(call: F) -> Self
    where
        F: Fn(BoxedValue, Vec<BoxedValue>) -> Result<BoxedValue, HandlerError>
            + Send
            + Sync
            + 'static,
    {
        Self::Instance(Arc::new(call))
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static(_))
    }
}

impl fmt::Debug for MethodHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_static() {
            "MethodHandle::Static"
        } else {
            "MethodHandle::Instance"
        })
    }
}

/// Immutable bundle of method handle plus ordered arguments for one call.
pub struct MethodInvokeInfo {
    method: MethodHandle,
    args: Vec<BoxedValue>,
}

impl MethodInvokeInfo {
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Perform the call.
    ///
    /// Instance methods first obtain the instance from the supplier; a
    /// supplier failure propagates unchanged without attempting invocation.
    /// Static methods never touch the supplier.
    pub fn invoke(self, instance_supplier: &dyn InstanceSupplier) -> Result<BoxedValue, HandlerError> {
        match self.method {
            MethodHandle::Static(call) => call(self.args),
            MethodHandle::Instance(call) => {
                let instance = instance_supplier.get()?;
                call(instance, self.args)
            }
        }
    }
}

/// Builder state machine: Empty -> MethodSet -> Building -> Built.
///
/// Misuse (setting the method twice, appending before a method exists,
/// building without one) is a bug in the surrounding wiring, not bad input,
/// and panics instead of returning an error.
#[derive(Default)]
pub struct InvocationBuilder {
    method: Option<MethodHandle>,
    args: Vec<BoxedValue>,
}

impl InvocationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the method handle. Exactly once.
    pub fn set_method(&mut self, method: MethodHandle) {
        assert!(
            self.method.is_none(),
            "invocation builder: method handle already set"
        );
        self.method = Some(method);
    }

    /// Append one argument in call order. No type checking happens here;
    /// the method handle checks at invoke time.
    pub fn append_argument(&mut self, argument: BoxedValue) {
        assert!(
            self.method.is_some(),
            "invocation builder: append_argument before set_method"
        );
        self.args.push(argument);
    }

    /// Finalize into an immutable descriptor.
    pub fn build(self) -> MethodInvokeInfo {
        let method = self
            .method
            .expect("invocation builder: build without a method handle");
        MethodInvokeInfo {
            method,
            args: self.args,
        }
    }
}
