//! Per-invocation values: dynamically typed arguments and outcomes, raised
//! faults, and the read-only join-point context advice bodies receive.
//!
//! The interception boundary is dynamically typed: arguments and return
//! values travel as `Box<dyn Any + Send>` and raised errors as [`Fault`]
//! values. Advice bodies downcast what they need; binding expectations
//! (see [`advice`](crate::advice)) make the declared types checkable without
//! running the body.

use std::{any::Any, error::Error as StdError, fmt, sync::Arc};

use crate::{
    descriptor::{MethodDescriptor, TypeDescriptor},
    proxy::{Proxy, TargetObject},
};

/// A dynamically typed argument value.
pub type ArgValue = Box<dyn Any + Send>;

/// A dynamically typed return value.
pub type ReturnValue = Box<dyn Any + Send>;

/// Outcome of one dispatched call: the target's (or an Around layer's)
/// return value, or the fault that ended it.
pub type CallOutcome = std::result::Result<ReturnValue, Fault>;

/// Outcome of one advice body. `Err` replaces the in-flight outcome of the
/// invocation; the dispatcher never swallows it.
pub type AdviceOutcome = std::result::Result<(), Fault>;

/// An error raised by a target or an advice body, propagated to the caller
/// unchanged in kind.
///
/// `Fault` is a cheap-to-clone shared handle; cloning never copies the
/// underlying error. The concrete error type stays downcastable, which is
/// how `AfterThrowing` type expectations are checked.
///
/// # Examples
///
/// ```
/// use weft::invocation::Fault;
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("account {0} is frozen")]
/// struct FrozenAccount(u64);
///
/// let fault = Fault::new(FrozenAccount(7));
/// assert!(fault.is::<FrozenAccount>());
/// assert_eq!(fault.downcast_ref::<FrozenAccount>().unwrap().0, 7);
/// ```
#[derive(Clone)]
pub struct Fault(Arc<dyn StdError + Send + Sync + 'static>);

impl Fault {
    /// Wrap a concrete error.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self(Arc::new(error))
    }

    /// Create a fault from a bare message, for code with no richer error
    /// type at hand.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(MessageFault(message.into()))
    }

    /// Whether the underlying error is of concrete type `E`.
    pub fn is<E>(&self) -> bool
    where
        E: StdError + 'static,
    {
        self.downcast_ref::<E>().is_some()
    }

    /// Borrow the underlying error as concrete type `E`, if it is one.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        let inner: &(dyn StdError + 'static) = &*self.0;
        inner.downcast_ref::<E>()
    }

    /// Identity comparison: whether both handles share one underlying error.
    ///
    /// The dispatcher uses this to recognize an Around body that forwards
    /// the exact fault its `proceed` returned.
    pub fn same(&self, other: &Fault) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fault({:?})", self.0)
    }
}

impl StdError for Fault {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.0)
    }
}

impl From<crate::Error> for Fault {
    fn from(error: crate::Error) -> Self {
        Self::new(error)
    }
}

#[derive(Debug)]
struct MessageFault(String);

impl fmt::Display for MessageFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for MessageFault {}

/// Read-only context for one join point: the call event advice runs around.
///
/// Created fresh for every dispatched call and discarded when the call
/// completes. Advice bodies receive a shared reference and must not assume
/// exclusive access to anything reachable through it.
pub struct JoinPoint<'a> {
    ty: &'a TypeDescriptor,
    method: &'a MethodDescriptor,
    args: &'a [ArgValue],
    target: &'a dyn TargetObject,
    proxy: Option<&'a Proxy>,
}

impl<'a> JoinPoint<'a> {
    /// Assemble a join point for one call.
    pub fn new(
        ty: &'a TypeDescriptor,
        method: &'a MethodDescriptor,
        args: &'a [ArgValue],
        target: &'a dyn TargetObject,
    ) -> Self {
        Self {
            ty,
            method,
            args,
            target,
            proxy: None,
        }
    }

    /// Record the proxy the call came through.
    pub fn with_proxy(mut self, proxy: &'a Proxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Descriptor of the target type.
    pub fn type_descriptor(&self) -> &TypeDescriptor {
        self.ty
    }

    /// Descriptor of the invoked operation.
    pub fn method(&self) -> &MethodDescriptor {
        self.method
    }

    /// The call's arguments.
    pub fn args(&self) -> &[ArgValue] {
        self.args
    }

    /// Downcast argument `index` to `T`, if present and of that type.
    pub fn arg<T: 'static>(&self, index: usize) -> Option<&T> {
        self.args.get(index)?.downcast_ref::<T>()
    }

    /// The raw target behind the proxy.
    pub fn target(&self) -> &dyn TargetObject {
        self.target
    }

    /// The proxy the call came through, when dispatch was proxy-fronted.
    pub fn proxy(&self) -> Option<&Proxy> {
        self.proxy
    }

    /// `Type.operation` form, for diagnostics.
    pub fn signature(&self) -> String {
        format!("{}.{}", self.ty.name, self.method.name)
    }
}

impl fmt::Debug for JoinPoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinPoint")
            .field("signature", &self.signature())
            .field("args", &self.args.len())
            .finish()
    }
}
