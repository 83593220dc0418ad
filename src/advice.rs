//! Advice: the units of behavior woven around matched calls.
//!
//! [`Advice`] is a closed tagged variant over the five advice kinds. The
//! dispatcher matches on it exhaustively; there is no open subclassing and
//! no downcasting of advice objects. `AfterReturning` and `AfterThrowing`
//! advice carry statically declared binding descriptors: the binding names
//! the parameter the outcome is delivered to, and an optional type
//! expectation built from a concrete Rust type decides whether the body
//! runs at all.

use std::{any::Any, error::Error as StdError, fmt, sync::Arc};

use crate::{
    Result,
    dispatch::Proceed,
    error::Error,
    invocation::{AdviceOutcome, CallOutcome, Fault, JoinPoint},
};

/// The five advice kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdviceKind {
    Before,
    AfterReturning,
    AfterThrowing,
    After,
    Around,
}

impl AdviceKind {
    /// Nesting rank used to break precedence ties within one declaring
    /// scope: lower rank nests further out. Note that plain `After` ranks
    /// above `AfterReturning`/`AfterThrowing` here even though the
    /// dispatcher runs it after them within the after phase.
    pub fn rank(self) -> u8 {
        match self {
            AdviceKind::Around => 0,
            AdviceKind::Before => 1,
            AdviceKind::After => 2,
            AdviceKind::AfterReturning => 3,
            AdviceKind::AfterThrowing => 4,
        }
    }
}

impl fmt::Display for AdviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdviceKind::Before => "before",
            AdviceKind::AfterReturning => "after_returning",
            AdviceKind::AfterThrowing => "after_throwing",
            AdviceKind::After => "after",
            AdviceKind::Around => "around",
        };
        write!(f, "{name}")
    }
}

/// Body of a `Before` or `After` advice.
pub type SimpleBody = Arc<dyn Fn(&JoinPoint<'_>) -> AdviceOutcome + Send + Sync>;

/// Body of an `AfterReturning` advice; receives the return value.
pub type ReturningBody = Arc<dyn Fn(&JoinPoint<'_>, &(dyn Any + Send)) -> AdviceOutcome + Send + Sync>;

/// Body of an `AfterThrowing` advice; receives the raised fault.
pub type ThrowingBody = Arc<dyn Fn(&JoinPoint<'_>, &Fault) -> AdviceOutcome + Send + Sync>;

/// Body of an `Around` advice; owns the decision to proceed.
pub type AroundBody = Arc<dyn Fn(&JoinPoint<'_>, Proceed<'_>) -> CallOutcome + Send + Sync>;

/// Type expectation on a bound return value.
///
/// Built from a concrete Rust type; carries a checkable predicate plus the
/// type name for diagnostics.
#[derive(Clone)]
pub struct ValueExpectation {
    type_name: &'static str,
    check: Arc<dyn Fn(&(dyn Any + Send)) -> bool + Send + Sync>,
}

impl ValueExpectation {
    /// Expect the return value to be a `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            check: Arc::new(|value| value.downcast_ref::<T>().is_some()),
        }
    }

    /// Whether the value satisfies the expectation.
    pub fn accepts(&self, value: &(dyn Any + Send)) -> bool {
        (self.check.as_ref())(value)
    }

    /// Name of the expected type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for ValueExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueExpectation({})", self.type_name)
    }
}

/// Type expectation on a bound fault.
#[derive(Clone)]
pub struct FaultExpectation {
    type_name: &'static str,
    check: Arc<dyn Fn(&Fault) -> bool + Send + Sync>,
}

impl FaultExpectation {
    /// Expect the fault's concrete error type to be `E`.
    ///
    /// Rust has no error subtyping, so "assignable to E" means exactly E:
    /// the check is a downcast of the concrete type.
    pub fn of<E>() -> Self
    where
        E: StdError + 'static,
    {
        Self {
            type_name: std::any::type_name::<E>(),
            check: Arc::new(|fault| fault.is::<E>()),
        }
    }

    /// Whether the fault satisfies the expectation.
    pub fn accepts(&self, fault: &Fault) -> bool {
        (self.check.as_ref())(fault)
    }

    /// Name of the expected error type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for FaultExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FaultExpectation({})", self.type_name)
    }
}

/// Statically declared binding for an `AfterReturning` advice.
///
/// # Examples
///
/// ```
/// use weft::advice::ReturnBinding;
///
/// // Runs for any return value.
/// let untyped = ReturnBinding::any("ret_val");
/// // Runs only when the target returned a String.
/// let typed = ReturnBinding::typed::<String>("ret_val");
/// assert_eq!(typed.name(), "ret_val");
/// ```
#[derive(Debug, Clone)]
pub struct ReturnBinding {
    name: String,
    expectation: Option<ValueExpectation>,
}

impl ReturnBinding {
    /// Bind the return value under `name` with no type expectation.
    pub fn any(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expectation: None,
        }
    }

    /// Assemble from parts; used by the declarative layer, where the name
    /// comes from the document and the expectation from the handler
    /// registration.
    pub(crate) fn assembled(name: impl Into<String>, expectation: Option<ValueExpectation>) -> Self {
        Self {
            name: name.into(),
            expectation,
        }
    }

    /// Bind the return value under `name`, expecting type `T`.
    pub fn typed<T: 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expectation: Some(ValueExpectation::of::<T>()),
        }
    }

    /// The bound parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type expectation, if any.
    pub fn expectation(&self) -> Option<&ValueExpectation> {
        self.expectation.as_ref()
    }

    /// Whether the advice body should run for this return value.
    pub fn accepts(&self, value: &(dyn Any + Send)) -> bool {
        match &self.expectation {
            Some(expectation) => expectation.accepts(value),
            None => true,
        }
    }
}

/// Statically declared binding for an `AfterThrowing` advice.
#[derive(Debug, Clone)]
pub struct ThrowsBinding {
    name: String,
    expectation: Option<FaultExpectation>,
}

impl ThrowsBinding {
    /// Bind the fault under `name` with no type expectation.
    pub fn any(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expectation: None,
        }
    }

    /// Assemble from parts; used by the declarative layer.
    pub(crate) fn assembled(name: impl Into<String>, expectation: Option<FaultExpectation>) -> Self {
        Self {
            name: name.into(),
            expectation,
        }
    }

    /// Bind the fault under `name`, expecting concrete error type `E`.
    pub fn typed<E>(name: impl Into<String>) -> Self
    where
        E: StdError + 'static,
    {
        Self {
            name: name.into(),
            expectation: Some(FaultExpectation::of::<E>()),
        }
    }

    /// The bound parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type expectation, if any.
    pub fn expectation(&self) -> Option<&FaultExpectation> {
        self.expectation.as_ref()
    }

    /// Whether the advice body should run for this fault.
    pub fn accepts(&self, fault: &Fault) -> bool {
        match &self.expectation {
            Some(expectation) => expectation.accepts(fault),
            None => true,
        }
    }
}

/// A unit of behavior to run relative to a matched call.
///
/// Cloning shares the body (`Arc`); it never copies captured state.
#[derive(Clone)]
pub enum Advice {
    /// Runs before the target; an error short-circuits the call.
    Before(SimpleBody),
    /// Runs when the underlying call returned normally and the binding
    /// accepts the value.
    AfterReturning {
        binding: ReturnBinding,
        body: ReturningBody,
    },
    /// Runs when the underlying call raised and the binding accepts the
    /// fault.
    AfterThrowing {
        binding: ThrowsBinding,
        body: ThrowingBody,
    },
    /// Runs after the underlying call regardless of outcome.
    After(SimpleBody),
    /// Wraps the rest of the chain; owns the decision to proceed.
    Around(AroundBody),
}

impl Advice {
    /// Before advice from a closure.
    pub fn before<F>(body: F) -> Self
    where
        F: Fn(&JoinPoint<'_>) -> AdviceOutcome + Send + Sync + 'static,
    {
        Advice::Before(Arc::new(body))
    }

    /// AfterReturning advice from a binding and a closure over the untyped
    /// return value.
    pub fn after_returning<F>(binding: ReturnBinding, body: F) -> Self
    where
        F: Fn(&JoinPoint<'_>, &(dyn Any + Send)) -> AdviceOutcome + Send + Sync + 'static,
    {
        Advice::AfterReturning {
            binding,
            body: Arc::new(body),
        }
    }

    /// AfterReturning advice over a typed return value. The binding is
    /// `typed::<T>`, so the body only ever sees a `T`.
    pub fn after_returning_typed<T, F>(name: impl Into<String>, body: F) -> Self
    where
        T: 'static,
        F: Fn(&JoinPoint<'_>, &T) -> AdviceOutcome + Send + Sync + 'static,
    {
        Self::after_returning(ReturnBinding::typed::<T>(name), move |jp, value| {
            match value.downcast_ref::<T>() {
                Some(typed) => body(jp, typed),
                // The binding check keeps mismatches out; nothing to do here.
                None => Ok(()),
            }
        })
    }

    /// AfterThrowing advice from a binding and a closure over the fault.
    pub fn after_throwing<F>(binding: ThrowsBinding, body: F) -> Self
    where
        F: Fn(&JoinPoint<'_>, &Fault) -> AdviceOutcome + Send + Sync + 'static,
    {
        Advice::AfterThrowing {
            binding,
            body: Arc::new(body),
        }
    }

    /// After (finally) advice from a closure.
    pub fn after<F>(body: F) -> Self
    where
        F: Fn(&JoinPoint<'_>) -> AdviceOutcome + Send + Sync + 'static,
    {
        Advice::After(Arc::new(body))
    }

    /// Around advice from a closure receiving the proceed capability.
    pub fn around<F>(body: F) -> Self
    where
        F: Fn(&JoinPoint<'_>, Proceed<'_>) -> CallOutcome + Send + Sync + 'static,
    {
        Advice::Around(Arc::new(body))
    }

    /// The advice kind.
    pub fn kind(&self) -> AdviceKind {
        match self {
            Advice::Before(_) => AdviceKind::Before,
            Advice::AfterReturning { .. } => AdviceKind::AfterReturning,
            Advice::AfterThrowing { .. } => AdviceKind::AfterThrowing,
            Advice::After(_) => AdviceKind::After,
            Advice::Around(_) => AdviceKind::Around,
        }
    }

    /// Validate binding metadata, reporting violations against `advisor`.
    ///
    /// Binding names must be identifiers (`[A-Za-z_][A-Za-z0-9_]*`). This
    /// runs at registration time; nothing here is ever checked during
    /// dispatch.
    pub(crate) fn validate(&self, advisor: &str) -> Result<()> {
        let binding_name = match self {
            Advice::AfterReturning { binding, .. } => Some(binding.name()),
            Advice::AfterThrowing { binding, .. } => Some(binding.name()),
            _ => None,
        };
        if let Some(name) = binding_name {
            if !is_identifier(name) {
                return Err(Error::InvalidBindingName {
                    advisor: advisor.to_string(),
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advice::AfterReturning { binding, .. } => f
                .debug_struct("AfterReturning")
                .field("binding", binding)
                .finish_non_exhaustive(),
            Advice::AfterThrowing { binding, .. } => f
                .debug_struct("AfterThrowing")
                .field("binding", binding)
                .finish_non_exhaustive(),
            other => write!(f, "{}", other.kind()),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
