//! Declarative advisor configuration.
//!
//! An advisor document declares *where* advice applies (pointcut patterns,
//! precedence, binding names) while the advice bodies themselves are
//! registered in code under stable handler names in a [`HandlerCatalog`].
//! Resolution pairs the two and fails fast on anything inconsistent: an
//! unknown handler, a handler registered for a different advice kind, a
//! missing binding, a malformed pattern.
//!
//! Binding type expectations come from the typed handler registration, not
//! the document — declarations stay static and validated, with no runtime
//! type discovery.

use std::{any::Any, collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    advice::{
        Advice, AdviceKind, AroundBody, FaultExpectation, ReturnBinding, ReturningBody,
        SimpleBody, ThrowingBody, ThrowsBinding, ValueExpectation,
    },
    advisor::{Advisor, Precedence},
    dispatch::Proceed,
    error::Error,
    invocation::{AdviceOutcome, CallOutcome, Fault, JoinPoint},
    pointcut::{NamePattern, Pointcut},
};

/// Named advice bodies referenced by advisor documents.
///
/// # Examples
///
/// ```
/// use weft::adapters::HandlerCatalog;
///
/// let handlers = HandlerCatalog::new()
///     .before("authorize", |jp| {
///         println!("checking access to {}", jp.signature());
///         Ok(())
///     })
///     .after_returning::<String, _>("audit_result", |_jp, value| {
///         println!("returned {value}");
///         Ok(())
///     });
/// assert!(handlers.contains("authorize"));
/// ```
#[derive(Clone, Default)]
pub struct HandlerCatalog {
    handlers: HashMap<String, Handler>,
}

#[derive(Clone)]
enum Handler {
    Before(SimpleBody),
    After(SimpleBody),
    AfterReturning {
        expectation: Option<ValueExpectation>,
        body: ReturningBody,
    },
    AfterThrowing {
        expectation: Option<FaultExpectation>,
        body: ThrowingBody,
    },
    Around(AroundBody),
}

impl Handler {
    fn kind(&self) -> AdviceKind {
        match self {
            Handler::Before(_) => AdviceKind::Before,
            Handler::After(_) => AdviceKind::After,
            Handler::AfterReturning { .. } => AdviceKind::AfterReturning,
            Handler::AfterThrowing { .. } => AdviceKind::AfterThrowing,
            Handler::Around(_) => AdviceKind::Around,
        }
    }
}

impl HandlerCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a Before handler.
    pub fn before<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&JoinPoint<'_>) -> AdviceOutcome + Send + Sync + 'static,
    {
        self.handlers
            .insert(name.into(), Handler::Before(Arc::new(body)));
        self
    }

    /// Register an After (finally) handler.
    pub fn after<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&JoinPoint<'_>) -> AdviceOutcome + Send + Sync + 'static,
    {
        self.handlers
            .insert(name.into(), Handler::After(Arc::new(body)));
        self
    }

    /// Register an Around handler.
    pub fn around<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&JoinPoint<'_>, Proceed<'_>) -> CallOutcome + Send + Sync + 'static,
    {
        self.handlers
            .insert(name.into(), Handler::Around(Arc::new(body)));
        self
    }

    /// Register an AfterReturning handler over a typed return value. The
    /// declared type becomes the binding's expectation: the body only runs
    /// when the target returned a `T`.
    pub fn after_returning<T, F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        T: 'static,
        F: Fn(&JoinPoint<'_>, &T) -> AdviceOutcome + Send + Sync + 'static,
    {
        let wrapped: ReturningBody = Arc::new(move |jp, value| match value.downcast_ref::<T>() {
            Some(typed) => body(jp, typed),
            None => Ok(()),
        });
        self.handlers.insert(
            name.into(),
            Handler::AfterReturning {
                expectation: Some(ValueExpectation::of::<T>()),
                body: wrapped,
            },
        );
        self
    }

    /// Register an AfterReturning handler that accepts any return value.
    pub fn after_returning_any<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&JoinPoint<'_>, &(dyn Any + Send)) -> AdviceOutcome + Send + Sync + 'static,
    {
        self.handlers.insert(
            name.into(),
            Handler::AfterReturning {
                expectation: None,
                body: Arc::new(body),
            },
        );
        self
    }

    /// Register an AfterThrowing handler filtered to concrete error type
    /// `E`.
    pub fn after_throwing<E, F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        E: std::error::Error + 'static,
        F: Fn(&JoinPoint<'_>, &Fault) -> AdviceOutcome + Send + Sync + 'static,
    {
        self.handlers.insert(
            name.into(),
            Handler::AfterThrowing {
                expectation: Some(FaultExpectation::of::<E>()),
                body: Arc::new(body),
            },
        );
        self
    }

    /// Register an AfterThrowing handler that observes any fault.
    pub fn after_throwing_any<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&JoinPoint<'_>, &Fault) -> AdviceOutcome + Send + Sync + 'static,
    {
        self.handlers.insert(
            name.into(),
            Handler::AfterThrowing {
                expectation: None,
                body: Arc::new(body),
            },
        );
        self
    }

    /// Whether a handler is registered under the name.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    fn get(&self, advisor: &str, name: &str) -> Result<&Handler> {
        self.handlers.get(name).ok_or_else(|| Error::UnknownHandler {
            advisor: advisor.to_string(),
            handler: name.to_string(),
        })
    }
}

/// Declared pointcut expression; mirrors
/// [`Pointcut`](crate::pointcut::Pointcut) with string patterns, validated
/// when resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum PointcutDecl {
    /// `{"method": {"pattern": "save*"}}`
    Method { pattern: String },
    /// Name and declared parameter-type patterns; exact arity.
    Signature { method: String, params: Vec<String> },
    /// Target type name glob.
    Within { pattern: String },
    /// Target type is the named type or a subtype.
    SubtypeOf { type_name: String },
    /// Marker present on the operation.
    MarkedMethod { marker: String },
    /// Marker present on the target type.
    MarkedType { marker: String },
    /// Marker present on any declared parameter.
    MarkedParam { marker: String },
    /// Conjunction.
    All { of: Vec<PointcutDecl> },
    /// Disjunction.
    Any { of: Vec<PointcutDecl> },
    /// Negation.
    Not { inner: Box<PointcutDecl> },
}

impl PointcutDecl {
    /// Compile the declaration, failing fast on malformed patterns.
    pub fn resolve(&self) -> Result<Pointcut> {
        match self {
            PointcutDecl::Method { pattern } => Ok(Pointcut::Method(NamePattern::parse(pattern)?)),
            PointcutDecl::Signature { method, params } => Ok(Pointcut::Signature {
                method: NamePattern::parse(method)?,
                params: params
                    .iter()
                    .map(|p| NamePattern::parse(p))
                    .collect::<Result<Vec<_>>>()?,
            }),
            PointcutDecl::Within { pattern } => Ok(Pointcut::Within(NamePattern::parse(pattern)?)),
            PointcutDecl::SubtypeOf { type_name } => {
                Ok(Pointcut::SubtypeOf(type_name.as_str().into()))
            }
            PointcutDecl::MarkedMethod { marker } => {
                Ok(Pointcut::MarkedMethod(marker.as_str().into()))
            }
            PointcutDecl::MarkedType { marker } => Ok(Pointcut::MarkedType(marker.as_str().into())),
            PointcutDecl::MarkedParam { marker } => {
                Ok(Pointcut::MarkedParam(marker.as_str().into()))
            }
            PointcutDecl::All { of } => Ok(Pointcut::All(
                of.iter().map(|p| p.resolve()).collect::<Result<Vec<_>>>()?,
            )),
            PointcutDecl::Any { of } => Ok(Pointcut::Any(
                of.iter().map(|p| p.resolve()).collect::<Result<Vec<_>>>()?,
            )),
            PointcutDecl::Not { inner } => Ok(Pointcut::Not(Box::new(inner.resolve()?))),
        }
    }
}

/// Declared advice: the kind, the handler name, and the outcome binding
/// where the kind requires one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdviceDecl {
    Before {
        handler: String,
    },
    AfterReturning {
        handler: String,
        #[serde(default)]
        returning: Option<String>,
    },
    AfterThrowing {
        handler: String,
        #[serde(default)]
        throwing: Option<String>,
    },
    After {
        handler: String,
    },
    Around {
        handler: String,
    },
}

impl AdviceDecl {
    fn handler(&self) -> &str {
        match self {
            AdviceDecl::Before { handler }
            | AdviceDecl::AfterReturning { handler, .. }
            | AdviceDecl::AfterThrowing { handler, .. }
            | AdviceDecl::After { handler }
            | AdviceDecl::Around { handler } => handler,
        }
    }

    fn kind(&self) -> AdviceKind {
        match self {
            AdviceDecl::Before { .. } => AdviceKind::Before,
            AdviceDecl::AfterReturning { .. } => AdviceKind::AfterReturning,
            AdviceDecl::AfterThrowing { .. } => AdviceKind::AfterThrowing,
            AdviceDecl::After { .. } => AdviceKind::After,
            AdviceDecl::Around { .. } => AdviceKind::Around,
        }
    }
}

/// One declared advisor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AdvisorDecl {
    /// Advisor name, unique within its scope.
    pub name: String,
    /// Declaring scope.
    pub scope: String,
    /// Order value; absent means unordered (sorts last).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    /// Where the advice applies.
    pub pointcut: PointcutDecl,
    /// What runs there.
    pub advice: AdviceDecl,
}

impl AdvisorDecl {
    /// Resolve the declaration against the handler catalog.
    ///
    /// # Errors
    ///
    /// Fails on a malformed pattern, an unknown handler, a handler
    /// registered for a different kind, or a missing outcome binding.
    pub fn resolve(&self, handlers: &HandlerCatalog) -> Result<Advisor> {
        let pointcut = self.pointcut.resolve()?;
        let handler = handlers.get(&self.name, self.advice.handler())?;

        if handler.kind() != self.advice.kind() {
            return Err(Error::HandlerKindMismatch {
                advisor: self.name.clone(),
                handler: self.advice.handler().to_string(),
                registered: handler.kind().to_string(),
                declared: self.advice.kind().to_string(),
            });
        }

        let advice = match (&self.advice, handler) {
            (AdviceDecl::Before { .. }, Handler::Before(body)) => Advice::Before(Arc::clone(body)),
            (AdviceDecl::After { .. }, Handler::After(body)) => Advice::After(Arc::clone(body)),
            (AdviceDecl::Around { .. }, Handler::Around(body)) => Advice::Around(Arc::clone(body)),
            (
                AdviceDecl::AfterReturning { returning, .. },
                Handler::AfterReturning { expectation, body },
            ) => {
                let name = returning.as_deref().ok_or_else(|| Error::MissingBinding {
                    advisor: self.name.clone(),
                    kind: AdviceKind::AfterReturning.to_string(),
                })?;
                Advice::AfterReturning {
                    binding: ReturnBinding::assembled(name, expectation.clone()),
                    body: Arc::clone(body),
                }
            }
            (
                AdviceDecl::AfterThrowing { throwing, .. },
                Handler::AfterThrowing { expectation, body },
            ) => {
                let name = throwing.as_deref().ok_or_else(|| Error::MissingBinding {
                    advisor: self.name.clone(),
                    kind: AdviceKind::AfterThrowing.to_string(),
                })?;
                Advice::AfterThrowing {
                    binding: ThrowsBinding::assembled(name, expectation.clone()),
                    body: Arc::clone(body),
                }
            }
            // Kinds were checked equal above.
            _ => unreachable!("advice declaration and handler kind diverged"),
        };

        let precedence = match self.order {
            Some(order) => Precedence::Ordered(order),
            None => Precedence::Unordered,
        };

        Ok(
            Advisor::new(self.name.clone(), self.scope.as_str(), pointcut, advice)
                .with_precedence(precedence),
        )
    }
}
