//! The proxy front: the object callers actually invoke.
//!
//! A [`Proxy`] projects the capability surface its type descriptor
//! advertises and forwards every call through the dispatcher with the
//! resolved chain — never to the raw target directly.
//!
//! The self-invocation boundary is inherent to interception by wrapping:
//! when target code calls one of its own operations internally (without
//! going back through the proxy), that inner call bypasses the entire
//! advice chain. This is the defining boundary of proxy-based
//! interception, preserved here as documented behavior.

use std::{fmt, sync::Arc};

use crate::{
    Result,
    chain::{ChainBuilder, ChainCache, InterceptorChain},
    descriptor::{MethodDescriptor, TypeDescriptor},
    dispatch,
    error::Error,
    invocation::{ArgValue, CallOutcome, Fault, JoinPoint},
    registry::AdvisorRegistry,
};

/// A target object behind a proxy.
///
/// The core never decides what the capability surface is — the type
/// descriptor does. A target receives the descriptor of the invoked
/// operation and the call's arguments, and produces the call outcome.
pub trait TargetObject: Send + Sync {
    /// Perform the real operation.
    fn invoke(&self, method: &MethodDescriptor, args: &[ArgValue]) -> CallOutcome;
}

/// The object clients call instead of the raw target.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use weft::chain::ChainCache;
/// use weft::descriptor::{MethodDescriptor, TypeDescriptor};
/// use weft::invocation::{ArgValue, CallOutcome};
/// use weft::proxy::{Proxy, TargetObject};
/// use weft::registry::AdvisorRegistry;
///
/// struct Greeter;
///
/// impl TargetObject for Greeter {
///     fn invoke(&self, method: &MethodDescriptor, _args: &[ArgValue]) -> CallOutcome {
///         match method.name.as_str() {
///             "greet" => Ok(Box::new("hello".to_string())),
///             other => unreachable!("not on the surface: {other}"),
///         }
///     }
/// }
///
/// let descriptor = Arc::new(TypeDescriptor::new("Greeter").method(MethodDescriptor::new("greet")));
/// let registry = Arc::new(AdvisorRegistry::builder().build()?);
/// let proxy = Proxy::new(descriptor, Arc::new(Greeter), registry, Arc::new(ChainCache::new()));
///
/// let outcome = proxy.call("greet", &[]);
/// assert_eq!(outcome.unwrap().downcast_ref::<String>().unwrap(), "hello");
/// # Ok::<(), weft::Error>(())
/// ```
pub struct Proxy {
    descriptor: Arc<TypeDescriptor>,
    target: Arc<dyn TargetObject>,
    builder: ChainBuilder,
    chains: Arc<ChainCache>,
}

impl Proxy {
    /// Front a target with the given descriptor, registry and shared chain
    /// cache.
    pub fn new(
        descriptor: Arc<TypeDescriptor>,
        target: Arc<dyn TargetObject>,
        registry: Arc<AdvisorRegistry>,
        chains: Arc<ChainCache>,
    ) -> Self {
        Self {
            descriptor,
            target,
            builder: ChainBuilder::new(registry),
            chains,
        }
    }

    /// Invoke an operation on the advertised surface.
    ///
    /// Every call is routed through the dispatcher with the operation's
    /// resolved chain. Calls naming an operation outside the surface fail
    /// with a [`Fault`] wrapping [`Error::UnknownOperation`].
    pub fn call(&self, operation: &str, args: &[ArgValue]) -> CallOutcome {
        let Some(method) = self.descriptor.operation(operation) else {
            return Err(Fault::new(Error::UnknownOperation {
                type_name: self.descriptor.name.to_string(),
                operation: operation.to_string(),
            }));
        };

        let chain = self.chains.chain_for(&self.descriptor, method, &self.builder);
        let jp = JoinPoint::new(&self.descriptor, method, args, self.target.as_ref())
            .with_proxy(self);

        dispatch::run(&chain, &jp, || self.target.invoke(method, args))
    }

    /// The advertised capability surface.
    pub fn surface(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.descriptor.methods.iter()
    }

    /// Descriptor of the proxied type.
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// The raw target. Calling it directly bypasses the advice chain —
    /// that is the self-invocation boundary, not an API to reach for.
    pub fn target(&self) -> &Arc<dyn TargetObject> {
        &self.target
    }

    /// Resolve (or fetch the cached) chain for one operation, for
    /// inspection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownOperation`] if the operation is not on the
    /// surface.
    pub fn chain_for(&self, operation: &str) -> Result<Arc<InterceptorChain>> {
        let method = self
            .descriptor
            .operation(operation)
            .ok_or_else(|| Error::UnknownOperation {
                type_name: self.descriptor.name.to_string(),
                operation: operation.to_string(),
            })?;
        Ok(self.chains.chain_for(&self.descriptor, method, &self.builder))
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("type", &self.descriptor.name)
            .field("surface", &self.descriptor.methods.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::Advice;
    use crate::advisor::Advisor;
    use crate::pointcut::Pointcut;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        calls: AtomicUsize,
    }

    impl TargetObject for Counter {
        fn invoke(&self, method: &MethodDescriptor, _args: &[ArgValue]) -> CallOutcome {
            match method.name.as_str() {
                "bump" => {
                    let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
                    Ok(Box::new(n))
                }
                _ => Err(Fault::message("unsupported")),
            }
        }
    }

    fn descriptor() -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::new("Counter").method(MethodDescriptor::new("bump")))
    }

    #[test]
    fn test_calls_route_through_advice() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_by_advice = Arc::clone(&seen);
        let registry = Arc::new(
            AdvisorRegistry::builder()
                .register(Advisor::new(
                    "watch",
                    "s",
                    Pointcut::method_glob("bump").unwrap(),
                    Advice::before(move |_| {
                        seen_by_advice.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }),
                ))
                .build()
                .unwrap(),
        );

        let proxy = Proxy::new(
            descriptor(),
            Arc::new(Counter {
                calls: AtomicUsize::new(0),
            }),
            registry,
            Arc::new(ChainCache::new()),
        );

        let outcome = proxy.call("bump", &[]);
        assert_eq!(*outcome.unwrap().downcast_ref::<usize>().unwrap(), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_operation_is_a_fault() {
        let registry = Arc::new(AdvisorRegistry::builder().build().unwrap());
        let proxy = Proxy::new(
            descriptor(),
            Arc::new(Counter {
                calls: AtomicUsize::new(0),
            }),
            registry,
            Arc::new(ChainCache::new()),
        );

        let fault = proxy.call("vanish", &[]).unwrap_err();
        assert!(matches!(
            fault.downcast_ref::<Error>(),
            Some(Error::UnknownOperation { .. })
        ));
    }

    #[test]
    fn test_chain_inspection() {
        let registry = Arc::new(AdvisorRegistry::builder().build().unwrap());
        let proxy = Proxy::new(
            descriptor(),
            Arc::new(Counter {
                calls: AtomicUsize::new(0),
            }),
            registry,
            Arc::new(ChainCache::new()),
        );

        assert!(proxy.chain_for("bump").unwrap().is_empty());
        assert!(matches!(
            proxy.chain_for("vanish"),
            Err(Error::UnknownOperation { .. })
        ));
        assert_eq!(proxy.surface().count(), 1);
    }
}
