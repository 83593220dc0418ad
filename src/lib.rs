//! Weft - in-process call interception and advice weaving
//!
//! This crate provides:
//! - Pointcut matching over declared type and operation descriptors
//! - A build-then-freeze advisor registry with fail-fast validation
//! - Interceptor chain resolution with precedence ordering and a shared,
//!   single-winner chain cache
//! - An invocation dispatcher implementing before/after/around semantics
//!   with strict fault propagation
//! - A proxy front projecting a target's capability surface through the
//!   advice chain
//! - Declarative advisor configuration (JSON documents + named handlers)
//!
//! # How the pieces fit
//!
//! Advisors ({pointcut, advice, precedence}) come from
//! [`AdvisorSource`](ports::AdvisorSource)s and are frozen into an
//! [`AdvisorRegistry`](registry::AdvisorRegistry) when the
//! [`App`](app::App) container is built. A [`Proxy`](proxy::Proxy) fronts
//! each target: every call on the advertised surface resolves (once, then
//! cached) the ordered [`InterceptorChain`](chain::InterceptorChain) for
//! that operation and runs it through the
//! [dispatcher](dispatch::run) around the real invocation.
//!
//! Note the inherent boundary of interception by wrapping: a target that
//! calls its own operations internally never re-enters the proxy, so those
//! inner calls bypass the advice chain entirely.

pub mod adapters;
pub mod advice;
pub mod advisor;
pub mod app;
pub mod chain;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod identifiers;
pub mod invocation;
pub mod pointcut;
pub mod ports;
pub mod proxy;
pub mod registry;

pub use advice::{Advice, AdviceKind, ReturnBinding, ThrowsBinding};
pub use advisor::{Advisor, Precedence};
pub use app::{App, AppBuilder, ContainerConfig};
pub use chain::{ChainBuilder, ChainCache, InterceptorChain};
pub use descriptor::{MethodDescriptor, ParamDescriptor, TypeDescriptor};
pub use dispatch::Proceed;
pub use error::{Error, Result};
pub use invocation::{ArgValue, CallOutcome, Fault, JoinPoint, ReturnValue};
pub use pointcut::{NamePattern, Pointcut};
pub use proxy::{Proxy, TargetObject};
pub use registry::{AdvisorRegistry, RegistryBuilder};
