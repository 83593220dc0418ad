//! The container: composition root for the interception core.
//!
//! This module provides centralized dependency wiring following hexagonal
//! architecture principles. The container owns the infrastructure
//! dependencies (advisor sources, the introspector), loads and validates
//! every advisor while building, freezes the registry, and creates proxies
//! over the frozen state.

use std::sync::Arc;

use log::debug;

use super::config::ContainerConfig;
use crate::{
    Result,
    adapters::TypeCatalog,
    chain::{ChainBuilder, ChainCache, InterceptorChain},
    error::Error,
    pointcut::NamePattern,
    ports::{AdvisorSource, Introspector},
    proxy::{Proxy, TargetObject},
    registry::AdvisorRegistry,
};

/// The assembled container: frozen registry, introspector and shared chain
/// cache.
///
/// Everything in here is read-only after [`AppBuilder::build`] returns;
/// the container and the proxies it creates are freely shareable across
/// threads. Configuration completes before first dispatch by construction.
///
/// # Examples
///
/// ## Production wiring
///
/// ```
/// use weft::adapters::{StaticAdvisorSource, TypeCatalog};
/// use weft::advice::Advice;
/// use weft::advisor::Advisor;
/// use weft::app::App;
/// use weft::descriptor::{MethodDescriptor, TypeDescriptor};
/// use weft::pointcut::Pointcut;
///
/// let app = App::builder()
///     .with_source(StaticAdvisorSource::new(vec![Advisor::new(
///         "trace",
///         "tracing",
///         Pointcut::method_glob("*")?,
///         Advice::before(|_| Ok(())),
///     )]))
///     .with_introspector(
///         TypeCatalog::new()
///             .with_type(TypeDescriptor::new("Ledger").method(MethodDescriptor::new("post")))?,
///     )
///     .build()?;
///
/// assert_eq!(app.registry().len(), 1);
/// # Ok::<(), weft::Error>(())
/// ```
pub struct App {
    registry: Arc<AdvisorRegistry>,
    introspector: Arc<dyn Introspector>,
    chains: Arc<ChainCache>,
}

impl App {
    /// Create an empty container: no advisors, no known types.
    ///
    /// Useful as a null object; real wiring goes through [`App::builder`].
    pub fn new() -> Self {
        let registry = AdvisorRegistry::builder()
            .build()
            .expect("empty registry cannot fail validation");
        Self {
            registry: Arc::new(registry),
            introspector: Arc::new(TypeCatalog::new()),
            chains: Arc::new(ChainCache::new()),
        }
    }

    /// Create a builder for assembling a container.
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// The frozen advisor registry.
    pub fn registry(&self) -> &Arc<AdvisorRegistry> {
        &self.registry
    }

    /// The shared chain cache.
    pub fn chain_cache(&self) -> &Arc<ChainCache> {
        &self.chains
    }

    /// Create a proxy fronting `target` with the surface `type_name`
    /// advertises.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] when the introspector does not know
    /// the type.
    pub fn proxy(&self, type_name: &str, target: Arc<dyn TargetObject>) -> Result<Proxy> {
        let descriptor = self.introspector.describe(type_name)?;
        Ok(Proxy::new(
            descriptor,
            target,
            Arc::clone(&self.registry),
            Arc::clone(&self.chains),
        ))
    }

    /// Resolve (or fetch the cached) chain for one operation, for
    /// inspection and tests.
    pub fn chain_for(&self, type_name: &str, operation: &str) -> Result<Arc<InterceptorChain>> {
        let descriptor = self.introspector.describe(type_name)?;
        let method = descriptor
            .operation(operation)
            .ok_or_else(|| Error::UnknownOperation {
                type_name: type_name.to_string(),
                operation: operation.to_string(),
            })?;
        let builder = ChainBuilder::new(Arc::clone(&self.registry));
        Ok(self.chains.chain_for(&descriptor, method, &builder))
    }

    /// Whether any operation of the type resolves a non-empty chain.
    ///
    /// An entirely unadvised type needs no proxy; callers may use the raw
    /// target directly.
    pub fn requires_proxy(&self, type_name: &str) -> Result<bool> {
        let descriptor = self.introspector.describe(type_name)?;
        let builder = ChainBuilder::new(Arc::clone(&self.registry));
        Ok(descriptor
            .methods
            .iter()
            .any(|method| !self.chains.chain_for(&descriptor, method, &builder).is_empty()))
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for assembling the container with its dependencies.
///
/// Sources are loaded in the order they were added; that order is the
/// registration order within a declaring scope.
#[derive(Default)]
pub struct AppBuilder {
    sources: Vec<Box<dyn AdvisorSource>>,
    introspector: Option<Arc<dyn Introspector>>,
    config: ContainerConfig,
}

impl AppBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an advisor source. May be called multiple times.
    pub fn with_source<S: AdvisorSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Set the introspector.
    pub fn with_introspector<I: Introspector + 'static>(mut self, introspector: I) -> Self {
        self.introspector = Some(Arc::new(introspector));
        self
    }

    /// Set the container configuration.
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Shorthand for configuring the auto-proxy type-name filter.
    pub fn with_auto_proxy_filter(mut self, pattern: impl Into<String>) -> Self {
        self.config.auto_proxy_filter = Some(pattern.into());
        self
    }

    /// Load every source, validate everything, freeze.
    ///
    /// # Errors
    ///
    /// Any configuration problem — source I/O or decode failure, malformed
    /// pattern, unknown handler, duplicate advisor, invalid binding — is
    /// fatal and surfaces here, before first dispatch.
    pub fn build(self) -> Result<App> {
        let mut registry_builder = AdvisorRegistry::builder();

        if let Some(pattern) = &self.config.auto_proxy_filter {
            registry_builder = registry_builder.auto_proxy_filter(NamePattern::parse(pattern)?);
        }

        for source in &self.sources {
            registry_builder = registry_builder.register_all(source.load_advisors()?);
        }

        let registry = registry_builder.build()?;
        debug!(
            "container built: {} advisor(s) from {} source(s)",
            registry.len(),
            self.sources.len()
        );

        Ok(App {
            registry: Arc::new(registry),
            introspector: self
                .introspector
                .unwrap_or_else(|| Arc::new(TypeCatalog::new())),
            chains: Arc::new(ChainCache::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StaticAdvisorSource;
    use crate::advice::Advice;
    use crate::advisor::Advisor;
    use crate::descriptor::{MethodDescriptor, TypeDescriptor};
    use crate::pointcut::Pointcut;

    fn catalog() -> TypeCatalog {
        TypeCatalog::new()
            .with_type(
                TypeDescriptor::new("LedgerService")
                    .method(MethodDescriptor::new("post"))
                    .method(MethodDescriptor::new("balance")),
            )
            .unwrap()
    }

    fn trace_advisor(pattern: &str) -> Advisor {
        Advisor::new(
            "trace",
            "tracing",
            Pointcut::method_glob(pattern).unwrap(),
            Advice::before(|_| Ok(())),
        )
    }

    #[test]
    fn test_empty_app() {
        let app = App::new();
        assert!(app.registry().is_empty());
        assert!(matches!(
            app.chain_for("Anything", "op"),
            Err(Error::UnknownType { .. })
        ));
    }

    #[test]
    fn test_build_wires_sources_and_introspector() {
        let app = App::builder()
            .with_source(StaticAdvisorSource::new(vec![trace_advisor("post")]))
            .with_introspector(catalog())
            .build()
            .unwrap();

        assert_eq!(app.chain_for("LedgerService", "post").unwrap().len(), 1);
        assert!(app.chain_for("LedgerService", "balance").unwrap().is_empty());
        assert!(app.requires_proxy("LedgerService").unwrap());
    }

    #[test]
    fn test_unadvised_type_requires_no_proxy() {
        let app = App::builder()
            .with_source(StaticAdvisorSource::new(vec![trace_advisor("missing_op")]))
            .with_introspector(catalog())
            .build()
            .unwrap();
        assert!(!app.requires_proxy("LedgerService").unwrap());
    }

    #[test]
    fn test_auto_proxy_filter_validated_at_build() {
        let result = App::builder()
            .with_auto_proxy_filter("bad pattern")
            .build();
        assert!(matches!(result, Err(Error::InvalidPattern { .. })));
    }

    #[test]
    fn test_source_failure_is_fatal_to_build() {
        struct Failing;
        impl AdvisorSource for Failing {
            fn load_advisors(&self) -> Result<Vec<Advisor>> {
                Err(Error::MalformedConfiguration {
                    message: "broken".to_string(),
                })
            }
        }

        let result = App::builder().with_source(Failing).build();
        assert!(matches!(result, Err(Error::MalformedConfiguration { .. })));
    }

    #[test]
    fn test_unknown_operation_reported() {
        let app = App::builder().with_introspector(catalog()).build().unwrap();
        assert!(matches!(
            app.chain_for("LedgerService", "missing"),
            Err(Error::UnknownOperation { .. })
        ));
    }
}
