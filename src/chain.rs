//! Interceptor chains: the ordered advice resolved for one (type, operation)
//! pair, plus the shared cache that guarantees at-most-one resolution per
//! key under concurrent first access.

use std::sync::Arc;

use dashmap::DashMap;
use log::debug;

use crate::{
    advisor::Advisor,
    descriptor::{MethodDescriptor, TypeDescriptor},
    identifiers::{OperationName, TypeName},
    registry::AdvisorRegistry,
};

/// Ordered sequence of advisors resolved for one specific operation.
///
/// An empty chain means no advisor matched: the operation needs no proxying
/// and a dispatched call goes straight to the target.
#[derive(Debug, Clone)]
pub struct InterceptorChain {
    entries: Vec<Arc<Advisor>>,
}

impl InterceptorChain {
    /// Chain with no entries.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Whether no advisor applies.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of resolved advisors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Resolved advisors, outermost first.
    pub fn entries(&self) -> &[Arc<Advisor>] {
        &self.entries
    }

    /// Advisor names in execution-nesting order, for inspection.
    pub fn advisor_names(&self) -> Vec<&str> {
        self.entries.iter().map(|a| a.name()).collect()
    }
}

/// Resolves chains against a frozen registry.
///
/// Resolution filters the registry's candidates through their pointcuts and
/// stable-sorts the matches: by precedence, then (within one declaring
/// scope) by advice-kind rank and registration order. The relative order of
/// different scopes at equal precedence is deterministic here but
/// unspecified by contract.
#[derive(Debug, Clone)]
pub struct ChainBuilder {
    registry: Arc<AdvisorRegistry>,
}

impl ChainBuilder {
    /// Create a builder over a frozen registry.
    pub fn new(registry: Arc<AdvisorRegistry>) -> Self {
        Self { registry }
    }

    /// The registry chains are resolved against.
    pub fn registry(&self) -> &Arc<AdvisorRegistry> {
        &self.registry
    }

    /// Resolve the chain for one operation.
    ///
    /// Resolving the same (type, operation) twice against the same frozen
    /// registry yields the identical sequence.
    pub fn build(&self, ty: &TypeDescriptor, method: &MethodDescriptor) -> InterceptorChain {
        let mut matched: Vec<(usize, &Arc<Advisor>)> = self
            .registry
            .candidates_for(ty)
            .enumerate()
            .filter(|(_, advisor)| advisor.pointcut().matches(ty, method))
            .collect();

        matched.sort_by_key(|(seq, advisor)| {
            (
                advisor.precedence().sort_key(),
                self.registry.scope_rank(advisor.scope()),
                advisor.advice().kind().rank(),
                *seq,
            )
        });

        let entries: Vec<Arc<Advisor>> = matched
            .into_iter()
            .map(|(_, advisor)| Arc::clone(advisor))
            .collect();

        debug!(
            "resolved chain for {}.{}: {} advisor(s)",
            ty.name,
            method.name,
            entries.len()
        );

        InterceptorChain { entries }
    }
}

/// Cache key: one (type, operation) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainKey {
    type_name: TypeName,
    operation: OperationName,
}

impl ChainKey {
    /// Build a key from a type and one of its operations.
    pub fn new(type_name: impl Into<TypeName>, operation: impl Into<OperationName>) -> Self {
        Self {
            type_name: type_name.into(),
            operation: operation.into(),
        }
    }
}

/// Shared chain cache.
///
/// First access per key resolves the chain exactly once: the winning thread
/// computes inside the map's entry lock while concurrent callers for the
/// same key wait and then reuse the stored chain. The registry is frozen
/// before first dispatch, so cached chains never go stale; `clear` exists
/// for tests.
#[derive(Debug, Default)]
pub struct ChainCache {
    chains: DashMap<ChainKey, Arc<InterceptorChain>>,
}

impl ChainCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the chain for an operation, resolving it on first access.
    pub fn chain_for(
        &self,
        ty: &TypeDescriptor,
        method: &MethodDescriptor,
        builder: &ChainBuilder,
    ) -> Arc<InterceptorChain> {
        let key = ChainKey::new(ty.name.clone(), method.name.clone());
        self.get_or_resolve(key, || builder.build(ty, method))
    }

    /// Fetch the chain under `key`, running `resolve` at most once: under
    /// concurrent first access a single winner computes inside the entry
    /// lock while the others wait, then everyone shares the stored chain.
    pub fn get_or_resolve(
        &self,
        key: ChainKey,
        resolve: impl FnOnce() -> InterceptorChain,
    ) -> Arc<InterceptorChain> {
        let entry = self.chains.entry(key).or_insert_with(|| Arc::new(resolve()));
        Arc::clone(entry.value())
    }

    /// Number of cached chains.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Drop every cached chain. Test support only; production registries
    /// are frozen, so invalidation never arises.
    pub fn clear(&self) {
        self.chains.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::Advice;
    use crate::advisor::Advisor;
    use crate::descriptor::MethodDescriptor;
    use crate::pointcut::Pointcut;

    fn ty() -> TypeDescriptor {
        TypeDescriptor::new("Ledger")
            .method(MethodDescriptor::new("post"))
            .method(MethodDescriptor::new("balance"))
    }

    fn advisor(name: &str, scope: &str, pattern: &str, order: i32) -> Advisor {
        Advisor::new(
            name,
            scope,
            Pointcut::method_glob(pattern).unwrap(),
            Advice::before(|_| Ok(())),
        )
        .with_order(order)
    }

    #[test]
    fn test_non_matching_advisors_are_excluded() {
        let registry = Arc::new(
            AdvisorRegistry::builder()
                .register(advisor("on_post", "s", "post", 0))
                .register(advisor("on_balance", "s", "balance", 0))
                .build()
                .unwrap(),
        );
        let builder = ChainBuilder::new(registry);
        let ty = ty();

        let chain = builder.build(&ty, ty.operation("post").unwrap());
        assert_eq!(chain.advisor_names(), vec!["on_post"]);
    }

    #[test]
    fn test_empty_chain_when_nothing_matches() {
        let registry = Arc::new(
            AdvisorRegistry::builder()
                .register(advisor("on_post", "s", "post", 0))
                .build()
                .unwrap(),
        );
        let builder = ChainBuilder::new(registry);
        let ty = ty();

        let chain = builder.build(&ty, ty.operation("balance").unwrap());
        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);
    }

    #[test]
    fn test_precedence_orders_chain() {
        let registry = Arc::new(
            AdvisorRegistry::builder()
                .register(advisor("late", "s", "*", 10))
                .register(advisor("early", "s", "*", 1))
                .register(
                    Advisor::new(
                        "unordered",
                        "s",
                        Pointcut::method_glob("*").unwrap(),
                        Advice::before(|_| Ok(())),
                    ),
                )
                .build()
                .unwrap(),
        );
        let builder = ChainBuilder::new(registry);
        let ty = ty();

        let chain = builder.build(&ty, ty.operation("post").unwrap());
        assert_eq!(chain.advisor_names(), vec!["early", "late", "unordered"]);
    }

    #[test]
    fn test_kind_rank_breaks_ties_within_scope() {
        let registry = Arc::new(
            AdvisorRegistry::builder()
                .register(
                    Advisor::new(
                        "finally",
                        "s",
                        Pointcut::method_glob("*").unwrap(),
                        Advice::after(|_| Ok(())),
                    )
                    .with_order(0),
                )
                .register(
                    Advisor::new(
                        "wrap",
                        "s",
                        Pointcut::method_glob("*").unwrap(),
                        Advice::around(|_, proceed| proceed.invoke()),
                    )
                    .with_order(0),
                )
                .register(advisor("check", "s", "*", 0))
                .build()
                .unwrap(),
        );
        let builder = ChainBuilder::new(registry);
        let ty = ty();

        let chain = builder.build(&ty, ty.operation("post").unwrap());
        // Around > Before > After within one scope at equal precedence.
        assert_eq!(chain.advisor_names(), vec!["wrap", "check", "finally"]);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let registry = Arc::new(
            AdvisorRegistry::builder()
                .register(advisor("a", "s1", "*", 2))
                .register(advisor("b", "s2", "*", 1))
                .register(advisor("c", "s1", "*", 1))
                .build()
                .unwrap(),
        );
        let builder = ChainBuilder::new(registry);
        let ty = ty();
        let method = ty.operation("post").unwrap();

        let first = builder.build(&ty, method).advisor_names().join(",");
        for _ in 0..5 {
            assert_eq!(builder.build(&ty, method).advisor_names().join(","), first);
        }
    }

    #[test]
    fn test_cache_returns_same_chain() {
        let registry = Arc::new(
            AdvisorRegistry::builder()
                .register(advisor("a", "s", "*", 0))
                .build()
                .unwrap(),
        );
        let builder = ChainBuilder::new(registry);
        let cache = ChainCache::new();
        let ty = ty();
        let method = ty.operation("post").unwrap();

        let first = cache.chain_for(&ty, method, &builder);
        let second = cache.chain_for(&ty, method, &builder);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
