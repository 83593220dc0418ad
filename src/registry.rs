//! The advisor registry: frozen storage of every registered advisor.
//!
//! The registry is pure storage plus the optional auto-proxy naming filter;
//! no pointcut evaluation happens here. It is assembled through
//! [`RegistryBuilder`] while the container loads and frozen by `build()` —
//! the builder is consumed, so registration during active dispatch is
//! impossible by construction.

use std::{collections::HashMap, sync::Arc};

use log::debug;

use crate::{
    Result,
    advisor::Advisor,
    descriptor::TypeDescriptor,
    error::Error,
    identifiers::ScopeId,
    pointcut::NamePattern,
};

/// Frozen, shareable advisor storage.
///
/// # Examples
///
/// ```
/// use weft::advice::Advice;
/// use weft::advisor::Advisor;
/// use weft::pointcut::Pointcut;
/// use weft::registry::AdvisorRegistry;
///
/// let registry = AdvisorRegistry::builder()
///     .register(Advisor::new(
///         "trace",
///         "tracing",
///         Pointcut::method_glob("*")?,
///         Advice::before(|_| Ok(())),
///     ))
///     .build()?;
/// assert_eq!(registry.len(), 1);
/// # Ok::<(), weft::Error>(())
/// ```
#[derive(Debug)]
pub struct AdvisorRegistry {
    advisors: Vec<Arc<Advisor>>,
    scope_ranks: HashMap<ScopeId, usize>,
    type_filter: Option<NamePattern>,
}

impl AdvisorRegistry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Number of registered advisors.
    pub fn len(&self) -> usize {
        self.advisors.len()
    }

    /// Whether the registry holds no advisors.
    pub fn is_empty(&self) -> bool {
        self.advisors.is_empty()
    }

    /// Whether the naming convention admits this target type at all.
    ///
    /// Without a configured filter every type is advisable.
    pub fn is_advisable(&self, ty: &TypeDescriptor) -> bool {
        match &self.type_filter {
            Some(filter) => filter.matches(ty.name.as_str()),
            None => true,
        }
    }

    /// Every advisor that may apply to the target type, in registration
    /// order. Applies only the naming-convention gate; pointcut evaluation
    /// is the chain builder's job.
    pub fn candidates_for<'a>(
        &'a self,
        ty: &TypeDescriptor,
    ) -> impl Iterator<Item = &'a Arc<Advisor>> {
        let admitted = self.is_advisable(ty);
        self.advisors.iter().filter(move |_| admitted)
    }

    /// All advisors in registration order, ignoring the type filter.
    pub fn advisors(&self) -> &[Arc<Advisor>] {
        &self.advisors
    }

    /// First-seen rank of a declaring scope. Used as a deterministic (but
    /// contractually unspecified) tiebreak across scopes at equal
    /// precedence.
    pub(crate) fn scope_rank(&self, scope: &ScopeId) -> usize {
        self.scope_ranks.get(scope).copied().unwrap_or(usize::MAX)
    }
}

/// Builder for [`AdvisorRegistry`]; validates everything fail-fast in
/// `build()`.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    advisors: Vec<Advisor>,
    type_filter: Option<NamePattern>,
}

impl RegistryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an advisor. Source order is preserved and participates in
    /// tie-breaking within a declaring scope.
    pub fn register(mut self, advisor: Advisor) -> Self {
        self.advisors.push(advisor);
        self
    }

    /// Register many advisors, preserving their order.
    pub fn register_all(mut self, advisors: impl IntoIterator<Item = Advisor>) -> Self {
        self.advisors.extend(advisors);
        self
    }

    /// Gate advising by target type name: types whose name does not match
    /// the glob see an empty candidate set.
    pub fn auto_proxy_filter(mut self, filter: NamePattern) -> Self {
        self.type_filter = Some(filter);
        self
    }

    /// Validate and freeze.
    ///
    /// # Errors
    ///
    /// Fails fast on the first configuration violation: an empty advisor
    /// name, a duplicate (scope, name) pair, or an invalid binding name.
    pub fn build(self) -> Result<AdvisorRegistry> {
        let mut seen: HashMap<(ScopeId, String), ()> = HashMap::new();
        let mut scope_ranks: HashMap<ScopeId, usize> = HashMap::new();

        for advisor in &self.advisors {
            if advisor.name().is_empty() {
                return Err(Error::EmptyAdvisorName {
                    scope: advisor.scope().to_string(),
                });
            }
            let key = (advisor.scope().clone(), advisor.name().to_string());
            if seen.insert(key, ()).is_some() {
                return Err(Error::DuplicateAdvisor {
                    name: advisor.name().to_string(),
                    scope: advisor.scope().to_string(),
                });
            }
            advisor.advice().validate(advisor.name())?;

            let next_rank = scope_ranks.len();
            scope_ranks.entry(advisor.scope().clone()).or_insert(next_rank);
        }

        debug!(
            "advisor registry frozen: {} advisors across {} scopes",
            self.advisors.len(),
            scope_ranks.len()
        );

        Ok(AdvisorRegistry {
            advisors: self.advisors.into_iter().map(Arc::new).collect(),
            scope_ranks,
            type_filter: self.type_filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{Advice, ReturnBinding};
    use crate::pointcut::Pointcut;

    fn noop_before(name: &str, scope: &str) -> Advisor {
        Advisor::new(
            name,
            scope,
            Pointcut::method_glob("*").unwrap(),
            Advice::before(|_| Ok(())),
        )
    }

    #[test]
    fn test_build_then_freeze() {
        let registry = AdvisorRegistry::builder()
            .register(noop_before("a", "s1"))
            .register(noop_before("b", "s1"))
            .build()
            .unwrap();
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_duplicate_name_in_scope_rejected() {
        let result = AdvisorRegistry::builder()
            .register(noop_before("a", "s1"))
            .register(noop_before("a", "s1"))
            .build();
        assert!(matches!(result, Err(Error::DuplicateAdvisor { .. })));
    }

    #[test]
    fn test_same_name_in_different_scopes_allowed() {
        let registry = AdvisorRegistry::builder()
            .register(noop_before("a", "s1"))
            .register(noop_before("a", "s2"))
            .build()
            .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.scope_rank(&"s1".into()), 0);
        assert_eq!(registry.scope_rank(&"s2".into()), 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        let result = AdvisorRegistry::builder()
            .register(noop_before("", "s1"))
            .build();
        assert!(matches!(result, Err(Error::EmptyAdvisorName { .. })));
    }

    #[test]
    fn test_invalid_binding_name_rejected_at_build() {
        let advisor = Advisor::new(
            "bad_binding",
            "s1",
            Pointcut::method_glob("*").unwrap(),
            Advice::after_returning(ReturnBinding::any("not a name"), |_, _| Ok(())),
        );
        let result = AdvisorRegistry::builder().register(advisor).build();
        assert!(matches!(result, Err(Error::InvalidBindingName { .. })));
    }

    #[test]
    fn test_auto_proxy_filter_gates_candidates() {
        use crate::descriptor::TypeDescriptor;

        let registry = AdvisorRegistry::builder()
            .register(noop_before("a", "s1"))
            .auto_proxy_filter(NamePattern::parse("*Service").unwrap())
            .build()
            .unwrap();

        let service = TypeDescriptor::new("AccountService");
        let repo = TypeDescriptor::new("AccountRepository");
        assert!(registry.is_advisable(&service));
        assert!(!registry.is_advisable(&repo));
        assert_eq!(registry.candidates_for(&service).count(), 1);
        assert_eq!(registry.candidates_for(&repo).count(), 0);
    }
}
