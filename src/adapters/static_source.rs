//! In-memory advisor source for programmatic wiring and tests.

use crate::{Result, advisor::Advisor, ports::AdvisorSource};

/// Advisor source backed by a plain vector.
///
/// The natural choice when advisors are wired up in code: build them,
/// hand them to the source, give the source to the container. Also the
/// fastest fixture for tests — no files, no decoding.
///
/// # Examples
///
/// ```
/// use weft::adapters::StaticAdvisorSource;
/// use weft::advice::Advice;
/// use weft::advisor::Advisor;
/// use weft::pointcut::Pointcut;
/// use weft::ports::AdvisorSource;
///
/// let source = StaticAdvisorSource::new(vec![Advisor::new(
///     "trace",
///     "tracing",
///     Pointcut::method_glob("*")?,
///     Advice::before(|_| Ok(())),
/// )]);
/// assert_eq!(source.load_advisors()?.len(), 1);
/// # Ok::<(), weft::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticAdvisorSource {
    advisors: Vec<Advisor>,
}

impl StaticAdvisorSource {
    /// Source producing the given advisors, in order.
    pub fn new(advisors: Vec<Advisor>) -> Self {
        Self { advisors }
    }

    /// Empty source.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append an advisor.
    pub fn with(mut self, advisor: Advisor) -> Self {
        self.advisors.push(advisor);
        self
    }

    /// Number of advisors this source holds.
    pub fn len(&self) -> usize {
        self.advisors.len()
    }

    /// Whether the source holds no advisors.
    pub fn is_empty(&self) -> bool {
        self.advisors.is_empty()
    }
}

impl AdvisorSource for StaticAdvisorSource {
    fn load_advisors(&self) -> Result<Vec<Advisor>> {
        Ok(self.advisors.clone())
    }
}
