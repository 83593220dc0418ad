//! Advisor source port - abstraction for supplying the initial advisors.
//!
//! This port defines the boundary between the interception core and
//! whatever produces advisor configuration: programmatic wiring, a
//! declarative document, or a test fixture. Sources run while the
//! container loads, strictly before first dispatch.

use crate::{Result, advisor::Advisor};

/// Port for loading the advisors a container starts with.
///
/// Implementations produce advisors in a stable order; the container
/// preserves source order across multiple sources, and that order is the
/// registration order tie-breaking within a declaring scope relies on.
///
/// Any configuration problem (malformed pointcut pattern, unknown handler,
/// invalid binding) must surface here as an error — registration is the
/// fail-fast boundary; nothing is deferred to call time.
///
/// # Examples
///
/// ```
/// use weft::advice::Advice;
/// use weft::advisor::Advisor;
/// use weft::pointcut::Pointcut;
/// use weft::ports::AdvisorSource;
///
/// struct Fixed;
///
/// impl AdvisorSource for Fixed {
///     fn load_advisors(&self) -> weft::Result<Vec<Advisor>> {
///         Ok(vec![Advisor::new(
///             "trace",
///             "tracing",
///             Pointcut::method_glob("*")?,
///             Advice::before(|_| Ok(())),
///         )])
///     }
/// }
/// ```
pub trait AdvisorSource {
    /// Produce the advisors this source contributes, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error for any malformed declaration; the container treats
    /// it as fatal to startup.
    fn load_advisors(&self) -> Result<Vec<Advisor>>;
}
