//! Advisors: advice paired with the pointcut deciding where it applies and
//! the precedence deciding its relative position in a chain.

use std::{cmp::Ordering, fmt};

use crate::{advice::Advice, identifiers::ScopeId, pointcut::Pointcut};

/// Ordering value determining relative execution order among matching
/// advisors. Lower values mean higher precedence (outermost nesting);
/// `Unordered` sorts after every ordered value.
///
/// # Examples
///
/// ```
/// use weft::advisor::Precedence;
///
/// assert!(Precedence::Ordered(0) < Precedence::Ordered(10));
/// assert!(Precedence::Ordered(i32::MAX) < Precedence::Unordered);
/// assert_eq!(Precedence::default(), Precedence::Unordered);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Precedence {
    /// Explicit order value; lower runs further out.
    Ordered(i32),
    /// No declared order; sorts last.
    #[default]
    Unordered,
}

impl Precedence {
    /// Collapse to a totally ordered key.
    pub fn sort_key(self) -> i64 {
        match self {
            Precedence::Ordered(value) => i64::from(value),
            Precedence::Unordered => i64::MAX,
        }
    }
}

impl PartialOrd for Precedence {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Precedence {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precedence::Ordered(value) => write!(f, "{value}"),
            Precedence::Unordered => write!(f, "unordered"),
        }
    }
}

impl From<i32> for Precedence {
    fn from(value: i32) -> Self {
        Precedence::Ordered(value)
    }
}

/// An advice paired with its pointcut, declaring scope and precedence.
///
/// Advisors are immutable once registered: the registry takes ownership at
/// build time and hands out shared references afterwards.
///
/// # Examples
///
/// ```
/// use weft::advice::Advice;
/// use weft::advisor::Advisor;
/// use weft::pointcut::Pointcut;
///
/// let advisor = Advisor::new(
///     "audit_saves",
///     "audit",
///     Pointcut::method_glob("save*")?,
///     Advice::before(|jp| {
///         println!("about to run {}", jp.signature());
///         Ok(())
///     }),
/// )
/// .with_order(10);
/// assert_eq!(advisor.name(), "audit_saves");
/// # Ok::<(), weft::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Advisor {
    name: String,
    scope: ScopeId,
    pointcut: Pointcut,
    advice: Advice,
    precedence: Precedence,
}

impl Advisor {
    /// Create an advisor with `Unordered` precedence.
    pub fn new(
        name: impl Into<String>,
        scope: impl Into<ScopeId>,
        pointcut: Pointcut,
        advice: Advice,
    ) -> Self {
        Self {
            name: name.into(),
            scope: scope.into(),
            pointcut,
            advice,
            precedence: Precedence::Unordered,
        }
    }

    /// Set an explicit precedence.
    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    /// Set an explicit order value (shorthand for `Ordered`).
    pub fn with_order(self, order: i32) -> Self {
        self.with_precedence(Precedence::Ordered(order))
    }

    /// The advisor's name, unique within its scope.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declaring scope.
    pub fn scope(&self) -> &ScopeId {
        &self.scope
    }

    /// The pointcut deciding where the advice applies.
    pub fn pointcut(&self) -> &Pointcut {
        &self.pointcut
    }

    /// The advice to run at matched join points.
    pub fn advice(&self) -> &Advice {
        &self.advice
    }

    /// The declared precedence.
    pub fn precedence(&self) -> Precedence {
        self.precedence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::AdviceKind;

    #[test]
    fn test_precedence_ordering() {
        let mut values = vec![
            Precedence::Unordered,
            Precedence::Ordered(5),
            Precedence::Ordered(-1),
            Precedence::Ordered(0),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Precedence::Ordered(-1),
                Precedence::Ordered(0),
                Precedence::Ordered(5),
                Precedence::Unordered,
            ]
        );
    }

    #[test]
    fn test_advisor_accessors() {
        let advisor = Advisor::new(
            "trace_all",
            "tracing",
            Pointcut::method_glob("*").unwrap(),
            Advice::before(|_| Ok(())),
        )
        .with_order(3);

        assert_eq!(advisor.name(), "trace_all");
        assert_eq!(advisor.scope(), &ScopeId::from("tracing"));
        assert_eq!(advisor.precedence(), Precedence::Ordered(3));
        assert_eq!(advisor.advice().kind(), AdviceKind::Before);
    }
}
