//! Pointcuts: predicates selecting which calls are subject to interception.
//!
//! A [`Pointcut`] is evaluated against the declared descriptors of a target
//! type and one of its operations. Evaluation is pure and static: the same
//! descriptors always yield the same answer, and runtime argument values
//! play no role. That property is what makes caching a resolved chain per
//! (type, operation) pair sound.
//!
//! Name patterns use glob syntax (`*` matches any run of characters, `?`
//! matches one). A malformed pattern fails when it is parsed, at
//! configuration time, never during dispatch.

use std::fmt;

use regex::Regex;

use crate::{
    Result,
    descriptor::{MethodDescriptor, TypeDescriptor},
    error::Error,
    identifiers::{MarkerName, TypeName},
};

/// A glob pattern over a single name, compiled to an anchored regex.
///
/// Allowed input characters are ASCII alphanumerics, `_`, `.`, `-` and the
/// wildcards `*` and `?`. Anything else is rejected at parse time.
///
/// # Examples
///
/// ```
/// use weft::pointcut::NamePattern;
///
/// let pattern = NamePattern::parse("find_*")?;
/// assert!(pattern.matches("find_by_id"));
/// assert!(!pattern.matches("save"));
///
/// assert!(NamePattern::parse("").is_err());
/// # Ok::<(), weft::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    regex: Regex,
}

impl NamePattern {
    /// Parse a glob pattern, failing fast on malformed input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the pattern is empty or contains
    /// a character outside the allowed set.
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(Error::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "pattern must not be empty".to_string(),
            });
        }

        let mut translated = String::with_capacity(pattern.len() + 8);
        translated.push('^');
        for ch in pattern.chars() {
            match ch {
                '*' => translated.push_str(".*"),
                '?' => translated.push('.'),
                c if c.is_ascii_alphanumeric() || c == '_' => translated.push(c),
                '.' | '-' => {
                    translated.push('\\');
                    translated.push(ch);
                }
                c => {
                    return Err(Error::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: format!("unsupported character '{c}'"),
                    });
                }
            }
        }
        translated.push('$');

        let regex = Regex::new(&translated).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Whether the given name matches the pattern.
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// The original glob source.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the pattern is a bare literal (no wildcards).
    pub fn is_literal(&self) -> bool {
        !self.source.contains(['*', '?'])
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl PartialEq for NamePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for NamePattern {}

/// Predicate deciding whether an operation on a target type is intercepted.
///
/// Operations no pointcut matches are invisible to the advice system: they
/// are never wrapped.
///
/// # Examples
///
/// ```
/// use weft::descriptor::{MethodDescriptor, TypeDescriptor};
/// use weft::pointcut::Pointcut;
///
/// let desc = TypeDescriptor::new("OrderRepository")
///     .supertype("Repository")
///     .method(MethodDescriptor::new("save").marked("transactional"))
///     .method(MethodDescriptor::new("count"));
///
/// let pointcut = Pointcut::All(vec![
///     Pointcut::SubtypeOf("Repository".into()),
///     Pointcut::method_glob("save")?,
/// ]);
/// assert!(pointcut.matches(&desc, desc.operation("save").unwrap()));
/// assert!(!pointcut.matches(&desc, desc.operation("count").unwrap()));
/// # Ok::<(), weft::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Pointcut {
    /// Operation name matches the glob.
    Method(NamePattern),
    /// Operation name and declared parameter types match; arity is exact.
    Signature {
        method: NamePattern,
        params: Vec<NamePattern>,
    },
    /// Target type name matches the glob.
    Within(NamePattern),
    /// Target type is the named type or one of its subtypes.
    SubtypeOf(TypeName),
    /// Operation carries the marker.
    MarkedMethod(MarkerName),
    /// Target type carries the marker.
    MarkedType(MarkerName),
    /// Any declared parameter of the operation carries the marker.
    MarkedParam(MarkerName),
    /// Every sub-pointcut matches.
    All(Vec<Pointcut>),
    /// At least one sub-pointcut matches.
    Any(Vec<Pointcut>),
    /// The sub-pointcut does not match.
    Not(Box<Pointcut>),
}

impl Pointcut {
    /// Convenience constructor for a method-name glob pointcut.
    pub fn method_glob(pattern: &str) -> Result<Self> {
        Ok(Pointcut::Method(NamePattern::parse(pattern)?))
    }

    /// Convenience constructor for a type-name glob pointcut.
    pub fn within_glob(pattern: &str) -> Result<Self> {
        Ok(Pointcut::Within(NamePattern::parse(pattern)?))
    }

    /// Evaluate the pointcut against a type and one of its operations.
    ///
    /// Pure: no side effects, and the same descriptors always produce the
    /// same result.
    pub fn matches(&self, ty: &TypeDescriptor, method: &MethodDescriptor) -> bool {
        match self {
            Pointcut::Method(pattern) => pattern.matches(method.name.as_str()),
            Pointcut::Signature {
                method: name,
                params,
            } => {
                name.matches(method.name.as_str())
                    && params.len() == method.params.len()
                    && params
                        .iter()
                        .zip(method.param_type_names())
                        .all(|(pattern, declared)| pattern.matches(declared.as_str()))
            }
            Pointcut::Within(pattern) => pattern.matches(ty.name.as_str()),
            Pointcut::SubtypeOf(type_name) => ty.is_subtype_of(type_name.as_str()),
            Pointcut::MarkedMethod(marker) => method.has_marker(marker.as_str()),
            Pointcut::MarkedType(marker) => ty.has_marker(marker.as_str()),
            Pointcut::MarkedParam(marker) => method.has_param_marker(marker.as_str()),
            Pointcut::All(parts) => parts.iter().all(|p| p.matches(ty, method)),
            Pointcut::Any(parts) => parts.iter().any(|p| p.matches(ty, method)),
            Pointcut::Not(inner) => !inner.matches(ty, method),
        }
    }
}
