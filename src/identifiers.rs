//! Domain identifier types for target types, operations, markers and scopes.
//!
//! These types provide type-safe wrappers around the string identifiers used
//! throughout the interception machinery: the names of target types and their
//! operations, the marker annotations pointcuts test for, and the declaring
//! scopes advisors belong to.

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

/// Name of a target type on the capability surface.
///
/// Type names are the keys the introspector resolves descriptors by and one
/// half of the chain-cache key.
///
/// # Examples
///
/// ```
/// use weft::identifiers::TypeName;
///
/// let name = TypeName::new("OrderRepository");
/// assert_eq!(name.as_str(), "OrderRepository");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeName(String);

impl TypeName {
    /// Create a new type name.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert the name into its inner String.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<&str> for TypeName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<TypeName> for &str {
    fn eq(&self, other: &TypeName) -> bool {
        *self == other.as_str()
    }
}

impl Borrow<str> for TypeName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<String> for TypeName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for TypeName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Name of one operation (method) on a target type's capability surface.
///
/// # Examples
///
/// ```
/// use weft::identifiers::OperationName;
///
/// let op = OperationName::new("save");
/// assert_eq!(op.as_str(), "save");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperationName(String);

impl OperationName {
    /// Create a new operation name.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert the name into its inner String.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<&str> for OperationName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<OperationName> for &str {
    fn eq(&self, other: &OperationName) -> bool {
        *self == other.as_str()
    }
}

impl Borrow<str> for OperationName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<String> for OperationName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for OperationName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for OperationName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// A marker annotation attached to a type, method or parameter.
///
/// Markers are opaque labels; the introspector reports their presence and
/// pointcuts test for them by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkerName(String);

impl MarkerName {
    /// Create a new marker name.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert the name into its inner String.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MarkerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<&str> for MarkerName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<MarkerName> for &str {
    fn eq(&self, other: &MarkerName) -> bool {
        *self == other.as_str()
    }
}

impl Borrow<str> for MarkerName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for MarkerName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The declaring scope an advisor belongs to.
///
/// Advisors declared by the same scope (the same aspect, module or
/// configuration unit) get deterministic relative ordering; ordering across
/// scopes at equal precedence is unspecified.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScopeId(String);

impl ScopeId {
    /// Create a new scope identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert the identifier into its inner String.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<&str> for ScopeId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<ScopeId> for &str {
    fn eq(&self, other: &ScopeId) -> bool {
        *self == other.as_str()
    }
}

impl Borrow<str> for ScopeId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for ScopeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name_round_trip() {
        let name = TypeName::new("AccountService");
        assert_eq!(name, "AccountService");
        assert_eq!("AccountService", name);
        assert_eq!(name.clone().into_inner(), "AccountService");
        assert_eq!(format!("{name}"), "AccountService");
    }

    #[test]
    fn test_operation_name_borrow_allows_str_lookup() {
        use std::collections::HashMap;

        let mut map: HashMap<OperationName, usize> = HashMap::new();
        map.insert(OperationName::new("save"), 1);
        assert_eq!(map.get("save"), Some(&1));
    }

    #[test]
    fn test_scope_id_equality() {
        assert_eq!(ScopeId::new("tx"), ScopeId::from("tx"));
        assert_ne!(ScopeId::new("tx"), ScopeId::new("audit"));
    }
}
