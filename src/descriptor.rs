//! Descriptors for target types and their capability surface.
//!
//! A [`TypeDescriptor`] is the introspection record an
//! [`Introspector`](crate::ports::Introspector) supplies for one target type:
//! its operations with declared signatures, its markers, and its flattened
//! supertype chain. Pointcut matching and proxy surface projection work over
//! these records only; the interception core never inspects live Rust types.

use serde::{Deserialize, Serialize};

use crate::identifiers::{MarkerName, OperationName, TypeName};

/// Declared parameter of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    /// Parameter name, when the declaration carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Declared type of the parameter.
    pub type_name: TypeName,
    /// Markers attached to the parameter.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<MarkerName>,
}

impl ParamDescriptor {
    /// Create an unnamed, unmarked parameter of the given declared type.
    pub fn of(type_name: impl Into<TypeName>) -> Self {
        Self {
            name: None,
            type_name: type_name.into(),
            markers: Vec::new(),
        }
    }

    /// Set the parameter name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a marker to the parameter.
    pub fn marked(mut self, marker: impl Into<MarkerName>) -> Self {
        self.markers.push(marker.into());
        self
    }

    /// Whether the parameter carries the given marker.
    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers.iter().any(|m| m.as_str() == marker)
    }
}

/// Declared signature of one operation on a type's capability surface.
///
/// # Examples
///
/// ```
/// use weft::descriptor::{MethodDescriptor, ParamDescriptor};
///
/// let save = MethodDescriptor::new("save")
///     .param(ParamDescriptor::of("Order").named("order"))
///     .returns("OrderId")
///     .marked("transactional");
/// assert_eq!(save.name.as_str(), "save");
/// assert!(save.has_marker("transactional"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Operation name.
    pub name: OperationName,
    /// Declared parameters, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamDescriptor>,
    /// Declared return type. `None` for operations that return nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeName>,
    /// Markers attached to the operation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<MarkerName>,
}

impl MethodDescriptor {
    /// Create a descriptor for an operation with no parameters, no declared
    /// return type and no markers.
    pub fn new(name: impl Into<OperationName>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type: None,
            markers: Vec::new(),
        }
    }

    /// Append a declared parameter.
    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    /// Set the declared return type.
    pub fn returns(mut self, type_name: impl Into<TypeName>) -> Self {
        self.return_type = Some(type_name.into());
        self
    }

    /// Attach a marker to the operation.
    pub fn marked(mut self, marker: impl Into<MarkerName>) -> Self {
        self.markers.push(marker.into());
        self
    }

    /// Whether the operation carries the given marker.
    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers.iter().any(|m| m.as_str() == marker)
    }

    /// Whether any declared parameter carries the given marker.
    pub fn has_param_marker(&self, marker: &str) -> bool {
        self.params.iter().any(|p| p.has_marker(marker))
    }

    /// Declared parameter type names, in order.
    pub fn param_type_names(&self) -> impl Iterator<Item = &TypeName> {
        self.params.iter().map(|p| &p.type_name)
    }
}

/// Introspection record for one target type.
///
/// The `supertypes` list is flattened: it contains every transitive
/// supertype, in no particular order. Producing the flattened form is the
/// introspector's job; the matcher only asks membership questions.
///
/// # Examples
///
/// ```
/// use weft::descriptor::{MethodDescriptor, TypeDescriptor};
///
/// let desc = TypeDescriptor::new("OrderRepository")
///     .supertype("Repository")
///     .method(MethodDescriptor::new("save"))
///     .method(MethodDescriptor::new("find_by_id"));
/// assert!(desc.is_subtype_of("Repository"));
/// assert!(desc.operation("save").is_some());
/// assert!(desc.operation("delete").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Type name.
    pub name: TypeName,
    /// Transitively flattened supertypes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supertypes: Vec<TypeName>,
    /// Markers attached to the type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<MarkerName>,
    /// The capability surface: operations the type exposes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodDescriptor>,
}

impl TypeDescriptor {
    /// Create a descriptor with an empty surface.
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            supertypes: Vec::new(),
            markers: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Record a supertype (already-flattened form).
    pub fn supertype(mut self, name: impl Into<TypeName>) -> Self {
        self.supertypes.push(name.into());
        self
    }

    /// Attach a marker to the type.
    pub fn marked(mut self, marker: impl Into<MarkerName>) -> Self {
        self.markers.push(marker.into());
        self
    }

    /// Add an operation to the capability surface.
    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Look up an operation by name.
    pub fn operation(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name.as_str() == name)
    }

    /// Whether this type is the named type or lists it as a supertype.
    pub fn is_subtype_of(&self, type_name: &str) -> bool {
        self.name.as_str() == type_name || self.supertypes.iter().any(|s| s.as_str() == type_name)
    }

    /// Whether the type carries the given marker.
    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers.iter().any(|m| m.as_str() == marker)
    }
}
