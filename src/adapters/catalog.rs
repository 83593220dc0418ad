//! Static type catalog implementing the introspector port.

use std::{collections::HashMap, path::Path, sync::Arc};

use crate::{
    Result,
    descriptor::TypeDescriptor,
    error::Error,
    identifiers::TypeName,
    ports::Introspector,
};

/// Frozen map of type descriptors.
///
/// The catalog is assembled up front (programmatically or from a JSON
/// document) and then only read: `describe` hands out shared descriptors.
/// Duplicate registrations are configuration errors.
///
/// # Examples
///
/// ```
/// use weft::adapters::TypeCatalog;
/// use weft::descriptor::{MethodDescriptor, TypeDescriptor};
/// use weft::ports::Introspector;
///
/// let catalog = TypeCatalog::new()
///     .with_type(TypeDescriptor::new("Ledger").method(MethodDescriptor::new("post")))?;
///
/// let ledger = catalog.describe("Ledger")?;
/// assert!(ledger.operation("post").is_some());
/// assert!(catalog.describe("Unknown").is_err());
/// # Ok::<(), weft::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: HashMap<TypeName, Arc<TypeDescriptor>>,
}

impl TypeCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateType`] if the type is already present.
    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Result<Self> {
        let name = descriptor.name.clone();
        if self.types.contains_key(&name) {
            return Err(Error::DuplicateType {
                type_name: name.to_string(),
            });
        }
        self.types.insert(name, Arc::new(descriptor));
        Ok(self)
    }

    /// Decode a catalog from a JSON array of type descriptors.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let descriptors: Vec<TypeDescriptor> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for descriptor in descriptors {
            catalog = catalog.with_type(descriptor)?;
        }
        Ok(catalog)
    }

    /// Read and decode a catalog from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::Io {
            operation: format!("read type catalog from {}", path.display()),
            source: e,
        })?;
        Self::from_json_str(&text)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the catalog holds no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether a type is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }
}

impl Introspector for TypeCatalog {
    fn describe(&self, type_name: &str) -> Result<Arc<TypeDescriptor>> {
        self.types
            .get(type_name)
            .cloned()
            .ok_or_else(|| Error::UnknownType {
                type_name: type_name.to_string(),
            })
    }
}
