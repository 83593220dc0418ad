//! File- and string-backed advisor source over declarative JSON documents.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    adapters::declarative::{AdvisorDecl, HandlerCatalog},
    advisor::Advisor,
    error::Error,
    ports::AdvisorSource,
};

/// Top-level shape of an advisor configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct AdvisorDocument {
    advisors: Vec<AdvisorDecl>,
}

enum DocumentInput {
    File(PathBuf),
    Inline(String),
}

/// Advisor source decoding a JSON document and resolving it against a
/// [`HandlerCatalog`].
///
/// Loading is fully fail-fast: any I/O problem, decode problem or
/// resolution problem (unknown handler, kind mismatch, malformed pattern,
/// missing binding) surfaces as a [`crate::Error`] from `load_advisors`,
/// fatal to container startup.
///
/// # Examples
///
/// ```
/// use weft::adapters::{HandlerCatalog, JsonAdvisorSource};
/// use weft::ports::AdvisorSource;
///
/// let handlers = HandlerCatalog::new().before("check", |_| Ok(()));
/// let source = JsonAdvisorSource::from_str(
///     r#"{"advisors": [{
///         "name": "check_saves",
///         "scope": "security",
///         "pointcut": {"method": {"pattern": "save*"}},
///         "advice": {"kind": "before", "handler": "check"}
///     }]}"#,
///     handlers,
/// );
/// assert_eq!(source.load_advisors()?.len(), 1);
/// # Ok::<(), weft::Error>(())
/// ```
pub struct JsonAdvisorSource {
    input: DocumentInput,
    handlers: HandlerCatalog,
}

impl JsonAdvisorSource {
    /// Source reading the document from a file at load time.
    pub fn from_path(path: impl Into<PathBuf>, handlers: HandlerCatalog) -> Self {
        Self {
            input: DocumentInput::File(path.into()),
            handlers,
        }
    }

    /// Source over an in-memory document.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(document: impl Into<String>, handlers: HandlerCatalog) -> Self {
        Self {
            input: DocumentInput::Inline(document.into()),
            handlers,
        }
    }

    fn document_text(&self) -> Result<String> {
        match &self.input {
            DocumentInput::File(path) => std::fs::read_to_string(path).map_err(|e| Error::Io {
                operation: format!("read advisor configuration from {}", path.display()),
                source: e,
            }),
            DocumentInput::Inline(text) => Ok(text.clone()),
        }
    }

    fn location(&self) -> String {
        match &self.input {
            DocumentInput::File(path) => path.display().to_string(),
            DocumentInput::Inline(_) => "<inline document>".to_string(),
        }
    }

    /// The file path, when the source is file-backed.
    pub fn path(&self) -> Option<&Path> {
        match &self.input {
            DocumentInput::File(path) => Some(path),
            DocumentInput::Inline(_) => None,
        }
    }
}

impl AdvisorSource for JsonAdvisorSource {
    fn load_advisors(&self) -> Result<Vec<Advisor>> {
        let text = self.document_text()?;
        let document: AdvisorDocument =
            serde_json::from_str(&text).map_err(|e| Error::MalformedConfiguration {
                message: format!("{} ({})", e, self.location()),
            })?;

        document
            .advisors
            .iter()
            .map(|decl| decl.resolve(&self.handlers))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handlers() -> HandlerCatalog {
        HandlerCatalog::new()
            .before("check", |_| Ok(()))
            .around("time_it", |_, proceed| proceed.invoke())
    }

    #[test]
    fn test_loads_advisors_in_document_order() {
        let source = JsonAdvisorSource::from_str(
            r#"{"advisors": [
                {"name": "a", "scope": "s", "order": 2,
                 "pointcut": {"method": {"pattern": "*"}},
                 "advice": {"kind": "before", "handler": "check"}},
                {"name": "b", "scope": "s", "order": 1,
                 "pointcut": {"method": {"pattern": "*"}},
                 "advice": {"kind": "around", "handler": "time_it"}}
            ]}"#,
            handlers(),
        );

        let advisors = source.load_advisors().unwrap();
        assert_eq!(advisors.len(), 2);
        // Document order, not precedence order: ordering is the chain
        // builder's job.
        assert_eq!(advisors[0].name(), "a");
        assert_eq!(advisors[1].name(), "b");
    }

    #[test]
    fn test_undecodable_document_is_malformed_configuration() {
        let source = JsonAdvisorSource::from_str("{not json", handlers());
        assert!(matches!(
            source.load_advisors(),
            Err(Error::MalformedConfiguration { .. })
        ));

        let wrong_shape = JsonAdvisorSource::from_str(r#"{"advisers": []}"#, handlers());
        assert!(matches!(
            wrong_shape.load_advisors(),
            Err(Error::MalformedConfiguration { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = JsonAdvisorSource::from_path("/nonexistent/advisors.json", handlers());
        assert!(matches!(source.load_advisors(), Err(Error::Io { .. })));
    }
}
