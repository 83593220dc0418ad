//! Error types for the weft crate

use thiserror::Error;

/// Main error type for the weft crate
///
/// Every variant here is a configuration problem detected while the
/// container is being assembled (fail-fast); none of them is produced
/// during dispatch. Errors raised by advice bodies or targets travel as
/// [`Fault`](crate::invocation::Fault) values instead and are propagated
/// to the caller unchanged.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid name pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("advisor name must not be empty (scope '{scope}')")]
    EmptyAdvisorName { scope: String },

    #[error("duplicate advisor '{name}' in scope '{scope}'")]
    DuplicateAdvisor { name: String, scope: String },

    #[error("invalid binding name '{name}' on advisor '{advisor}' (expected an identifier)")]
    InvalidBindingName { advisor: String, name: String },

    #[error("advisor '{advisor}' declares no binding for its {kind} advice")]
    MissingBinding { advisor: String, kind: String },

    #[error("unknown handler '{handler}' referenced by advisor '{advisor}'")]
    UnknownHandler { advisor: String, handler: String },

    #[error(
        "handler '{handler}' is registered as {registered} advice but advisor '{advisor}' declares it as {declared}"
    )]
    HandlerKindMismatch {
        advisor: String,
        handler: String,
        registered: String,
        declared: String,
    },

    #[error("unknown type '{type_name}' (not present in the introspection catalog)")]
    UnknownType { type_name: String },

    #[error("type '{type_name}' has no operation '{operation}' on its capability surface")]
    UnknownOperation {
        type_name: String,
        operation: String,
    },

    #[error("duplicate type descriptor '{type_name}' in catalog")]
    DuplicateType { type_name: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("advisor configuration is malformed: {message}")]
    MalformedConfiguration { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;
