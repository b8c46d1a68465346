//! Error taxonomy for the OGM.
//!
//! One variant per §7 error kind, plus the handful of parser-internal
//! variants inherited from the Cypher front end (`SyntaxError`,
//! `PlanError`) which are only reachable through the `cypher::parse`
//! test utility, never through the public facade/query/compiler path.

use std::fmt;

/// The coarse error kind a caller should branch on.
///
/// Every [`Error`] maps onto exactly one of these; `kind()` extracts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    ConstraintViolation,
    Unsupported,
    Serialization,
    Transport,
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::ConstraintViolation => "ConstraintViolation",
            ErrorKind::Unsupported => "Unsupported",
            ErrorKind::Serialization => "Serialization",
            ErrorKind::Transport => "Transport",
            ErrorKind::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("unsupported query: {0}")]
    Unsupported(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("transport error: {0}")]
    Transport {
        message: String,
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("cancelled")]
    Cancelled,

    /// Cypher syntax error. Only produced by [`crate::cypher::parse`], the
    /// test-utility front end used to assert on the compiler's output; the
    /// compiler itself never emits text it then has to re-parse in
    /// production code paths.
    #[error("Cypher syntax error at position {position}: {message}")]
    SyntaxError { position: usize, message: String },

    /// Reserved for the retained `cypher::ast`/`parser` front end; the
    /// OGM's own compiler (`compiler` module) never returns this.
    #[error("plan error: {0}")]
    PlanError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::ConstraintViolation(_) => ErrorKind::ConstraintViolation,
            Error::Unsupported(_) => ErrorKind::Unsupported,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Transport { .. } => ErrorKind::Transport,
            Error::Cancelled => ErrorKind::Cancelled,
            // Parser-internal variants surface as InvalidInput/Unsupported
            // to callers who only match on `kind()`.
            Error::SyntaxError { .. } => ErrorKind::InvalidInput,
            Error::PlanError(_) => ErrorKind::Unsupported,
            Error::Io(_) => ErrorKind::Transport,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Error::Transport { message: message.into(), cause: None }
    }

    /// §4.3 `NoSerializer(type)`.
    pub fn no_serializer(type_name: impl fmt::Display) -> Self {
        Error::Serialization(format!("no serializer registered for type {type_name}"))
    }

    /// §4.3 `LabelNotFound(label)`.
    pub fn label_not_found(label: impl fmt::Display) -> Self {
        Error::Serialization(format!("label {label} not found"))
    }

    /// §4.3 `IncompatibleValue(property, type, got)`.
    pub fn incompatible_value(property: impl fmt::Display, expected: impl fmt::Display, got: impl fmt::Display) -> Self {
        Error::Serialization(format!("property {property}: expected {expected}, got {got}"))
    }

    /// §4.3 `UnresolvablePolymorphic(requested, label)`.
    pub fn unresolvable_polymorphic(label: impl fmt::Display) -> Self {
        Error::Serialization(format!("could not resolve a concrete subtype for label {label}"))
    }

    pub fn transport_with_cause(
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::Transport { message: message.into(), cause: Some(Box::new(cause)) }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
