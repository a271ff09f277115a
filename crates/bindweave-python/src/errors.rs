//! Error taxonomy of the enum runtime.
//!
//! Host failures are carried as `PyErr` so they reach the generated wrapper
//! unchanged; everything detected on the Rust side gets its own variant so
//! callers can decide what to do without matching on messages.
//!
//! ## Mapping to Python exceptions
//!
//! ```text
//! Initialization, MissingScope, Reentrant -> EnumSupportError
//! Construction, Host                      -> the original host exception
//! TypeMismatch                            -> TypeError
//! ValueRange                              -> OverflowError
//! Descriptor                              -> ValueError
//! ```

use std::fmt;

use bindweave::{DescriptorError, ValueRangeError};
use pyo3::{
    create_exception,
    exceptions::{PyException, PyOverflowError, PyTypeError, PyValueError},
    prelude::*,
};

create_exception!(
    bindweave,
    EnumSupportError,
    PyException,
    "Raised when the enum runtime itself can't proceed."
);

/// Error returned by registry, materializer and converter operations.
#[derive(Debug)]
pub enum EnumError {
    /// The host enum facility couldn't be resolved at bootstrap.
    Initialization { what: String, source: Option<PyErr> },
    /// Building the enum type failed; the descriptor stays unmaterialized.
    Construction { enum_name: String, source: PyErr },
    /// An object that isn't a member of the expected enum was passed in.
    TypeMismatch { expected: String, found: String },
    /// The host rejected a conversion, e.g. a value with no matching member.
    Host(PyErr),
    /// A host integer doesn't fit the native value.
    ValueRange(ValueRangeError),
    /// The descriptor table is malformed.
    Descriptor(DescriptorError),
    /// The class a scoped enum should be bound on isn't in the namespace.
    MissingScope { enum_name: String, scope: String },
    /// Materialization of an enum was re-entered from within itself.
    Reentrant { enum_name: String },
}

impl fmt::Display for EnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialization { what, source: Some(source) } => {
                write!(f, "unable to initialise enum support: {what}: {source}")
            }
            Self::Initialization { what, source: None } => write!(f, "unable to initialise enum support: {what}"),
            Self::Construction { enum_name, source } => write!(f, "unable to create enum '{enum_name}': {source}"),
            Self::TypeMismatch { expected, found } => {
                write!(f, "a member of enum '{expected}' is expected not '{found}'")
            }
            Self::Host(error) => write!(f, "{error}"),
            Self::ValueRange(error) => write!(f, "{error}"),
            Self::Descriptor(error) => write!(f, "{error}"),
            Self::MissingScope { enum_name, scope } => {
                write!(f, "enum '{enum_name}' can't be bound: scope '{scope}' not found")
            }
            Self::Reentrant { enum_name } => write!(f, "enum '{enum_name}' is already being created"),
        }
    }
}

impl std::error::Error for EnumError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Initialization { source, .. } => source.as_ref().map(|e| e as _),
            Self::Construction { source, .. } => Some(source),
            Self::Host(error) => Some(error),
            Self::ValueRange(error) => Some(error),
            Self::Descriptor(error) => Some(error),
            Self::TypeMismatch { .. } | Self::MissingScope { .. } | Self::Reentrant { .. } => None,
        }
    }
}

impl From<DescriptorError> for EnumError {
    fn from(error: DescriptorError) -> Self {
        Self::Descriptor(error)
    }
}

impl From<ValueRangeError> for EnumError {
    fn from(error: ValueRangeError) -> Self {
        Self::ValueRange(error)
    }
}

impl From<PyErr> for EnumError {
    fn from(error: PyErr) -> Self {
        Self::Host(error)
    }
}

impl From<EnumError> for PyErr {
    fn from(error: EnumError) -> Self {
        match error {
            EnumError::Construction { source, .. } | EnumError::Host(source) => source,
            EnumError::TypeMismatch { .. } => PyTypeError::new_err(error.to_string()),
            EnumError::ValueRange(_) => PyOverflowError::new_err(error.to_string()),
            EnumError::Descriptor(_) => PyValueError::new_err(error.to_string()),
            EnumError::Initialization { .. } | EnumError::MissingScope { .. } | EnumError::Reentrant { .. } => {
                EnumSupportError::new_err(error.to_string())
            }
        }
    }
}
