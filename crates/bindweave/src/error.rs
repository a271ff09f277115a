use std::fmt;

use crate::EnumBaseType;

/// Error returned when a generator table is malformed.
///
/// Descriptors are produced at build time, so these indicate a generator bug
/// or a corrupted table rather than a user error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    /// A module, class, enum or member has an empty name.
    EmptyName { what: &'static str },
    /// Two members of the same enum share a name.
    DuplicateMember { enum_name: String, member: String },
    /// Two enums bound in the same scope share a name.
    DuplicateEnum { scope: String, name: String },
    /// A scope index does not refer to a class of the module.
    UnknownScope { index: u32, classes: usize },
    /// Following enclosing scopes from a class leads back to itself.
    ScopeCycle { class: String },
    /// The serialized table could not be decoded.
    Decode(String),
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName { what } => write!(f, "{what} name must not be empty"),
            Self::DuplicateMember { enum_name, member } => {
                write!(f, "enum '{enum_name}' declares member '{member}' more than once")
            }
            Self::DuplicateEnum { scope, name } => write!(f, "enum '{name}' is declared twice in '{scope}'"),
            Self::UnknownScope { index, classes } => {
                write!(f, "scope index {index} is out of range for {classes} classes")
            }
            Self::ScopeCycle { class } => write!(f, "class '{class}' is nested inside itself"),
            Self::Decode(msg) => write!(f, "invalid descriptor table: {msg}"),
        }
    }
}

impl std::error::Error for DescriptorError {}

impl From<serde_json::Error> for DescriptorError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

impl From<postcard::Error> for DescriptorError {
    fn from(error: postcard::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

/// Error returned when a host integer can't be represented as a native member value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRangeError {
    /// The rejected host integer, in decimal. Host integers are unbounded.
    pub value: String,
    pub base_type: EnumBaseType,
}

impl ValueRangeError {
    #[must_use]
    pub fn new(value: &impl fmt::Display, base_type: EnumBaseType) -> Self {
        Self {
            value: value.to_string(),
            base_type,
        }
    }
}

impl fmt::Display for ValueRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.base_type.is_unsigned() { "unsigned" } else { "signed" };
        write!(
            f,
            "value {} is out of range for {} ({kind} 32-bit)",
            self.value, self.base_type
        )
    }
}

impl std::error::Error for ValueRangeError {}

/// Error returned when enum support configuration is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration text could not be parsed.
    Parse(String),
    /// A required name is empty.
    EmptyField(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid enum support config: {msg}"),
            Self::EmptyField(field) => write!(f, "enum support config field '{field}' must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse(error.to_string())
    }
}
