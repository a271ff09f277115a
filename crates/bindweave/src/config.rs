use serde::{Deserialize, Serialize};

use crate::{ConfigError, EnumFamily};

/// Settings for resolving the host's enum facility.
///
/// Every field has a default matching CPython's standard `enum` module, so an
/// empty JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumSupportConfig {
    /// Module providing the four enum factories.
    pub enum_module: String,
    pub factories: FactoryNames,
    /// Validate each descriptor before materializing it.
    pub validate_descriptors: bool,
}

impl Default for EnumSupportConfig {
    fn default() -> Self {
        Self {
            enum_module: "enum".to_owned(),
            factories: FactoryNames::default(),
            validate_descriptors: true,
        }
    }
}

impl EnumSupportConfig {
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enum_module.is_empty() {
            return Err(ConfigError::EmptyField("enum_module"));
        }
        for family in EnumFamily::ALL {
            if self.factories.name_for(family).is_empty() {
                return Err(ConfigError::EmptyField(FactoryNames::field_for(family)));
            }
        }
        Ok(())
    }
}

/// Attribute names of the four factories within [`EnumSupportConfig::enum_module`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryNames {
    pub plain: String,
    pub int: String,
    pub flag: String,
    pub int_flag: String,
}

impl Default for FactoryNames {
    fn default() -> Self {
        Self {
            plain: "Enum".to_owned(),
            int: "IntEnum".to_owned(),
            flag: "Flag".to_owned(),
            int_flag: "IntFlag".to_owned(),
        }
    }
}

impl FactoryNames {
    #[must_use]
    pub fn name_for(&self, family: EnumFamily) -> &str {
        match family {
            EnumFamily::Plain => &self.plain,
            EnumFamily::Int => &self.int,
            EnumFamily::Flag => &self.flag,
            EnumFamily::IntFlag => &self.int_flag,
        }
    }

    fn field_for(family: EnumFamily) -> &'static str {
        match family {
            EnumFamily::Plain => "factories.plain",
            EnumFamily::Int => "factories.int",
            EnumFamily::Flag => "factories.flag",
            EnumFamily::IntFlag => "factories.int_flag",
        }
    }
}
