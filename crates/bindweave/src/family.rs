use serde::{Deserialize, Serialize};

/// The base type a generator records for a native enum.
///
/// This is the discriminator carried by every descriptor. It decides both the
/// host factory used to build the type ([`Self::family`]) and how member values
/// are interpreted ([`Self::is_unsigned`]).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString, Serialize, Deserialize,
)]
pub enum EnumBaseType {
    /// A plain `enum.Enum` with signed values.
    #[default]
    #[strum(serialize = "enum")]
    #[serde(rename = "enum")]
    Enum,
    /// An `enum.IntEnum` with signed values.
    #[strum(serialize = "int_enum")]
    #[serde(rename = "int_enum")]
    IntEnum,
    /// An `enum.IntEnum` whose native type is unsigned.
    #[strum(serialize = "uint_enum")]
    #[serde(rename = "uint_enum")]
    UIntEnum,
    /// An `enum.Flag`; flags are implicitly unsigned.
    #[strum(serialize = "flag")]
    #[serde(rename = "flag")]
    Flag,
    /// An `enum.IntFlag`; flags are implicitly unsigned.
    #[strum(serialize = "int_flag")]
    #[serde(rename = "int_flag")]
    IntFlag,
}

impl EnumBaseType {
    /// Returns the factory family used to materialize enums of this base type.
    #[must_use]
    pub fn family(self) -> EnumFamily {
        match self {
            Self::IntFlag => EnumFamily::IntFlag,
            Self::Flag => EnumFamily::Flag,
            Self::IntEnum | Self::UIntEnum => EnumFamily::Int,
            Self::Enum => EnumFamily::Plain,
        }
    }

    /// Whether member values are read as unsigned 32-bit integers.
    #[must_use]
    pub fn is_unsigned(self) -> bool {
        matches!(self, Self::UIntEnum | Self::Flag | Self::IntFlag)
    }

    /// Whether members support bitwise composition.
    #[must_use]
    pub fn is_flag(self) -> bool {
        self.family().is_flag()
    }
}

/// One of the four enum factories provided by the host's `enum` facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EnumFamily {
    /// `enum.Enum`
    Plain,
    /// `enum.IntEnum`
    Int,
    /// `enum.Flag`
    Flag,
    /// `enum.IntFlag`
    IntFlag,
}

impl EnumFamily {
    /// All families, in the order they are resolved at bootstrap.
    pub const ALL: [Self; 4] = [Self::Plain, Self::Int, Self::Flag, Self::IntFlag];

    #[must_use]
    pub fn is_flag(self) -> bool {
        matches!(self, Self::Flag | Self::IntFlag)
    }
}
