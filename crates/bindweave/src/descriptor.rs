use indexmap::{IndexMap, map::Entry};
use serde::{Deserialize, Serialize};

use crate::{DescriptorError, EnumBaseType, ScopeId, host_value};

/// One entry of an enum's member table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDef {
    pub name: String,
    /// The native value, always stored as a C `int`.
    pub value: i32,
}

/// Static description of one native enum, as emitted by the generator.
///
/// The runtime never mutates this; it is consumed once when the host type is
/// materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumTypeDef {
    /// The Python name of the enum, without any enclosing scope.
    pub name: String,
    #[serde(default)]
    pub base_type: EnumBaseType,
    /// Members in declaration order.
    #[serde(default)]
    pub members: Vec<MemberDef>,
    /// The enclosing class, if the enum isn't declared at module level.
    #[serde(default)]
    pub scope: Option<ScopeId>,
}

impl EnumTypeDef {
    #[must_use]
    pub fn new(name: impl Into<String>, base_type: EnumBaseType) -> Self {
        Self {
            name: name.into(),
            base_type,
            members: Vec::new(),
            scope: None,
        }
    }

    #[must_use]
    pub fn with_member(mut self, name: impl Into<String>, value: i32) -> Self {
        self.members.push(MemberDef {
            name: name.into(),
            value,
        });
        self
    }

    #[must_use]
    pub fn in_scope(mut self, scope: ScopeId) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Returns the member mapping handed to the host factory.
    ///
    /// Values are converted with [`host_value`] and keep declaration order.
    /// Duplicate values are kept, the host turns them into aliases.
    pub fn member_values(&self) -> Result<IndexMap<&str, i64>, DescriptorError> {
        let mut values = IndexMap::with_capacity(self.members.len());
        for member in &self.members {
            match values.entry(member.name.as_str()) {
                Entry::Occupied(_) => {
                    return Err(DescriptorError::DuplicateMember {
                        enum_name: self.name.clone(),
                        member: member.name.clone(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(host_value(member.value, self.base_type));
                }
            }
        }
        Ok(values)
    }

    /// Checks that the enum and all of its members are well formed.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.name.is_empty() {
            return Err(DescriptorError::EmptyName { what: "enum" });
        }
        if self.members.iter().any(|m| m.name.is_empty()) {
            return Err(DescriptorError::EmptyName { what: "member" });
        }
        self.member_values().map(|_| ())
    }
}
