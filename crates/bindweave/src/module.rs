//! Per-module descriptor tables.
//!
//! The generator emits one [`ModuleDef`] per extension module. Enums nested in
//! a wrapped class refer to it through a [`ScopeId`], an index into
//! [`ModuleDef::classes`]. Classes can be nested too, which is why qualified
//! names are built by walking the scope chain outwards.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::{DescriptorError, EnumTypeDef};

/// Index of an enclosing class within its module's class table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(pub u32);

impl ScopeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[expect(clippy::cast_possible_truncation, reason = "class tables are far smaller than u32::MAX")]
    fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

/// A wrapped class that may enclose enums or other classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    #[serde(default)]
    pub scope: Option<ScopeId>,
}

impl ClassDef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: None,
        }
    }

    #[must_use]
    pub fn in_scope(mut self, scope: ScopeId) -> Self {
        self.scope = Some(scope);
        self
    }
}

/// The descriptor table of one generated extension module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDef {
    /// The fully qualified module name, used as each enum's `__module__`.
    pub name: String,
    #[serde(default)]
    pub classes: Vec<ClassDef>,
    #[serde(default)]
    pub enums: Vec<EnumTypeDef>,
}

impl ModuleDef {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classes: Vec::new(),
            enums: Vec::new(),
        }
    }

    /// Appends a class and returns the scope that refers to it.
    pub fn add_class(&mut self, class: ClassDef) -> ScopeId {
        let id = ScopeId::from_index(self.classes.len());
        self.classes.push(class);
        id
    }

    #[must_use]
    pub fn with_enum(mut self, def: EnumTypeDef) -> Self {
        self.enums.push(def);
        self
    }

    pub fn from_json(source: &str) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Decodes a table embedded in the binary by the generator.
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, DescriptorError> {
        Ok(postcard::from_bytes(bytes)?)
    }

    pub fn to_postcard(&self) -> Result<Vec<u8>, DescriptorError> {
        Ok(postcard::to_allocvec(self)?)
    }

    /// Returns the class a scope refers to.
    pub fn class(&self, scope: ScopeId) -> Result<&ClassDef, DescriptorError> {
        self.classes.get(scope.index()).ok_or(DescriptorError::UnknownScope {
            index: scope.0,
            classes: self.classes.len(),
        })
    }

    /// Returns the chain of class names from the outermost class down to `scope`.
    pub fn scope_path(&self, scope: ScopeId) -> Result<Vec<&str>, DescriptorError> {
        let mut path = Vec::new();
        let mut current = Some(scope);
        while let Some(id) = current {
            let class = self.class(id)?;
            // a chain longer than the table must revisit a class
            if path.len() == self.classes.len() {
                return Err(DescriptorError::ScopeCycle {
                    class: class.name.clone(),
                });
            }
            path.push(class.name.as_str());
            current = class.scope;
        }
        path.reverse();
        Ok(path)
    }

    /// Returns the dotted qualified name of a class, e.g. `Outer.Widget`.
    pub fn scope_qualname(&self, scope: ScopeId) -> Result<String, DescriptorError> {
        Ok(self.scope_path(scope)?.join("."))
    }

    /// Returns the `__qualname__` an enum needs, or `None` for module-level enums.
    ///
    /// The host's default qualified name is only correct at module level, so a
    /// scoped enum has to be given one explicitly.
    pub fn enum_qualname(&self, def: &EnumTypeDef) -> Result<Option<String>, DescriptorError> {
        match def.scope {
            Some(scope) => Ok(Some(format!("{}.{}", self.scope_qualname(scope)?, def.name))),
            None => Ok(None),
        }
    }

    /// Checks the whole table.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.name.is_empty() {
            return Err(DescriptorError::EmptyName { what: "module" });
        }
        for (index, class) in self.classes.iter().enumerate() {
            if class.name.is_empty() {
                return Err(DescriptorError::EmptyName { what: "class" });
            }
            self.scope_path(ScopeId::from_index(index))?;
        }

        let mut seen = AHashSet::new();
        for def in &self.enums {
            def.validate()?;
            if let Some(scope) = def.scope {
                self.class(scope)?;
            }
            if !seen.insert((def.scope, def.name.as_str())) {
                let scope = match def.scope {
                    Some(scope) => self.scope_qualname(scope)?,
                    None => self.name.clone(),
                };
                return Err(DescriptorError::DuplicateEnum {
                    scope,
                    name: def.name.clone(),
                });
            }
        }
        Ok(())
    }
}
