//! Process-wide enum support state.
//!
//! [`EnumRegistry::bootstrap`] resolves the four factories of the host's enum
//! facility once; the registry is then handed by reference to every
//! materialization and conversion. It also keeps the back-reference table that
//! maps a materialized type to the descriptor it was built from.

use std::sync::Arc;

use ahash::AHashMap;
use bindweave::{EnumFamily, EnumSupportConfig};
use parking_lot::RwLock;
use pyo3::{
    prelude::*,
    types::{PyString, PyType},
};

use crate::{descriptor::EnumDescriptor, errors::EnumError};

/// The bootstrapped enum runtime.
pub struct EnumRegistry {
    config: EnumSupportConfig,
    factories: EnumFactories,
    pub(crate) names: InternedNames,
    /// Keyed by the address of the type object, which the descriptor keeps alive.
    back_refs: RwLock<AHashMap<usize, Arc<EnumDescriptor>>>,
}

struct EnumFactories {
    plain: Py<PyAny>,
    int: Py<PyAny>,
    flag: Py<PyAny>,
    int_flag: Py<PyAny>,
}

/// Identifiers used on every materialization or conversion.
pub(crate) struct InternedNames {
    pub module: Py<PyString>,
    pub qualname: Py<PyString>,
    pub value: Py<PyString>,
}

impl EnumRegistry {
    /// Resolves the enum facility described by `config`.
    ///
    /// Fails with [`EnumError::Initialization`] if the module or any of the four
    /// factories can't be found. Nothing acquired before the failure is kept.
    pub fn bootstrap(py: Python<'_>, config: EnumSupportConfig) -> Result<Self, EnumError> {
        config.validate().map_err(|error| EnumError::Initialization {
            what: error.to_string(),
            source: None,
        })?;

        let module = py
            .import(config.enum_module.as_str())
            .map_err(|source| EnumError::Initialization {
                what: format!("module '{}' is not available", config.enum_module),
                source: Some(source),
            })?;
        let resolve = |family: EnumFamily| -> Result<Py<PyAny>, EnumError> {
            let name = config.factories.name_for(family);
            let factory = module.getattr(name).map_err(|source| EnumError::Initialization {
                what: format!("'{}.{name}' is not available", config.enum_module),
                source: Some(source),
            })?;
            if !factory.is_callable() {
                return Err(EnumError::Initialization {
                    what: format!("'{}.{name}' is not callable", config.enum_module),
                    source: None,
                });
            }
            Ok(factory.unbind())
        };
        let factories = EnumFactories {
            plain: resolve(EnumFamily::Plain)?,
            int: resolve(EnumFamily::Int)?,
            flag: resolve(EnumFamily::Flag)?,
            int_flag: resolve(EnumFamily::IntFlag)?,
        };

        let names = InternedNames {
            module: PyString::intern(py, "module").unbind(),
            qualname: PyString::intern(py, "qualname").unbind(),
            value: PyString::intern(py, "value").unbind(),
        };

        tracing::debug!(enum_module = %config.enum_module, "enum support initialised");
        Ok(Self {
            config,
            factories,
            names,
            back_refs: RwLock::new(AHashMap::new()),
        })
    }

    /// Bootstraps against CPython's standard `enum` module.
    pub fn bootstrap_default(py: Python<'_>) -> Result<Self, EnumError> {
        Self::bootstrap(py, EnumSupportConfig::default())
    }

    #[must_use]
    pub fn config(&self) -> &EnumSupportConfig {
        &self.config
    }

    /// Returns the factory used to build enums of `family`.
    #[must_use]
    pub fn factory<'py>(&self, py: Python<'py>, family: EnumFamily) -> &Bound<'py, PyAny> {
        let factory = match family {
            EnumFamily::Plain => &self.factories.plain,
            EnumFamily::Int => &self.factories.int,
            EnumFamily::Flag => &self.factories.flag,
            EnumFamily::IntFlag => &self.factories.int_flag,
        };
        factory.bind(py)
    }

    /// Number of enum types this registry has handed out.
    #[must_use]
    pub fn materialized_count(&self) -> usize {
        self.back_refs.read().len()
    }

    pub(crate) fn record_back_ref(&self, type_object: &Bound<'_, PyType>, descriptor: &Arc<EnumDescriptor>) {
        self.back_refs
            .write()
            .insert(type_key(type_object), Arc::clone(descriptor));
    }

    /// Records a type built elsewhere, leaving an existing entry alone.
    pub(crate) fn adopt_back_ref(&self, type_object: &Bound<'_, PyType>, descriptor: &Arc<EnumDescriptor>) {
        let key = type_key(type_object);
        if self.back_refs.read().contains_key(&key) {
            return;
        }
        self.back_refs
            .write()
            .entry(key)
            .or_insert_with(|| Arc::clone(descriptor));
    }

    pub(crate) fn lookup_back_ref(&self, type_object: &Bound<'_, PyType>) -> Option<Arc<EnumDescriptor>> {
        let found = self.back_refs.read().get(&type_key(type_object)).cloned();
        tracing::trace!(found = found.is_some(), "enum back-reference lookup");
        found
    }
}

fn type_key(type_object: &Bound<'_, PyType>) -> usize {
    type_object.as_ptr() as usize
}
