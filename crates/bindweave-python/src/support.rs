use std::sync::Arc;

use ahash::AHashMap;
use bindweave::{EnumSupportConfig, ModuleDef};
use parking_lot::RwLock;
use pyo3::{
    exceptions::{PyKeyError, PyTypeError, PyValueError},
    prelude::*,
};

use crate::{descriptor::EnumDescriptor, errors::EnumError, registry::EnumRegistry};

/// Python-facing handle on an [`EnumRegistry`].
///
/// Lets descriptor tables be loaded from JSON at runtime, which is how
/// generated pure-Python shims and tests drive the runtime.
#[pyclass(name = "EnumSupport", module = "bindweave", frozen)]
pub struct PyEnumSupport {
    registry: EnumRegistry,
    /// Loaded descriptors keyed by `module.qualname`.
    descriptors: RwLock<AHashMap<String, Arc<EnumDescriptor>>>,
}

impl PyEnumSupport {
    #[must_use]
    pub fn registry(&self) -> &EnumRegistry {
        &self.registry
    }

    fn descriptor(&self, key: &str) -> PyResult<Arc<EnumDescriptor>> {
        self.descriptors
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| PyKeyError::new_err(format!("unknown enum '{key}'")))
    }
}

#[pymethods]
impl PyEnumSupport {
    /// Bootstraps enum support.
    ///
    /// Args:
    ///     config: Optional JSON configuration; defaults to the standard `enum` module.
    #[new]
    #[pyo3(signature = (config = None))]
    pub fn new(py: Python<'_>, config: Option<&str>) -> PyResult<Self> {
        let config = match config {
            Some(source) => EnumSupportConfig::from_json(source).map_err(|e| PyValueError::new_err(e.to_string()))?,
            None => EnumSupportConfig::default(),
        };
        Ok(Self {
            registry: EnumRegistry::bootstrap(py, config)?,
            descriptors: RwLock::new(AHashMap::new()),
        })
    }

    /// Registers every enum of a JSON descriptor table into `namespace`.
    ///
    /// Returns the qualified keys of the registered enums, in table order.
    pub fn load_module(&self, py: Python<'_>, source: &str, namespace: &Bound<'_, PyAny>) -> PyResult<Vec<String>> {
        let module = ModuleDef::from_json(source).map_err(EnumError::from)?;
        let loaded = self.registry.register_module(py, &module, namespace)?;
        let mut descriptors = self.descriptors.write();
        Ok(loaded
            .into_iter()
            .map(|descriptor| {
                let key = descriptor.qualified_name();
                descriptors.insert(key.clone(), descriptor);
                key
            })
            .collect())
    }

    /// Returns the member of a loaded enum for a native value.
    pub fn to_host(&self, py: Python<'_>, key: &str, value: i32) -> PyResult<Py<PyAny>> {
        let descriptor = self.descriptor(key)?;
        Ok(self.registry.to_host(py, value, &descriptor)?.unbind())
    }

    /// Returns the native value of a member of any loaded enum.
    pub fn to_native(&self, member: &Bound<'_, PyAny>) -> PyResult<i32> {
        let Some(descriptor) = self.registry.recover_descriptor(member) else {
            let found = member.get_type().name()?;
            return Err(PyTypeError::new_err(format!(
                "a member of a bound enum is expected not '{found}'"
            )));
        };
        Ok(self.registry.to_native(member, &descriptor)?)
    }

    pub fn is_flag_like(&self, obj: &Bound<'_, PyAny>) -> bool {
        self.registry.is_flag_like(obj)
    }

    pub fn is_enum_like(&self, obj: &Bound<'_, PyAny>) -> bool {
        self.registry.is_enum_like(obj)
    }

    /// Returns the qualified key of the enum `obj` belongs to, if it was loaded here.
    pub fn descriptor_name(&self, obj: &Bound<'_, PyAny>) -> Option<String> {
        self.registry
            .recover_descriptor(obj)
            .map(|descriptor| descriptor.qualified_name())
    }

    fn __repr__(&self) -> String {
        format!(
            "EnumSupport(enum_module={:?}, enums={})",
            self.registry.config().enum_module,
            self.descriptors.read().len()
        )
    }
}
