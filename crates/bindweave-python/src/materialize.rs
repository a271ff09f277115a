//! Lazy construction of host enum types from descriptors.
//!
//! Types are built with the functional form of the host factories, i.e.
//! `Factory(name, {member: value, ...}, module=..., qualname=...)`, which keeps
//! the member table's declaration order.

use std::sync::Arc;

use bindweave::ModuleDef;
use pyo3::{
    prelude::*,
    types::{PyDict, PyType},
};

use crate::{
    descriptor::{Claim, EnumDescriptor},
    errors::EnumError,
    registry::EnumRegistry,
    slots::install_slots,
};

impl EnumRegistry {
    /// Returns the host type of `descriptor`, building it on first use.
    ///
    /// At most one type is ever built per descriptor, even when called from
    /// several threads. If building fails the descriptor is left
    /// unmaterialized and the error is returned; a later call retries.
    pub fn get_or_create<'py>(
        &self,
        py: Python<'py>,
        descriptor: &Arc<EnumDescriptor>,
    ) -> Result<Bound<'py, PyType>, EnumError> {
        let guard = match descriptor.claim(py)? {
            Claim::Ready(type_object) => {
                // the type may have been built through another registry
                self.adopt_back_ref(&type_object, descriptor);
                return Ok(type_object);
            }
            Claim::Build(guard) => guard,
        };
        let type_object = self.create_type_object(py, descriptor)?;
        self.record_back_ref(&type_object, descriptor);
        guard.publish(type_object.clone().unbind());
        Ok(type_object)
    }

    fn create_type_object<'py>(
        &self,
        py: Python<'py>,
        descriptor: &EnumDescriptor,
    ) -> Result<Bound<'py, PyType>, EnumError> {
        let def = descriptor.def();
        if self.config().validate_descriptors {
            def.validate()?;
        }
        let construction = |source: PyErr| EnumError::Construction {
            enum_name: def.name.clone(),
            source,
        };

        let members = def.member_values()?.into_pyobject(py).map_err(construction)?;

        let kwargs = PyDict::new(py);
        kwargs
            .set_item(self.names.module.bind(py), descriptor.module())
            .map_err(construction)?;
        // the default __qualname__ is only right for module-level enums
        if let Some(qualname) = descriptor.qualname() {
            kwargs
                .set_item(self.names.qualname.bind(py), qualname)
                .map_err(construction)?;
        }

        let family = def.base_type.family();
        let type_object = self
            .factory(py, family)
            .call((def.name.as_str(), members), Some(&kwargs))
            .map_err(construction)?
            .cast_into::<PyType>()
            .map_err(|error| construction(error.into()))?;

        if !descriptor.slots().is_empty() {
            install_slots(type_object.as_any(), descriptor.slots()).map_err(construction)?;
        }

        tracing::debug!(
            name = %def.name,
            module = descriptor.module(),
            %family,
            members = def.members.len(),
            slots = descriptor.slots().len(),
            "materialized enum type"
        );
        Ok(type_object)
    }

    /// Materializes `descriptor` and binds it under its simple name.
    ///
    /// `namespace` is either a `dict` (a module's globals) or any object, in
    /// which case the type is set as an attribute (an enclosing class).
    pub fn register_into(
        &self,
        py: Python<'_>,
        descriptor: &Arc<EnumDescriptor>,
        namespace: &Bound<'_, PyAny>,
    ) -> Result<(), EnumError> {
        let type_object = self.get_or_create(py, descriptor)?;
        if let Ok(dict) = namespace.cast::<PyDict>() {
            dict.set_item(descriptor.name(), type_object)?;
        } else {
            namespace.setattr(descriptor.name(), type_object)?;
        }
        tracing::trace!(name = descriptor.name(), "registered enum");
        Ok(())
    }

    /// Registers every enum of a generated module.
    ///
    /// Module-level enums are bound in `namespace`; scoped enums are bound on
    /// their enclosing class, looked up from `namespace` along the scope path.
    /// The table is validated first unless `validate_descriptors` is off.
    /// Returns the descriptors in table order.
    pub fn register_module(
        &self,
        py: Python<'_>,
        module: &ModuleDef,
        namespace: &Bound<'_, PyAny>,
    ) -> Result<Vec<Arc<EnumDescriptor>>, EnumError> {
        if self.config().validate_descriptors {
            module.validate()?;
        }
        let descriptors = EnumDescriptor::describe_module(module)?;
        for (def, descriptor) in module.enums.iter().zip(&descriptors) {
            match def.scope {
                None => self.register_into(py, descriptor, namespace)?,
                Some(scope) => {
                    let path = module.scope_path(scope)?;
                    let Some(target) = resolve_scope(namespace, &path) else {
                        return Err(EnumError::MissingScope {
                            enum_name: def.name.clone(),
                            scope: path.join("."),
                        });
                    };
                    self.register_into(py, descriptor, &target)?;
                }
            }
        }
        tracing::debug!(module = %module.name, enums = descriptors.len(), "registered module enums");
        Ok(descriptors)
    }
}

fn resolve_scope<'py>(namespace: &Bound<'py, PyAny>, path: &[&str]) -> Option<Bound<'py, PyAny>> {
    let (first, rest) = path.split_first()?;
    let mut target = match namespace.cast::<PyDict>() {
        Ok(dict) => dict.get_item(*first).ok().flatten()?,
        Err(_) => namespace.getattr(*first).ok()?,
    };
    for name in rest {
        target = target.getattr(*name).ok()?;
    }
    Some(target)
}
