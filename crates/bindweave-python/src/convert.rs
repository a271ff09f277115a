//! Conversion of enum values across the native/host boundary.
//!
//! - `to_host`: native `int` -> enum member, via the materialized type
//! - `to_native`: enum member -> native `int`, with a strict type check
//!
//! Both apply the descriptor's signedness rule, so any member value
//! round-trips unchanged.

use std::sync::Arc;

use bindweave::{EnumFamily, ValueRangeError, host_value, native_value};
use pyo3::{
    prelude::*,
    types::{PyInt, PyType},
};

use crate::{descriptor::EnumDescriptor, errors::EnumError, registry::EnumRegistry};

impl EnumRegistry {
    /// Returns the member of `descriptor`'s enum for a native value.
    ///
    /// Values with no matching member are rejected by the host (plain enums)
    /// or become pseudo-members (flags); either way the host decides.
    pub fn to_host<'py>(
        &self,
        py: Python<'py>,
        native: i32,
        descriptor: &Arc<EnumDescriptor>,
    ) -> Result<Bound<'py, PyAny>, EnumError> {
        let type_object = self.get_or_create(py, descriptor)?;
        let value = host_value(native, descriptor.def().base_type);
        Ok(type_object.call1((value,))?)
    }

    /// Returns the native value of an enum member.
    ///
    /// Fails with [`EnumError::TypeMismatch`] unless `obj` is an instance of
    /// `descriptor`'s enum; other enums and plain integers are never coerced.
    pub fn to_native(&self, obj: &Bound<'_, PyAny>, descriptor: &Arc<EnumDescriptor>) -> Result<i32, EnumError> {
        let py = obj.py();
        let type_object = self.get_or_create(py, descriptor)?;
        if !obj.is_instance(type_object.as_any())? {
            return Err(EnumError::TypeMismatch {
                expected: descriptor.name().to_owned(),
                found: type_name(obj),
            });
        }
        let base_type = descriptor.def().base_type;
        let value = obj
            .getattr(self.names.value.bind(py))?
            .cast_into::<PyInt>()
            .map_err(PyErr::from)?;
        // flag pseudo-members can hold any number of bits
        match value.extract::<i64>() {
            Ok(host) => Ok(native_value(host, base_type)?),
            Err(_) => Err(ValueRangeError::new(&value, base_type).into()),
        }
    }

    /// Whether `obj` is a flag member, or a flag type.
    #[must_use]
    pub fn is_flag_like(&self, obj: &Bound<'_, PyAny>) -> bool {
        self.is_family_like(obj, EnumFamily::Flag)
    }

    /// Whether `obj` is an enum member, or an enum type.
    #[must_use]
    pub fn is_enum_like(&self, obj: &Bound<'_, PyAny>) -> bool {
        self.is_family_like(obj, EnumFamily::Plain)
    }

    /// Returns the descriptor `obj`'s enum was materialized from.
    ///
    /// `obj` may be a member or the enum type itself. Anything else, including
    /// enums defined directly in Python, gives `None`.
    #[must_use]
    pub fn recover_descriptor(&self, obj: &Bound<'_, PyAny>) -> Option<Arc<EnumDescriptor>> {
        if !self.is_enum_like(obj) {
            return None;
        }
        let type_object = match obj.cast::<PyType>() {
            Ok(type_object) => type_object.clone(),
            Err(_) => obj.get_type(),
        };
        self.lookup_back_ref(&type_object)
    }

    fn is_family_like(&self, obj: &Bound<'_, PyAny>, family: EnumFamily) -> bool {
        let factory = self.factory(obj.py(), family);
        match obj.cast::<PyType>() {
            Ok(type_object) => type_object.is_subclass(factory).unwrap_or(false),
            Err(_) => obj.is_instance(factory).unwrap_or(false),
        }
    }
}

fn type_name(obj: &Bound<'_, PyAny>) -> String {
    obj.get_type()
        .name()
        .map_or_else(|_| "<unknown>".to_owned(), |name| name.to_string())
}
