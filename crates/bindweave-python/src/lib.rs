//! Python runtime for native enum descriptors.
//!
//! Generated binding code bootstraps an [`EnumRegistry`] once, wraps each of
//! its enum tables in [`EnumDescriptor`]s and then goes through the registry
//! for everything else:
//! - [`EnumRegistry::register_module`] binds every enum of a module
//! - [`EnumRegistry::to_host`] / [`EnumRegistry::to_native`] convert values
//! - [`EnumRegistry::recover_descriptor`] maps an enum object back to its descriptor
//!
//! Enum types are built lazily, once per descriptor, using the host's `enum`
//! module. The `_bindweave` extension module exposes the same runtime to Python.

mod convert;
mod descriptor;
mod errors;
mod materialize;
mod registry;
mod slots;
mod support;

use std::sync::OnceLock;

pub use descriptor::EnumDescriptor;
pub use errors::{EnumError, EnumSupportError};
use pyo3::prelude::*;
pub use registry::EnumRegistry;
pub use slots::{BoundSlotMethod, SlotDef, SlotFn, SlotKind, SlotMethod};
pub use support::PyEnumSupport;

/// Returns the package version, converting Cargo's format to Python's PEP 440.
fn get_version() -> &'static str {
    static VERSION: OnceLock<String> = OnceLock::new();

    VERSION.get_or_init(|| {
        // cargo uses "1.0-alpha1" etc. while python uses "1.0.0a1"
        env!("CARGO_PKG_VERSION").replace("-alpha", "a").replace("-beta", "b")
    })
}

/// bindweave - native enum support for generated Python bindings.
#[pymodule]
mod _bindweave {
    use pyo3::prelude::*;

    #[pymodule_export]
    use super::PyEnumSupport as EnumSupport;
    #[pymodule_export]
    use super::SlotMethod;
    #[pymodule_export]
    use super::BoundSlotMethod;
    use super::{EnumSupportError, get_version};

    #[pymodule_init]
    fn init(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add("__version__", get_version())?;
        m.add("EnumSupportError", m.py().get_type::<EnumSupportError>())?;
        Ok(())
    }
}
