//! Runtime descriptors and their materialization cell.
//!
//! An [`EnumDescriptor`] pairs the generator's static [`EnumTypeDef`] with the
//! one piece of mutable state the runtime needs: the cached host type. The
//! cell moves `Unmaterialized -> Building -> Materialized` and only falls back
//! to `Unmaterialized` when a build fails, so a later call can retry.
//!
//! The cell is guarded explicitly instead of relying on the GIL, which may be
//! released by the host while an enum type is being built (or not exist at
//! all on free-threaded builds). A thread that finds another one building
//! waits on a condvar with the GIL detached.

use std::{
    fmt,
    sync::Arc,
    thread::{self, ThreadId},
};

use bindweave::{DescriptorError, EnumTypeDef, ModuleDef};
use parking_lot::{Condvar, Mutex};
use pyo3::{prelude::*, types::PyType};

use crate::{errors::EnumError, slots::SlotDef};

/// One native enum as known to the runtime.
pub struct EnumDescriptor {
    def: EnumTypeDef,
    module: String,
    qualname: Option<String>,
    slots: Vec<SlotDef>,
    cell: Mutex<CellState>,
    ready: Condvar,
}

enum CellState {
    Unmaterialized,
    Building(ThreadId),
    Materialized(Py<PyType>),
}

/// Outcome of trying to take the cell for building.
pub(crate) enum Claim<'a, 'py> {
    Ready(Bound<'py, PyType>),
    Build(BuildGuard<'a>),
}

impl EnumDescriptor {
    /// Creates a descriptor for a module-level enum of `module`.
    #[must_use]
    pub fn new(module: impl Into<String>, def: EnumTypeDef) -> Self {
        Self {
            def,
            module: module.into(),
            qualname: None,
            slots: Vec::new(),
            cell: Mutex::new(CellState::Unmaterialized),
            ready: Condvar::new(),
        }
    }

    /// Sets the `__qualname__` passed to the factory, for enums nested in a class.
    #[must_use]
    pub fn with_qualname(mut self, qualname: impl Into<String>) -> Self {
        self.qualname = Some(qualname.into());
        self
    }

    #[must_use]
    pub fn with_slots(mut self, slots: Vec<SlotDef>) -> Self {
        self.slots = slots;
        self
    }

    /// Builds one descriptor per enum of a generated module, in table order.
    pub fn from_module(module: &ModuleDef) -> Result<Vec<Arc<Self>>, DescriptorError> {
        module.validate()?;
        Self::describe_module(module)
    }

    /// Like [`Self::from_module`], without validating the table first.
    ///
    /// Scope references are still resolved, so a dangling scope is an error.
    pub(crate) fn describe_module(module: &ModuleDef) -> Result<Vec<Arc<Self>>, DescriptorError> {
        module
            .enums
            .iter()
            .map(|def| {
                let descriptor = Self::new(module.name.clone(), def.clone());
                Ok(Arc::new(match module.enum_qualname(def)? {
                    Some(qualname) => descriptor.with_qualname(qualname),
                    None => descriptor,
                }))
            })
            .collect()
    }

    #[must_use]
    pub fn def(&self) -> &EnumTypeDef {
        &self.def
    }

    /// The simple Python name of the enum.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    #[must_use]
    pub fn qualname(&self) -> Option<&str> {
        self.qualname.as_deref()
    }

    /// `module.qualname`, unique across every module the generator produced.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.module, self.qualname().unwrap_or(self.name()))
    }

    #[must_use]
    pub fn slots(&self) -> &[SlotDef] {
        &self.slots
    }

    #[must_use]
    pub fn is_materialized(&self) -> bool {
        matches!(*self.cell.lock(), CellState::Materialized(_))
    }

    /// Returns the cached type without materializing it.
    #[must_use]
    pub fn type_object<'py>(&self, py: Python<'py>) -> Option<Bound<'py, PyType>> {
        match &*self.cell.lock() {
            CellState::Materialized(type_object) => Some(type_object.bind(py).clone()),
            _ => None,
        }
    }

    /// Returns the cached type, or takes the cell so the caller can build it.
    pub(crate) fn claim<'py>(&self, py: Python<'py>) -> Result<Claim<'_, 'py>, EnumError> {
        let me = thread::current().id();
        loop {
            let mut state = self.cell.lock();
            let builder = match &*state {
                CellState::Materialized(type_object) => return Ok(Claim::Ready(type_object.bind(py).clone())),
                CellState::Building(owner) => Some(*owner),
                CellState::Unmaterialized => None,
            };
            match builder {
                None => {
                    *state = CellState::Building(me);
                    return Ok(Claim::Build(BuildGuard {
                        descriptor: self,
                        published: false,
                    }));
                }
                Some(owner) if owner == me => {
                    return Err(EnumError::Reentrant {
                        enum_name: self.def.name.clone(),
                    });
                }
                Some(_) => {}
            }
            drop(state);

            // the builder needs the GIL to finish
            py.detach(|| {
                let mut state = self.cell.lock();
                while matches!(*state, CellState::Building(_)) {
                    self.ready.wait(&mut state);
                }
            });
        }
    }
}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumDescriptor")
            .field("def", &self.def)
            .field("module", &self.module)
            .field("qualname", &self.qualname)
            .field("slots", &self.slots)
            .field("materialized", &self.is_materialized())
            .finish()
    }
}

/// Exclusive right to build a descriptor's type.
///
/// Dropping the guard without publishing puts the cell back to
/// `Unmaterialized` and wakes any waiters so one of them can retry.
pub(crate) struct BuildGuard<'a> {
    descriptor: &'a EnumDescriptor,
    published: bool,
}

impl BuildGuard<'_> {
    pub(crate) fn publish(mut self, type_object: Py<PyType>) {
        *self.descriptor.cell.lock() = CellState::Materialized(type_object);
        self.published = true;
        self.descriptor.ready.notify_all();
    }
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        if !self.published {
            *self.descriptor.cell.lock() = CellState::Unmaterialized;
            self.descriptor.ready.notify_all();
        }
    }
}
