//! Extra special methods installed on materialized enum types.
//!
//! A generator can attach behaviour the host enum classes don't have, e.g. an
//! arithmetic operator the native enum overloads. Each hook is a Rust closure
//! wrapped in a [`SlotMethod`], which implements the descriptor protocol so the
//! host binds it to instances exactly like a method defined in Python.

use std::{fmt, sync::Arc};

use pyo3::{exceptions::PyTypeError, prelude::*, types::PyTuple};

/// Handler signature for a slot: the receiver and the remaining positional arguments.
pub type SlotFn = Arc<dyn for<'py> Fn(&Bound<'py, PyAny>, &Bound<'py, PyTuple>) -> PyResult<Py<PyAny>> + Send + Sync>;

/// The special methods a descriptor may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
pub enum SlotKind {
    #[strum(serialize = "__repr__")]
    Repr,
    #[strum(serialize = "__str__")]
    Str,
    #[strum(serialize = "__hash__")]
    Hash,
    #[strum(serialize = "__bool__")]
    Bool,
    #[strum(serialize = "__int__")]
    Int,
    #[strum(serialize = "__index__")]
    Index,
    #[strum(serialize = "__eq__")]
    Eq,
    #[strum(serialize = "__ne__")]
    Ne,
    #[strum(serialize = "__lt__")]
    Lt,
    #[strum(serialize = "__le__")]
    Le,
    #[strum(serialize = "__gt__")]
    Gt,
    #[strum(serialize = "__ge__")]
    Ge,
    #[strum(serialize = "__add__")]
    Add,
    #[strum(serialize = "__sub__")]
    Sub,
    #[strum(serialize = "__mul__")]
    Mul,
    #[strum(serialize = "__and__")]
    And,
    #[strum(serialize = "__or__")]
    Or,
    #[strum(serialize = "__xor__")]
    Xor,
    #[strum(serialize = "__invert__")]
    Invert,
    #[strum(serialize = "__neg__")]
    Neg,
    #[strum(serialize = "__contains__")]
    Contains,
}

impl SlotKind {
    /// The attribute name the hook is installed under.
    #[must_use]
    pub fn dunder(self) -> &'static str {
        self.into()
    }
}

/// One behaviour hook of a descriptor.
#[derive(Clone)]
pub struct SlotDef {
    pub kind: SlotKind,
    handler: SlotFn,
}

impl SlotDef {
    pub fn new<F>(kind: SlotKind, handler: F) -> Self
    where
        F: for<'py> Fn(&Bound<'py, PyAny>, &Bound<'py, PyTuple>) -> PyResult<Py<PyAny>> + Send + Sync + 'static,
    {
        Self {
            kind,
            handler: Arc::new(handler),
        }
    }
}

impl fmt::Debug for SlotDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotDef").field("kind", &self.kind).finish_non_exhaustive()
    }
}

/// Installs every hook on a freshly created type.
pub(crate) fn install_slots(type_object: &Bound<'_, PyAny>, slots: &[SlotDef]) -> PyResult<()> {
    let py = type_object.py();
    for slot in slots {
        let method = Py::new(
            py,
            SlotMethod {
                kind: slot.kind,
                handler: Arc::clone(&slot.handler),
            },
        )?;
        type_object.setattr(slot.kind.dunder(), method)?;
    }
    Ok(())
}

/// A slot hook as seen from Python, unbound.
#[pyclass(frozen, module = "bindweave", name = "SlotMethod")]
pub struct SlotMethod {
    kind: SlotKind,
    handler: SlotFn,
}

#[pymethods]
impl SlotMethod {
    fn __get__(
        slf: &Bound<'_, Self>,
        instance: Option<&Bound<'_, PyAny>>,
        _owner: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<Py<PyAny>> {
        let Some(instance) = instance else {
            return Ok(slf.clone().into_any().unbind());
        };
        let bound = BoundSlotMethod {
            kind: slf.get().kind,
            handler: Arc::clone(&slf.get().handler),
            receiver: instance.clone().unbind(),
        };
        Ok(Py::new(slf.py(), bound)?.into_any())
    }

    #[pyo3(signature = (*args))]
    fn __call__(&self, args: &Bound<'_, PyTuple>) -> PyResult<Py<PyAny>> {
        if args.is_empty() {
            return Err(PyTypeError::new_err(format!(
                "unbound {} needs an enum member argument",
                self.kind
            )));
        }
        let receiver = args.get_item(0)?;
        let rest = args.get_slice(1, args.len());
        (self.handler)(&receiver, &rest)
    }

    fn __repr__(&self) -> String {
        format!("<slot method {}>", self.kind)
    }
}

/// A slot hook bound to the member it was looked up on.
#[pyclass(frozen, module = "bindweave", name = "BoundSlotMethod")]
pub struct BoundSlotMethod {
    kind: SlotKind,
    handler: SlotFn,
    receiver: Py<PyAny>,
}

#[pymethods]
impl BoundSlotMethod {
    #[pyo3(signature = (*args))]
    fn __call__(&self, py: Python<'_>, args: &Bound<'_, PyTuple>) -> PyResult<Py<PyAny>> {
        (self.handler)(self.receiver.bind(py), args)
    }

    fn __repr__(&self, py: Python<'_>) -> PyResult<String> {
        let receiver = self.receiver.bind(py).repr()?;
        Ok(format!("<bound slot method {} of {receiver}>", self.kind))
    }
}
