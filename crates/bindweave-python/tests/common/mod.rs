use std::{ffi::CString, sync::Arc};

use bindweave::{EnumBaseType, EnumTypeDef};
use bindweave_python::{EnumDescriptor, EnumRegistry};
use pyo3::{prelude::*, types::PyModule};

pub fn registry(py: Python<'_>) -> EnumRegistry {
    EnumRegistry::bootstrap_default(py).unwrap()
}

/// `Color = {RED: 1, GREEN: 2, BLUE: 4}` as an int flag.
pub fn color() -> Arc<EnumDescriptor> {
    Arc::new(EnumDescriptor::new(
        "gui",
        EnumTypeDef::new("Color", EnumBaseType::IntFlag)
            .with_member("RED", 1)
            .with_member("GREEN", 2)
            .with_member("BLUE", 4),
    ))
}

pub fn descriptor(name: &str, base_type: EnumBaseType, members: &[(&str, i32)]) -> Arc<EnumDescriptor> {
    let def = members
        .iter()
        .fold(EnumTypeDef::new(name, base_type), |def, (member, value)| {
            def.with_member(*member, *value)
        });
    Arc::new(EnumDescriptor::new("tests", def))
}

/// Compiles `code` as a module and makes it importable under `name`.
pub fn install_module<'py>(py: Python<'py>, name: &str, code: &str) -> Bound<'py, PyModule> {
    let code = CString::new(code).unwrap();
    let file_name = CString::new(format!("{name}.py")).unwrap();
    let module_name = CString::new(name).unwrap();
    let module = PyModule::from_code(py, &code, &file_name, &module_name).unwrap();
    py.import("sys")
        .unwrap()
        .getattr("modules")
        .unwrap()
        .set_item(name, &module)
        .unwrap();
    module
}

pub fn member_names(type_object: &Bound<'_, PyAny>) -> Vec<String> {
    type_object
        .try_iter()
        .unwrap()
        .map(|member| member.unwrap().getattr("name").unwrap().extract().unwrap())
        .collect()
}
