//! Static data model for native enums exposed through generated Python bindings.
//!
//! A binding generator describes every native enum it wraps with an
//! [`EnumTypeDef`] and groups them per extension module in a [`ModuleDef`].
//! This crate owns that description and the rules every runtime must apply
//! identically when turning it into host objects:
//! - which of the four enum families a base type belongs to ([`EnumBaseType::family`])
//! - how a native `int` is read as a host integer and back ([`host_value`], [`native_value`])
//! - how the qualified name of a scoped enum is composed ([`ModuleDef::enum_qualname`])
//!
//! The Python runtime that materializes these descriptors lives in `bindweave-python`.

mod config;
mod descriptor;
mod error;
mod family;
mod module;
mod value;

pub use crate::{
    config::{EnumSupportConfig, FactoryNames},
    descriptor::{EnumTypeDef, MemberDef},
    error::{ConfigError, DescriptorError, ValueRangeError},
    family::{EnumBaseType, EnumFamily},
    module::{ClassDef, ModuleDef, ScopeId},
    value::{host_value, native_value},
};
