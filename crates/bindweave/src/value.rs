//! Conversion of member values between the native and host representations.
//!
//! Native enum values are C `int`s. The host sees arbitrary-precision integers,
//! so unsigned base types must reinterpret the bit pattern on the way out and
//! range-check it on the way back in. Materialization and every later
//! conversion go through these two functions so the rule can't drift.

use crate::{EnumBaseType, ValueRangeError};

/// Returns the host integer for a native member value.
///
/// Unsigned base types reinterpret `raw` as a `u32`, so `-1` becomes `0xffff_ffff`.
#[must_use]
pub fn host_value(raw: i32, base_type: EnumBaseType) -> i64 {
    if base_type.is_unsigned() {
        i64::from(raw.cast_unsigned())
    } else {
        i64::from(raw)
    }
}

/// Returns the native member value for a host integer.
///
/// This is the inverse of [`host_value`]: unsigned base types accept
/// `0..=u32::MAX`, signed ones accept the `i32` range.
pub fn native_value(host: i64, base_type: EnumBaseType) -> Result<i32, ValueRangeError> {
    let converted = if base_type.is_unsigned() {
        u32::try_from(host).ok().map(u32::cast_signed)
    } else {
        i32::try_from(host).ok()
    };
    converted.ok_or_else(|| ValueRangeError::new(&host, base_type))
}
