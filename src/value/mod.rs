//! The uniform value protocol all data flows through, plus the capability
//! traits a value may opt into.
//!
//! Well-known values (nil/bool/int/float/string/bytes/list/map) are a
//! closed set of concrete structs; host-adapter values are boxed trait
//! objects. Capability queries return an optional trait reference rather
//! than a type-assertion that can panic. A "settable" capability folds
//! write access into the same optional-capability pattern as the read
//! capabilities, instead of threading a second trait-object type
//! everywhere a writable slot is needed.
mod error_value;
mod lens;

pub use error_value::ErrorValue;
pub use lens::{Lens, MaterializedLens, SlotState};

use crate::error::RuntimeError;
use crate::types::Type;
use std::collections::HashMap;
use std::fmt::Debug;

/// The raw payload a value's `native()` exposes. Lists and maps carry
/// boxed children rather than a fully-erased `Any` so
/// that callers iterating a list/map payload keep working Values, not a
/// second representation to convert back from.
#[derive(Debug)]
pub enum Native {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<BoxValue>),
    Map(HashMap<String, BoxValue>),
}

/// Structural equality over the scalar variants only; `List`/`Map` compare
/// equal only when both are empty, since their elements are trait objects
/// with no general `PartialEq`. Used by tests, not by the interpreter
/// itself (which goes through [`Comparable`]).
impl PartialEq for Native {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::List(a), Self::List(b)) => a.is_empty() && b.is_empty(),
            (Self::Map(a), Self::Map(b)) => a.is_empty() && b.is_empty(),
            _ => false,
        }
    }
}

/// An owned, dynamically-typed value. Values are cheap to produce and
/// usually live no longer than a single evaluation.
pub type BoxValue = Box<dyn Value>;

/// Capability: `{target}[index]` for array-like values.
pub trait Indexable: Debug {
    fn get_index(&self, index: i64) -> BoxValue;
}

/// Capability: `{target}[key]` for string-keyed containers.
pub trait KeyAccessible: Debug {
    fn get_key(&self, key: &str) -> BoxValue;
}

/// Capability: `{target}.{field}` for structure-shaped values.
pub trait FieldAccessible: Debug {
    fn get_field(&self, field: &str) -> BoxValue;
}

/// Capability: `==`, `!=`, `<`, `<=`, `>`, `>=`.
///
/// Comparing across incompatible primitive types returns `false`/not-less-
/// than rather than an error: convert the right operand, compare; on
/// conversion failure, report no match.
pub trait Comparable: Debug {
    fn equals(&self, other: &dyn Value) -> bool;
    fn less_than(&self, other: &dyn Value) -> bool;
}

/// Capability: `+`, `-`, `*`, `/`. Each op returns a Value — an error-value
/// on type mismatch or division by zero, never a panic.
pub trait Arithmetic: Debug {
    fn add(&self, other: &dyn Value) -> BoxValue;
    fn sub(&self, other: &dyn Value) -> BoxValue;
    fn mul(&self, other: &dyn Value) -> BoxValue;
    fn div(&self, other: &dyn Value) -> BoxValue;
}

/// Capability: write access to a slot. A value opts in by overriding
/// [`Value::as_settable`] to return `Some(self)`.
pub trait Settable: Debug {
    fn set_value(&mut self, value: BoxValue) -> Result<(), crate::error::SetError>;
}

/// The root protocol every runtime datum implements.
pub trait Value: Debug {
    fn type_of(&self) -> Type;
    fn native(&self) -> Native;
    fn convert_to(&self, target: &Type) -> Result<Native, RuntimeError>;
    fn clone_value(&self) -> BoxValue;

    /// If this value is itself an error-value, the error it carries. Used
    /// by the evaluator to detect propagation without a separate `Result`
    /// channel threaded through every expression node.
    fn as_error(&self) -> Option<&RuntimeError> {
        None
    }

    fn as_indexable(&self) -> Option<&dyn Indexable> {
        None
    }
    fn as_key_accessible(&self) -> Option<&dyn KeyAccessible> {
        None
    }
    fn as_field_accessible(&self) -> Option<&dyn FieldAccessible> {
        None
    }
    fn as_comparable(&self) -> Option<&dyn Comparable> {
        None
    }
    fn as_arithmetic(&self) -> Option<&dyn Arithmetic> {
        None
    }
    fn as_settable(&mut self) -> Option<&mut dyn Settable> {
        None
    }
}

/// `v.convertTo(bool)` used by `and`/`or`/`not`/the statement filter.
/// Conversion failure yields `false` *as an error-value*, not a panic — the
/// caller (short-circuit operators, the statement filter) is expected to
/// check `as_error()` on the result when it needs to distinguish a
/// legitimate `false` from a coercion failure.
pub fn to_bool(value: &dyn Value) -> BoxValue {
    match value.convert_to(&crate::types::well_known::boolean()) {
        Ok(Native::Bool(b)) => Box::new(crate::stdlib::primitive::BoolValue(b)),
        Ok(_) => unreachable!("convert_to(bool) must yield Native::Bool"),
        Err(err) => Box::new(ErrorValue::new(err)),
    }
}

/// Convenience used throughout the stdlib/interpreter to build a typed
/// "unsupported capability" error-value rather than panicking.
pub fn missing_capability(value: &dyn Value, capability: &'static str) -> BoxValue {
    Box::new(ErrorValue::new(RuntimeError::MissingCapability {
        type_name: value.type_of().name().to_owned(),
        capability,
    }))
}
