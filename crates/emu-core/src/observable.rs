//! Observability trait for inspecting emulator state.
//!
//! Every component that carries interesting state exposes it for tests and
//! debugging through dotted query paths. Queries never affect emulation
//! state. Adapted from the workspace's existing `Observable`/`Value`
//! machinery, extended with the 64-bit and floating-point variants this
//! CPU's registers need.

use std::fmt;

/// A dynamically-typed value returned from a state query.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// 8-bit unsigned integer.
    U8(u8),
    /// 32-bit unsigned integer.
    U32(u32),
    /// 64-bit unsigned integer.
    U64(u64),
    /// 64-bit signed integer.
    I64(i64),
    /// Single-precision float.
    F32(f32),
    /// Double-precision float.
    F64(f64),
    /// String value.
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v:#04x}"),
            Value::U32(v) => write!(f, "{v:#010x}"),
            Value::U64(v) => write!(f, "{v:#018x}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

/// A component whose state can be inspected by path, without mutating it.
pub trait Observable {
    /// Query a specific property by path, e.g. `"x0"`, `"flags.z"`, `"pc"`.
    ///
    /// Returns `None` if the path is not recognized.
    fn query(&self, path: &str) -> Option<Value>;

    /// List all paths this component accepts in `query`.
    fn query_paths(&self) -> &'static [&'static str];
}
