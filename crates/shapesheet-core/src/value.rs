//! Cell value types

use crate::error::{Error, Result};
use std::any::{Any, TypeId};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A typed cell result marshaled to or from the host
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CellValue {
    /// Truncated integer result
    Int(i32),
    /// Floating point result
    Float(f64),
    /// Text result
    Text(String),
}

impl CellValue {
    /// The value type tag of this value
    pub fn value_type(&self) -> CellValueType {
        match self {
            CellValue::Int(_) => CellValueType::Int,
            CellValue::Float(_) => CellValueType::Float,
            CellValue::Text(_) => CellValueType::Text,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            CellValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Int(n)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Float(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(n) => write!(f, "{n}"),
            CellValue::Float(n) => write!(f, "{n}"),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// The result types a host can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CellValueType {
    Int,
    Float,
    Text,
}

impl CellValueType {
    /// Host get flag for this result type (floats, truncated ints, strings)
    pub const fn get_flag(self) -> i16 {
        match self {
            CellValueType::Float => 0,
            CellValueType::Int => 1,
            CellValueType::Text => 3,
        }
    }

    /// Inverse of [`get_flag`](Self::get_flag)
    pub fn from_get_flag(flag: i16) -> Result<Self> {
        match flag {
            0 => Ok(CellValueType::Float),
            1 => Ok(CellValueType::Int),
            3 => Ok(CellValueType::Text),
            other => Err(Error::UnsupportedType(format!("get flag {other}"))),
        }
    }

    /// Resolve the value type for a Rust type.
    ///
    /// Only `i32`, `f64` and `String` are supported.
    pub fn of<T: Any>() -> Result<Self> {
        let id = TypeId::of::<T>();
        if id == TypeId::of::<i32>() {
            Ok(CellValueType::Int)
        } else if id == TypeId::of::<f64>() {
            Ok(CellValueType::Float)
        } else if id == TypeId::of::<String>() {
            Ok(CellValueType::Text)
        } else {
            Err(Error::UnsupportedType(std::any::type_name::<T>().to_string()))
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CellValueType::Int => "int",
            CellValueType::Float => "float",
            CellValueType::Text => "text",
        }
    }
}

impl fmt::Display for CellValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CellValueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" | "i32" => Ok(CellValueType::Int),
            "float" | "double" | "f64" => Ok(CellValueType::Float),
            "text" | "string" | "str" => Ok(CellValueType::Text),
            other => Err(Error::UnsupportedType(other.to_string())),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for f64 {}
    impl Sealed for String {}
}

/// A Rust type that a typed batch read can decode into.
///
/// Sealed to `i32`, `f64` and `String`.
pub trait CellResult: Sized + Clone + fmt::Debug + sealed::Sealed + 'static {
    const VALUE_TYPE: CellValueType;

    /// Extract a value of this type; `None` on a tag mismatch
    fn from_value(value: CellValue) -> Option<Self>;
}

impl CellResult for i32 {
    const VALUE_TYPE: CellValueType = CellValueType::Int;

    fn from_value(value: CellValue) -> Option<Self> {
        match value {
            CellValue::Int(n) => Some(n),
            _ => None,
        }
    }
}

impl CellResult for f64 {
    const VALUE_TYPE: CellValueType = CellValueType::Float;

    fn from_value(value: CellValue) -> Option<Self> {
        match value {
            CellValue::Float(n) => Some(n),
            _ => None,
        }
    }
}

impl CellResult for String {
    const VALUE_TYPE: CellValueType = CellValueType::Text;

    fn from_value(value: CellValue) -> Option<Self> {
        match value {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Unit a result is read or written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnitCode(pub i16);

impl UnitCode {
    /// Unitless number (internal units for lengths)
    pub const NUMBER: UnitCode = UnitCode(32);
    pub const PERCENT: UnitCode = UnitCode(33);
    pub const POINTS: UnitCode = UnitCode(50);
    pub const PAGE_UNITS: UnitCode = UnitCode(63);
    pub const DRAWING_UNITS: UnitCode = UnitCode(64);
    pub const INCHES: UnitCode = UnitCode(65);
    pub const CENTIMETERS: UnitCode = UnitCode(69);
    pub const MILLIMETERS: UnitCode = UnitCode(70);
    pub const DEGREES: UnitCode = UnitCode(81);
    pub const RADIANS: UnitCode = UnitCode(83);
    /// Leave the value in the cell's own units
    pub const NO_CAST: UnitCode = UnitCode(252);
}

impl Default for UnitCode {
    fn default() -> Self {
        UnitCode::NUMBER
    }
}

bitflags::bitflags! {
    /// Flags passed with batched set calls
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct SetFlags: i16 {
        /// Treat result values as formula text
        const RESULTS_AS_FORMULAS = 1;
        /// Override guarded cells
        const BLAST_GUARDS = 2;
        /// Reject writes that introduce circular references
        const TEST_CIRCULAR = 4;
        /// Formulas use universal (locale independent) syntax
        const UNIVERSAL_SYNTAX = 8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_of() {
        assert_eq!(CellValueType::of::<i32>().unwrap(), CellValueType::Int);
        assert_eq!(CellValueType::of::<f64>().unwrap(), CellValueType::Float);
        assert_eq!(CellValueType::of::<String>().unwrap(), CellValueType::Text);

        let err = CellValueType::of::<bool>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(ref name) if name == "bool"));
        assert!(CellValueType::of::<i64>().is_err());
        assert!(CellValueType::of::<&str>().is_err());
    }

    #[test]
    fn test_value_type_parse() {
        assert_eq!("Integer".parse::<CellValueType>().unwrap(), CellValueType::Int);
        assert_eq!("double".parse::<CellValueType>().unwrap(), CellValueType::Float);
        assert_eq!(" string ".parse::<CellValueType>().unwrap(), CellValueType::Text);
        assert!(matches!(
            "bool".parse::<CellValueType>(),
            Err(Error::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_get_flags() {
        for vt in [CellValueType::Int, CellValueType::Float, CellValueType::Text] {
            assert_eq!(CellValueType::from_get_flag(vt.get_flag()).unwrap(), vt);
        }
        assert!(CellValueType::from_get_flag(4).is_err());
    }

    #[test]
    fn test_cell_result_decode() {
        assert_eq!(i32::from_value(CellValue::Int(7)), Some(7));
        assert_eq!(i32::from_value(CellValue::Float(7.0)), None);
        assert_eq!(f64::from_value(CellValue::Float(1.5)), Some(1.5));
        assert_eq!(
            String::from_value(CellValue::from("abc")),
            Some("abc".to_string())
        );
        assert_eq!(<String as CellResult>::VALUE_TYPE, CellValueType::Text);
    }

    #[test]
    fn test_set_flags() {
        let flags = SetFlags::UNIVERSAL_SYNTAX | SetFlags::BLAST_GUARDS;
        assert_eq!(flags.bits(), 10);
        assert_eq!(SetFlags::default().bits(), 0);
    }
}
