// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Scalar value type system.
//!
//! Every leaf of a decoded record is one [`Scalar`]. Integer and float
//! variants keep the exact wire type so no precision is lost before a
//! consumer decides how to plot it. All variants are serde-serializable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One decoded leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    // Boolean
    Bool(bool),

    // Signed integers
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),

    // Unsigned integers
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),

    // Floating point
    Float32(f32),
    Float64(f64),

    // String (UTF-8, lossy for invalid sequences)
    String(String),

    /// Timestamp as nanoseconds since Unix epoch
    Timestamp(i64),

    /// Duration as nanoseconds (can be negative)
    Duration(i64),
}

impl Scalar {
    /// Check if this value is a numeric type (integers or floats).
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Scalar::String(_))
    }

    /// Check if this value is an integer type (signed or unsigned).
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Scalar::Int8(_)
                | Scalar::Int16(_)
                | Scalar::Int32(_)
                | Scalar::Int64(_)
                | Scalar::UInt8(_)
                | Scalar::UInt16(_)
                | Scalar::UInt32(_)
                | Scalar::UInt64(_)
        )
    }

    /// Check if this value is a temporal type (timestamp or duration).
    pub fn is_temporal(&self) -> bool {
        matches!(self, Scalar::Timestamp(_) | Scalar::Duration(_))
    }

    /// Convert to f64 for plotting.
    ///
    /// Booleans map to 0/1, temporal values to seconds. Strings have no
    /// numeric form.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Scalar::Int8(v) => Some(*v as f64),
            Scalar::Int16(v) => Some(*v as f64),
            Scalar::Int32(v) => Some(*v as f64),
            Scalar::Int64(v) => Some(*v as f64),
            Scalar::UInt8(v) => Some(*v as f64),
            Scalar::UInt16(v) => Some(*v as f64),
            Scalar::UInt32(v) => Some(*v as f64),
            Scalar::UInt64(v) => Some(*v as f64),
            Scalar::Float32(v) => Some(*v as f64),
            Scalar::Float64(v) => Some(*v),
            Scalar::Timestamp(nanos) | Scalar::Duration(nanos) => {
                Some(*nanos as f64 / NANOS_PER_SEC as f64)
            }
            Scalar::String(_) => None,
        }
    }

    /// Try to convert this value to i64 (for integer types only).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int8(v) => Some(*v as i64),
            Scalar::Int16(v) => Some(*v as i64),
            Scalar::Int32(v) => Some(*v as i64),
            Scalar::Int64(v) => Some(*v),
            Scalar::UInt8(v) => Some(*v as i64),
            Scalar::UInt16(v) => Some(*v as i64),
            Scalar::UInt32(v) => Some(*v as i64),
            Scalar::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Try to get the inner string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the timestamp value as nanoseconds.
    pub fn as_timestamp_nanos(&self) -> Option<i64> {
        match self {
            Scalar::Timestamp(nanos) => Some(*nanos),
            _ => None,
        }
    }

    /// Get the type name of this value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "bool",
            Scalar::Int8(_) => "int8",
            Scalar::Int16(_) => "int16",
            Scalar::Int32(_) => "int32",
            Scalar::Int64(_) => "int64",
            Scalar::UInt8(_) => "uint8",
            Scalar::UInt16(_) => "uint16",
            Scalar::UInt32(_) => "uint32",
            Scalar::UInt64(_) => "uint64",
            Scalar::Float32(_) => "float32",
            Scalar::Float64(_) => "float64",
            Scalar::String(_) => "string",
            Scalar::Timestamp(_) => "time",
            Scalar::Duration(_) => "duration",
        }
    }

    /// Create a Timestamp from ROS1 time (secs: u32, nsecs: u32).
    pub fn from_ros1_time(secs: u32, nsecs: u32) -> Self {
        Scalar::Timestamp(secs as i64 * NANOS_PER_SEC + nsecs as i64)
    }

    /// Create a Duration from ROS1 duration (secs: i32, nsecs: i32).
    pub fn from_ros1_duration(secs: i32, nsecs: i32) -> Self {
        Scalar::Duration(secs as i64 * NANOS_PER_SEC + nsecs as i64)
    }
}

/// Nanoseconds per second for time/duration conversion.
pub const NANOS_PER_SEC: i64 = 1_000_000_000;

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Int8(v) => write!(f, "{v}"),
            Scalar::Int16(v) => write!(f, "{v}"),
            Scalar::Int32(v) => write!(f, "{v}"),
            Scalar::Int64(v) => write!(f, "{v}"),
            Scalar::UInt8(v) => write!(f, "{v}"),
            Scalar::UInt16(v) => write!(f, "{v}"),
            Scalar::UInt32(v) => write!(f, "{v}"),
            Scalar::UInt64(v) => write!(f, "{v}"),
            Scalar::Float32(v) => write!(f, "{v}"),
            Scalar::Float64(v) => write!(f, "{v}"),
            Scalar::String(v) => write!(f, "\"{v}\""),
            Scalar::Timestamp(v) => write!(f, "Timestamp({v}ns)"),
            Scalar::Duration(v) => write!(f, "Duration({v}ns)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_f64_numeric() {
        assert_eq!(Scalar::Int8(-3).as_f64(), Some(-3.0));
        assert_eq!(Scalar::UInt64(7).as_f64(), Some(7.0));
        assert_eq!(Scalar::Float32(1.5).as_f64(), Some(1.5));
        assert_eq!(Scalar::Bool(true).as_f64(), Some(1.0));
        assert_eq!(Scalar::String("x".into()).as_f64(), None);
    }

    #[test]
    fn test_time_as_seconds() {
        let t = Scalar::from_ros1_time(2, 500_000_000);
        assert_eq!(t.as_timestamp_nanos(), Some(2_500_000_000));
        assert_eq!(t.as_f64(), Some(2.5));

        let d = Scalar::from_ros1_duration(-1, 0);
        assert_eq!(d.as_f64(), Some(-1.0));
        assert!(d.is_temporal());
    }

    #[test]
    fn test_as_i64_overflow() {
        assert_eq!(Scalar::UInt64(u64::MAX).as_i64(), None);
        assert_eq!(Scalar::UInt32(9).as_i64(), Some(9));
        assert_eq!(Scalar::Float64(1.0).as_i64(), None);
    }

    #[test]
    fn test_type_name_and_display() {
        assert_eq!(Scalar::Float64(0.0).type_name(), "float64");
        assert_eq!(Scalar::String("s".into()).to_string(), "\"s\"");
        assert!(Scalar::Int32(1).is_integer());
        assert!(!Scalar::String("s".into()).is_numeric());
    }
}
