// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Positional reads over a ROS1-serialized buffer.
//!
//! ROS1 serialization is little-endian with no padding. Every read takes
//! the current position and returns the value together with the position
//! just past it, so decode steps compose without hidden cursor state.

use byteorder::{ByteOrder, LittleEndian};

use crate::core::{CodecError, Result as CoreResult, Scalar};
use crate::schema::PrimitiveType;

/// Read-only view of one record's bytes.
#[derive(Debug, Clone, Copy)]
pub struct Ros1Buffer<'a> {
    data: &'a [u8],
}

impl<'a> Ros1Buffer<'a> {
    /// Wrap a record buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Total buffer length.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left after `pos`.
    #[inline]
    pub fn remaining(&self, pos: usize) -> usize {
        self.data.len().saturating_sub(pos)
    }

    /// Borrow `len` bytes at `pos`.
    #[inline]
    pub fn take(&self, pos: usize, len: usize) -> CoreResult<(&'a [u8], usize)> {
        let end = pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| CodecError::truncated(len, self.remaining(pos), pos as u64))?;
        Ok((&self.data[pos..end], end))
    }

    /// Advance past `len` bytes without reading them.
    #[inline]
    pub fn skip(&self, pos: usize, len: usize) -> CoreResult<usize> {
        self.take(pos, len).map(|(_, end)| end)
    }

    /// Read a little-endian `u32` (string and array length prefixes).
    #[inline]
    pub fn read_u32(&self, pos: usize) -> CoreResult<(u32, usize)> {
        let (bytes, next) = self.take(pos, 4)?;
        Ok((LittleEndian::read_u32(bytes), next))
    }

    /// Read a length-prefixed string, replacing invalid UTF-8.
    pub fn read_string(&self, pos: usize) -> CoreResult<(String, usize)> {
        let (len, pos) = self.read_u32(pos)?;
        let len = len as usize;
        if len > self.remaining(pos) {
            return Err(CodecError::length_exceeded(len, pos, self.data.len()));
        }
        let (bytes, next) = self.take(pos, len)?;
        Ok((String::from_utf8_lossy(bytes).into_owned(), next))
    }

    /// Skip a length-prefixed string.
    pub fn skip_string(&self, pos: usize) -> CoreResult<usize> {
        let (len, pos) = self.read_u32(pos)?;
        let len = len as usize;
        if len > self.remaining(pos) {
            return Err(CodecError::length_exceeded(len, pos, self.data.len()));
        }
        self.skip(pos, len)
    }

    /// Read one primitive value.
    pub fn read_primitive(&self, pos: usize, prim: PrimitiveType) -> CoreResult<(Scalar, usize)> {
        if prim == PrimitiveType::String {
            let (s, next) = self.read_string(pos)?;
            return Ok((Scalar::String(s), next));
        }

        let size = prim.size().unwrap_or(0);
        let (b, next) = self.take(pos, size)?;
        let value = match prim {
            PrimitiveType::Bool => Scalar::Bool(b[0] != 0),
            PrimitiveType::Int8 => Scalar::Int8(b[0] as i8),
            PrimitiveType::UInt8 | PrimitiveType::Byte | PrimitiveType::Char => Scalar::UInt8(b[0]),
            PrimitiveType::Int16 => Scalar::Int16(LittleEndian::read_i16(b)),
            PrimitiveType::UInt16 => Scalar::UInt16(LittleEndian::read_u16(b)),
            PrimitiveType::Int32 => Scalar::Int32(LittleEndian::read_i32(b)),
            PrimitiveType::UInt32 => Scalar::UInt32(LittleEndian::read_u32(b)),
            PrimitiveType::Int64 => Scalar::Int64(LittleEndian::read_i64(b)),
            PrimitiveType::UInt64 => Scalar::UInt64(LittleEndian::read_u64(b)),
            PrimitiveType::Float32 => Scalar::Float32(LittleEndian::read_f32(b)),
            PrimitiveType::Float64 => Scalar::Float64(LittleEndian::read_f64(b)),
            PrimitiveType::Time => Scalar::from_ros1_time(
                LittleEndian::read_u32(&b[..4]),
                LittleEndian::read_u32(&b[4..]),
            ),
            PrimitiveType::Duration => Scalar::from_ros1_duration(
                LittleEndian::read_i32(&b[..4]),
                LittleEndian::read_i32(&b[4..]),
            ),
            PrimitiveType::String => unreachable!("handled above"),
        };
        Ok((value, next))
    }

    /// Skip one primitive value.
    pub fn skip_primitive(&self, pos: usize, prim: PrimitiveType) -> CoreResult<usize> {
        match prim.size() {
            Some(size) => self.skip(pos, size),
            None => self.skip_string(pos),
        }
    }
}
