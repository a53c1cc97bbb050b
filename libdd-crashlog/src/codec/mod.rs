// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Big-endian wire primitives, plus the crash record and batch layouts built on them.
//!
//! Integers are fixed width, most significant byte first. Text is framed by a
//! 2-byte unsigned count of its UTF-8 bytes, so a single text value is limited
//! to [`MAX_TEXT_LEN`] bytes. Absent and empty text share the same encoding.

mod batch;
mod error;
mod record;

pub use batch::*;
pub use error::{DecodeError, EncodeError};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

pub const MAX_TEXT_LEN: usize = u16::MAX as usize;
pub const MAX_FRAMES: usize = u16::MAX as usize;

pub fn write_bool<W: Write>(w: &mut W, value: bool) -> Result<(), EncodeError> {
    w.write_u8(u8::from(value))?;
    Ok(())
}

pub fn write_u8<W: Write>(w: &mut W, value: u8) -> Result<(), EncodeError> {
    w.write_u8(value)?;
    Ok(())
}

pub fn write_i32<W: Write>(w: &mut W, value: i32) -> Result<(), EncodeError> {
    w.write_i32::<BigEndian>(value)?;
    Ok(())
}

pub fn write_i64<W: Write>(w: &mut W, value: i64) -> Result<(), EncodeError> {
    w.write_i64::<BigEndian>(value)?;
    Ok(())
}

/// Writes the length prefix, then the UTF-8 bytes of `text`.
pub fn write_text<W: Write>(w: &mut W, text: &str) -> Result<(), EncodeError> {
    let bytes = text.as_bytes();
    let len =
        u16::try_from(bytes.len()).map_err(|_| EncodeError::TextTooLong { len: bytes.len() })?;
    w.write_u16::<BigEndian>(len)?;
    w.write_all(bytes)?;
    Ok(())
}

pub fn write_frame_count<W: Write>(w: &mut W, count: usize) -> Result<(), EncodeError> {
    let count = u16::try_from(count).map_err(|_| EncodeError::TooManyFrames { count })?;
    w.write_u16::<BigEndian>(count)?;
    Ok(())
}

pub fn read_bool<R: Read>(r: &mut R) -> Result<bool, DecodeError> {
    match r.read_u8()? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(DecodeError::InvalidBool(other)),
    }
}

pub fn read_u8<R: Read>(r: &mut R) -> Result<u8, DecodeError> {
    Ok(r.read_u8()?)
}

pub fn read_i32<R: Read>(r: &mut R) -> Result<i32, DecodeError> {
    Ok(r.read_i32::<BigEndian>()?)
}

pub fn read_i64<R: Read>(r: &mut R) -> Result<i64, DecodeError> {
    Ok(r.read_i64::<BigEndian>()?)
}

pub fn read_text<R: Read>(r: &mut R) -> Result<String, DecodeError> {
    let len = r.read_u16::<BigEndian>()? as usize;
    let mut buf = vec![0; len];
    r.read_exact(&mut buf)?;
    Ok(String::from_utf8(buf)?)
}

pub fn read_frame_count<R: Read>(r: &mut R) -> Result<usize, DecodeError> {
    Ok(r.read_u16::<BigEndian>()? as usize)
}
