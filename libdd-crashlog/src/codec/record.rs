// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::crash_info::{CrashRecord, StackFrame};
use std::io::Cursor;

impl StackFrame {
    pub fn encode<W: Write>(&self, w: &mut W) -> Result<(), EncodeError> {
        write_text(w, &self.class_name)?;
        write_text(w, &self.file_name)?;
        write_text(w, &self.method_name)?;
        write_i32(w, self.line_number)?;
        write_bool(w, self.is_native)
    }

    pub fn decode<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
        Ok(Self {
            class_name: read_text(r)?,
            file_name: read_text(r)?,
            method_name: read_text(r)?,
            line_number: read_i32(r)?,
            is_native: read_bool(r)?,
        })
    }
}

impl CrashRecord {
    /// Writes the record in its fixed field order. Records carry no length
    /// prefix: readers find the end of a record by decoding it.
    pub fn encode<W: Write>(&self, w: &mut W) -> Result<(), EncodeError> {
        write_text(w, &self.crash_id)?;
        write_i64(w, self.timestamp)?;
        write_i64(w, self.allocated_memory_bytes)?;
        write_i64(w, self.max_memory_bytes)?;
        write_i64(w, self.internal_storage_available)?;
        write_i64(w, self.internal_storage_total)?;
        write_i64(w, self.external_storage_available)?;
        write_i64(w, self.external_storage_total)?;
        write_text(w, &self.thread_name)?;
        write_text(w, &self.process_name)?;
        write_text(w, &self.cause_type_name)?;
        write_text(w, self.detail_message.as_deref().unwrap_or_default())?;

        write_frame_count(w, self.stack_frames.len())?;
        for frame in &self.stack_frames {
            frame.encode(w)?;
        }
        Ok(())
    }

    /// Reads one record, leaving `r` positioned right after it.
    /// An empty detail message decodes as `None`.
    pub fn decode<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
        let crash_id = read_text(r)?;
        let timestamp = read_i64(r)?;
        let allocated_memory_bytes = read_i64(r)?;
        let max_memory_bytes = read_i64(r)?;
        let internal_storage_available = read_i64(r)?;
        let internal_storage_total = read_i64(r)?;
        let external_storage_available = read_i64(r)?;
        let external_storage_total = read_i64(r)?;
        let thread_name = read_text(r)?;
        let process_name = read_text(r)?;
        let cause_type_name = read_text(r)?;
        let detail_message = Some(read_text(r)?).filter(|m| !m.is_empty());

        let frame_count = read_frame_count(r)?;
        let mut stack_frames = Vec::with_capacity(frame_count);
        for _ in 0..frame_count {
            stack_frames.push(StackFrame::decode(r)?);
        }

        Ok(Self {
            crash_id,
            timestamp,
            allocated_memory_bytes,
            max_memory_bytes,
            internal_storage_available,
            internal_storage_total,
            external_storage_available,
            external_storage_total,
            thread_name,
            process_name,
            cause_type_name,
            detail_message,
            stack_frames,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::with_capacity(256 + self.stack_frames.len() * 64);
        self.encode(&mut buf)?;
        Ok(buf)
    }

    /// Decodes a buffer that must hold exactly one record, as a record file does.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = Cursor::new(bytes);
        let record = Self::decode(&mut cursor)?;
        let remaining = bytes.len() - cursor.position() as usize;
        if remaining != 0 {
            return Err(DecodeError::TrailingBytes(remaining));
        }
        Ok(record)
    }
}
