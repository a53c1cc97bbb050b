// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::crash_info::{BatchHeader, CrashRecord, Platform, MAGIC};
use serde::Serialize;
use std::io::Cursor;

/// The record count is a single byte on the wire; batches never carry more records than this.
pub const MAX_BATCH_RECORDS: usize = 128;

impl BatchHeader {
    pub fn encode<W: Write>(&self, w: &mut W) -> Result<(), EncodeError> {
        write_i32(w, self.magic)?;
        write_i32(w, self.format_version)?;
        write_text(w, &self.app_version_name)?;
        write_u8(w, self.platform.tag())?;
        write_text(w, &self.device_model)?;
        write_i32(w, self.os_sdk_version)?;
        write_text(w, &self.os_release)?;
        write_text(w, &self.package_name)
    }

    pub fn decode<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
        let magic = read_i32(r)?;
        if magic != MAGIC {
            return Err(DecodeError::BadMagic { found: magic });
        }
        Ok(Self {
            magic,
            format_version: read_i32(r)?,
            app_version_name: read_text(r)?,
            platform: Platform::try_from(read_u8(r)?)?,
            device_model: read_text(r)?,
            os_sdk_version: read_i32(r)?,
            os_release: read_text(r)?,
            package_name: read_text(r)?,
        })
    }
}

/// Writes a complete batch body: the header, the clamped record count, then
/// the raw bytes of each record, verbatim.
///
/// Records past [`MAX_BATCH_RECORDS`] are not written. Returns the count that
/// was written into the body.
pub fn encode_batch<W: Write, B: AsRef<[u8]>>(
    w: &mut W,
    header: &BatchHeader,
    records: &[B],
) -> Result<u8, EncodeError> {
    let included = &records[..records.len().min(MAX_BATCH_RECORDS)];
    // MAX_BATCH_RECORDS fits in a byte
    let count = included.len() as u8;

    header.encode(w)?;
    write_u8(w, count)?;
    for record in included {
        w.write_all(record.as_ref())?;
    }
    Ok(count)
}

/// A decoded batch body, as a collector would see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Batch {
    pub header: BatchHeader,
    pub record_count: u8,
    pub records: Vec<CrashRecord>,
}

impl Batch {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = Cursor::new(bytes);
        let header = BatchHeader::decode(&mut cursor)?;
        let record_count = read_u8(&mut cursor)?;
        let mut records = Vec::with_capacity(record_count as usize);
        for _ in 0..record_count {
            records.push(CrashRecord::decode(&mut cursor)?);
        }

        let remaining = bytes.len() - cursor.position() as usize;
        if remaining != 0 {
            return Err(DecodeError::TrailingBytes(remaining));
        }
        Ok(Self {
            header,
            record_count,
            records,
        })
    }
}
