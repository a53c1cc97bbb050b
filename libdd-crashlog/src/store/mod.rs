// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The records directory: one file per captured failure, each holding exactly
//! one encoded [`CrashRecord`].

use crate::codec::EncodeError;
use crate::collector::CapturedFailure;
use crate::crash_info::{crash_id, CrashRecord};
use crate::environment::EnvironmentProvider;
use crate::shared::constants::{INVALID_FILE_SUFFIX, RECORD_FILE_EXTENSION, RECORD_FILE_PREFIX};
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Upper bound on `crash_<ts>_<n>` candidates tried for one second.
const MAX_NAME_ATTEMPTS: u32 = 10_000;

#[derive(Debug, Error)]
pub enum PersistError {
    /// Nothing was written: encoding happens before the file is created.
    #[error("failed to encode crash record: {0}")]
    Encode(#[from] EncodeError),
    /// A file that was created before the failure is left in place.
    #[error("failed to write crash record {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A record file written by [`CrashRecordStore::persist`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFile {
    pub path: PathBuf,
    pub crash_id: String,
}

pub struct CrashRecordStore {
    dir: PathBuf,
    environment: Arc<dyn EnvironmentProvider>,
    // Serializes persist calls, so concurrent failures never interleave writes
    // or race for the same file name.
    lock: Mutex<()>,
}

impl CrashRecordStore {
    pub fn new(dir: impl Into<PathBuf>, environment: Arc<dyn EnvironmentProvider>) -> Self {
        Self {
            dir: dir.into(),
            environment,
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn environment(&self) -> &Arc<dyn EnvironmentProvider> {
        &self.environment
    }

    /// Builds the record for `failure` and writes it to a new file.
    ///
    /// Files are named `crash_<YYYYMMDDHHMMSS>.crh` after the local time of
    /// the capture. When that name is taken, `_1`, `_2`, ... is appended to
    /// the timestamp; an existing file is never overwritten.
    pub fn persist(
        &self,
        thread_name: &str,
        failure: &CapturedFailure,
    ) -> Result<RecordFile, PersistError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let now = Local::now();
        let device = self.environment.device_info();
        let resources = self.environment.resources(&self.dir);
        let record = CrashRecord {
            crash_id: crash_id(
                &device.app_version_name,
                &failure.cause_type_name,
                failure.detail_message.as_deref(),
                &failure.frames,
            ),
            timestamp: now.timestamp_millis(),
            allocated_memory_bytes: resources.allocated_memory_bytes,
            max_memory_bytes: resources.max_memory_bytes,
            internal_storage_available: resources.internal_storage_available,
            internal_storage_total: resources.internal_storage_total,
            external_storage_available: resources.external_storage_available,
            external_storage_total: resources.external_storage_total,
            thread_name: thread_name.to_string(),
            process_name: self.environment.process_name(),
            cause_type_name: failure.cause_type_name.clone(),
            detail_message: failure.detail_message.clone(),
            stack_frames: failure.frames.clone(),
        };
        let bytes = record.to_bytes()?;

        fs::create_dir_all(&self.dir).map_err(|source| PersistError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let (path, mut file) = self.create_record_file(&now)?;
        file.write_all(&bytes)
            .and_then(|()| file.sync_all())
            .map_err(|source| PersistError::Io {
                path: path.clone(),
                source,
            })?;

        info!(
            crash_id = %record.crash_id,
            path = %path.display(),
            "persisted crash record"
        );
        Ok(RecordFile {
            path,
            crash_id: record.crash_id,
        })
    }

    fn create_record_file(&self, now: &DateTime<Local>) -> Result<(PathBuf, File), PersistError> {
        let stamp = now.format("%Y%m%d%H%M%S");
        let mut last_err = None;
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = if attempt == 0 {
                format!("{RECORD_FILE_PREFIX}{stamp}.{RECORD_FILE_EXTENSION}")
            } else {
                format!("{RECORD_FILE_PREFIX}{stamp}_{attempt}.{RECORD_FILE_EXTENSION}")
            };
            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("record file {} exists, trying next name", path.display());
                    last_err = Some((path, e));
                }
                Err(source) => return Err(PersistError::Io { path, source }),
            }
        }
        let (path, source) = last_err.unwrap_or_else(|| {
            (
                self.dir.clone(),
                io::Error::from(io::ErrorKind::AlreadyExists),
            )
        });
        Err(PersistError::Io { path, source })
    }

    /// Lists the pending record files in capture order: by timestamp, then by
    /// the numeric same-second suffix. Only regular files with the record
    /// prefix and extension are listed. A missing directory has no pending
    /// files.
    ///
    /// Listing holds the persist lock, so a file that is still being written
    /// is never listed.
    pub fn pending(&self, scan_horizon: Option<usize>) -> io::Result<Vec<PathBuf>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e),
        };

        let mut files = vec![];
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if is_record_file_name(&path) {
                files.push(path);
            }
        }
        files.sort_by_cached_key(|path| capture_order_key(path));
        if let Some(horizon) = scan_horizon {
            files.truncate(horizon);
        }
        Ok(files)
    }

    /// Renames a record file that failed validation to
    /// `<name>.invalid`, so later listings skip it. The contents are kept.
    pub fn set_aside(&self, path: &Path) -> io::Result<PathBuf> {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(INVALID_FILE_SUFFIX);
        let target = PathBuf::from(name);
        fs::rename(path, &target)?;
        warn!("set aside invalid record file as {}", target.display());
        Ok(target)
    }

    /// Deletes `files`, returning how many were removed. Failures are logged
    /// and do not stop the remaining deletions.
    pub fn purge(&self, files: &[PathBuf]) -> usize {
        let mut deleted = 0;
        for path in files {
            match fs::remove_file(path) {
                Ok(()) => deleted += 1,
                Err(e) => warn!("failed to delete record file {}: {e}", path.display()),
            }
        }
        debug!("deleted {deleted} of {} record files", files.len());
        deleted
    }
}

/// `(timestamp, suffix, name)` for `crash_<timestamp>[_<suffix>].crh`, the
/// unsuffixed file first.
fn capture_order_key(path: &Path) -> (String, u64, String) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name
        .strip_prefix(RECORD_FILE_PREFIX)
        .and_then(|n| n.strip_suffix(RECORD_FILE_EXTENSION))
        .and_then(|n| n.strip_suffix('.'))
        .unwrap_or(&name);
    let (stamp, suffix) = match stem.split_once('_') {
        Some((stamp, n)) => (stamp, n.parse().unwrap_or(u64::MAX)),
        None => (stem, 0),
    };
    (stamp.to_string(), suffix, name.clone())
}

fn is_record_file_name(path: &Path) -> bool {
    let name_matches = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(RECORD_FILE_PREFIX));
    name_matches && path.extension().is_some_and(|ext| ext == RECORD_FILE_EXTENSION)
}
