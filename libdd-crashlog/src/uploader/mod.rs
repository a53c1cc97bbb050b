// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Sends the pending crash records to the collector as one batch, from a
//! background thread, at most once per process.
//!
//! The upload moves through `Idle -> Eligible -> Sending -> Purged | Retained`,
//! or stops at `Rejected` when the connection is not good enough. There is no
//! retry: records that were not accepted wait for the next launch.

pub mod eligibility;
pub mod transport;

use crate::codec::{encode_batch, EncodeError};
use crate::crash_info::{BatchHeader, CrashRecord};
use crate::shared::configuration::{CrashlogConfiguration, PurgePolicy};
use crate::shared::constants::UPLOAD_THREAD_NAME;
use crate::store::CrashRecordStore;
use bytes::Bytes;
use eligibility::{check_eligibility, ConnectivityProvider, Eligibility};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering::SeqCst};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use std::{fs, io};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use transport::{Transport, TransportError};

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle = 0,
    Rejected = 1,
    Eligible = 2,
    Sending = 3,
    Purged = 4,
    Retained = 5,
}

impl UploadState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => UploadState::Rejected,
            2 => UploadState::Eligible,
            3 => UploadState::Sending,
            4 => UploadState::Purged,
            5 => UploadState::Retained,
            _ => UploadState::Idle,
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to list the records directory: {0}")]
    Scan(#[source] io::Error),
    #[error("failed to encode the batch: {0}")]
    Encode(#[from] EncodeError),
    #[error("failed to send the batch: {0}")]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing valid was pending; no request was made.
    Idle,
    /// The collector accepted the batch.
    Sent { record_count: u8, deleted: usize },
}

pub struct Uploader {
    store: Arc<CrashRecordStore>,
    connectivity: Arc<dyn ConnectivityProvider>,
    transport: Arc<dyn Transport>,
    max_records_per_batch: usize,
    scan_horizon: Option<usize>,
    purge_policy: PurgePolicy,
    report_delay: Duration,
    started: AtomicBool,
    state: Arc<AtomicU8>,
}

impl Uploader {
    pub fn new(
        config: &CrashlogConfiguration,
        store: Arc<CrashRecordStore>,
        connectivity: Arc<dyn ConnectivityProvider>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            store,
            connectivity,
            transport,
            max_records_per_batch: config.max_records_per_batch(),
            scan_horizon: config.scan_horizon(),
            purge_policy: config.purge_policy(),
            report_delay: config.report_delay(),
            started: AtomicBool::new(false),
            state: Arc::new(AtomicU8::new(UploadState::Idle as u8)),
        }
    }

    pub fn state(&self) -> UploadState {
        UploadState::from_u8(self.state.load(SeqCst))
    }

    fn set_state(&self, state: UploadState) {
        self.state.store(state as u8, SeqCst);
    }

    /// Checks eligibility and, when eligible, starts the upload thread and
    /// returns without waiting for it. Only the first call does anything.
    pub fn start(self: &Arc<Self>) -> Option<UploadHandle> {
        if self
            .started
            .compare_exchange(false, true, SeqCst, SeqCst)
            .is_err()
        {
            debug!("crash record upload already started");
            return None;
        }

        let network = self.connectivity.active_network();
        if let Eligibility::Rejected(reason) = check_eligibility(network.as_ref()) {
            info!("not uploading crash records: {reason}");
            self.set_state(UploadState::Rejected);
            return None;
        }
        self.set_state(UploadState::Eligible);

        let uploader = Arc::clone(self);
        match thread::Builder::new()
            .name(UPLOAD_THREAD_NAME.to_string())
            .spawn(move || uploader.run())
        {
            Ok(thread) => Some(UploadHandle {
                state: Arc::clone(&self.state),
                thread,
            }),
            Err(e) => {
                error!("failed to spawn the crash upload thread: {e}");
                self.set_state(UploadState::Retained);
                None
            }
        }
    }

    fn run(&self) {
        lower_thread_priority();
        if !self.report_delay.is_zero() {
            thread::sleep(self.report_delay);
        }
        if let Err(e) = self.run_cycle() {
            warn!("crash record upload failed: {e}");
        }
    }

    /// One scan-send-purge pass, on the calling thread. Files are deleted
    /// only once the collector accepted the batch. Files that fail validation
    /// are set aside as soon as they are found.
    pub fn run_cycle(&self) -> Result<CycleOutcome, UploadError> {
        let result = self.cycle();
        self.set_state(match &result {
            Ok(CycleOutcome::Idle) => UploadState::Idle,
            Ok(CycleOutcome::Sent { .. }) => UploadState::Purged,
            Err(_) => UploadState::Retained,
        });
        result
    }

    fn cycle(&self) -> Result<CycleOutcome, UploadError> {
        let listed = self
            .store
            .pending(self.scan_horizon)
            .map_err(UploadError::Scan)?;
        if listed.is_empty() {
            debug!("no pending crash records");
            return Ok(CycleOutcome::Idle);
        }

        // `scanned` is `listed` with set-aside files under their new names.
        let mut blobs = Vec::new();
        let mut transmitted = Vec::new();
        let mut scanned = Vec::with_capacity(listed.len());
        for path in &listed {
            if blobs.len() == self.max_records_per_batch {
                break;
            }
            let bytes = match fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("skipping unreadable record file {}: {e}", path.display());
                    scanned.push(path.clone());
                    continue;
                }
            };
            match CrashRecord::from_bytes(&bytes) {
                Ok(_) => {
                    blobs.push(bytes);
                    transmitted.push(path.clone());
                    scanned.push(path.clone());
                }
                Err(e) => {
                    warn!("skipping invalid record file {}: {e}", path.display());
                    match self.store.set_aside(path) {
                        Ok(moved) => scanned.push(moved),
                        Err(e) => {
                            warn!("failed to set aside {}: {e}", path.display());
                            scanned.push(path.clone());
                        }
                    }
                }
            }
        }
        scanned.extend_from_slice(&listed[scanned.len()..]);
        if blobs.is_empty() {
            debug!("none of the {} pending files holds a valid record", listed.len());
            return Ok(CycleOutcome::Idle);
        }

        let header = BatchHeader::new(&self.store.environment().device_info());
        let mut body = Vec::with_capacity(blobs.iter().map(Vec::len).sum::<usize>() + 256);
        let record_count = encode_batch(&mut body, &header, &blobs)?;

        self.set_state(UploadState::Sending);
        info!(
            "sending {record_count} crash records ({} bytes, {} files pending)",
            body.len(),
            listed.len()
        );
        self.transport.send(Bytes::from(body))?;

        let to_delete: &[PathBuf] = match self.purge_policy {
            PurgePolicy::AllScanned => &scanned,
            PurgePolicy::TransmittedOnly => &transmitted,
        };
        let deleted = self.store.purge(to_delete);
        info!("collector accepted {record_count} crash records, deleted {deleted} files");
        Ok(CycleOutcome::Sent {
            record_count,
            deleted,
        })
    }
}

/// Handle on a running upload.
#[derive(Debug)]
pub struct UploadHandle {
    state: Arc<AtomicU8>,
    thread: JoinHandle<()>,
}

impl UploadHandle {
    pub fn state(&self) -> UploadState {
        UploadState::from_u8(self.state.load(SeqCst))
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Waits for the upload thread and returns the final state.
    pub fn join(self) -> UploadState {
        if self.thread.join().is_err() {
            error!("crash upload thread panicked");
        }
        UploadState::from_u8(self.state.load(SeqCst))
    }
}

#[cfg(target_os = "linux")]
fn lower_thread_priority() {
    // On Linux the nice value is per thread; `who == 0` is the calling thread.
    // SAFETY: setpriority has no memory safety preconditions.
    let rc = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, 19) };
    if rc != 0 {
        debug!(
            "failed to lower the upload thread priority: {}",
            io::Error::last_os_error()
        );
    }
}

#[cfg(not(target_os = "linux"))]
fn lower_thread_priority() {}
