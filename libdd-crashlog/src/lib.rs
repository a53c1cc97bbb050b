// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! `libdd-crashlog` records unhandled panics as compact binary crash records
//! and uploads them on a later run.
//!
//! When a panic reaches the hook, the [`collector`] captures its stack, the
//! [`store`] writes one `crash_<timestamp>.crh` file with the record, and the
//! previously registered hook runs as usual. On the next launch with a good
//! enough connection, the [`uploader`] sends every pending record in a single
//! batch and deletes the files once the collector answers with HTTP 200.
//!
//! ```rust,no_run
//! use libdd_crashlog::{
//!     install, CrashlogConfiguration, StaticConnectivity, SystemEnvironment,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = CrashlogConfiguration::from_env()?;
//! let environment = Arc::new(SystemEnvironment::new("1.4.2", "com.example.service"));
//! let _handle = install(&config, environment, Arc::new(StaticConnectivity::unmetered()))?;
//! # Ok(())
//! # }
//! ```
//!
//! All wire integers are big-endian; see [`codec`] for the record and batch
//! layouts.

pub mod codec;
pub mod collector;
pub mod crash_info;
pub mod environment;
pub mod shared;
pub mod store;
pub mod uploader;

pub use collector::{
    install, install_with_transport, CapturedFailure, InstallError, Interceptor, InterceptorHandle,
};
pub use crash_info::{BatchHeader, CrashRecord, Platform, StackFrame};
pub use environment::{
    DeviceInfo, EnvironmentProvider, ResourceSnapshot, StaticEnvironment, SystemEnvironment,
};
pub use shared::configuration::{CrashlogConfiguration, PurgePolicy};
pub use store::{CrashRecordStore, PersistError, RecordFile};
pub use uploader::eligibility::{
    check_eligibility, AccessTechnology, ConnectionType, ConnectivityProvider, Eligibility,
    NetworkClass, NetworkInfo, StaticConnectivity,
};
pub use uploader::transport::{HttpTransport, Transport, TransportError};
pub use uploader::{CycleOutcome, UploadError, UploadHandle, UploadState, Uploader};
