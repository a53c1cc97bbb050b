// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Turns unhandled panics into crash records.
//!
//! [`install`] registers an [`Interceptor`] as the process panic hook, chained
//! in front of whatever hook was registered before, and optionally starts the
//! background upload of records left by earlier runs.

mod failure;
mod interceptor;

pub use failure::*;
pub use interceptor::*;

use crate::environment::EnvironmentProvider;
use crate::shared::configuration::CrashlogConfiguration;
use crate::store::CrashRecordStore;
use crate::uploader::eligibility::ConnectivityProvider;
use crate::uploader::transport::{HttpTransport, Transport, TransportError};
use crate::uploader::{UploadHandle, Uploader};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering::SeqCst};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

static INSTALLED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("the crash interceptor is already installed in this process")]
    AlreadyInstalled,
    #[error("failed to set up the crash report transport: {0}")]
    Transport(#[from] TransportError),
}

/// What [`install`] set up. Dropping the handle leaves the hook installed and
/// the upload running.
pub struct InterceptorHandle {
    interceptor: Arc<Interceptor>,
    upload: Option<UploadHandle>,
}

impl InterceptorHandle {
    pub fn interceptor(&self) -> &Arc<Interceptor> {
        &self.interceptor
    }

    pub fn store(&self) -> &Arc<CrashRecordStore> {
        self.interceptor.store()
    }

    /// The upload started at install time, if reporting is enabled and the
    /// connection was eligible.
    pub fn upload(&self) -> Option<&UploadHandle> {
        self.upload.as_ref()
    }

    pub fn into_upload(self) -> Option<UploadHandle> {
        self.upload
    }
}

/// Installs the crash interceptor using an HTTP transport to the configured
/// endpoint. Succeeds at most once per process.
pub fn install(
    config: &CrashlogConfiguration,
    environment: Arc<dyn EnvironmentProvider>,
    connectivity: Arc<dyn ConnectivityProvider>,
) -> Result<InterceptorHandle, InstallError> {
    claim_install()?;
    let transport = if config.report_enabled() {
        match HttpTransport::new(config.endpoint(), config.transmit_timeout()) {
            Ok(transport) => Some(Arc::new(transport) as Arc<dyn Transport>),
            Err(e) => {
                INSTALLED.store(false, SeqCst);
                return Err(e.into());
            }
        }
    } else {
        None
    };
    Ok(install_claimed(config, environment, connectivity, transport))
}

/// Same as [`install`], with the batches sent through `transport`.
pub fn install_with_transport(
    config: &CrashlogConfiguration,
    environment: Arc<dyn EnvironmentProvider>,
    connectivity: Arc<dyn ConnectivityProvider>,
    transport: Arc<dyn Transport>,
) -> Result<InterceptorHandle, InstallError> {
    claim_install()?;
    Ok(install_claimed(
        config,
        environment,
        connectivity,
        Some(transport),
    ))
}

fn claim_install() -> Result<(), InstallError> {
    INSTALLED
        .compare_exchange(false, true, SeqCst, SeqCst)
        .map(|_| ())
        .map_err(|_| InstallError::AlreadyInstalled)
}

fn install_claimed(
    config: &CrashlogConfiguration,
    environment: Arc<dyn EnvironmentProvider>,
    connectivity: Arc<dyn ConnectivityProvider>,
    transport: Option<Arc<dyn Transport>>,
) -> InterceptorHandle {
    let store = Arc::new(CrashRecordStore::new(config.records_dir(), environment));

    let previous = panic::take_hook();
    let interceptor = Arc::new(Interceptor::new(store.clone(), Some(previous)));
    let hook = interceptor.clone();
    panic::set_hook(Box::new(move |info| hook.on_panic(info)));
    info!(
        records_dir = %config.records_dir().display(),
        "crash interceptor installed"
    );

    let upload = match transport {
        Some(transport) if config.report_enabled() => {
            Arc::new(Uploader::new(config, store, connectivity, transport)).start()
        }
        _ => {
            debug!("crash reporting disabled, not starting the upload");
            None
        }
    };
    InterceptorHandle {
        interceptor,
        upload,
    }
}
