// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Device and resource figures attached to crash records and batch headers.
//!
//! Providers never fail: figures that cannot be obtained are reported as zero
//! or empty.

use crate::crash_info::Platform;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use sysinfo::{Pid, ProcessExt, RefreshKind, System, SystemExt};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub app_version_name: String,
    pub platform: Platform,
    pub device_model: String,
    pub os_sdk_version: i32,
    pub os_release: String,
    pub package_name: String,
}

/// Memory and storage figures, in bytes, at the time of a failure.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub allocated_memory_bytes: i64,
    pub max_memory_bytes: i64,
    pub internal_storage_available: i64,
    pub internal_storage_total: i64,
    pub external_storage_available: i64,
    pub external_storage_total: i64,
}

pub trait EnvironmentProvider: Send + Sync {
    fn device_info(&self) -> DeviceInfo;

    /// `records_dir` locates the internal storage volume. It may not exist yet.
    fn resources(&self, records_dir: &Path) -> ResourceSnapshot;

    fn process_name(&self) -> String;
}

/// Figures read from the running host.
///
/// Internal storage is the volume holding the records directory, external
/// storage the volume holding the temp directory.
pub struct SystemEnvironment {
    app_version_name: String,
    package_name: String,
    os: os_info::Info,
    system: Mutex<System>,
}

impl SystemEnvironment {
    pub fn new(app_version_name: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            app_version_name: app_version_name.into(),
            package_name: package_name.into(),
            os: os_info::get(),
            system: Mutex::new(System::new_with_specifics(RefreshKind::new().with_memory())),
        }
    }

    fn memory(&self) -> (u64, u64) {
        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        let pid = Pid::from(std::process::id() as usize);
        system.refresh_memory();
        let allocated = if system.refresh_process(pid) {
            system.process(pid).map(|p| p.memory()).unwrap_or_default()
        } else {
            debug!("no process information for pid {}", std::process::id());
            0
        };
        (allocated, system.total_memory())
    }
}

impl EnvironmentProvider for SystemEnvironment {
    fn device_info(&self) -> DeviceInfo {
        let os_sdk_version = match self.os.version() {
            os_info::Version::Semantic(major, _, _) => i32::try_from(*major).unwrap_or_default(),
            _ => 0,
        };
        DeviceInfo {
            app_version_name: self.app_version_name.clone(),
            platform: Platform::current(),
            device_model: self.os.architecture().unwrap_or("unknown").to_string(),
            os_sdk_version,
            os_release: self.os.version().to_string(),
            package_name: self.package_name.clone(),
        }
    }

    fn resources(&self, records_dir: &Path) -> ResourceSnapshot {
        let (allocated, max) = self.memory();
        let (internal_available, internal_total) = volume_space(records_dir);
        let (external_available, external_total) = volume_space(&std::env::temp_dir());
        ResourceSnapshot {
            allocated_memory_bytes: saturating_i64(allocated),
            max_memory_bytes: saturating_i64(max),
            internal_storage_available: saturating_i64(internal_available),
            internal_storage_total: saturating_i64(internal_total),
            external_storage_available: saturating_i64(external_available),
            external_storage_total: saturating_i64(external_total),
        }
    }

    fn process_name(&self) -> String {
        current_process_name()
    }
}

/// Fixed figures, for hosts that already know them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticEnvironment {
    pub device: DeviceInfo,
    pub resources: ResourceSnapshot,
    pub process_name: String,
}

impl EnvironmentProvider for StaticEnvironment {
    fn device_info(&self) -> DeviceInfo {
        self.device.clone()
    }

    fn resources(&self, _records_dir: &Path) -> ResourceSnapshot {
        self.resources
    }

    fn process_name(&self) -> String {
        self.process_name.clone()
    }
}

pub(crate) fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Available and total bytes of the volume holding `path`, or of its nearest
/// existing ancestor.
fn volume_space(path: &Path) -> (u64, u64) {
    let Some(existing) = path.ancestors().find(|p| p.exists()) else {
        return (0, 0);
    };
    let available = fs2::available_space(existing).unwrap_or_else(|e| {
        debug!("cannot read available space of {}: {e}", existing.display());
        0
    });
    let total = fs2::total_space(existing).unwrap_or_else(|e| {
        debug!("cannot read total space of {}: {e}", existing.display());
        0
    });
    (available, total)
}

fn current_process_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_name().map(|n| n.to_string_lossy().into_owned()))
        .or_else(|| std::env::args().next())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_conversion() {
        assert_eq!(saturating_i64(42), 42);
        assert_eq!(saturating_i64(u64::MAX), i64::MAX);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn volume_of_missing_directory_uses_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not").join("yet").join("there");
        let (available, total) = volume_space(&missing);
        assert!(total > 0);
        assert!(available <= total);
    }

    #[test]
    #[cfg_attr(miri, ignore)] // os_info::get() spawns subprocess, unsupported by Miri
    fn system_environment_reports_host_figures() {
        let env = SystemEnvironment::new("3.2.1", "com.example.app");
        let device = env.device_info();
        assert_eq!(device.app_version_name, "3.2.1");
        assert_eq!(device.package_name, "com.example.app");
        assert_eq!(device.platform, Platform::current());
        assert!(!device.device_model.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let resources = env.resources(dir.path());
        assert!(resources.internal_storage_total > 0);
        assert!(resources.internal_storage_available <= resources.internal_storage_total);
        assert!(resources.allocated_memory_bytes >= 0);
        assert!(!env.process_name().is_empty());
    }

    #[test]
    fn static_environment_returns_its_values() {
        let env = StaticEnvironment {
            device: DeviceInfo {
                app_version_name: "1.0".to_string(),
                platform: Platform::Android,
                device_model: "Pixel".to_string(),
                os_sdk_version: 19,
                os_release: "4.4".to_string(),
                package_name: "com.example".to_string(),
            },
            resources: ResourceSnapshot {
                allocated_memory_bytes: 1,
                max_memory_bytes: 2,
                ..Default::default()
            },
            process_name: "example".to_string(),
        };
        assert_eq!(env.device_info().device_model, "Pixel");
        assert_eq!(env.resources(Path::new("/nowhere")).max_memory_bytes, 2);
        assert_eq!(env.process_name(), "example");
    }
}
