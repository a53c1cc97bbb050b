// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::codec::DecodeError;
use crate::environment::DeviceInfo;
use serde::{Deserialize, Serialize};

/// Identifies a crash batch body.
pub const MAGIC: i32 = 0x0003_125B;
pub const FORMAT_VERSION: i32 = 1;

/// Platform tag of the reporting device, encoded as a single byte.
///
/// The tags are ordinal and part of the wire format: new platforms are
/// appended, existing values are never renumbered.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Android = 1,
    Ios = 2,
    WindowsPhone = 3,
    Windows = 4,
    Linux = 5,
    MacOs = 6,
    Other = 7,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Platform {
    type Error = DecodeError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Ok(match tag {
            1 => Platform::Android,
            2 => Platform::Ios,
            3 => Platform::WindowsPhone,
            4 => Platform::Windows,
            5 => Platform::Linux,
            6 => Platform::MacOs,
            7 => Platform::Other,
            unknown => return Err(DecodeError::UnknownPlatform(unknown)),
        })
    }
}

/// Leads every upload batch; describes the app and device the records came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchHeader {
    pub magic: i32,
    pub format_version: i32,
    pub app_version_name: String,
    pub platform: Platform,
    pub device_model: String,
    pub os_sdk_version: i32,
    pub os_release: String,
    pub package_name: String,
}

impl BatchHeader {
    pub fn new(device: &DeviceInfo) -> Self {
        Self {
            magic: MAGIC,
            format_version: FORMAT_VERSION,
            app_version_name: device.app_version_name.clone(),
            platform: device.platform,
            device_model: device.device_model.clone(),
            os_sdk_version: device.os_sdk_version,
            os_release: device.os_release.clone(),
            package_name: device.package_name.clone(),
        }
    }
}
