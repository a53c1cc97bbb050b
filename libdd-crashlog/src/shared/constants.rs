// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

pub const RECORD_FILE_PREFIX: &str = "crash_";
pub const RECORD_FILE_EXTENSION: &str = "crh";
/// Appended to record files that fail validation, which takes them out of
/// the pending listing.
pub const INVALID_FILE_SUFFIX: &str = "invalid";
pub const RECORDS_DIR_NAME: &str = "crash_report";

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/CrashLog/report";
pub const DEFAULT_REPORT_DELAY: Duration = Duration::ZERO;
pub const DEFAULT_TRANSMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Name of the background upload thread.
pub const UPLOAD_THREAD_NAME: &str = "CrashLogReport";

pub const ENV_RECORDS_DIR: &str = "DD_CRASHLOG_RECORDS_DIR";
pub const ENV_ENDPOINT: &str = "DD_CRASHLOG_ENDPOINT";
pub const ENV_REPORT_DELAY: &str = "DD_CRASHLOG_REPORT_DELAY";
pub const ENV_REPORT_ENABLED: &str = "DD_CRASHLOG_REPORT_ENABLED";
pub const ENV_MAX_RECORDS_PER_BATCH: &str = "DD_CRASHLOG_MAX_RECORDS_PER_BATCH";
pub const ENV_SCAN_HORIZON: &str = "DD_CRASHLOG_SCAN_HORIZON";
pub const ENV_TRANSMIT_TIMEOUT: &str = "DD_CRASHLOG_TRANSMIT_TIMEOUT";
pub const ENV_PURGE_POLICY: &str = "DD_CRASHLOG_PURGE_POLICY";
