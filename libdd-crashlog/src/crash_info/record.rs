// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::StackFrame;
use serde::{Deserialize, Serialize};

/// One captured failure, as persisted in a record file and carried in a batch.
///
/// Records are written once and never modified; see `codec` for the wire layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashRecord {
    /// Fingerprint of the failure signature, see [`super::crash_id`].
    pub crash_id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub allocated_memory_bytes: i64,
    pub max_memory_bytes: i64,
    pub internal_storage_available: i64,
    pub internal_storage_total: i64,
    pub external_storage_available: i64,
    pub external_storage_total: i64,
    pub thread_name: String,
    pub process_name: String,
    pub cause_type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_message: Option<String>,
    pub stack_frames: Vec<StackFrame>,
}
