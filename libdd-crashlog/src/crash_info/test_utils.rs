// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg(test)]

use super::*;

pub trait TestInstance {
    fn test_instance(seed: u64) -> Self;
}

impl TestInstance for StackFrame {
    fn test_instance(seed: u64) -> Self {
        StackFrame::new(
            format!("app::module{}", seed % 7),
            format!("function_{seed}"),
            format!("src/module{}.rs", seed % 7),
            (seed % 1000) as i32,
        )
    }
}

impl TestInstance for CrashRecord {
    fn test_instance(seed: u64) -> Self {
        let stack_frames: Vec<StackFrame> = (0..3)
            .map(|i| StackFrame::test_instance(seed * 10 + i))
            .collect();
        let detail_message = Some(format!("called `Option::unwrap()` on a `None` value #{seed}"));
        Self {
            crash_id: crash_id("1.0.1", "panic", detail_message.as_deref(), &stack_frames),
            timestamp: 1_568_898_000_000 + seed as i64,
            allocated_memory_bytes: 16 << 20,
            max_memory_bytes: 8 << 30,
            internal_storage_available: 100 << 30,
            internal_storage_total: 500 << 30,
            external_storage_available: 10 << 30,
            external_storage_total: 50 << 30,
            thread_name: format!("worker-{seed}"),
            process_name: "crashlog-test".to_string(),
            cause_type_name: "panic".to_string(),
            detail_message,
            stack_frames,
        }
    }
}

impl TestInstance for BatchHeader {
    fn test_instance(seed: u64) -> Self {
        Self {
            magic: MAGIC,
            format_version: FORMAT_VERSION,
            app_version_name: format!("1.0.{seed}"),
            platform: Platform::Linux,
            device_model: "x86_64".to_string(),
            os_sdk_version: 6,
            os_release: "6.1.0".to_string(),
            package_name: "com.example.crashlog".to_string(),
        }
    }
}
