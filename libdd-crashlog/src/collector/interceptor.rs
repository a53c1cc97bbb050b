// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::CapturedFailure;
use crate::store::{CrashRecordStore, RecordFile};
use std::panic::PanicHookInfo;
use std::sync::Arc;
use std::thread;
use tracing::{error, info};

pub type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static>;

/// Persists unhandled failures, then hands them on to the hook that was
/// registered before it.
pub struct Interceptor {
    store: Arc<CrashRecordStore>,
    previous: Option<PanicHook>,
}

impl Interceptor {
    pub fn new(store: Arc<CrashRecordStore>, previous: Option<PanicHook>) -> Self {
        Self { store, previous }
    }

    pub fn store(&self) -> &Arc<CrashRecordStore> {
        &self.store
    }

    /// Persists `failure`. A persist error is logged and swallowed: the
    /// caller still has to run the default failure handling.
    pub fn on_unhandled_failure(
        &self,
        thread_name: &str,
        failure: &CapturedFailure,
    ) -> Option<RecordFile> {
        info!(
            thread = thread_name,
            cause = %failure.cause_type_name,
            message = failure.detail_message.as_deref().unwrap_or_default(),
            frames = failure.frames.len(),
            "intercepted unhandled failure"
        );
        match self.store.persist(thread_name, failure) {
            Ok(file) => Some(file),
            Err(e) => {
                error!("failed to persist crash record: {e}");
                None
            }
        }
    }

    /// Panic hook entry point. The previous hook always runs, whatever
    /// happened to the record.
    pub fn on_panic(&self, info: &PanicHookInfo<'_>) {
        let current = thread::current();
        let thread_name = current.name().unwrap_or("<unnamed>");
        let failure = CapturedFailure::from_panic(info);
        self.on_unhandled_failure(thread_name, &failure);
        self.call_previous(info);
    }

    fn call_previous(&self, info: &PanicHookInfo<'_>) {
        if let Some(previous) = &self.previous {
            previous(info);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crash_info::{CrashRecord, Platform, StackFrame};
    use crate::environment::{DeviceInfo, ResourceSnapshot, StaticEnvironment};
    use std::fs;

    fn store(dir: &std::path::Path) -> Arc<CrashRecordStore> {
        let environment = StaticEnvironment {
            device: DeviceInfo {
                app_version_name: "1.0".to_string(),
                platform: Platform::Linux,
                device_model: "x86_64".to_string(),
                os_sdk_version: 6,
                os_release: "6.1.0".to_string(),
                package_name: "com.example".to_string(),
            },
            resources: ResourceSnapshot::default(),
            process_name: "example".to_string(),
        };
        Arc::new(CrashRecordStore::new(dir, Arc::new(environment)))
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn unhandled_failure_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let interceptor = Interceptor::new(store(dir.path()), None);
        let failure = CapturedFailure::new(
            "panic",
            None,
            vec![StackFrame::native("libc", "abort")],
        );

        let file = interceptor.on_unhandled_failure("main", &failure).unwrap();
        let record = CrashRecord::from_bytes(&fs::read(file.path).unwrap()).unwrap();
        assert_eq!(record.thread_name, "main");
        assert_eq!(record.detail_message, None);
        assert_eq!(record.stack_frames, failure.frames);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn persist_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("records");
        fs::write(&blocker, b"").unwrap();
        let interceptor = Interceptor::new(store(&blocker), None);
        let failure = CapturedFailure::new("panic", Some("boom".to_string()), vec![]);

        assert!(interceptor.on_unhandled_failure("main", &failure).is_none());
    }
}
