// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! A failing persist must not keep the previous panic hook from running.

use libdd_crashlog::{
    install, CrashlogConfiguration, DeviceInfo, Platform, PurgePolicy, ResourceSnapshot,
    StaticConnectivity, StaticEnvironment,
};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

static PREVIOUS_HOOK_CALLS: AtomicUsize = AtomicUsize::new(0);

#[test]
#[cfg_attr(miri, ignore)]
fn previous_hook_runs_when_persist_fails() {
    let dir = tempfile::tempdir().unwrap();
    // The records directory cannot be created over a regular file.
    let blocker = dir.path().join("crash_report");
    fs::write(&blocker, b"in the way").unwrap();

    std::panic::set_hook(Box::new(|_| {
        PREVIOUS_HOOK_CALLS.fetch_add(1, SeqCst);
    }));

    let config = CrashlogConfiguration::new(
        blocker.clone(),
        "http://localhost:8080/CrashLog/report".to_string(),
        Duration::ZERO,
        false,
        128,
        None,
        None,
        PurgePolicy::AllScanned,
    )
    .unwrap();
    let environment = Arc::new(StaticEnvironment {
        device: DeviceInfo {
            app_version_name: "1.0".to_string(),
            platform: Platform::Linux,
            device_model: "x86_64".to_string(),
            os_sdk_version: 6,
            os_release: "6.1.0".to_string(),
            package_name: "com.example.blocked".to_string(),
        },
        resources: ResourceSnapshot::default(),
        process_name: "blocked".to_string(),
    });
    let handle = install(&config, environment, Arc::new(StaticConnectivity::offline())).unwrap();
    assert!(handle.upload().is_none());

    for i in 0..2 {
        let result = thread::spawn(move || panic!("failure {i}")).join();
        assert!(result.is_err());
    }
    assert_eq!(PREVIOUS_HOOK_CALLS.load(SeqCst), 2);
    assert_eq!(fs::read(&blocker).unwrap(), b"in the way");
}
