// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use libdd_crashlog::codec::{encode_batch, MAX_BATCH_RECORDS};
use libdd_crashlog::crash_info::{crash_id, BatchHeader, CrashRecord, Platform, StackFrame};
use libdd_crashlog::DeviceInfo;

fn record(frame_count: usize) -> CrashRecord {
    let stack_frames: Vec<StackFrame> = (0..frame_count)
        .map(|i| {
            StackFrame::new(
                format!("bench_app::module_{}", i % 16),
                format!("function_{i}"),
                format!("src/module_{}.rs", i % 16),
                i as i32,
            )
        })
        .collect();
    let detail_message = Some("called `Result::unwrap()` on an `Err` value".to_string());
    CrashRecord {
        crash_id: crash_id("1.0.0", "panic", detail_message.as_deref(), &stack_frames),
        timestamp: 1_700_000_000_000,
        allocated_memory_bytes: 64 << 20,
        max_memory_bytes: 16 << 30,
        internal_storage_available: 100 << 30,
        internal_storage_total: 500 << 30,
        external_storage_available: 10 << 30,
        external_storage_total: 50 << 30,
        thread_name: "worker-3".to_string(),
        process_name: "bench".to_string(),
        cause_type_name: "panic".to_string(),
        detail_message,
        stack_frames,
    }
}

pub fn codec_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("record");
    for frame_count in [8, 64, 512] {
        let record = record(frame_count);
        let encoded = record.to_bytes().unwrap();
        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("encode", frame_count),
            &record,
            |b, record| b.iter(|| black_box(record.to_bytes().unwrap())),
        );
        group.bench_with_input(
            BenchmarkId::new("decode", frame_count),
            &encoded,
            |b, encoded| b.iter(|| black_box(CrashRecord::from_bytes(encoded).unwrap())),
        );
    }
    group.finish();

    let header = BatchHeader::new(&DeviceInfo {
        app_version_name: "1.0.0".to_string(),
        platform: Platform::Linux,
        device_model: "x86_64".to_string(),
        os_sdk_version: 6,
        os_release: "6.1.0".to_string(),
        package_name: "com.example.bench".to_string(),
    });
    let blobs: Vec<Vec<u8>> = (0..MAX_BATCH_RECORDS)
        .map(|i| record(32 + i % 32).to_bytes().unwrap())
        .collect();
    c.bench_function("batch/encode_full", |b| {
        b.iter(|| {
            let mut body = Vec::new();
            black_box(encode_batch(&mut body, &header, &blobs).unwrap());
            body
        })
    });
}
