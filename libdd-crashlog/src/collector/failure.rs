// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::crash_info::{StackFrame, UNKNOWN_LINE};
use backtrace::{Backtrace, BacktraceSymbol};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::PanicHookInfo;

/// Cause type recorded for Rust panics.
pub const PANIC_CAUSE: &str = "panic";

/// What is known about a failure at the moment it is intercepted, before the
/// environment figures are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedFailure {
    pub cause_type_name: String,
    pub detail_message: Option<String>,
    /// Innermost frame first.
    pub frames: Vec<StackFrame>,
}

impl CapturedFailure {
    pub fn new(
        cause_type_name: impl Into<String>,
        detail_message: Option<String>,
        frames: Vec<StackFrame>,
    ) -> Self {
        Self {
            cause_type_name: cause_type_name.into(),
            detail_message,
            frames,
        }
    }

    /// Captures the stack of the panicking thread. Must be called from within
    /// the panic hook, so that the frames above the panic site can be dropped.
    pub fn from_panic(info: &PanicHookInfo<'_>) -> Self {
        let frames = strip_panic_machinery(frames_from_backtrace(&Backtrace::new()));
        Self::new(PANIC_CAUSE, panic_message(info.payload()), frames)
    }
}

/// Panics raised with `panic!("literal")` carry a `&str`, formatted panics a `String`.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    if let Some(s) = payload.downcast_ref::<&str>() {
        Some(s.to_string())
    } else {
        payload.downcast_ref::<String>().cloned()
    }
}

fn frames_from_backtrace(backtrace: &Backtrace) -> Vec<StackFrame> {
    let mut frames = vec![];
    for frame in backtrace.frames() {
        let symbols = frame.symbols();
        if symbols.is_empty() {
            frames.push(StackFrame::native("", format!("{:?}", frame.ip())));
            continue;
        }
        // Inlined functions resolve to several symbols for the same frame.
        for symbol in symbols {
            frames.push(frame_from_symbol(symbol, frame.ip()));
        }
    }
    frames
}

fn frame_from_symbol(symbol: &BacktraceSymbol, ip: *mut std::ffi::c_void) -> StackFrame {
    // The alternate format drops the trailing hash of mangled Rust names.
    let name = match symbol.name() {
        Some(name) => format!("{name:#}"),
        None => format!("{ip:?}"),
    };
    let (class_name, method_name) = StackFrame::split_symbol(&name);
    match symbol.filename() {
        Some(file) => {
            let line = symbol
                .lineno()
                .and_then(|l| i32::try_from(l).ok())
                .unwrap_or(UNKNOWN_LINE);
            StackFrame::new(class_name, method_name, file.display().to_string(), line)
        }
        None => StackFrame::native(class_name, method_name),
    }
}

fn in_module(class_name: &str, module: &str) -> bool {
    class_name
        .strip_prefix(module)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

fn is_panic_entry(frame: &StackFrame) -> bool {
    in_module(&frame.class_name, "std::panicking") || in_module(&frame.class_name, "core::panicking")
}

fn is_panic_machinery(frame: &StackFrame) -> bool {
    is_panic_entry(frame)
        || in_module(&frame.class_name, "std::panic")
        || matches!(
            frame.method_name.as_str(),
            "rust_begin_unwind" | "__rust_end_short_backtrace" | "__rust_start_panic" | "rust_panic"
        )
}

fn is_capture_frame(frame: &StackFrame) -> bool {
    in_module(&frame.class_name, "backtrace") || in_module(&frame.class_name, "libdd_crashlog")
}

/// Drops the frames of the capture itself and of the standard library panic
/// runtime, so the first remaining frame is the panic site.
///
/// The bottom of the stack is left alone even when it passes through
/// `std::panicking`, as thread entry points and `catch_unwind` do.
pub(crate) fn strip_panic_machinery(frames: Vec<StackFrame>) -> Vec<StackFrame> {
    let skip = match frames.iter().position(is_panic_entry) {
        Some(entry) => {
            entry
                + frames[entry..]
                    .iter()
                    .take_while(|f| is_panic_machinery(f))
                    .count()
        }
        None => frames.iter().take_while(|f| is_capture_frame(f)).count(),
    };
    frames.into_iter().skip(skip).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(symbol: &str) -> StackFrame {
        let (class_name, method_name) = StackFrame::split_symbol(symbol);
        StackFrame::new(class_name, method_name, "src/lib.rs", 1)
    }

    #[test]
    fn message_from_payload() {
        let literal: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(literal.as_ref()).as_deref(), Some("boom"));

        let formatted: Box<dyn Any + Send> = Box::new(format!("bad value {}", 3));
        assert_eq!(
            panic_message(formatted.as_ref()).as_deref(),
            Some("bad value 3")
        );

        let other: Box<dyn Any + Send> = Box::new(17u32);
        assert_eq!(panic_message(other.as_ref()), None);
    }

    #[test]
    fn strips_panic_runtime_frames() {
        let frames = vec![
            frame("backtrace::backtrace::trace"),
            frame("backtrace::capture::Backtrace::new"),
            frame("libdd_crashlog::collector::failure::CapturedFailure::from_panic"),
            frame("<alloc::boxed::Box<F,A> as core::ops::function::Fn<Args>>::call"),
            frame("std::panicking::rust_panic_with_hook"),
            frame("std::panicking::begin_panic_handler::{{closure}}"),
            frame("std::sys::backtrace::__rust_end_short_backtrace"),
            frame("rust_begin_unwind"),
            frame("core::panicking::panic_fmt"),
            frame("my_app::worker::run"),
            frame("my_app::main"),
            frame("std::panicking::try"),
            frame("std::panic::catch_unwind"),
            frame("std::rt::lang_start_internal"),
        ];
        let stripped = strip_panic_machinery(frames);
        let names: Vec<String> = stripped
            .iter()
            .map(|f| format!("{}::{}", f.class_name, f.method_name))
            .collect();
        assert_eq!(
            names,
            [
                "my_app::worker::run",
                "my_app::main",
                "std::panicking::try",
                "std::panic::catch_unwind",
                "std::rt::lang_start_internal",
            ]
        );
    }

    #[test]
    fn without_panic_runtime_only_capture_frames_are_dropped() {
        let frames = vec![
            frame("backtrace::capture::Backtrace::new"),
            frame("my_app::report"),
            frame("my_app::main"),
        ];
        let stripped = strip_panic_machinery(frames);
        assert_eq!(stripped.len(), 2);
        assert_eq!(stripped[0].method_name, "report");
    }

    #[test]
    fn module_matching_respects_path_boundaries() {
        assert!(in_module("std::panicking", "std::panicking"));
        assert!(in_module("std::panicking::begin_panic_handler", "std::panicking"));
        assert!(!in_module("std::panicking", "std::panic"));
        assert!(!in_module("backtrace_helper", "backtrace"));
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn resolved_frames_carry_source_locations() {
        let frames = frames_from_backtrace(&Backtrace::new());
        assert!(!frames.is_empty());
        // This test function itself must show up, with a file name.
        let own = frames
            .iter()
            .find(|f| f.method_name == "resolved_frames_carry_source_locations");
        if let Some(own) = own {
            assert!(!own.is_native);
            assert!(own.file_name.ends_with("failure.rs"));
        }
    }
}
