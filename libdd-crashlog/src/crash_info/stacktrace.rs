// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// Line number used when the source line of a frame is not known.
pub const UNKNOWN_LINE: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct StackFrame {
    /// Module path of the function, e.g. `my_app::worker` for `my_app::worker::run`.
    pub class_name: String,
    pub file_name: String,
    pub method_name: String,
    /// Negative when unknown.
    pub line_number: i32,
    /// Set for frames without source information, typically foreign code.
    pub is_native: bool,
}

impl StackFrame {
    pub fn new(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        file_name: impl Into<String>,
        line_number: i32,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            file_name: file_name.into(),
            method_name: method_name.into(),
            line_number,
            is_native: false,
        }
    }

    pub fn native(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            file_name: String::new(),
            method_name: method_name.into(),
            line_number: UNKNOWN_LINE,
            is_native: true,
        }
    }

    /// Every field of the frame in a fixed layout,
    /// `module::function(file:line)` followed by `[native]` for native frames.
    pub fn fingerprint_key(&self) -> String {
        let mut key = format!(
            "{}::{}({}:{})",
            self.class_name, self.method_name, self.file_name, self.line_number
        );
        if self.is_native {
            key.push_str("[native]");
        }
        key
    }

    /// Splits a demangled symbol like `my_app::worker::run` into its module
    /// path and function name. Names without a path separator have an empty
    /// module path.
    pub fn split_symbol(symbol: &str) -> (&str, &str) {
        // `<T as Trait>::method` contains separators inside the angle brackets,
        // so only split on the last separator outside of them.
        let mut depth = 0usize;
        let mut split_at = None;
        let bytes = symbol.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'<' => depth += 1,
                b'>' => depth = depth.saturating_sub(1),
                b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                    split_at = Some(i);
                    i += 1;
                }
                _ => {}
            }
            i += 1;
        }
        match split_at {
            Some(at) => (&symbol[..at], &symbol[at + 2..]),
            None => ("", symbol),
        }
    }
}

/// Readable form: `module::function(file:line)`, `(Native Method)` for native
/// frames, `(Unknown Source)` when no file is known, and `(file)` when only the
/// line is missing. Lossy, so the fingerprint uses [`StackFrame::fingerprint_key`].
impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.class_name.is_empty() {
            write!(f, "{}::", self.class_name)?;
        }
        f.write_str(&self.method_name)?;
        if self.is_native {
            f.write_str("(Native Method)")
        } else if self.file_name.is_empty() {
            f.write_str("(Unknown Source)")
        } else if self.line_number >= 0 {
            write!(f, "({}:{})", self.file_name, self.line_number)
        } else {
            write!(f, "({})", self.file_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        let frame = StackFrame::new("app::worker", "run", "src/worker.rs", 42);
        assert_eq!(frame.to_string(), "app::worker::run(src/worker.rs:42)");

        let frame = StackFrame::new("app", "main", "src/main.rs", UNKNOWN_LINE);
        assert_eq!(frame.to_string(), "app::main(src/main.rs)");

        let frame = StackFrame::new("", "start", "", 10);
        assert_eq!(frame.to_string(), "start(Unknown Source)");

        let frame = StackFrame::native("libc", "abort");
        assert_eq!(frame.to_string(), "libc::abort(Native Method)");
    }

    #[test]
    fn fingerprint_key_keeps_every_field() {
        let frame = StackFrame::new("app::worker", "run", "src/worker.rs", 42);
        assert_eq!(frame.fingerprint_key(), "app::worker::run(src/worker.rs:42)");

        let frame = StackFrame::new("", "start", "", 10);
        assert_eq!(frame.fingerprint_key(), "::start(:10)");

        let frame = StackFrame::native("libc", "abort");
        assert_eq!(frame.fingerprint_key(), "libc::abort(:-1)[native]");
    }

    #[test]
    fn split_plain_symbol() {
        assert_eq!(
            StackFrame::split_symbol("my_app::worker::run"),
            ("my_app::worker", "run")
        );
        assert_eq!(StackFrame::split_symbol("main"), ("", "main"));
        assert_eq!(
            StackFrame::split_symbol("my_app::main::{{closure}}"),
            ("my_app::main", "{{closure}}")
        );
    }

    #[test]
    fn split_trait_impl_symbol() {
        assert_eq!(
            StackFrame::split_symbol("<alloc::boxed::Box<F> as core::ops::FnOnce<A>>::call_once"),
            (
                "<alloc::boxed::Box<F> as core::ops::FnOnce<A>>",
                "call_once"
            )
        );
        assert_eq!(
            StackFrame::split_symbol("<T as app::Handler>"),
            ("", "<T as app::Handler>")
        );
    }
}
