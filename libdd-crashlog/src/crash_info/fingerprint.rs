// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::StackFrame;

/// Computes the crash fingerprint: the MD5 digest of the app version, the
/// cause type, the detail message and the [`StackFrame::fingerprint_key`] of
/// every frame, in that order, as 32 lowercase hex characters.
///
/// Identical failures of the same app version share an id. This is not an
/// integrity check and collisions are harmless.
///
/// Ids are not interchangeable with those of other crash reporters for the
/// same batch format: an absent message contributes nothing here and frames
/// are keyed by all of their fields.
pub fn crash_id(
    app_version_name: &str,
    cause_type_name: &str,
    detail_message: Option<&str>,
    frames: &[StackFrame],
) -> String {
    let mut ctx = md5::Context::new();
    ctx.consume(app_version_name);
    ctx.consume(cause_type_name);
    if let Some(message) = detail_message {
        ctx.consume(message);
    }
    for frame in frames {
        ctx.consume(frame.fingerprint_key());
    }
    format!("{:x}", ctx.compute())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crash_info::UNKNOWN_LINE;

    fn frames() -> Vec<StackFrame> {
        vec![
            StackFrame::new("app::worker", "run", "src/worker.rs", 42),
            StackFrame::new("app", "main", "src/main.rs", 7),
        ]
    }

    #[test]
    fn id_is_lowercase_hex() {
        let id = crash_id("1.0", "panic", Some("boom"), &frames());
        assert_eq!(id.len(), 32);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn matches_digest_of_concatenation() {
        let frames = frames();
        let concatenated = format!(
            "1.0panicboom{}{}",
            frames[0].fingerprint_key(),
            frames[1].fingerprint_key()
        );
        assert_eq!(
            crash_id("1.0", "panic", Some("boom"), &frames),
            format!("{:x}", md5::compute(concatenated))
        );
        assert_eq!(
            crash_id("", "", None, &[]),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }

    #[test]
    fn id_is_deterministic() {
        assert_eq!(
            crash_id("1.0", "panic", Some("boom"), &frames()),
            crash_id("1.0", "panic", Some("boom"), &frames())
        );
    }

    #[test]
    fn every_input_changes_the_id() {
        let base = crash_id("1.0", "panic", Some("boom"), &frames());
        assert_ne!(base, crash_id("1.1", "panic", Some("boom"), &frames()));
        assert_ne!(base, crash_id("1.0", "abort", Some("boom"), &frames()));
        assert_ne!(base, crash_id("1.0", "panic", Some("bang"), &frames()));
        assert_ne!(base, crash_id("1.0", "panic", None, &frames()));

        let mutations: [fn(&mut StackFrame); 5] = [
            |f| f.class_name.push('x'),
            |f| f.file_name.push('x'),
            |f| f.method_name.push('x'),
            |f| f.line_number += 1,
            |f| f.is_native = !f.is_native,
        ];
        let stacks = [
            frames(),
            vec![StackFrame::native("libc", "abort")],
            vec![StackFrame::new("app", "main", "", 1)],
            vec![StackFrame::new("app", "main", "src/main.rs", UNKNOWN_LINE)],
        ];
        for stack in stacks {
            let base = crash_id("1.0", "panic", Some("boom"), &stack);
            for mutate in mutations {
                let mut changed = stack.clone();
                let last = changed.len() - 1;
                mutate(&mut changed[last]);
                assert_ne!(base, crash_id("1.0", "panic", Some("boom"), &changed));
            }
        }
    }
}
