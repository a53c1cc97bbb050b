// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors raised while turning crash data into its wire form.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A text field is longer than a 16-bit length prefix can describe.
    #[error("encoded text too long: {len} bytes")]
    TextTooLong { len: usize },
    /// The stack trace holds more frames than a 16-bit count can describe.
    #[error("stack trace has too many frames: {count}")]
    TooManyFrames { count: usize },
    #[error("failed to write encoded data: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while reading crash records or batches back.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Covers truncated input as well as read failures of the underlying source.
    #[error("failed to read encoded data: {0}")]
    Io(#[from] std::io::Error),
    #[error("text is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),
    #[error("unexpected batch magic {found:#010x}")]
    BadMagic { found: i32 },
    #[error("unknown platform tag {0}")]
    UnknownPlatform(u8),
    #[error("{0} trailing bytes after the last record")]
    TrailingBytes(usize),
}
