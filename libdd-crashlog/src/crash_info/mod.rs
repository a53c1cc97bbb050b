// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

mod batch_header;
mod fingerprint;
mod record;
mod stacktrace;
pub(crate) mod test_utils;

pub use batch_header::*;
pub use fingerprint::*;
pub use record::*;
pub use stacktrace::*;
