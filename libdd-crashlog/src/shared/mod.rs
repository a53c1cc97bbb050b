// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Configuration and constants shared by the collector, the store and the uploader.

pub mod configuration;
pub mod constants;
pub(crate) mod parse_env;
