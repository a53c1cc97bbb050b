// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::{env, path::PathBuf, str::FromStr, time::Duration};

/// Seconds, fractional values allowed.
pub fn duration(name: &str) -> Option<Duration> {
    Duration::try_from_secs_f32(env::var(name).ok()?.parse::<f32>().ok()?).ok()
}

pub fn int<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok()?.parse::<T>().ok()
}

pub fn bool(name: &str) -> Option<bool> {
    match env::var(name).ok()?.as_str() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        _ => Some(false),
    }
}

pub fn str_not_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}

pub fn path(name: &str) -> Option<PathBuf> {
    str_not_empty(name).map(PathBuf::from)
}
