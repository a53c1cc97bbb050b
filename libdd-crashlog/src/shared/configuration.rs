// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::{constants::*, parse_env};
use crate::codec::MAX_BATCH_RECORDS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Which record files are deleted once the collector accepted a batch.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurgePolicy {
    /// Every file listed during the scan, including the ones past the batch
    /// cap that were never transmitted and the ones set aside as invalid.
    #[default]
    AllScanned,
    /// Only the files whose records were part of the accepted batch. Files
    /// set aside as invalid stay on disk.
    TransmittedOnly,
}

impl FromStr for PurgePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_scanned" | "all-scanned" | "AllScanned" => Ok(PurgePolicy::AllScanned),
            "transmitted_only" | "transmitted-only" | "TransmittedOnly" => {
                Ok(PurgePolicy::TransmittedOnly)
            }
            other => anyhow::bail!("unknown purge policy {other:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashlogConfiguration {
    endpoint: String,
    max_records_per_batch: usize,
    purge_policy: PurgePolicy,
    records_dir: PathBuf,
    report_delay: Duration,
    report_enabled: bool,
    // Unbounded when None
    scan_horizon: Option<usize>,
    transmit_timeout: Duration,
}

impl CrashlogConfiguration {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        records_dir: PathBuf,
        endpoint: String,
        report_delay: Duration,
        report_enabled: bool,
        max_records_per_batch: usize,
        scan_horizon: Option<usize>,
        transmit_timeout: Option<Duration>,
        purge_policy: PurgePolicy,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            (1..=MAX_BATCH_RECORDS).contains(&max_records_per_batch),
            "max_records_per_batch must be between 1 and {MAX_BATCH_RECORDS}, got {max_records_per_batch}"
        );
        anyhow::ensure!(
            scan_horizon != Some(0),
            "scan_horizon must be positive when set"
        );
        anyhow::ensure!(!endpoint.is_empty(), "endpoint must not be empty");
        let transmit_timeout = transmit_timeout.unwrap_or(DEFAULT_TRANSMIT_TIMEOUT);
        anyhow::ensure!(
            !transmit_timeout.is_zero(),
            "transmit_timeout must be positive"
        );

        Ok(Self {
            endpoint,
            max_records_per_batch,
            purge_policy,
            records_dir,
            report_delay,
            report_enabled,
            scan_horizon,
            transmit_timeout,
        })
    }

    /// Starts from the defaults and applies any `DD_CRASHLOG_*` variable that
    /// is set. Numbers, durations and paths that do not parse fall back to the
    /// default. An unknown purge policy is an error, and the result is
    /// validated like [`new`](Self::new), so an out-of-range batch cap is too.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        let purge_policy = match parse_env::str_not_empty(ENV_PURGE_POLICY) {
            Some(policy) => policy.parse()?,
            None => defaults.purge_policy,
        };
        Self::new(
            parse_env::path(ENV_RECORDS_DIR).unwrap_or(defaults.records_dir),
            parse_env::str_not_empty(ENV_ENDPOINT).unwrap_or(defaults.endpoint),
            parse_env::duration(ENV_REPORT_DELAY).unwrap_or(defaults.report_delay),
            parse_env::bool(ENV_REPORT_ENABLED).unwrap_or(defaults.report_enabled),
            parse_env::int(ENV_MAX_RECORDS_PER_BATCH).unwrap_or(defaults.max_records_per_batch),
            parse_env::int(ENV_SCAN_HORIZON).or(defaults.scan_horizon),
            parse_env::duration(ENV_TRANSMIT_TIMEOUT),
            purge_policy,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn max_records_per_batch(&self) -> usize {
        self.max_records_per_batch
    }

    pub fn purge_policy(&self) -> PurgePolicy {
        self.purge_policy
    }

    pub fn records_dir(&self) -> &Path {
        &self.records_dir
    }

    pub fn report_delay(&self) -> Duration {
        self.report_delay
    }

    pub fn report_enabled(&self) -> bool {
        self.report_enabled
    }

    pub fn scan_horizon(&self) -> Option<usize> {
        self.scan_horizon
    }

    pub fn transmit_timeout(&self) -> Duration {
        self.transmit_timeout
    }
}

impl Default for CrashlogConfiguration {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_records_per_batch: MAX_BATCH_RECORDS,
            purge_policy: PurgePolicy::default(),
            records_dir: std::env::temp_dir().join(RECORDS_DIR_NAME),
            report_delay: DEFAULT_REPORT_DELAY,
            report_enabled: true,
            scan_horizon: None,
            transmit_timeout: DEFAULT_TRANSMIT_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(max_records_per_batch: usize) -> anyhow::Result<CrashlogConfiguration> {
        CrashlogConfiguration::new(
            PathBuf::from("/tmp/crash_report"),
            DEFAULT_ENDPOINT.to_string(),
            Duration::ZERO,
            true,
            max_records_per_batch,
            None,
            None,
            PurgePolicy::AllScanned,
        )
    }

    #[test]
    fn defaults() {
        let config = CrashlogConfiguration::default();
        assert_eq!(config.endpoint(), "http://localhost:8080/CrashLog/report");
        assert_eq!(config.max_records_per_batch(), 128);
        assert_eq!(config.report_delay(), Duration::ZERO);
        assert!(config.report_enabled());
        assert_eq!(config.scan_horizon(), None);
        assert_eq!(config.transmit_timeout(), Duration::from_secs(30));
        assert_eq!(config.purge_policy(), PurgePolicy::AllScanned);
        assert!(config.records_dir().ends_with("crash_report"));
    }

    #[test]
    fn batch_cap_is_validated() {
        assert!(build(0).is_err());
        assert!(build(129).is_err());
        assert_eq!(build(1).unwrap().max_records_per_batch(), 1);
        assert_eq!(build(128).unwrap().max_records_per_batch(), 128);
    }

    #[test]
    fn missing_timeout_uses_default() {
        assert_eq!(
            build(10).unwrap().transmit_timeout(),
            DEFAULT_TRANSMIT_TIMEOUT
        );
    }

    #[test]
    fn purge_policy_from_str() {
        assert_eq!(
            "transmitted_only".parse::<PurgePolicy>().unwrap(),
            PurgePolicy::TransmittedOnly
        );
        assert_eq!(
            "all-scanned".parse::<PurgePolicy>().unwrap(),
            PurgePolicy::AllScanned
        );
        assert!("sometimes".parse::<PurgePolicy>().is_err());
    }

    #[test]
    fn serde_round_trip() {
        let config = build(64).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: CrashlogConfiguration = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
