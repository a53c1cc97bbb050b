// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The connectivity gate evaluated once before an upload starts.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionType {
    /// WiFi, ethernet or any other connection without data charges.
    Unmetered,
    /// Cellular or otherwise charged connections.
    Metered,
}

/// Radio access technology of a metered connection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessTechnology {
    Gprs,
    Edge,
    Cdma,
    OneXRtt,
    Iden,
    Umts,
    EvdoRev0,
    EvdoRevA,
    EvdoRevB,
    Hsdpa,
    Hsupa,
    Hspa,
    Ehrpd,
    HspaPlus,
    Lte,
    Unknown,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NetworkClass {
    Unknown,
    TwoG,
    ThreeG,
    FourG,
}

impl AccessTechnology {
    pub fn network_class(self) -> NetworkClass {
        use AccessTechnology::*;
        match self {
            Gprs | Edge | Cdma | OneXRtt | Iden => NetworkClass::TwoG,
            Umts | EvdoRev0 | EvdoRevA | EvdoRevB | Hsdpa | Hsupa | Hspa | Ehrpd | HspaPlus => {
                NetworkClass::ThreeG
            }
            Lte => NetworkClass::FourG,
            Unknown => NetworkClass::Unknown,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub connected: bool,
    pub connection_type: ConnectionType,
    /// Only meaningful for metered connections.
    pub access_technology: AccessTechnology,
}

/// Reports the active network connection, if any.
pub trait ConnectivityProvider: Send + Sync {
    fn active_network(&self) -> Option<NetworkInfo>;
}

/// A connectivity provider with a fixed answer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StaticConnectivity(pub Option<NetworkInfo>);

impl StaticConnectivity {
    pub fn unmetered() -> Self {
        Self(Some(NetworkInfo {
            connected: true,
            connection_type: ConnectionType::Unmetered,
            access_technology: AccessTechnology::Unknown,
        }))
    }

    pub fn metered(access_technology: AccessTechnology) -> Self {
        Self(Some(NetworkInfo {
            connected: true,
            connection_type: ConnectionType::Metered,
            access_technology,
        }))
    }

    pub fn offline() -> Self {
        Self(None)
    }
}

impl ConnectivityProvider for StaticConnectivity {
    fn active_network(&self) -> Option<NetworkInfo> {
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RejectReason {
    NoNetwork,
    NotConnected,
    SlowNetwork(NetworkClass),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NoNetwork => f.write_str("no active network"),
            RejectReason::NotConnected => f.write_str("network is not connected"),
            RejectReason::SlowNetwork(class) => {
                write!(f, "metered network of class {class:?} is too slow")
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Rejected(RejectReason),
}

impl Eligibility {
    pub fn is_eligible(self) -> bool {
        self == Eligibility::Eligible
    }
}

/// A connected unmetered network is always eligible. A connected metered
/// network is eligible on 3G and 4G class technologies only.
pub fn check_eligibility(network: Option<&NetworkInfo>) -> Eligibility {
    let Some(network) = network else {
        return Eligibility::Rejected(RejectReason::NoNetwork);
    };
    if !network.connected {
        return Eligibility::Rejected(RejectReason::NotConnected);
    }
    match network.connection_type {
        ConnectionType::Unmetered => Eligibility::Eligible,
        ConnectionType::Metered => match network.access_technology.network_class() {
            NetworkClass::ThreeG | NetworkClass::FourG => Eligibility::Eligible,
            class => Eligibility::Rejected(RejectReason::SlowNetwork(class)),
        },
    }
}
