//! Expansion of configured targets into atomic check units

use std::fmt;

use crate::config::Target;

/// One independently checkable probe: a TCP port, or a ping when `port` is `None`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckUnit {
    pub name: String,
    pub host: String,
    pub port: Option<u16>,
}

impl CheckUnit {
    pub fn ping(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: None,
        }
    }

    pub fn port(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: Some(port),
        }
    }

    pub fn is_ping(&self) -> bool {
        self.port.is_none()
    }

    /// Key used to track this unit's status across cycles
    pub fn key(&self) -> UnitKey {
        UnitKey {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

/// Identity of a check unit for status tracking: host plus port
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitKey {
    pub host: String,
    pub port: Option<u16>,
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => write!(f, "{}:ping", self.host),
        }
    }
}

/// Flatten targets into check units, one per port or a single ping unit
pub fn expand_targets(targets: &[Target]) -> Vec<CheckUnit> {
    targets
        .iter()
        .flat_map(|target| {
            if target.ports.is_empty() {
                vec![CheckUnit::ping(&target.name, &target.host)]
            } else {
                target
                    .ports
                    .iter()
                    .map(|&port| CheckUnit::port(&target.name, &target.host, port))
                    .collect()
            }
        })
        .collect()
}
