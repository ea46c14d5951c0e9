// src/status/model.rs
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest `detail` string we ever hand out.
pub const DETAIL_MAX_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Up,
    Down,
    /// Only shown by clients before their first successful poll.
    Checking,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCheckResult {
    pub name: String,
    pub status: ServiceState,
    pub port: u16,
    pub detail: String,
}

impl ServiceCheckResult {
    pub fn up(name: impl Into<String>, port: u16, detail: &str) -> Self {
        Self {
            name: name.into(),
            status: ServiceState::Up,
            port,
            detail: sanitize_detail(detail),
        }
    }

    pub fn down(name: impl Into<String>, port: u16, detail: &str) -> Self {
        Self {
            name: name.into(),
            status: ServiceState::Down,
            port,
            detail: sanitize_detail(detail),
        }
    }

    pub fn checking(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            status: ServiceState::Checking,
            port,
            detail: String::new(),
        }
    }

    /// Stand-in for a probe that crashed instead of returning a result.
    pub fn unknown(error: &str) -> Self {
        Self::down("Unknown", 0, error)
    }

    pub fn is_up(&self) -> bool {
        self.status == ServiceState::Up
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStatus {
    pub status: OverallStatus,
    pub services: Vec<ServiceCheckResult>,
    pub check_ms: u64,
}

impl AggregateStatus {
    pub fn from_services(services: Vec<ServiceCheckResult>, elapsed: Duration) -> Self {
        let status = if services.iter().all(ServiceCheckResult::is_up) {
            OverallStatus::Healthy
        } else {
            OverallStatus::Degraded
        };

        Self {
            status,
            services,
            check_ms: (elapsed.as_secs_f64() * 1000.0).round() as u64,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == OverallStatus::Healthy
    }
}

/// Name and port of a configured dependency, known before any probe runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub name: String,
    pub port: u16,
}

impl ServiceDescriptor {
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
        }
    }
}

/// First line of `raw`, trimmed and cut to `DETAIL_MAX_CHARS` characters.
pub fn sanitize_detail(raw: &str) -> String {
    raw.split(&['\n', '\r'][..])
        .next()
        .unwrap_or_default()
        .trim()
        .chars()
        .take(DETAIL_MAX_CHARS)
        .collect()
}
