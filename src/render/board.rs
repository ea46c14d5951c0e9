// src/render/board.rs
use crate::status::{
    AggregateStatus, OverallStatus, ServiceCheckResult, ServiceDescriptor, ServiceState,
    FETCH_FAILED_DETAIL,
};
use chrono::{DateTime, Local};

/// Outcome of the most recent poll.
#[derive(Debug, Clone, PartialEq)]
pub enum LastCheck {
    Pending,
    Succeeded {
        at: DateTime<Local>,
        check_ms: u64,
        status: OverallStatus,
    },
    Failed {
        at: DateTime<Local>,
    },
}

/// What the poll client displays. Entries start as `checking`, become the
/// server's results after each good poll, and are all forced `down` after a
/// failed one.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    defaults: Vec<ServiceDescriptor>,
    entries: Vec<ServiceCheckResult>,
    last_check: LastCheck,
}

impl StatusBoard {
    pub fn new(defaults: Vec<ServiceDescriptor>) -> Self {
        let entries = defaults
            .iter()
            .map(|d| ServiceCheckResult::checking(d.name.as_str(), d.port))
            .collect();
        Self {
            defaults,
            entries,
            last_check: LastCheck::Pending,
        }
    }

    pub fn entries(&self) -> &[ServiceCheckResult] {
        &self.entries
    }

    pub fn last_check(&self) -> &LastCheck {
        &self.last_check
    }

    pub fn apply<E>(&mut self, fetched: Result<AggregateStatus, E>, at: DateTime<Local>) {
        match fetched {
            Ok(aggregate) => self.apply_success(aggregate, at),
            Err(_) => self.apply_failure(at),
        }
    }

    pub fn apply_success(&mut self, aggregate: AggregateStatus, at: DateTime<Local>) {
        self.entries = aggregate.services;
        self.last_check = LastCheck::Succeeded {
            at,
            check_ms: aggregate.check_ms,
            status: aggregate.status,
        };
    }

    /// Never keeps the previous poll's states.
    pub fn apply_failure(&mut self, at: DateTime<Local>) {
        self.entries = self
            .defaults
            .iter()
            .map(|d| ServiceCheckResult {
                name: d.name.clone(),
                status: ServiceState::Down,
                port: d.port,
                detail: FETCH_FAILED_DETAIL.to_string(),
            })
            .collect();
        self.last_check = LastCheck::Failed { at };
    }

    pub fn last_check_label(&self) -> String {
        match &self.last_check {
            LastCheck::Pending => "...".to_string(),
            LastCheck::Succeeded { at, check_ms, .. } => {
                format!("{} ({}ms)", at.format("%H:%M:%S"), check_ms)
            }
            LastCheck::Failed { at } => format!("Failed - {}", at.format("%H:%M:%S")),
        }
    }
}
