// src/render/terminal.rs
use super::board::{LastCheck, StatusBoard};
use crate::status::{OverallStatus, ServiceCheckResult, ServiceState};
use colored::Colorize;
use std::fmt::Write;

pub fn render_board(board: &StatusBoard) -> String {
    let mut out = String::new();

    let title = "System Status";
    let _ = writeln!(out, "\n{}", title.bold().cyan());
    let _ = writeln!(out, "{}", "=".repeat(title.len()).cyan());

    let overall = match board.last_check() {
        LastCheck::Succeeded {
            status: OverallStatus::Healthy,
            ..
        } => "healthy".green().bold(),
        LastCheck::Succeeded { .. } | LastCheck::Failed { .. } => "degraded".red().bold(),
        LastCheck::Pending => "checking".yellow().bold(),
    };
    let _ = writeln!(out, "Overall: {}", overall);
    let _ = writeln!(out, "Last check: {}\n", board.last_check_label());

    let width = board
        .entries()
        .iter()
        .map(|e| e.name.chars().count())
        .max()
        .unwrap_or(0);
    for entry in board.entries() {
        let _ = writeln!(out, "{}", render_entry(entry, width));
    }
    out
}

fn render_entry(entry: &ServiceCheckResult, width: usize) -> String {
    let (marker, label) = match entry.status {
        ServiceState::Up => ("●".green().bold(), "Running".green()),
        ServiceState::Down => ("●".red().bold(), "Offline".red()),
        ServiceState::Checking => ("●".yellow().bold(), "Checking...".yellow()),
    };

    let detail = match entry.status {
        ServiceState::Up => format!("localhost:{} - {}", entry.port, entry.detail),
        ServiceState::Down if entry.detail.is_empty() => "Service unreachable".to_string(),
        _ => entry.detail.clone(),
    };

    format!(
        "{} {:<width$}  {:<11}  {}",
        marker,
        entry.name,
        label,
        detail.dimmed(),
        width = width
    )
}
