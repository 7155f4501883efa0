// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering for CLI results.

use std::io::IsTerminal;

use colored::Colorize;
use mnemo::{
    BackupHandle, HealthReport, HealthStatus, Memory, Ranked, RelinkSummary, Task, TaskNode,
    TaskStatus,
};

/// Longest memory excerpt printed in search results.
const EXCERPT_CHARS: usize = 72;

#[derive(Debug, Clone, Copy)]
pub struct Style {
    color: bool,
}

impl Style {
    /// Color only when stdout is a terminal and `--plain` was not given.
    pub fn detect(plain: bool) -> Self {
        Self {
            color: !plain && std::io::stdout().is_terminal(),
        }
    }
}

pub fn health_exit_code(report: &HealthReport) -> i32 {
    match report.status {
        HealthStatus::Healthy | HealthStatus::Warning => 0,
        HealthStatus::Error => 1,
    }
}

pub fn print_health(report: &HealthReport, style: Style) {
    println!();
    println!("  mnemo health");
    println!("  {}", "-".repeat(50));
    println!(
        "    {} tasks, {} memories, {} corrupt, {} orphans",
        report.tasks, report.memories, report.corrupt, report.orphans
    );
    for issue in &report.issues {
        println!(
            "    {} {} ({})",
            status_marker(issue.severity, style),
            issue.message,
            issue.path.display()
        );
    }
    println!("  {}", "-".repeat(50));
    println!("  {} {}", status_marker(report.status, style), report.status);
    println!();
}

fn status_marker(status: HealthStatus, style: Style) -> String {
    match (status, style.color) {
        (HealthStatus::Healthy, true) => "✓".green().to_string(),
        (HealthStatus::Warning, true) => "!".yellow().to_string(),
        (HealthStatus::Error, true) => "✗".red().to_string(),
        (HealthStatus::Healthy, false) => "[OK]  ".to_string(),
        (HealthStatus::Warning, false) => "[WARN]".to_string(),
        (HealthStatus::Error, false) => "[FAIL]".to_string(),
    }
}

pub fn print_backup(handle: &BackupHandle) {
    let m = &handle.manifest;
    println!(
        "{}  {:<18} {:>5} tasks {:>5} memories  {}",
        m.timestamp.format("%Y-%m-%d %H:%M:%S"),
        m.operation,
        m.contents.task_count,
        m.contents.memory_count,
        handle.path.display()
    );
}

pub fn print_relink(summary: &RelinkSummary) {
    for (kind, s) in [("tasks", summary.tasks), ("memories", summary.memories)] {
        println!(
            "{kind}: {} visited, {} updated, {} connections, {} failed",
            s.entities, s.updated, s.connections, s.failures
        );
    }
}

pub fn print_tree(roots: &[TaskNode], style: Style) {
    if roots.is_empty() {
        println!("no tasks");
        return;
    }
    for node in roots {
        print_node(node, 0, style);
    }
}

fn print_node(node: &TaskNode, indent: usize, style: Style) {
    println!(
        "{}{} {} [{}]",
        "  ".repeat(indent),
        status_label(node.effective_status, style),
        node.task.title,
        node.task.id
    );
    for child in &node.children {
        print_node(child, indent + 1, style);
    }
}

fn status_label(status: TaskStatus, style: Style) -> String {
    let label = format!("{:<11}", status.to_string());
    if !style.color {
        return label;
    }
    match status {
        TaskStatus::Done => label.green().to_string(),
        TaskStatus::Blocked => label.red().to_string(),
        TaskStatus::InProgress => label.yellow().to_string(),
        _ => label,
    }
}

pub fn print_search(tasks: &[Ranked<Task>], memories: &[Ranked<Memory>], style: Style) {
    if tasks.is_empty() && memories.is_empty() {
        println!("no matches");
        return;
    }
    for hit in tasks {
        println!(
            "{:>6.1}  task    {} {}",
            hit.score,
            heading(&hit.item.title, style),
            hit.item.path
        );
    }
    for hit in memories {
        println!(
            "{:>6.1}  memory  {} {}",
            hit.score,
            heading(&excerpt(&hit.item.content), style),
            hit.item.id
        );
    }
}

fn heading(text: &str, style: Style) -> String {
    if style.color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn excerpt(content: &str) -> String {
    let line = content.lines().next().unwrap_or_default();
    if line.chars().count() <= EXCERPT_CHARS {
        return line.to_string();
    }
    let cut: String = line.chars().take(EXCERPT_CHARS).collect();
    format!("{cut}...")
}
