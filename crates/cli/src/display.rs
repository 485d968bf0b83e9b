// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use phip_core::{DrainSummary, PendingReport, QueueCounts, RecordOutcome};

use crate::sync::{CaptureOutcome, Feedback, QueueReason};

/// Timestamp format for queue listings.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Format a queued report as a single line.
///
/// `[4] 2026-06-01  fever 4, diarrhea 2  (queued 2026-06-01 08:15 UTC)`
pub fn format_pending_line(report: &PendingReport) -> String {
    let date = report.payload.report_date().unwrap_or("(no date)");
    let counts = case_counts(report);
    let queued = report.created_at.format(TIME_FORMAT);
    if counts.is_empty() {
        format!("[{}] {}  (queued {})", report.id, date, queued)
    } else {
        format!("[{}] {}  {}  (queued {})", report.id, date, counts, queued)
    }
}

/// Format a rejected report: the pending line plus the server's reason.
pub fn format_dead_letter(report: &PendingReport) -> Vec<String> {
    let mut lines = vec![format_pending_line(report)];
    if let Some(reason) = &report.last_error {
        lines.push(format!("    {}", reason));
    }
    lines
}

/// Non-zero case counts of a report, e.g. `fever 4, diarrhea 2`.
fn case_counts(report: &PendingReport) -> String {
    const FIELDS: [(&str, &str); 5] = [
        ("fever_cases", "fever"),
        ("diarrhea_cases", "diarrhea"),
        ("vomiting_cases", "vomiting"),
        ("respiratory_cases", "respiratory"),
        ("unexplained_deaths", "deaths"),
    ];
    FIELDS
        .iter()
        .filter_map(|(key, label)| {
            let n = report.payload.get(key)?.as_u64()?;
            (n > 0).then(|| format!("{} {}", label, n))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format queue counts for `status`.
pub fn format_counts(counts: &QueueCounts) -> Vec<String> {
    let mut lines = vec![format!("Pending:   {}", counts.pending)];
    if counts.in_flight > 0 {
        lines.push(format!("In flight: {}", counts.in_flight));
    }
    lines.push(format!("Rejected:  {}", counts.dead_letter));
    lines
}

/// Format a drain summary: a headline plus one line per undelivered record.
pub fn format_summary(summary: &DrainSummary) -> Vec<String> {
    let when = summary
        .finished_at
        .unwrap_or(summary.started_at)
        .format(TIME_FORMAT);
    let mut lines = vec![format!(
        "Last sync ({}, {}): {}",
        summary.trigger, when, summary
    )];
    for result in &summary.results {
        if let Some(detail) = format_outcome(&result.outcome) {
            lines.push(format!("  [{}] {}", result.id, detail));
        }
    }
    lines
}

fn format_outcome(outcome: &RecordOutcome) -> Option<String> {
    let (label, reason) = match outcome {
        RecordOutcome::Delivered => return None,
        RecordOutcome::RetryLater { reason } => ("will retry", reason),
        RecordOutcome::NeedsCredential { reason } => ("needs login", reason),
        RecordOutcome::DeadLettered { reason } => ("rejected", reason),
        RecordOutcome::StorageError { reason } => ("storage error", reason),
    };
    Some(format!("{}: {}", label, reason))
}

/// Format the result of a capture.
pub fn format_capture(outcome: &CaptureOutcome, report_date: &str) -> String {
    match outcome {
        CaptureOutcome::SubmittedImmediately => {
            format!("Submitted report for {}", report_date)
        }
        CaptureOutcome::QueuedOffline {
            id,
            reason: QueueReason::Offline,
        } => format!("Offline: queued report for {} as [{}]", report_date, id),
        CaptureOutcome::QueuedOffline {
            id,
            reason: QueueReason::SubmitFailed(err),
        } => format!(
            "Queued report for {} as [{}] ({})",
            report_date, id, err
        ),
    }
}

/// Format facility feedback.
pub fn format_feedback(feedback: &Feedback) -> Vec<String> {
    let mut lines = vec![
        format!("Risk level: {}", feedback.risk_level),
        format!("Trend:      {}", feedback.risk_trend),
        format!("Warning:    {}", feedback.warning_message),
    ];
    if !feedback.comparison.is_empty() {
        lines.push(String::new());
        lines.push("Today vs LGA average:".to_string());
        for (key, value) in &feedback.comparison {
            lines.push(format!("  {:<24} {}", key, format_number(*value)));
        }
    }
    lines
}

/// Whole numbers without a fractional part, others to one decimal.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
