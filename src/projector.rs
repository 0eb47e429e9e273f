use crate::models::{BoardEntry, LeaveRecord, LeaveStatus, TaskStatus};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

pub const UNASSIGNED: &str = "Unassigned";

#[derive(Debug)]
pub struct StatusColumn<'a> {
    pub status: TaskStatus,
    pub entries: Vec<&'a BoardEntry>,
}

/// Partitions the board into the five kanban columns in fixed order.
/// Every entry lands in exactly one column; order within a column is
/// input order.
pub fn status_columns(entries: &[BoardEntry]) -> Vec<StatusColumn<'_>> {
    let mut columns: Vec<StatusColumn<'_>> = TaskStatus::COLUMNS
        .iter()
        .map(|&status| StatusColumn {
            status,
            entries: Vec::new(),
        })
        .collect();
    for entry in entries {
        columns[entry.item.status().column_index()].entries.push(entry);
    }
    columns
}

#[derive(Debug, Default)]
pub struct DailyBuckets<'a> {
    pub today: Vec<&'a BoardEntry>,
    pub tomorrow: Vec<&'a BoardEntry>,
    pub upcoming: Vec<&'a BoardEntry>,
}

/// Classifies daily-kind entries relative to `today`. Comparison is
/// calendar-date string equality against keys computed once per call,
/// never timestamp arithmetic, so a render pass near midnight cannot
/// split a bucket. Dates that are neither today nor tomorrow fall into
/// `upcoming`, past ones included.
pub fn daily_buckets(today: NaiveDate, entries: &[BoardEntry]) -> DailyBuckets<'_> {
    let today_key = today.to_string();
    let tomorrow_key = (today + Duration::days(1)).to_string();

    let mut buckets = DailyBuckets::default();
    for entry in entries {
        if !entry.item.is_daily() {
            continue;
        }
        let date = entry.item.start_date();
        if date == today_key {
            buckets.today.push(entry);
        } else if date == tomorrow_key {
            buckets.tomorrow.push(entry);
        } else {
            buckets.upcoming.push(entry);
        }
    }
    buckets
}

/// Groups entries by assignee; blank assignees collect under the
/// literal `"Unassigned"`. An empty snapshot yields an empty map — the
/// bucket is never synthesized.
pub fn assignee_groups(entries: &[BoardEntry]) -> BTreeMap<String, Vec<&BoardEntry>> {
    let mut groups: BTreeMap<String, Vec<&BoardEntry>> = BTreeMap::new();
    for entry in entries {
        let assignee = entry.item.assignee().trim();
        let key = if assignee.is_empty() { UNASSIGNED } else { assignee };
        groups.entry(key.to_string()).or_default().push(entry);
    }
    groups
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    pub total: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub review: usize,
}

/// Single pass over the merged snapshot. Daily items count toward
/// `total` only; their forced `Daily` status keeps them out of the
/// three named buckets.
pub fn dashboard_counts(entries: &[BoardEntry]) -> DashboardCounts {
    let mut counts = DashboardCounts::default();
    for entry in entries {
        counts.total += 1;
        match entry.item.status() {
            TaskStatus::InProgress => counts.in_progress += 1,
            TaskStatus::Done => counts.completed += 1,
            TaskStatus::Review => counts.review += 1,
            TaskStatus::Waiting | TaskStatus::Daily => {}
        }
    }
    counts
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LeaveSummary {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
}

pub fn leave_summary(leaves: &[LeaveRecord]) -> LeaveSummary {
    let mut summary = LeaveSummary {
        total: leaves.len(),
        ..LeaveSummary::default()
    };
    for leave in leaves {
        match leave.status {
            LeaveStatus::Pending => summary.pending += 1,
            LeaveStatus::Approved => summary.approved += 1,
        }
    }
    summary
}
