use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task workflow status. Parsing is lossy on purpose: the store holds
/// free-text status values entered over several UI generations, so
/// "Completed" folds into `Done` and anything unrecognized lands in
/// `Waiting`. Serialization always emits the canonical strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskStatus {
    #[default]
    Waiting,
    InProgress,
    Review,
    Done,
    Daily,
}

impl TaskStatus {
    /// Kanban column order.
    pub const COLUMNS: [TaskStatus; 5] = [
        TaskStatus::Waiting,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
        TaskStatus::Daily,
    ];

    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "In Progress" => TaskStatus::InProgress,
            "Review" => TaskStatus::Review,
            "Done" | "Completed" => TaskStatus::Done,
            "Daily" => TaskStatus::Daily,
            _ => TaskStatus::Waiting,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Waiting => "Waiting",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Review => "Review",
            TaskStatus::Done => "Done",
            TaskStatus::Daily => "Daily",
        }
    }

    pub(crate) fn column_index(self) -> usize {
        match self {
            TaskStatus::Waiting => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Review => 2,
            TaskStatus::Done => 3,
            TaskStatus::Daily => 4,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|value| TaskStatus::parse(&value))
    }
}

/// A ranged task. `taskname` is the natural key on the wire; dates are
/// ISO `YYYY-MM-DD` strings with no time component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub taskname: String,
    #[serde(default)]
    pub assign: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub startdate: String,
    pub enddate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub send_reminder: bool,
}

/// A recurring check-in item: a single date, no range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTask {
    pub name: String,
    #[serde(default)]
    pub assign: String,
    #[serde(default)]
    pub description: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub email: String,
    pub team: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Present,
    Absent,
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PresenceStatus::Present => "present",
            PresenceStatus::Absent => "absent",
        })
    }
}

/// At most one record exists per `(member_name, date)`; the store owns
/// that uniqueness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceRecord {
    pub member_name: String,
    pub date: String,
    pub status: PresenceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
}

impl LeaveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRecord {
    pub member_name: String,
    pub start_date: String,
    pub end_date: String,
    pub reason: String,
    pub status: LeaveStatus,
    pub requested_by: String,
}

/// Bearer token handed out by `POST /token` and `POST /register`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

/// Session-local identity for a board row. Stable across edits, so a
/// rename never changes which row the render adapter is pointing at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) u64);

/// Discriminant carried through edit/delete round-trips so mutations
/// target the collection the item came from.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardItem {
    Task(Task),
    Daily(DailyTask),
}

impl BoardItem {
    pub fn name(&self) -> &str {
        match self {
            BoardItem::Task(task) => &task.taskname,
            BoardItem::Daily(daily) => &daily.name,
        }
    }

    pub fn assignee(&self) -> &str {
        match self {
            BoardItem::Task(task) => &task.assign,
            BoardItem::Daily(daily) => &daily.assign,
        }
    }

    /// Daily items always project as `Daily`, regardless of any status
    /// the store might echo back.
    pub fn status(&self) -> TaskStatus {
        match self {
            BoardItem::Task(task) => task.status,
            BoardItem::Daily(_) => TaskStatus::Daily,
        }
    }

    pub fn start_date(&self) -> &str {
        match self {
            BoardItem::Task(task) => &task.startdate,
            BoardItem::Daily(daily) => &daily.date,
        }
    }

    pub fn end_date(&self) -> &str {
        match self {
            BoardItem::Task(task) => &task.enddate,
            BoardItem::Daily(daily) => &daily.date,
        }
    }

    pub fn is_daily(&self) -> bool {
        matches!(self, BoardItem::Daily(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardEntry {
    pub id: EntryId,
    pub item: BoardItem,
}

/// One member's row in the presence overview: approved leave count plus
/// today's presence mark, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberOverview {
    pub member_name: String,
    pub approved_leaves: usize,
    pub today_presence: Option<PresenceStatus>,
}
