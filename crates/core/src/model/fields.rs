#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

/// Storage type of a task column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
    Flag,
}

/// Every column a task view can expose.
///
/// Most variants map 1:1 onto a column of the `tasks` table. The list-derived
/// columns (`ListName`, `ListColor`, `AccountName`, `AccountType`) are joined in
/// from the owning list when a stored task is loaded and never written back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskField {
    ListId,
    Title,
    Description,
    Dtstart,
    Due,
    Duration,
    Timezone,
    IsAllDay,
    Status,
    PercentComplete,
    Priority,
    Classification,
    CompletedAt,
    CompletedIsAllDay,
    CreatedAt,
    LastModifiedAt,
    IsNew,
    IsClosed,
    HasAlarms,
    HasProperties,
    Deleted,
    Dirty,
    Uid,
    Rrule,
    Rdate,
    Exdate,
    OriginalInstanceId,
    OriginalInstanceSyncId,
    SyncId,
    SyncVersion,
    Sync1,
    Sync2,
    Sync3,
    Sync4,
    Sync5,
    Sync6,
    Sync7,
    Sync8,
    ListName,
    ListColor,
    AccountName,
    AccountType,
}

impl TaskField {
    pub const ALL: [TaskField; 42] = [
        Self::ListId,
        Self::Title,
        Self::Description,
        Self::Dtstart,
        Self::Due,
        Self::Duration,
        Self::Timezone,
        Self::IsAllDay,
        Self::Status,
        Self::PercentComplete,
        Self::Priority,
        Self::Classification,
        Self::CompletedAt,
        Self::CompletedIsAllDay,
        Self::CreatedAt,
        Self::LastModifiedAt,
        Self::IsNew,
        Self::IsClosed,
        Self::HasAlarms,
        Self::HasProperties,
        Self::Deleted,
        Self::Dirty,
        Self::Uid,
        Self::Rrule,
        Self::Rdate,
        Self::Exdate,
        Self::OriginalInstanceId,
        Self::OriginalInstanceSyncId,
        Self::SyncId,
        Self::SyncVersion,
        Self::Sync1,
        Self::Sync2,
        Self::Sync3,
        Self::Sync4,
        Self::Sync5,
        Self::Sync6,
        Self::Sync7,
        Self::Sync8,
        Self::ListName,
        Self::ListColor,
        Self::AccountName,
        Self::AccountType,
    ];

    /// The opaque sync-adapter payload columns.
    pub const SYNC_DATA: [TaskField; 8] = [
        Self::Sync1,
        Self::Sync2,
        Self::Sync3,
        Self::Sync4,
        Self::Sync5,
        Self::Sync6,
        Self::Sync7,
        Self::Sync8,
    ];

    /// Columns that belong to the owning list rather than the task row.
    pub const LIST_DERIVED: [TaskField; 4] = [
        Self::ListName,
        Self::ListColor,
        Self::AccountName,
        Self::AccountType,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Self::ListId => "list_id",
            Self::Title => "title",
            Self::Description => "description",
            Self::Dtstart => "dtstart",
            Self::Due => "due",
            Self::Duration => "duration",
            Self::Timezone => "tz",
            Self::IsAllDay => "is_allday",
            Self::Status => "status",
            Self::PercentComplete => "percent_complete",
            Self::Priority => "priority",
            Self::Classification => "classification",
            Self::CompletedAt => "completed",
            Self::CompletedIsAllDay => "completed_is_allday",
            Self::CreatedAt => "created",
            Self::LastModifiedAt => "last_modified",
            Self::IsNew => "is_new",
            Self::IsClosed => "is_closed",
            Self::HasAlarms => "has_alarms",
            Self::HasProperties => "has_properties",
            Self::Deleted => "deleted",
            Self::Dirty => "dirty",
            Self::Uid => "uid",
            Self::Rrule => "rrule",
            Self::Rdate => "rdate",
            Self::Exdate => "exdate",
            Self::OriginalInstanceId => "original_instance_id",
            Self::OriginalInstanceSyncId => "original_instance_sync_id",
            Self::SyncId => "sync_id",
            Self::SyncVersion => "sync_version",
            Self::Sync1 => "sync1",
            Self::Sync2 => "sync2",
            Self::Sync3 => "sync3",
            Self::Sync4 => "sync4",
            Self::Sync5 => "sync5",
            Self::Sync6 => "sync6",
            Self::Sync7 => "sync7",
            Self::Sync8 => "sync8",
            Self::ListName => "list_name",
            Self::ListColor => "list_color",
            Self::AccountName => "account_name",
            Self::AccountType => "account_type",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::ListId
            | Self::Dtstart
            | Self::Due
            | Self::Status
            | Self::PercentComplete
            | Self::Priority
            | Self::Classification
            | Self::CompletedAt
            | Self::CreatedAt
            | Self::LastModifiedAt
            | Self::OriginalInstanceId
            | Self::ListColor => FieldKind::Integer,
            Self::IsAllDay
            | Self::CompletedIsAllDay
            | Self::IsNew
            | Self::IsClosed
            | Self::HasAlarms
            | Self::HasProperties
            | Self::Deleted
            | Self::Dirty => FieldKind::Flag,
            _ => FieldKind::Text,
        }
    }

    /// Whether the column lives on the `tasks` table (as opposed to being joined in).
    pub fn is_storage_column(self) -> bool {
        !Self::LIST_DERIVED.contains(&self)
    }

    pub fn storage_columns() -> impl Iterator<Item = TaskField> {
        Self::ALL.into_iter().filter(|field| field.is_storage_column())
    }
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown task column: {0}")]
pub struct UnknownColumn(pub String);

impl FromStr for TaskField {
    type Err = UnknownColumn;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.column() == value)
            .ok_or_else(|| UnknownColumn(value.to_string()))
    }
}
