#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    NeedsAction,
    InProcess,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub const DEFAULT: TaskStatus = TaskStatus::NeedsAction;

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::NeedsAction),
            1 => Some(Self::InProcess),
            2 => Some(Self::Completed),
            3 => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::NeedsAction => 0,
            Self::InProcess => 1,
            Self::Completed => 2,
            Self::Cancelled => 3,
        }
    }

    pub fn is_new(self) -> bool {
        matches!(self, Self::NeedsAction)
    }

    pub fn is_closed(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

pub const PRIORITY_RANGE: std::ops::RangeInclusive<i64> = 0..=9;
pub const CLASSIFICATION_RANGE: std::ops::RangeInclusive<i64> = 0..=2;
pub const PERCENT_COMPLETE_RANGE: std::ops::RangeInclusive<i64> = 0..=100;

/// Which text of a task a search association was generated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Title,
    Description,
    Property,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Property => "property",
        }
    }
}

/// Observable collections; observers are notified once per collection per operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Lists,
    Tasks,
    Instances,
    Properties,
}
