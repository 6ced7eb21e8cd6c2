#![forbid(unsafe_code)]

use tp_core::model::FieldValue;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskListRequest {
    pub name: String,
    pub color: Option<i64>,
    pub account_name: String,
    pub account_type: String,
    pub visible: bool,
    pub sync_enabled: bool,
    pub sync_id: Option<String>,
}

impl TaskListRequest {
    pub fn new(
        name: impl Into<String>,
        account_name: impl Into<String>,
        account_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            color: None,
            account_name: account_name.into(),
            account_type: account_type.into(),
            visible: true,
            sync_enabled: true,
            sync_id: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskListRow {
    pub id: i64,
    pub name: String,
    pub color: Option<i64>,
    pub account_name: String,
    pub account_type: String,
    pub visible: bool,
    pub sync_enabled: bool,
    pub sync_id: Option<String>,
}

pub const PROPERTY_DATA_SLOTS: usize = 8;

static NULL_SLOT: FieldValue = FieldValue::Null;

/// The generic `data0..data7` payload of a property row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyData([FieldValue; PROPERTY_DATA_SLOTS]);

impl PropertyData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets slot `slot`; out-of-range slots are ignored.
    pub fn with(mut self, slot: usize, value: impl Into<FieldValue>) -> Self {
        if let Some(target) = self.0.get_mut(slot) {
            *target = value.into();
        }
        self
    }

    pub fn slot(&self, slot: usize) -> &FieldValue {
        self.0.get(slot).unwrap_or(&NULL_SLOT)
    }

    pub fn slots(&self) -> &[FieldValue; PROPERTY_DATA_SLOTS] {
        &self.0
    }

    pub(crate) fn from_slots(slots: [FieldValue; PROPERTY_DATA_SLOTS]) -> Self {
        Self(slots)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyRequest {
    pub task_id: i64,
    pub mimetype: String,
    pub data: PropertyData,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyRow {
    pub id: i64,
    pub task_id: i64,
    pub mimetype: String,
    pub data: PropertyData,
}

/// Secondary ordering applied after relevance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchOrder {
    Due,
    Start,
    Title,
    #[default]
    Id,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub list_id: Option<i64>,
    pub order: SearchOrder,
    pub limit: Option<usize>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            list_id: None,
            order: SearchOrder::default(),
            limit: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
    pub task_id: i64,
    pub relevance: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceRow {
    pub task_id: i64,
    pub instance_start: Option<i64>,
    pub instance_due: Option<i64>,
    pub instance_duration: Option<i64>,
    pub instance_start_sorting: Option<i64>,
    pub instance_due_sorting: Option<i64>,
}
