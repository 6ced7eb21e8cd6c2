#![forbid(unsafe_code)]

use super::fields::{FieldKind, TaskField};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single column value. Flags are stored as `Integer(0|1)`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FieldValue {
    #[default]
    Null,
    Integer(i64),
    Text(String),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be {expected}")]
pub struct ValueTypeError {
    pub field: TaskField,
    pub expected: &'static str,
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn flag(value: bool) -> Self {
        Self::Integer(i64::from(value))
    }

    /// Checks that the value is null or matches the storage kind of `field`.
    pub fn check_kind(&self, field: TaskField) -> Result<(), ValueTypeError> {
        match (field.kind(), self) {
            (_, Self::Null) => Ok(()),
            (FieldKind::Integer, Self::Integer(_)) => Ok(()),
            (FieldKind::Flag, Self::Integer(0 | 1)) => Ok(()),
            (FieldKind::Text, Self::Text(_)) => Ok(()),
            (FieldKind::Integer, _) => Err(ValueTypeError {
                field,
                expected: "an integer",
            }),
            (FieldKind::Flag, _) => Err(ValueTypeError {
                field,
                expected: "a boolean flag",
            }),
            (FieldKind::Text, _) => Err(ValueTypeError {
                field,
                expected: "a string",
            }),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::flag(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Integer(value) => serializer.serialize_i64(*value),
            Self::Text(value) => serializer.serialize_str(value),
        }
    }
}

struct FieldValueVisitor;

impl<'de> Visitor<'de> for FieldValueVisitor {
    type Value = FieldValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null, a boolean, an integer or a string")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(FieldValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(FieldValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(FieldValue::flag(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(FieldValue::Integer(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        i64::try_from(value)
            .map(FieldValue::Integer)
            .map_err(|_| E::custom("integer out of range"))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(FieldValue::Text(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(FieldValue::Text(value))
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FieldValueVisitor)
    }
}

/// An ordered column → value map.
///
/// Used both as the stored snapshot of a task row and as the pending write set
/// of a change-set. Serializes as a JSON object keyed by column name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskValues(BTreeMap<TaskField, FieldValue>);

impl TaskValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: TaskField, value: impl Into<FieldValue>) -> Self {
        self.0.insert(field, value.into());
        self
    }

    pub fn get(&self, field: TaskField) -> Option<&FieldValue> {
        self.0.get(&field)
    }

    pub fn contains(&self, field: TaskField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn insert(&mut self, field: TaskField, value: impl Into<FieldValue>) {
        self.0.insert(field, value.into());
    }

    pub fn remove(&mut self, field: TaskField) -> Option<FieldValue> {
        self.0.remove(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskField, &FieldValue)> {
        self.0.iter().map(|(field, value)| (*field, value))
    }

    pub fn fields(&self) -> impl Iterator<Item = TaskField> + '_ {
        self.0.keys().copied()
    }

    /// Integer accessor; `Ok(None)` for absent or null values.
    pub fn integer(&self, field: TaskField) -> Result<Option<i64>, ValueTypeError> {
        match self.0.get(&field) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Integer(value)) => Ok(Some(*value)),
            Some(FieldValue::Text(_)) => Err(ValueTypeError {
                field,
                expected: "an integer",
            }),
        }
    }

    pub fn text(&self, field: TaskField) -> Result<Option<&str>, ValueTypeError> {
        match self.0.get(&field) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Text(value)) => Ok(Some(value.as_str())),
            Some(FieldValue::Integer(_)) => Err(ValueTypeError {
                field,
                expected: "a string",
            }),
        }
    }

    pub fn flag(&self, field: TaskField) -> Result<bool, ValueTypeError> {
        Ok(self.integer(field)?.is_some_and(|value| value != 0))
    }
}

impl FromIterator<(TaskField, FieldValue)> for TaskValues {
    fn from_iter<I: IntoIterator<Item = (TaskField, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for TaskValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, value) in &self.0 {
            map.serialize_entry(field.column(), value)?;
        }
        map.end()
    }
}

struct TaskValuesVisitor;

impl<'de> Visitor<'de> for TaskValuesVisitor {
    type Value = TaskValues;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object keyed by task column name")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut values = BTreeMap::new();
        while let Some((column, value)) = access.next_entry::<String, FieldValue>()? {
            let field = column.parse::<TaskField>().map_err(de::Error::custom)?;
            values.insert(field, value);
        }
        Ok(TaskValues(values))
    }
}

impl<'de> Deserialize<'de> for TaskValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TaskValuesVisitor)
    }
}
