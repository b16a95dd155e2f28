//! Dynamically typed statement parameters.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteArguments;
use sqlx::Arguments;

/// A single bound parameter for statements assembled at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Integer(i64),
    Bool(bool),
    Text(String),
    Null,
}

impl SqlValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Bind `values` in order, one per `?` placeholder.
pub fn to_arguments<'q>(values: &[SqlValue]) -> SqliteArguments<'q> {
    let mut arguments = SqliteArguments::default();
    for value in values {
        match value {
            SqlValue::Integer(v) => arguments.add(*v),
            SqlValue::Bool(v) => arguments.add(*v),
            SqlValue::Text(v) => arguments.add(v.clone()),
            SqlValue::Null => arguments.add(Option::<i64>::None),
        }
    }
    arguments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_values_collapse_to_null() {
        assert_eq!(SqlValue::from(None::<String>), SqlValue::Null);
        assert_eq!(
            SqlValue::from(Some("avatar.jpg")),
            SqlValue::Text("avatar.jpg".to_string())
        );
    }
}
