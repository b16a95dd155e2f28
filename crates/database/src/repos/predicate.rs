//! Typed filters rendered into parameterised SQL.

use crate::types::SqlValue;

/// Row filter for repository queries. Column names are compile-time strings,
/// values are always bound as parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    All,
    Eq(&'static str, SqlValue),
    In(&'static str, Vec<i64>),
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(column: &'static str, value: impl Into<SqlValue>) -> Self {
        Self::Eq(column, value.into())
    }

    pub fn id_in(ids: impl IntoIterator<Item = i64>) -> Self {
        Self::In("id", ids.into_iter().collect())
    }

    pub fn and(self, other: Predicate) -> Self {
        match self {
            Self::All => other,
            Self::And(mut parts) => {
                parts.push(other);
                Self::And(parts)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Render as a SQL boolean expression, qualifying columns with `qualifier`
    /// (e.g. `"t."`) and pushing bound values onto `params`.
    pub fn render(&self, qualifier: &str, params: &mut Vec<SqlValue>) -> String {
        match self {
            Self::All => "1 = 1".to_string(),
            Self::Eq(column, SqlValue::Null) => format!("{qualifier}{column} IS NULL"),
            Self::Eq(column, value) => {
                params.push(value.clone());
                format!("{qualifier}{column} = ?")
            }
            // Empty sets match nothing rather than producing `IN ()`.
            Self::In(_, ids) if ids.is_empty() => "1 = 0".to_string(),
            Self::In(column, ids) => {
                params.extend(ids.iter().copied().map(SqlValue::Integer));
                let placeholders = vec!["?"; ids.len()].join(", ");
                format!("{qualifier}{column} IN ({placeholders})")
            }
            Self::And(parts) if parts.is_empty() => "1 = 1".to_string(),
            Self::And(parts) => parts
                .iter()
                .map(|part| format!("({})", part.render(qualifier, params)))
                .collect::<Vec<_>>()
                .join(" AND "),
        }
    }
}
