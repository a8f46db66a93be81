use serde_json::{Map, Value};

use super::types::{FilterOp, FilterWhereInfo, SqlParam, SqlResult};

/// Conjunction of field conditions over a JSON document.
///
/// Accepts the Mongo-style subset the store needs: implicit equality,
/// `$eq` and `$in`. An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<FilterWhereInfo>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(FilterWhereInfo {
            field: field.into(),
            operator: FilterOp::Eq(value.into()),
        });
        self
    }

    pub fn is_in<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.conditions.push(FilterWhereInfo {
            field: field.into(),
            operator: FilterOp::In(values.into_iter().map(Into::into).collect()),
        });
        self
    }

    /// Evaluate the filter against an in-memory document
    pub fn matches(&self, document: &Map<String, Value>) -> bool {
        self.conditions.iter().all(|condition| {
            let current = document.get(&condition.field);
            match &condition.operator {
                FilterOp::Eq(Value::Null) => current.map_or(true, Value::is_null),
                FilterOp::Eq(expected) => current == Some(expected),
                FilterOp::In(values) => current.map_or(false, |v| values.contains(v)),
            }
        })
    }

    /// Render as a SQL predicate over a JSONB column named `body`.
    /// Placeholders are numbered from `first_param`.
    pub fn to_sql(&self, first_param: usize) -> SqlResult {
        let mut params = Vec::new();
        let mut next = first_param;
        let mut param = |value: SqlParam, params: &mut Vec<SqlParam>| {
            params.push(value);
            let placeholder = format!("${}", next);
            next += 1;
            placeholder
        };

        let mut sql_conditions = Vec::new();
        for condition in &self.conditions {
            let key = param(SqlParam::Text(condition.field.clone()), &mut params);
            let sql = match &condition.operator {
                FilterOp::Eq(Value::Null) => {
                    format!("(body -> {key} IS NULL OR body -> {key} = 'null'::jsonb)")
                }
                FilterOp::Eq(value) => {
                    let value = param(SqlParam::Json(value.clone()), &mut params);
                    format!("body -> {key} = {value}")
                }
                FilterOp::In(values) if values.is_empty() => "1=0".to_string(),
                FilterOp::In(values) => {
                    let values = param(SqlParam::Json(Value::Array(values.clone())), &mut params);
                    format!("body -> {key} IN (SELECT jsonb_array_elements({values}))")
                }
            };
            sql_conditions.push(sql);
        }

        let clause = if sql_conditions.is_empty() {
            "1=1".to_string()
        } else {
            sql_conditions.join(" AND ")
        };
        SqlResult { clause, params }
    }
}
