use serde_json::Value;

/// Operators understood by document filters
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// `{ field: value }` or `{ field: { "$eq": value } }`
    Eq(Value),
    /// `{ field: { "$in": [..] } }`
    In(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterWhereInfo {
    pub field: String,
    pub operator: FilterOp,
}

/// Bind parameter produced when a filter is rendered as SQL over a JSONB column
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Json(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub clause: String,
    pub params: Vec<SqlParam>,
}
