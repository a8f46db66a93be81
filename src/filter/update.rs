use serde_json::{Map, Value};

use super::error::FilterError;

const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    /// `{"$set": {field: value}}`
    Set(String, Value),
    /// `{"$pull": {field: value}}` removes every matching array element
    Pull(String, Value),
}

/// Patch applied by `update_one`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    ops: Vec<UpdateOp>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ops.push(UpdateOp::Set(field.into(), value.into()));
        self
    }

    pub fn pull(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.ops.push(UpdateOp::Pull(field.into(), value.into()));
        self
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        for op in &self.ops {
            let (UpdateOp::Set(field, _) | UpdateOp::Pull(field, _)) = op;
            if field == ID_FIELD {
                return Err(FilterError::ImmutableField(field.clone()));
            }
        }
        Ok(())
    }

    /// Apply to a document in place. Returns whether anything changed.
    pub fn apply(&self, document: &mut Map<String, Value>) -> bool {
        let mut modified = false;
        for op in &self.ops {
            match op {
                UpdateOp::Set(field, value) => {
                    if document.get(field) != Some(value) {
                        document.insert(field.clone(), value.clone());
                        modified = true;
                    }
                }
                UpdateOp::Pull(field, value) => {
                    if let Some(Value::Array(items)) = document.get_mut(field) {
                        let before = items.len();
                        items.retain(|item| item != value);
                        modified |= items.len() != before;
                    }
                }
            }
        }
        modified
    }
}
