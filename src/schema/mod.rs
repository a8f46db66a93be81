//! Schema registry: route payload rules compiled once at startup into
//! JSON Schema validators.

pub mod definitions;
pub mod rules;

use std::collections::HashMap;
use std::fmt;

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

pub use rules::{FieldRule, FieldType, SchemaDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Request,
    Response,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Request => "request",
            Direction::Response => "response",
        }
    }
}

/// `{direction}_{route name}`, e.g. `request_cart.create_cart`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaId(String);

impl SchemaId {
    pub fn new(direction: Direction, route: &str) -> Self {
        Self(format!("{}_{}", direction.as_str(), route))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the offending value; empty for the document root
    pub instance_path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violations(pub Vec<Violation>);

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Unknown schema '{0}'")]
    UnknownSchema(SchemaId),

    #[error("{schema_id}: {violations}")]
    Violation {
        schema_id: SchemaId,
        violations: Violations,
    },

    #[error("Failed to compile schema '{schema_id}': {reason}")]
    Build { schema_id: SchemaId, reason: String },
}

struct CompiledSchema {
    descriptor: SchemaDescriptor,
    validator: Validator,
}

/// Immutable after construction; shared across requests behind an `Arc`.
pub struct SchemaRegistry {
    schemas: HashMap<SchemaId, CompiledSchema>,
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.schemas.keys().map(SchemaId::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("SchemaRegistry").field("schemas", &ids).finish()
    }
}

impl SchemaRegistry {
    pub fn new(
        definitions: impl IntoIterator<Item = (SchemaId, SchemaDescriptor)>,
    ) -> Result<Self, SchemaError> {
        let mut schemas = HashMap::new();
        for (schema_id, descriptor) in definitions {
            let validator = jsonschema::validator_for(&descriptor.to_json_schema()).map_err(|e| {
                SchemaError::Build {
                    schema_id: schema_id.clone(),
                    reason: e.to_string(),
                }
            })?;
            schemas.insert(schema_id, CompiledSchema { descriptor, validator });
        }
        Ok(Self { schemas })
    }

    /// Registry holding every route schema the service declares
    pub fn builtin() -> Result<Self, SchemaError> {
        Self::new(definitions::builtin())
    }

    pub fn contains(&self, schema_id: &SchemaId) -> bool {
        self.schemas.contains_key(schema_id)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Validate `data` against the schema and hand it back unchanged on success.
    pub fn validate(&self, schema_id: &SchemaId, data: Value) -> Result<Value, SchemaError> {
        self.check(schema_id, &data)?;
        Ok(data)
    }

    pub fn check(&self, schema_id: &SchemaId, data: &Value) -> Result<(), SchemaError> {
        let schema = self
            .schemas
            .get(schema_id)
            .ok_or_else(|| SchemaError::UnknownSchema(schema_id.clone()))?;

        let mut violations: Vec<Violation> = schema
            .validator
            .iter_errors(data)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        schema.descriptor.collect_integer_violations(data, "", &mut violations);

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Violation {
                schema_id: schema_id.clone(),
                violations: Violations(violations),
            })
        }
    }
}
