use serde_json::{json, Map, Value};

use super::Violation;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Integer,
    List(Box<FieldRule>),
    Object(SchemaDescriptor),
}

/// Constraints for a single field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub field_type: FieldType,
    pub required: bool,
    pub non_empty: bool,
    pub max_length: Option<u64>,
    pub min: Option<i64>,
    /// Must match the whole value
    pub regex: Option<String>,
}

impl FieldRule {
    fn of(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            non_empty: false,
            max_length: None,
            min: None,
            regex: None,
        }
    }

    pub fn string() -> Self {
        Self::of(FieldType::String)
    }

    pub fn integer() -> Self {
        Self::of(FieldType::Integer)
    }

    pub fn list(items: FieldRule) -> Self {
        Self::of(FieldType::List(Box::new(items)))
    }

    pub fn object(descriptor: SchemaDescriptor) -> Self {
        Self::of(FieldType::Object(descriptor))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    pub fn max_length(mut self, max: u64) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    pub fn to_json_schema(&self) -> Value {
        let mut schema = match &self.field_type {
            FieldType::String => json!({ "type": "string" }),
            FieldType::Integer => json!({ "type": "integer" }),
            FieldType::List(items) => json!({ "type": "array", "items": items.to_json_schema() }),
            FieldType::Object(descriptor) => descriptor.to_json_schema(),
        };

        if let Value::Object(obj) = &mut schema {
            match self.field_type {
                FieldType::List(_) => {
                    if self.non_empty {
                        obj.insert("minItems".into(), json!(1));
                    }
                }
                _ => {
                    if self.non_empty {
                        obj.insert("minLength".into(), json!(1));
                    }
                }
            }
            if let Some(max) = self.max_length {
                obj.insert("maxLength".into(), json!(max));
            }
            if let Some(min) = self.min {
                obj.insert("minimum".into(), json!(min));
            }
            if let Some(pattern) = &self.regex {
                obj.insert("pattern".into(), json!(format!("^(?:{})$", pattern)));
            }
        }
        schema
    }

    /// JSON Schema's `integer` admits `1.0` and values past `i64`; integer
    /// fields here must hold an exact `i64`.
    fn collect_integer_violations(&self, value: &Value, path: &str, out: &mut Vec<Violation>) {
        match &self.field_type {
            FieldType::Integer => {
                if value.is_number() && value.as_i64().is_none() {
                    out.push(Violation {
                        instance_path: path.to_string(),
                        message: format!("{} is not a 64-bit integer", value),
                    });
                }
            }
            FieldType::List(items) => {
                if let Value::Array(values) = value {
                    for (i, item) in values.iter().enumerate() {
                        items.collect_integer_violations(item, &format!("{}/{}", path, i), out);
                    }
                }
            }
            FieldType::Object(descriptor) => descriptor.collect_integer_violations(value, path, out),
            FieldType::String => {}
        }
    }
}

/// Structural ruleset for one JSON object: field name to rule.
/// Fields not listed are rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDescriptor {
    fields: Vec<(String, FieldRule)>,
}

impl SchemaDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.push((name.into(), rule));
        self
    }

    pub(crate) fn collect_integer_violations(&self, data: &Value, path: &str, out: &mut Vec<Violation>) {
        if let Value::Object(obj) = data {
            for (name, rule) in &self.fields {
                if let Some(value) = obj.get(name) {
                    rule.collect_integer_violations(value, &format!("{}/{}", path, name), out);
                }
            }
        }
    }

    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for (name, rule) in &self.fields {
            properties.insert(name.clone(), rule.to_json_schema());
            if rule.required {
                required.push(Value::String(name.clone()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_compiles_to_closed_object_schema() {
        let schema = SchemaDescriptor::new()
            .field("user", FieldRule::string().required().max_length(100))
            .field("note", FieldRule::string())
            .to_json_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["required"], json!(["user"]));
        assert_eq!(schema["properties"]["user"]["maxLength"], 100);
    }

    #[test]
    fn regex_is_anchored() {
        let schema = FieldRule::string().regex(r"\S+").to_json_schema();
        assert_eq!(schema["pattern"], r"^(?:\S+)$");
    }

    #[test]
    fn integer_fields_reject_floats_and_out_of_range_values() {
        let descriptor = SchemaDescriptor::new().field(
            "items",
            FieldRule::list(FieldRule::object(
                SchemaDescriptor::new().field("price", FieldRule::integer()),
            )),
        );
        let data: Value = serde_json::from_str(
            r#"{"items": [{"price": 3}, {"price": 1.0}, {"price": 1e20}, {"price": 10000000000000000000}]}"#,
        )
        .unwrap();

        let mut violations = Vec::new();
        descriptor.collect_integer_violations(&data, "", &mut violations);
        let paths: Vec<&str> = violations.iter().map(|v| v.instance_path.as_str()).collect();
        assert_eq!(paths, ["/items/1/price", "/items/2/price", "/items/3/price"]);
    }

    #[test]
    fn list_rules_nest() {
        let schema = FieldRule::list(FieldRule::integer().min(1)).non_empty().to_json_schema();
        assert_eq!(schema["type"], "array");
        assert_eq!(schema["minItems"], 1);
        assert_eq!(schema["items"]["minimum"], 1);
    }
}
