//! Builder for the JSON Schemas advertised in tool descriptors

use serde_json::{Map, Value, json};

/// An `object` schema assembled property by property
#[derive(Debug, Default)]
pub struct ObjectSchema {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    fn property(mut self, name: &str, schema: Value) -> Self {
        self.properties.insert(name.to_string(), schema);
        self
    }

    pub fn string(self, name: &str, description: &str) -> Self {
        self.property(name, json!({"type": "string", "description": description}))
    }

    pub fn integer(self, name: &str, description: &str) -> Self {
        self.property(name, json!({"type": "integer", "description": description}))
    }

    pub fn boolean(self, name: &str, description: &str) -> Self {
        self.property(name, json!({"type": "boolean", "description": description}))
    }

    pub fn string_list(self, name: &str, description: &str) -> Self {
        self.property(
            name,
            json!({"type": "array", "items": {"type": "string"}, "description": description}),
        )
    }

    pub fn one_of(self, name: &str, description: &str, values: &[&str]) -> Self {
        self.property(
            name,
            json!({"type": "string", "enum": values, "description": description}),
        )
    }

    pub fn required(mut self, names: &[&str]) -> Self {
        self.required.extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn build(self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".into(), Value::from("object"));
        schema.insert("properties".into(), Value::Object(self.properties));
        if !self.required.is_empty() {
            schema.insert("required".into(), json!(self.required));
        }
        Value::Object(schema)
    }
}
