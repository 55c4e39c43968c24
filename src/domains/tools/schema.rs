//! Static tool descriptors.
//!
//! A [`ToolSpec`] describes one tool completely: its name, which endpoint it
//! talks to, what parameters it accepts and which fields are always sent.
//! Specs are `'static` tables defined in `definitions/` and never mutated.

use serde_json::{Map, Value, json};

/// Shapes a successful provider payload into the envelope's `data`.
pub type Shaper = fn(&Value, &super::ValidatedArgs) -> Value;

/// HTTP verb used for the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Primitive kind and validation rule for a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    /// Any JSON string.
    String,
    /// Integral number (or numeric string), optionally bounded inclusively.
    Integer { min: Option<i64>, max: Option<i64> },
    /// JSON bool or "true"/"false".
    Boolean,
    /// Closed set of legal values; numbers are compared by their decimal form.
    Enum(&'static [&'static str]),
    /// `"lng,lat"` with lng in [-180, 180] and lat in [-90, 90].
    Coordinate,
    /// `;`-joined coordinate pairs with at least `min_points` entries.
    CoordinateList { min_points: usize },
    /// Dotted-quad IPv4 address.
    Ipv4,
}

impl ParamKind {
    pub const fn bounded(min: i64, max: i64) -> Self {
        Self::Integer {
            min: Some(min),
            max: Some(max),
        }
    }

    pub const fn at_least(min: i64) -> Self {
        Self::Integer {
            min: Some(min),
            max: None,
        }
    }

    pub const fn polygon() -> Self {
        Self::CoordinateList { min_points: 3 }
    }

    /// JSON schema fragment for this kind.
    fn json_schema(&self) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::Integer { min, max } => {
                let mut schema = json!({ "type": ["integer", "string"] });
                if let Some(min) = min {
                    schema["minimum"] = json!(min);
                }
                if let Some(max) = max {
                    schema["maximum"] = json!(max);
                }
                schema
            }
            Self::Boolean => json!({ "type": ["boolean", "string"] }),
            Self::Enum(values) => json!({ "type": ["string", "integer"], "enum": values }),
            Self::Coordinate => json!({
                "type": "string",
                "pattern": r"^-?\d+(\.\d+)?,-?\d+(\.\d+)?$",
            }),
            Self::CoordinateList { .. } => json!({ "type": "string" }),
            Self::Ipv4 => json!({ "type": "string", "format": "ipv4" }),
        }
    }
}

/// Describes one accepted parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamDescriptor {
    pub name: &'static str,
    pub required: bool,
    pub kind: ParamKind,
    /// Value sent when the caller omits an optional field.
    pub default: Option<&'static str>,
    pub description: &'static str,
}

impl ParamDescriptor {
    pub const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            required: true,
            kind,
            default: None,
            description,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            required: false,
            kind,
            default: None,
            description,
        }
    }

    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }
}

/// Immutable descriptor for one tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Key into the endpoint registry.
    pub endpoint: &'static str,
    pub method: HttpMethod,
    pub params: &'static [ParamDescriptor],
    /// Always appended last; caller input never shadows these.
    pub fixed: &'static [(&'static str, &'static str)],
    pub shaper: Shaper,
}

/// Fixed fields every tool sends.
pub const JSON_OUTPUT: &[(&str, &str)] = &[("output", "json")];

impl ToolSpec {
    pub fn param(&self, name: &str) -> Option<&ParamDescriptor> {
        self.params.iter().find(|p| p.name == name)
    }

    /// JSON schema for the tool's arguments, derived from its descriptors.
    pub fn input_schema(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        for param in self.params {
            let mut schema = param.kind.json_schema();
            schema["description"] = json!(param.description);
            if let Some(default) = param.default {
                schema["default"] = json!(default);
            }
            properties.insert(param.name.to_string(), schema);
        }

        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        schema.insert("required".into(), json!(required));
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::geocode::GEOCODING;
    use crate::domains::tools::definitions::route::DRIVING;

    #[test]
    fn test_input_schema_lists_required_fields() {
        let schema = GEOCODING.input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["address"]));
        assert!(schema["properties"].get("city").is_some());
    }

    #[test]
    fn test_input_schema_carries_enum_and_default() {
        let schema = DRIVING.input_schema();
        let strategy = &schema["properties"]["strategy"];
        assert_eq!(strategy["default"], "32");
        assert!(strategy["enum"].as_array().unwrap().contains(&json!("32")));
    }
}
