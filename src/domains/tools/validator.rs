//! Parameter validation against a [`ToolSpec`].

use std::net::Ipv4Addr;

use serde_json::{Map, Value};
use tracing::debug;

use super::error::ToolError;
use super::schema::{ParamDescriptor, ParamKind, ToolSpec};

/// Wrapper key some clients put around the real arguments.
const INPUT_DATA_KEY: &str = "input_data";

/// Type-checked arguments, rendered to their query-string form, in the
/// order the tool declares its parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedArgs(Vec<(&'static str, String)>);

impl ValidatedArgs {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(key, value)| (*key, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Accept an object, a JSON string holding an object, or either of those
/// wrapped under `input_data`.
pub fn normalize_args(raw: Value) -> Result<Map<String, Value>, ToolError> {
    let mut map = match raw {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        Value::String(text) => parse_object(&text)?,
        _ => return Err(ToolError::validation("arguments must be a JSON object")),
    };

    if map.len() == 1 {
        match map.remove(INPUT_DATA_KEY) {
            Some(Value::Object(inner)) => return Ok(inner),
            Some(Value::String(text)) => return parse_object(&text),
            Some(other) => {
                map.insert(INPUT_DATA_KEY.to_string(), other);
            }
            None => {}
        }
    }

    Ok(map)
}

fn parse_object(text: &str) -> Result<Map<String, Value>, ToolError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ToolError::validation("arguments must be a JSON object")),
        Err(e) => Err(ToolError::validation(format!("arguments are not valid JSON: {e}"))),
    }
}

/// Validate raw arguments against a tool's descriptors.
///
/// Unknown fields are dropped. Optional fields that are absent (or `null`)
/// fall back to the descriptor's default, if any.
pub fn validate(spec: &ToolSpec, raw: &Map<String, Value>) -> Result<ValidatedArgs, ToolError> {
    for key in raw.keys() {
        if spec.param(key).is_none() {
            debug!(tool = spec.name, field = %key, "Dropping unknown field");
        }
    }

    let mut validated = Vec::with_capacity(spec.params.len());

    for param in spec.params {
        let value = raw.get(param.name).filter(|v| !v.is_null());
        let value = match value {
            Some(Value::String(s)) if param.required && s.trim().is_empty() => None,
            other => other,
        };

        match value {
            Some(value) => validated.push((param.name, check(param, value)?)),
            None if param.required => return Err(ToolError::missing_field(param.name)),
            None => {
                if let Some(default) = param.default {
                    validated.push((param.name, default.to_string()));
                }
            }
        }
    }

    Ok(ValidatedArgs(validated))
}

/// Type-check one value and render it for the query string.
fn check(param: &ParamDescriptor, value: &Value) -> Result<String, ToolError> {
    let name = param.name;
    match param.kind {
        ParamKind::String => value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ToolError::invalid_value(name, "expected a string")),
        ParamKind::Integer { min, max } => {
            let n = as_integer(value)
                .ok_or_else(|| ToolError::invalid_value(name, "expected an integer"))?;
            if let Some(min) = min.filter(|min| n < *min) {
                return Err(ToolError::invalid_value(name, format!("{n} is below {min}")));
            }
            if let Some(max) = max.filter(|max| n > *max) {
                return Err(ToolError::invalid_value(name, format!("{n} is above {max}")));
            }
            Ok(n.to_string())
        }
        ParamKind::Boolean => match value {
            Value::Bool(b) => Ok(b.to_string()),
            Value::String(s) if s == "true" || s == "false" => Ok(s.clone()),
            _ => Err(ToolError::invalid_value(name, "expected a boolean")),
        },
        ParamKind::Enum(allowed) => {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return Err(ToolError::invalid_value(name, "expected one of the listed values")),
            };
            if allowed.contains(&rendered.as_str()) {
                Ok(rendered)
            } else {
                Err(ToolError::invalid_value(
                    name,
                    format!("{rendered} is not one of [{}]", allowed.join(", ")),
                ))
            }
        }
        ParamKind::Coordinate => {
            let text = value
                .as_str()
                .ok_or_else(|| ToolError::invalid_value(name, "expected a \"lng,lat\" string"))?;
            check_coordinate(text).map_err(|reason| ToolError::invalid_value(name, reason))?;
            Ok(trim_pair(text))
        }
        ParamKind::CoordinateList { min_points } => {
            let text = value.as_str().ok_or_else(|| {
                ToolError::invalid_value(name, "expected a \"lng,lat;lng,lat\" string")
            })?;
            check_coordinate_list(text, min_points)
                .map_err(|reason| ToolError::invalid_value(name, reason))
        }
        ParamKind::Ipv4 => {
            let text = value
                .as_str()
                .ok_or_else(|| ToolError::invalid_value(name, "expected an IPv4 address"))?;
            text.trim()
                .parse::<Ipv4Addr>()
                .map_err(|_| ToolError::invalid_value(name, format!("{text} is not an IPv4 address")))?;
            Ok(text.trim().to_string())
        }
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Check a `"lng,lat"` pair.
pub fn check_coordinate(text: &str) -> Result<(f64, f64), String> {
    let mut parts = text.split(',');
    let (Some(lng), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("{text:?} is not a \"lng,lat\" pair"));
    };

    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| format!("longitude {lng:?} is not a number"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("latitude {lat:?} is not a number"))?;

    if !(-180.0..=180.0).contains(&lng) {
        return Err(format!("longitude {lng} out of range [-180, 180]"));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude {lat} out of range [-90, 90]"));
    }
    Ok((lng, lat))
}

/// `"lng,lat"` with whitespace around each number removed.
fn trim_pair(text: &str) -> String {
    text.split(',').map(str::trim).collect::<Vec<_>>().join(",")
}

/// Check a `;`-joined list of coordinate pairs and return it trimmed.
pub fn check_coordinate_list(text: &str, min_points: usize) -> Result<String, String> {
    if text.trim().is_empty() {
        return Err("coordinate list is empty".to_string());
    }
    let points: Vec<&str> = text.split(';').collect();
    for point in &points {
        check_coordinate(point)?;
    }
    if points.len() < min_points {
        return Err(format!(
            "needs at least {min_points} points, got {}",
            points.len()
        ));
    }
    Ok(points.iter().map(|p| trim_pair(p)).collect::<Vec<_>>().join(";"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::definitions::geocode::{GEOCODING, REVERSE_GEOCODING};
    use crate::domains::tools::definitions::poi::{SEARCH_POI, SEARCH_POI_POLYGON};
    use crate::domains::tools::definitions::region::IP_POSITIONING;
    use crate::domains::tools::definitions::route::DRIVING;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_coordinates_in_range_accepted() {
        for text in ["116.481488,39.990464", "-180,-90", "180,90", "0,0", " 1.5 , 2.5 "] {
            assert!(check_coordinate(text).is_ok(), "{text} should pass");
        }
    }

    #[test]
    fn test_coordinates_rejected() {
        for text in [
            "200,90",
            "116.48,91",
            "-180.0001,0",
            "invalid",
            "116.48",
            "1,2,3",
            "abc,39.9",
            "NaN,1",
            "",
        ] {
            assert!(check_coordinate(text).is_err(), "{text} should fail");
        }
    }

    #[test]
    fn test_coordinate_list() {
        let polygon = "116.47,39.9;116.49,39.91;116.48,39.93;116.46,39.92";
        assert!(check_coordinate_list(polygon, 3).is_ok());
        assert!(check_coordinate_list("116.47,39.9;116.49,39.91", 3).is_err());
        assert!(check_coordinate_list("116.47,39.9;300,1;1,1", 3).is_err());
        assert!(check_coordinate_list("", 1).is_err());
    }

    #[test]
    fn test_missing_required_field() {
        let err = validate(&GEOCODING, &args(json!({"city": "北京"}))).unwrap_err();
        assert_eq!(err.to_string(), "missing field address");
    }

    #[test]
    fn test_blank_required_string_is_missing() {
        let err = validate(&GEOCODING, &args(json!({"address": "  "}))).unwrap_err();
        assert_eq!(err.to_string(), "missing field address");
    }

    #[test]
    fn test_unknown_fields_dropped() {
        let validated = validate(
            &GEOCODING,
            &args(json!({"address": "北京市朝阳区阜通东大街6号", "hint": "extra", "key": "x"})),
        )
        .unwrap();
        assert_eq!(validated.get("address"), Some("北京市朝阳区阜通东大街6号"));
        assert_eq!(validated.get("hint"), None);
        assert_eq!(validated.get("key"), None);
    }

    #[test]
    fn test_declared_order_and_defaults() {
        let validated = validate(
            &REVERSE_GEOCODING,
            &args(json!({"extensions": "all", "location": "116.481488,39.990464"})),
        )
        .unwrap();
        let keys: Vec<_> = validated.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["location", "radius", "extensions"]);
        assert_eq!(validated.get("radius"), Some("1000"));
    }

    #[test]
    fn test_enum_rejects_unknown_strategy() {
        let err = validate(
            &DRIVING,
            &args(json!({
                "origin": "116.481028,39.989643",
                "destination": "116.434446,39.90816",
                "strategy": 99
            })),
        )
        .unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));
        assert!(err.to_string().starts_with("invalid value for strategy"));
    }

    #[test]
    fn test_enum_accepts_number_or_string() {
        for strategy in [json!(33), json!("33")] {
            let validated = validate(
                &DRIVING,
                &args(json!({
                    "origin": "116.481028,39.989643",
                    "destination": "116.434446,39.90816",
                    "strategy": strategy
                })),
            )
            .unwrap();
            assert_eq!(validated.get("strategy"), Some("33"));
        }
    }

    #[test]
    fn test_integer_range_and_coercion() {
        let ok = validate(&SEARCH_POI, &args(json!({"keywords": "美食", "page_size": "25"}))).unwrap();
        assert_eq!(ok.get("page_size"), Some("25"));

        let err = validate(&SEARCH_POI, &args(json!({"keywords": "美食", "page_size": 26})));
        assert!(err.is_err());
        let err = validate(&SEARCH_POI, &args(json!({"keywords": "美食", "page_num": 0})));
        assert!(err.is_err());
        let err = validate(&SEARCH_POI, &args(json!({"keywords": "美食", "page_num": 1.5})));
        assert!(err.is_err());
    }

    #[test]
    fn test_boolean_rendering() {
        let validated =
            validate(&SEARCH_POI, &args(json!({"keywords": "美食", "city_limit": true}))).unwrap();
        assert_eq!(validated.get("city_limit"), Some("true"));
        assert!(validate(&SEARCH_POI, &args(json!({"keywords": "美食", "city_limit": "yes"}))).is_err());
    }

    #[test]
    fn test_string_kind_rejects_numbers() {
        assert!(validate(&GEOCODING, &args(json!({"address": 42}))).is_err());
    }

    #[test]
    fn test_polygon_needs_three_points() {
        let err = validate(
            &SEARCH_POI_POLYGON,
            &args(json!({"polygon": "116.47,39.9;116.49,39.91"})),
        )
        .unwrap_err();
        assert!(err.to_string().contains("polygon"));
    }

    #[test]
    fn test_coordinates_forwarded_trimmed() {
        let validated = validate(
            &REVERSE_GEOCODING,
            &args(json!({"location": " 116.481488 , 39.990464 "})),
        )
        .unwrap();
        assert_eq!(validated.get("location"), Some("116.481488,39.990464"));

        let validated = validate(
            &SEARCH_POI_POLYGON,
            &args(json!({"polygon": "116.47, 39.9; 116.49,39.91 ;116.48 ,39.93"})),
        )
        .unwrap();
        assert_eq!(
            validated.get("polygon"),
            Some("116.47,39.9;116.49,39.91;116.48,39.93")
        );
    }

    #[test]
    fn test_ipv4() {
        assert!(validate(&IP_POSITIONING, &args(json!({"ip": "114.114.114.114"}))).is_ok());
        assert!(validate(&IP_POSITIONING, &args(json!({"ip": "999.1.1.1"}))).is_err());
        assert!(validate(&IP_POSITIONING, &args(json!({"ip": "localhost"}))).is_err());
    }

    #[test]
    fn test_normalize_accepts_wrapped_and_stringified() {
        let direct = normalize_args(json!({"address": "a"})).unwrap();
        let wrapped = normalize_args(json!({"input_data": {"address": "a"}})).unwrap();
        let stringified = normalize_args(json!(r#"{"address": "a"}"#)).unwrap();
        let wrapped_string = normalize_args(json!({"input_data": r#"{"address": "a"}"#})).unwrap();
        assert_eq!(direct, wrapped);
        assert_eq!(direct, stringified);
        assert_eq!(direct, wrapped_string);
        assert!(normalize_args(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_normalize_rejects_non_objects() {
        assert!(normalize_args(json!([1, 2])).is_err());
        assert!(normalize_args(json!("not json")).is_err());
        assert!(normalize_args(json!("[1]")).is_err());
    }
}
