//! Route planning tools (driving, walking, cycling, e-bike, transit, subway).
//!
//! All of them share one shaper: transit answers are reduced to the fastest
//! plan, everything else to the first path.

use serde_json::{Value, json};

use super::common::{POLYLINE_PREVIEW_CHARS, int, list, truncate};
use crate::domains::tools::ValidatedArgs;
use crate::domains::tools::schema::{HttpMethod, JSON_OUTPUT, ParamDescriptor as P, ParamKind, ToolSpec};

/// Driving strategies accepted by the v5 driving API.
const DRIVING_STRATEGIES: ParamKind = ParamKind::Enum(&[
    "0", "1", "2", "3", "32", "33", "34", "35", "36", "37", "38", "39", "40", "41", "42", "43",
    "44", "45",
]);

const TRANSIT_STRATEGIES: ParamKind = ParamKind::Enum(&["0", "1", "2", "3", "4", "5", "6", "7", "8"]);

const ALTERNATIVES: ParamKind = ParamKind::bounded(1, 3);

const ORIGIN: P = P::required("origin", ParamKind::Coordinate, "Start coordinate as \"lng,lat\"");
const DESTINATION: P = P::required(
    "destination",
    ParamKind::Coordinate,
    "End coordinate as \"lng,lat\"",
);
const SHOW_FIELDS: P = P::optional("show_fields", ParamKind::String, "Extra fields to return (e.g. cost,polyline)");

pub const DRIVING: ToolSpec = ToolSpec {
    name: "driving_route_planning",
    description: "Plan a driving route between two coordinates. Returns distance, duration \
                  and turn-by-turn steps.",
    endpoint: "driving",
    method: HttpMethod::Get,
    params: &[
        ORIGIN,
        DESTINATION,
        P::optional("strategy", DRIVING_STRATEGIES, "Route strategy (default 32)").with_default("32"),
        SHOW_FIELDS,
        P::optional("plate", ParamKind::String, "License plate, used to avoid restrictions"),
        P::optional("cartype", ParamKind::Enum(&["0", "1", "2"]), "0 fuel, 1 electric, 2 hybrid")
            .with_default("0"),
    ],
    fixed: JSON_OUTPUT,
    shaper: shape_route,
};

pub const WALKING: ToolSpec = ToolSpec {
    name: "walking_route_planning",
    description: "Plan a walking route between two coordinates.",
    endpoint: "walking",
    method: HttpMethod::Get,
    params: &[
        ORIGIN,
        DESTINATION,
        P::optional("origin_id", ParamKind::String, "POI ID of the start"),
        P::optional("destination_id", ParamKind::String, "POI ID of the destination"),
        P::optional("alternative_route", ALTERNATIVES, "Number of alternative routes (1-3)"),
        SHOW_FIELDS,
        P::optional("isindoor", ParamKind::Enum(&["0", "1"]), "Plan indoor segments (0 no, 1 yes)")
            .with_default("0"),
    ],
    fixed: JSON_OUTPUT,
    shaper: shape_route,
};

pub const BICYCLING: ToolSpec = ToolSpec {
    name: "bicycling_route_planning",
    description: "Plan a cycling route between two coordinates.",
    endpoint: "bicycling",
    method: HttpMethod::Get,
    params: &[
        ORIGIN,
        DESTINATION,
        SHOW_FIELDS,
        P::optional("alternative_route", ALTERNATIVES, "Number of alternative routes (1-3)"),
    ],
    fixed: JSON_OUTPUT,
    shaper: shape_route,
};

pub const ELECT_BIKE: ToolSpec = ToolSpec {
    name: "elect_bike_route_planning",
    description: "Plan an electric bike route between two coordinates.",
    endpoint: "electrobike",
    ..BICYCLING
};

pub const PUBLIC_TRANSIT: ToolSpec = ToolSpec {
    name: "public_transit_route_planning",
    description: "Plan a public transit route (bus, subway, walking transfers) between two \
                  coordinates. Returns the fastest plan with its segments.",
    endpoint: "transit",
    method: HttpMethod::Post,
    params: &[
        ORIGIN,
        DESTINATION,
        P::required("city1", ParamKind::String, "Citycode of the start city"),
        P::required("city2", ParamKind::String, "Citycode of the destination city"),
        P::optional("strategy", TRANSIT_STRATEGIES, "Transit strategy (0 recommended ... 8)")
            .with_default("0"),
        P::optional("date", ParamKind::String, "Departure date, YYYY-MM-DD"),
        P::optional("time", ParamKind::String, "Departure time, HH-mm"),
        SHOW_FIELDS,
        P::optional("alternative_route", ParamKind::bounded(1, 10), "Number of plans to return (1-10)"),
    ],
    fixed: JSON_OUTPUT,
    shaper: shape_route,
};

pub const SUBWAY: ToolSpec = ToolSpec {
    name: "amap_route_subway",
    description: "Plan a subway-first transit route inside one city.",
    endpoint: "subway",
    method: HttpMethod::Get,
    params: &[
        ORIGIN,
        DESTINATION,
        P::required("city", ParamKind::String, "City name or citycode"),
        P::optional("strategy", TRANSIT_STRATEGIES, "Transit strategy (0 recommended ... 8)")
            .with_default("0"),
        P::optional("date", ParamKind::String, "Departure date, YYYY-MM-DD"),
        P::optional("time", ParamKind::String, "Departure time, HH-mm"),
        SHOW_FIELDS,
    ],
    fixed: JSON_OUTPUT,
    shaper: shape_route,
};

fn shape_route(payload: &Value, _args: &ValidatedArgs) -> Value {
    let route = payload.get("route").unwrap_or(&Value::Null);

    let (summary, steps) = if route.get("transits").is_some() {
        shape_transits(list(route, "transits"))
    } else {
        shape_paths(list(route, "paths"))
    };

    json!({
        "origin": route.get("origin").cloned().unwrap_or(Value::Null),
        "destination": route.get("destination").cloned().unwrap_or(Value::Null),
        "summary": summary,
        "paths": steps,
    })
}

/// Duration of a path or plan; v5 nests it under `cost` when requested.
fn duration(plan: &Value) -> i64 {
    match plan.get("duration") {
        Some(d) => int(Some(d)),
        None => int(plan.pointer("/cost/duration")),
    }
}

fn shape_transits(transits: &[Value]) -> (Value, Vec<Value>) {
    let Some(best) = transits.iter().min_by_key(|t| match duration(t) {
        0 => i64::MAX,
        d => d,
    }) else {
        return (json!({}), Vec::new());
    };

    let cost = best
        .pointer("/cost/transit_fee")
        .or_else(|| best.pointer("/cost/price"))
        .cloned()
        .unwrap_or(Value::Null);

    let summary = json!({
        "duration": duration(best),
        "distance": int(best.get("distance")),
        "walking_distance": int(best.get("walking_distance")),
        "cost": cost,
    });

    let mut steps = Vec::new();
    for segment in list(best, "segments") {
        if let Some(walk) = segment.get("walking").filter(|w| w.is_object()) {
            steps.push(json!({
                "type": "walking",
                "from": walk.get("origin").cloned().unwrap_or(Value::Null),
                "to": walk.get("destination").cloned().unwrap_or(Value::Null),
                "distance": int(walk.get("distance")),
                "duration": duration(walk),
            }));
        }
        if let Some(bus) = segment.get("bus") {
            for line in list(bus, "buslines") {
                steps.push(transit_leg("bus", line));
            }
        }
        if let Some(railway) = segment.get("railway").filter(|r| r.get("name").is_some()) {
            steps.push(transit_leg("subway", railway));
        }
    }

    (summary, steps)
}

fn transit_leg(kind: &str, line: &Value) -> Value {
    json!({
        "type": kind,
        "line_name": line.get("name").cloned().unwrap_or(Value::Null),
        "from_stop": line.pointer("/departure_stop/name").cloned().unwrap_or(Value::Null),
        "to_stop": line.pointer("/arrival_stop/name").cloned().unwrap_or(Value::Null),
        "distance": int(line.get("distance")),
        "duration": duration(line),
    })
}

fn shape_paths(paths: &[Value]) -> (Value, Vec<Value>) {
    let Some(best) = paths.first() else {
        return (json!({}), Vec::new());
    };

    let mut summary = json!({
        "duration": duration(best),
        "distance": int(best.get("distance")),
    });
    if let Some(cost) = best.get("cost") {
        summary["cost_info"] = cost.clone();
    }

    let steps = list(best, "steps")
        .iter()
        .map(|step| {
            json!({
                "instruction": step.get("instruction").cloned().unwrap_or(Value::Null),
                "orientation": step.get("orientation").cloned().unwrap_or(Value::Null),
                "road_name": step.get("road_name").cloned().unwrap_or(Value::Null),
                "distance": int(step.get("step_distance")),
                "polyline": truncate(step.get("polyline"), POLYLINE_PREVIEW_CHARS),
            })
        })
        .collect();

    (summary, steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_driving_path() {
        let payload = json!({
            "status": "1",
            "route": {
                "origin": "116.481028,39.989643",
                "destination": "116.434446,39.90816",
                "paths": [{
                    "distance": "15000",
                    "cost": {"duration": "1800", "tolls": "0"},
                    "steps": [{
                        "instruction": "向西南行驶",
                        "orientation": "西南",
                        "road_name": "阜通东大街",
                        "step_distance": "120",
                        "polyline": "1".repeat(300)
                    }]
                }]
            }
        });
        let shaped = shape_route(&payload, &ValidatedArgs::default());
        assert_eq!(shaped["summary"]["distance"], 15000);
        assert_eq!(shaped["summary"]["duration"], 1800);
        assert_eq!(shaped["paths"][0]["distance"], 120);
        assert!(shaped["paths"][0]["polyline"].as_str().unwrap().ends_with("..."));
    }

    #[test]
    fn test_shape_transit_picks_fastest() {
        let payload = json!({
            "status": "1",
            "route": {
                "transits": [
                    {"cost": {"duration": "3600"}, "distance": "20000", "segments": []},
                    {
                        "cost": {"duration": "2400", "transit_fee": "4.0"},
                        "distance": "18000",
                        "walking_distance": "800",
                        "segments": [
                            {"walking": {"origin": "a", "destination": "b", "distance": "300"}},
                            {"bus": {"buslines": [{
                                "name": "地铁14号线",
                                "departure_stop": {"name": "望京"},
                                "arrival_stop": {"name": "北京南站"},
                                "distance": "17000"
                            }]}}
                        ]
                    }
                ]
            }
        });
        let shaped = shape_route(&payload, &ValidatedArgs::default());
        assert_eq!(shaped["summary"]["duration"], 2400);
        assert_eq!(shaped["summary"]["cost"], "4.0");
        let steps = shaped["paths"].as_array().unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0]["type"], "walking");
        assert_eq!(steps[1]["from_stop"], "望京");
    }

    #[test]
    fn test_shape_route_without_route() {
        let shaped = shape_route(&json!({"status": "1"}), &ValidatedArgs::default());
        assert_eq!(shaped["paths"], json!([]));
    }

    #[test]
    fn test_walking_and_driving_have_distinct_endpoints() {
        assert_ne!(DRIVING.endpoint, WALKING.endpoint);
        assert_ne!(PUBLIC_TRANSIT.endpoint, SUBWAY.endpoint);
        assert_eq!(ELECT_BIKE.params.len(), BICYCLING.params.len());
    }
}
