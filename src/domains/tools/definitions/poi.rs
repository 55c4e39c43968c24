//! POI search tools: keyword, around a point, inside a polygon, by ID, and
//! AOI boundary lookup.

use serde_json::{Value, json};

use super::common::{limit_arg, list, pick};
use crate::domains::tools::ValidatedArgs;
use crate::domains::tools::schema::{HttpMethod, JSON_OUTPUT, ParamDescriptor as P, ParamKind, ToolSpec};

const EXTENSIONS: ParamKind = ParamKind::Enum(&["base", "all"]);

const POI_FIELDS: &[&str] = &[
    "id", "name", "type", "typecode", "address", "location", "distance", "citycode", "adcode",
    "biz_ext",
];

pub const SEARCH_POI: ToolSpec = ToolSpec {
    name: "search_poi",
    description: "Search POIs by keyword, optionally limited to a region and POI types.",
    endpoint: "poi_text",
    method: HttpMethod::Get,
    params: &[
        P::required("keywords", ParamKind::String, "Keyword to search for"),
        P::optional("types", ParamKind::String, "POI type codes, separated by |"),
        P::optional("region", ParamKind::String, "citycode, adcode or city name"),
        P::optional("city_limit", ParamKind::Boolean, "Restrict results to region"),
        P::optional("show_fields", ParamKind::String, "Extra fields to return"),
        P::optional("page_size", ParamKind::bounded(1, 25), "Results per page (1-25)").with_default("10"),
        P::optional("page_num", ParamKind::at_least(1), "Page number (>= 1)").with_default("1"),
        P::optional("sig", ParamKind::String, "Digital signature"),
    ],
    fixed: JSON_OUTPUT,
    shaper: shape_poi_search,
};

pub const SEARCH_POI_AROUND: ToolSpec = ToolSpec {
    name: "search_poi_around",
    description: "Search POIs within a radius of a \"lng,lat\" center point.",
    endpoint: "poi_around",
    method: HttpMethod::Get,
    params: &[
        P::required("location", ParamKind::Coordinate, "Center coordinate as \"lng,lat\""),
        P::optional("keywords", ParamKind::String, "Keyword to search for"),
        P::optional("types", ParamKind::String, "POI type codes, separated by |"),
        P::optional("radius", ParamKind::bounded(1, 50000), "Radius in meters (1-50000)").with_default("5000"),
        P::optional("sortrule", ParamKind::Enum(&["distance", "weight"]), "distance or weight")
            .with_default("distance"),
        P::optional("offset", ParamKind::bounded(1, 25), "Results per page (1-25)").with_default("20"),
        P::optional("page", ParamKind::at_least(1), "Page number (>= 1)").with_default("1"),
        P::optional("extensions", EXTENSIONS, "base or all").with_default("base"),
    ],
    fixed: JSON_OUTPUT,
    shaper: shape_poi_search,
};

pub const SEARCH_POI_POLYGON: ToolSpec = ToolSpec {
    name: "search_poi_polygon",
    description: "Search POIs inside a polygon given as \"lng1,lat1;lng2,lat2;lng3,lat3...\".",
    endpoint: "poi_polygon",
    method: HttpMethod::Get,
    params: &[
        P::required("polygon", ParamKind::polygon(), "Polygon vertices, at least 3"),
        P::optional("keywords", ParamKind::String, "Keyword to search for"),
        P::optional("types", ParamKind::String, "POI type codes, separated by |"),
        P::optional("offset", ParamKind::bounded(1, 25), "Results per page (1-25)").with_default("20"),
        P::optional("page", ParamKind::at_least(1), "Page number (>= 1)").with_default("1"),
        P::optional("extensions", EXTENSIONS, "base or all").with_default("base"),
    ],
    fixed: JSON_OUTPUT,
    shaper: shape_poi_search,
};

pub const SEARCH_POI_DETAIL: ToolSpec = ToolSpec {
    name: "search_poi_detail",
    description: "Look up a single POI by its ID.",
    endpoint: "poi_detail",
    method: HttpMethod::Get,
    params: &[
        P::required("id", ParamKind::String, "POI ID"),
        P::optional("extensions", EXTENSIONS, "base or all").with_default("base"),
    ],
    fixed: JSON_OUTPUT,
    shaper: shape_poi_detail,
};

pub const SEARCH_AOI_BOUNDARY: ToolSpec = ToolSpec {
    name: "search_aoi_boundary",
    description: "Fetch the boundary polyline of an AOI (area of interest) by its POI ID.",
    endpoint: "aoi_polyline",
    method: HttpMethod::Get,
    params: &[P::required("id", ParamKind::String, "AOI POI ID")],
    fixed: JSON_OUTPUT,
    shaper: shape_aoi_boundary,
};

/// Page size the caller asked for, under whichever name the tool uses.
fn requested_limit(args: &ValidatedArgs) -> usize {
    if args.get("page_size").is_some() {
        limit_arg(args, "page_size", 10)
    } else {
        limit_arg(args, "offset", 20)
    }
}

fn shape_poi_search(payload: &Value, args: &ValidatedArgs) -> Value {
    let limit = requested_limit(args);
    let pois: Vec<Value> = list(payload, "pois")
        .iter()
        .take(limit)
        .map(|poi| pick(poi, POI_FIELDS))
        .collect();

    let mut shaped = json!({
        "count": payload.get("count").cloned().unwrap_or(Value::Null),
        "pois": pois,
    });

    if let Some(suggestion) = payload.get("suggestion").filter(|s| s.is_object()) {
        let cities: Vec<Value> = list(suggestion, "cities")
            .iter()
            .map(|c| pick(c, &["name", "citycode", "adcode"]))
            .collect();
        shaped["suggestion"] = json!({
            "keywords": suggestion.get("keywords").cloned().unwrap_or(json!([])),
            "cities": cities,
        });
    }

    shaped
}

fn shape_poi_detail(payload: &Value, _args: &ValidatedArgs) -> Value {
    let poi = list(payload, "pois")
        .first()
        .or_else(|| payload.get("poi"))
        .unwrap_or(&Value::Null);

    json!({
        "poi": pick(poi, &[
            "id", "name", "type", "typecode", "address", "location", "citycode", "adcode",
            "pname", "cityname", "adname", "biz_ext",
        ]),
    })
}

fn shape_aoi_boundary(payload: &Value, _args: &ValidatedArgs) -> Value {
    let aoi = list(payload, "aois").first().unwrap_or(&Value::Null);

    json!({
        "aoi": pick(aoi, &[
            "id", "name", "location", "polyline", "type", "typecode", "pname", "cityname",
            "adname", "address",
        ]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::validator::validate;

    fn pois(n: usize) -> Value {
        let list: Vec<Value> = (0..n).map(|i| json!({"id": format!("B{i}"), "name": "美食"})).collect();
        json!({"status": "1", "count": n.to_string(), "pois": list})
    }

    #[test]
    fn test_search_caps_to_page_size() {
        let args = validate(&SEARCH_POI, json!({"keywords": "美食", "page_size": 5}).as_object().unwrap()).unwrap();
        let shaped = shape_poi_search(&pois(12), &args);
        assert_eq!(shaped["pois"].as_array().unwrap().len(), 5);
        assert_eq!(shaped["count"], "12");
    }

    #[test]
    fn test_around_caps_to_offset() {
        let args = validate(
            &SEARCH_POI_AROUND,
            json!({"location": "116.481488,39.990464", "offset": 3}).as_object().unwrap(),
        )
        .unwrap();
        let shaped = shape_poi_search(&pois(12), &args);
        assert_eq!(shaped["pois"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_suggestion_kept() {
        let payload = json!({
            "status": "1", "count": "0", "pois": [],
            "suggestion": {"keywords": ["美食城"], "cities": [{"name": "北京", "citycode": "010", "adcode": "110000", "num": "5"}]}
        });
        let shaped = shape_poi_search(&payload, &ValidatedArgs::default());
        assert_eq!(shaped["suggestion"]["cities"][0], json!({"name": "北京", "citycode": "010", "adcode": "110000"}));
    }

    #[test]
    fn test_detail_and_aoi() {
        let detail = shape_poi_detail(&json!({"status": "1", "pois": [{"id": "B0FFFZZZ5S", "pname": "北京市"}]}), &ValidatedArgs::default());
        assert_eq!(detail["poi"]["pname"], "北京市");

        let aoi = shape_aoi_boundary(&json!({"status": "1", "aois": [{"id": "B0FFFZZZ5S", "polyline": "1,1;2,2;3,3"}]}), &ValidatedArgs::default());
        assert_eq!(aoi["aoi"]["polyline"], "1,1;2,2;3,3");

        let empty = shape_aoi_boundary(&json!({"status": "1"}), &ValidatedArgs::default());
        assert_eq!(empty["aoi"]["id"], Value::Null);
    }
}
