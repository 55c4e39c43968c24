//! Geocoding tools: address -> coordinates and coordinates -> address.

use serde_json::{Value, json};

use super::common::{list, pick, text};
use crate::domains::tools::ValidatedArgs;
use crate::domains::tools::schema::{HttpMethod, JSON_OUTPUT, ParamDescriptor as P, ParamKind, ToolSpec};

const EXTENSIONS: ParamKind = ParamKind::Enum(&["base", "all"]);

/// Reverse geocoding returns at most this many nearby POIs.
const MAX_REGEO_POIS: usize = 10;

pub const GEOCODING: ToolSpec = ToolSpec {
    name: "geocoding",
    description: "Convert a structured address (e.g. \"北京市朝阳区阜通东大街6号\") into \
                  coordinates. Returns location, adcode, citycode and the address breakdown.",
    endpoint: "geo",
    method: HttpMethod::Get,
    params: &[
        P::required("address", ParamKind::String, "Structured address to geocode"),
        P::optional("city", ParamKind::String, "City name, citycode or adcode to search in"),
        P::optional("sig", ParamKind::String, "Digital signature"),
    ],
    fixed: JSON_OUTPUT,
    shaper: shape_geocoding,
};

const REVERSE_PARAMS: &[P] = &[
    P::required("location", ParamKind::Coordinate, "Coordinate as \"lng,lat\""),
    P::optional("radius", ParamKind::bounded(0, 3000), "Search radius in meters (0-3000)")
        .with_default("1000"),
    P::optional("poitype", ParamKind::String, "POI type codes, separated by |"),
    P::optional("extensions", EXTENSIONS, "base or all").with_default("base"),
    P::optional("roadlevel", ParamKind::Enum(&["0", "1"]), "Road level filter (0 all, 1 main roads)"),
    P::optional("sig", ParamKind::String, "Digital signature"),
];

pub const REVERSE_GEOCODING: ToolSpec = ToolSpec {
    name: "reverse_geocoding",
    description: "Convert a \"lng,lat\" coordinate into an address. Returns the address \
                  breakdown and up to 10 nearby POIs.",
    endpoint: "regeo",
    method: HttpMethod::Get,
    params: REVERSE_PARAMS,
    fixed: JSON_OUTPUT,
    shaper: shape_reverse_geocoding,
};

/// Older clients call reverse geocoding under this name.
pub const REVERSE_GEOCODING_COMPAT: ToolSpec = ToolSpec {
    name: "reverse_Geocoding",
    description: "Reverse geocoding (kept for older clients; same as reverse_geocoding).",
    ..REVERSE_GEOCODING
};

/// Reverse geocoding with the full POI list for a given POI type.
pub const SEARCH_RE_GEO_ALL: ToolSpec = ToolSpec {
    name: "search_re_geo_all",
    description: "Reverse geocoding with extended results for the given POI type \
                  (kept for older clients).",
    params: &[
        P::required("location", ParamKind::Coordinate, "Coordinate as \"lng,lat\""),
        P::optional("radius", ParamKind::bounded(0, 3000), "Search radius in meters (0-3000)")
            .with_default("1000"),
        P::required("poitype", ParamKind::String, "POI type codes, separated by |"),
        P::optional("roadlevel", ParamKind::Enum(&["0", "1"]), "Road level filter (0 all, 1 main roads)"),
        P::optional("sig", ParamKind::String, "Digital signature"),
    ],
    fixed: &[("output", "json"), ("extensions", "all")],
    ..REVERSE_GEOCODING
};

fn shape_geocoding(payload: &Value, _args: &ValidatedArgs) -> Value {
    let results: Vec<Value> = list(payload, "geocodes")
        .iter()
        .map(|geo| {
            let formatted: String = ["country", "province", "city", "district", "street", "number"]
                .iter()
                .filter_map(|field| text(geo, field))
                .collect();
            let mut result = pick(
                geo,
                &[
                    "location", "country", "province", "city", "citycode", "district",
                    "township", "street", "number", "adcode", "level",
                ],
            );
            result["formatted_address"] = json!(formatted);
            result
        })
        .collect();

    let location = results
        .first()
        .and_then(|r| r.get("location"))
        .cloned()
        .unwrap_or(Value::Null);

    json!({
        "count": payload.get("count").cloned().unwrap_or(Value::Null),
        "location": location,
        "results": results,
    })
}

fn shape_reverse_geocoding(payload: &Value, _args: &ValidatedArgs) -> Value {
    let regeo = payload.get("regeocode").unwrap_or(&Value::Null);
    let address = regeo.get("addressComponent").unwrap_or(&Value::Null);

    let mut shaped_address = pick(
        address,
        &["country", "province", "city", "citycode", "district", "adcode", "township"],
    );
    shaped_address["street"] = address
        .pointer("/streetNumber/street")
        .cloned()
        .unwrap_or(Value::Null);
    shaped_address["street_number"] = address
        .pointer("/streetNumber/number")
        .cloned()
        .unwrap_or(Value::Null);
    shaped_address["formatted"] = regeo.get("formatted_address").cloned().unwrap_or(Value::Null);

    let pois: Vec<Value> = list(regeo, "pois")
        .iter()
        .take(MAX_REGEO_POIS)
        .map(|poi| pick(poi, &["id", "name", "type", "typecode", "address", "location", "distance"]))
        .collect();

    json!({
        "address": shaped_address,
        "pois": pois,
    })
}
