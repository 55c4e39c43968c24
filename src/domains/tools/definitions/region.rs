//! Administrative region lookup and IP positioning.

use serde_json::{Value, json};

use super::common::{list, pick};
use crate::domains::tools::ValidatedArgs;
use crate::domains::tools::schema::{HttpMethod, JSON_OUTPUT, ParamDescriptor as P, ParamKind, ToolSpec};

pub const ADMINISTRATIVE_REGION: ToolSpec = ToolSpec {
    name: "administrative_region_query",
    description: "Look up administrative regions (province, city, district, street) by keyword \
                  or adcode, with up to three levels of sub-regions.",
    endpoint: "district",
    method: HttpMethod::Get,
    params: &[
        P::required("keywords", ParamKind::String, "Region name, citycode or adcode"),
        P::optional("subdistrict", ParamKind::bounded(0, 3), "Sub-region depth (0-3)").with_default("1"),
        P::optional("page", ParamKind::at_least(1), "Page number (>= 1)").with_default("1"),
        P::optional("offset", ParamKind::at_least(1), "Results per page").with_default("20"),
        P::optional("extensions", ParamKind::Enum(&["base", "all"]), "all also returns boundaries")
            .with_default("base"),
        P::optional("filter", ParamKind::String, "Restrict to an adcode"),
    ],
    fixed: JSON_OUTPUT,
    shaper: shape_districts,
};

pub const IP_POSITIONING: ToolSpec = ToolSpec {
    name: "ip_positioning",
    description: "Locate an IPv4 address to province and city.",
    endpoint: "ip",
    method: HttpMethod::Get,
    params: &[
        P::required("ip", ParamKind::Ipv4, "IPv4 address, e.g. 114.114.114.114"),
        P::optional("sig", ParamKind::String, "Digital signature"),
    ],
    fixed: JSON_OUTPUT,
    shaper: shape_ip,
};

fn district(d: &Value) -> Value {
    let mut shaped = pick(d, &["name", "citycode", "adcode", "center", "level"]);
    shaped["sub_districts"] = Value::Array(list(d, "districts").iter().map(district).collect());
    shaped
}

fn shape_districts(payload: &Value, _args: &ValidatedArgs) -> Value {
    json!({
        "districts": list(payload, "districts").iter().map(district).collect::<Vec<_>>(),
    })
}

fn shape_ip(payload: &Value, _args: &ValidatedArgs) -> Value {
    // v3/ip answers flat; older deployments nest under `result`.
    let source = payload.get("result").filter(|r| r.is_object()).unwrap_or(payload);

    json!({
        "ip": source.get("ip").cloned().unwrap_or(Value::Null),
        "location": pick(source, &["province", "city", "adcode"]),
        "bounds": source.get("rectangle").cloned().unwrap_or(Value::Null),
    })
}
