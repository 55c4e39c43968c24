//! Tool Registry - the static catalog of every exposed tool.
//!
//! Both transports list tools from here, so the router and HTTP handler can
//! never disagree about what exists.

use rmcp::model::Tool;
use std::sync::Arc;

use super::definitions::{geocode, poi, region, route};
use super::envelope::Envelope;
use super::schema::ToolSpec;
use rmcp::handler::server::tool::cached_schema_for_type;

static CATALOG: [ToolSpec; 17] = [
    geocode::GEOCODING,
    geocode::REVERSE_GEOCODING,
    geocode::REVERSE_GEOCODING_COMPAT,
    geocode::SEARCH_RE_GEO_ALL,
    route::DRIVING,
    route::WALKING,
    route::BICYCLING,
    route::ELECT_BIKE,
    route::PUBLIC_TRANSIT,
    route::SUBWAY,
    poi::SEARCH_POI,
    poi::SEARCH_POI_AROUND,
    poi::SEARCH_POI_POLYGON,
    poi::SEARCH_POI_DETAIL,
    poi::SEARCH_AOI_BOUNDARY,
    region::ADMINISTRATIVE_REGION,
    region::IP_POSITIONING,
];

/// Lookup over the tool catalog.
pub struct ToolRegistry;

impl ToolRegistry {
    /// Every tool spec, in listing order.
    pub fn all() -> &'static [ToolSpec] {
        &CATALOG
    }

    pub fn get(name: &str) -> Option<&'static ToolSpec> {
        CATALOG.iter().find(|spec| spec.name == name)
    }

    pub fn tool_names() -> Vec<&'static str> {
        CATALOG.iter().map(|spec| spec.name).collect()
    }
}

/// MCP metadata for one spec; the output schema is always the envelope.
pub fn to_tool(spec: &ToolSpec) -> Tool {
    Tool {
        name: spec.name.into(),
        description: Some(spec.description.into()),
        input_schema: Arc::new(spec.input_schema()),
        annotations: None,
        output_schema: Some(cached_schema_for_type::<Envelope>()),
        icons: None,
        meta: None,
        title: None,
    }
}
