//! Endpoint registry: endpoint key -> base URL.

use std::collections::HashMap;

use reqwest::Url;

use super::error::ToolError;
use super::schema::ToolSpec;
use crate::core::config::EndpointsConfig;

/// Compiled-in default for one endpoint key.
#[derive(Debug, Clone, Copy)]
pub struct EndpointDefault {
    pub key: &'static str,
    /// Environment variable that overrides the URL.
    pub env_var: &'static str,
    pub url: &'static str,
}

const fn endpoint(key: &'static str, env_var: &'static str, url: &'static str) -> EndpointDefault {
    EndpointDefault { key, env_var, url }
}

/// Every endpoint the catalog may reference.
///
/// `transit` and `subway` share a default URL but are independent keys.
pub const ENDPOINT_DEFAULTS: &[EndpointDefault] = &[
    endpoint("geo", "AMAP_GEO_URL", "https://restapi.amap.com/v3/geocode/geo"),
    endpoint("regeo", "AMAP_REGEO_URL", "https://restapi.amap.com/v3/geocode/regeo"),
    endpoint("driving", "AMAP_DRIVING_URL", "https://restapi.amap.com/v5/direction/driving"),
    endpoint("walking", "AMAP_WALKING_URL", "https://restapi.amap.com/v5/direction/walking"),
    endpoint("bicycling", "AMAP_BICYCLING_URL", "https://restapi.amap.com/v5/direction/bicycling"),
    endpoint("electrobike", "AMAP_EBIKE_URL", "https://restapi.amap.com/v5/direction/electrobike"),
    endpoint("transit", "AMAP_BUS_URL", "https://restapi.amap.com/v5/direction/transit/integrated"),
    endpoint("subway", "AMAP_SUBWAY_TRANSIT", "https://restapi.amap.com/v5/direction/transit/integrated"),
    endpoint("district", "AMAP_REGION_QUERY_URL", "https://restapi.amap.com/v3/config/district"),
    endpoint("ip", "AMAP_IP_URL", "https://restapi.amap.com/v3/ip"),
    endpoint("poi_text", "AMAP_SEARCH_POI_URL", "https://restapi.amap.com/v5/place/text"),
    endpoint("poi_around", "AMAP_SEARCH_POI_AROUND_URL", "https://restapi.amap.com/v5/place/around"),
    endpoint("poi_polygon", "AMAP_SEARCH_POI_POLYGON_URL", "https://restapi.amap.com/v5/place/polygon"),
    endpoint("poi_detail", "AMAP_SEARCH_POI_DETAIL_URL", "https://restapi.amap.com/v5/place/detail"),
    endpoint("aoi_polyline", "AMAP_AOI_POLYLINE_URL", "https://restapi.amap.com/v5/aoi/polyline"),
];

/// Read-only lookup from endpoint key to base URL.
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    urls: HashMap<String, String>,
}

impl EndpointRegistry {
    /// Merge overrides over the compiled-in defaults (override wins).
    pub fn new(config: &EndpointsConfig) -> Self {
        let mut urls: HashMap<String, String> = ENDPOINT_DEFAULTS
            .iter()
            .map(|e| (e.key.to_string(), e.url.to_string()))
            .collect();
        for (key, url) in &config.overrides {
            urls.insert(key.clone(), url.clone());
        }
        Self { urls }
    }

    pub fn resolve(&self, key: &str) -> Result<&str, ToolError> {
        self.urls
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ToolError::config(format!("no endpoint configured for '{key}'")))
    }

    /// Check that every tool's endpoint resolves to a parseable URL.
    pub fn check_catalog<'a>(
        &self,
        specs: impl IntoIterator<Item = &'a ToolSpec>,
    ) -> Result<(), ToolError> {
        for spec in specs {
            let url = self.resolve(spec.endpoint)?;
            Url::parse(url).map_err(|e| {
                ToolError::config(format!(
                    "endpoint '{}' for tool {} is not a valid URL ({url}): {e}",
                    spec.endpoint, spec.name
                ))
            })?;
        }
        Ok(())
    }
}
