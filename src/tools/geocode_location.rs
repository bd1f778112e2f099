//! MCP `geocode_location` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GeocodeLocationParams {
    #[schemars(description = "Place name to geocode, e.g. 'Hakuba Valley'")]
    pub name: String,

    #[schemars(description = "Optional region hint (prefecture, city or country), e.g. 'Nagano, Japan'")]
    pub region: Option<String>,
}
