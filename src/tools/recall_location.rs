//! MCP `recall_location` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `recall_location` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RecallLocationParams {
    /// Free-text memory fragment, at most 500 characters.
    #[schemars(
        description = "A vague memory of a place, in any language (max 500 characters). E.g. 'snow on the mountains and a quiet hot spring'."
    )]
    pub memory: String,

    /// Optional emotion tag.
    #[schemars(
        description = "How the memory feels: 'nostalgic', 'peaceful', 'melancholy', 'joyful', 'mysterious', 'warm', or any free text."
    )]
    pub emotion: Option<String>,

    /// Skip geocoding and image lookup.
    #[schemars(description = "If true, return the ranked places without coordinates or image lookup. Defaults to false.")]
    pub skip_enrichment: Option<bool>,
}
