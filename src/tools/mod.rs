pub mod geocode_location;
pub mod recall_location;

use geocode_location::GeocodeLocationParams;
use recall_location::RecallLocationParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use std::sync::Arc;

use crate::analysis::types::MemoryInput;
use crate::locator::Locator;

/// The qmemory MCP tool handler. Holds the shared [`Locator`] and exposes the
/// recall pipeline via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct QMemoryTools {
    tool_router: ToolRouter<Self>,
    locator: Arc<Locator>,
}

#[tool_router]
impl QMemoryTools {
    pub fn new(locator: Arc<Locator>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            locator,
        }
    }

    /// Turn a memory fragment into ranked real-world places.
    #[tool(description = "Recall where a memory took place. Returns a primary place and up to four alternates with probabilities summing to 100, plus coordinates and an image URL when available.")]
    async fn recall_location(
        &self,
        Parameters(params): Parameters<RecallLocationParams>,
    ) -> Result<String, String> {
        let emotion = params.emotion.as_deref().unwrap_or("");
        let input = MemoryInput::submit(&params.memory, emotion).map_err(|e| e.to_string())?;

        tracing::info!(
            memory_len = input.text().chars().count(),
            emotion = %input.emotion(),
            "recall_location called"
        );

        let result = if params.skip_enrichment.unwrap_or(false) {
            self.locator.orchestrator().analyze(&input).await
        } else {
            self.locator.locate(&input).await
        }
        .map_err(|e| e.to_string())?;

        tracing::info!(
            primary = %result.primary.name,
            source = %result.source_method,
            "location recalled"
        );

        serde_json::to_string(&result).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Geocode a single place name.
    #[tool(description = "Look up coordinates for a place name. Returns lat/lng, address and country, or an error when nothing matches.")]
    async fn geocode_location(
        &self,
        Parameters(params): Parameters<GeocodeLocationParams>,
    ) -> Result<String, String> {
        let name = params.name.trim();
        if name.is_empty() {
            return Err("name must not be empty".into());
        }
        let region = params.region.as_deref().unwrap_or("");

        tracing::info!(place = %name, region = %region, "geocode_location called");

        let point = self
            .locator
            .enricher()
            .locate(name, region)
            .await
            .ok_or_else(|| format!("no coordinates found for {name:?}"))?;

        serde_json::to_string(&point).map_err(|e| format!("serialization failed: {e}"))
    }
}

#[tool_handler]
impl ServerHandler for QMemoryTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "qmemory turns vague memories into real places. Use recall_location with a \
                 memory fragment and optional emotion, and geocode_location to look up a \
                 single place name."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
