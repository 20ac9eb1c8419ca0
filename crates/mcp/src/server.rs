//! MCP tool server over the Workbench study API.

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use workbench::{DEFAULT_STUDY_ID, Endpoint, Lookup, WorkbenchClient};

const INSTRUCTIONS: &str = "Read-only lookups against the Metabolomics Workbench study \
database. Study IDs look like 'ST000001'; a prefix such as 'ST0004' matches several \
studies and 'ST' matches all of them. Failed lookups return {\"error\": \"...\"}.";

/// Arguments shared by every per-study tool.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StudyIdParams {
    /// The study ID to fetch. Can be a specific ID like 'ST000001' or a
    /// partial ID like 'ST0004' to fetch multiple studies. Defaults to 'ST'
    /// which retrieves all studies.
    #[serde(default = "default_study_id")]
    pub study_id: String,
}

impl Default for StudyIdParams {
    fn default() -> Self {
        Self {
            study_id: default_study_id(),
        }
    }
}

fn default_study_id() -> String {
    DEFAULT_STUDY_ID.to_string()
}

/// Turn a lookup into a tool result.
///
/// Failures stay ordinary results carrying `{"error": ...}`. Objects are
/// returned as structured content; other JSON goes out as text.
fn render(lookup: Lookup) -> CallToolResult {
    let payload = lookup.into_payload();
    if payload.is_object() {
        CallToolResult::structured(payload)
    } else {
        CallToolResult::success(vec![Content::text(payload.to_string())])
    }
}

/// MCP server exposing one tool per [`Endpoint`].
#[derive(Debug, Clone)]
pub struct WorkbenchServer {
    client: WorkbenchClient,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl WorkbenchServer {
    pub fn new(client: WorkbenchClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    async fn fetch(&self, endpoint: Endpoint, study_id: Option<&str>) -> CallToolResult {
        render(self.client.lookup(endpoint, study_id).await)
    }

    #[tool(description = "Show all publicly available studies (Project, Study, Analysis ID)")]
    async fn get_all_studies(&self) -> Result<CallToolResult, McpError> {
        Ok(self.fetch(Endpoint::AllStudies, None).await)
    }

    #[tool(description = "Fetch summary information for a study")]
    async fn get_study_summary(
        &self,
        Parameters(params): Parameters<StudyIdParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .fetch(Endpoint::StudySummary, Some(&params.study_id))
            .await)
    }

    #[tool(description = "Fetch samples and experimental variables (factors) for a study")]
    async fn get_study_samples_and_experimental_variables(
        &self,
        Parameters(params): Parameters<StudyIdParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .fetch(Endpoint::StudyFactors, Some(&params.study_id))
            .await)
    }

    #[tool(description = "Fetch summary information for all studies")]
    async fn get_all_study_summaries(&self) -> Result<CallToolResult, McpError> {
        Ok(self.fetch(Endpoint::AllStudySummaries, None).await)
    }

    #[tool(description = "Fetch analysis information for a study")]
    async fn get_study_analysis(
        &self,
        Parameters(params): Parameters<StudyIdParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .fetch(Endpoint::StudyAnalysis, Some(&params.study_id))
            .await)
    }

    #[tool(
        description = "Fetch metabolites and annotations detected in a study (one study at a time). Pass a specific ID like 'ST000001'."
    )]
    async fn get_study_metabolites(
        &self,
        Parameters(params): Parameters<StudyIdParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .fetch(Endpoint::StudyMetabolites, Some(&params.study_id))
            .await)
    }

    #[tool(
        description = "Fetch metabolites measurements for a study (one study at a time). Pass a specific ID like 'ST000001'."
    )]
    async fn get_study_metabolites_measurements(
        &self,
        Parameters(params): Parameters<StudyIdParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .fetch(Endpoint::StudyMeasurements, Some(&params.study_id))
            .await)
    }

    #[tool(description = "Fetch species information for a study")]
    async fn get_study_species(
        &self,
        Parameters(params): Parameters<StudyIdParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .fetch(Endpoint::StudySpecies, Some(&params.study_id))
            .await)
    }

    #[tool(description = "Fetch sample source information for a study")]
    async fn get_study_source(
        &self,
        Parameters(params): Parameters<StudyIdParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .fetch(Endpoint::StudySource, Some(&params.study_id))
            .await)
    }

    #[tool(description = "Fetch disease association (where applicable) for a study")]
    async fn get_study_disease(
        &self,
        Parameters(params): Parameters<StudyIdParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .fetch(Endpoint::StudyDisease, Some(&params.study_id))
            .await)
    }

    #[tool(description = "Fetch list of studies with untargeted data in NMDR")]
    async fn get_all_studies_untargeted(&self) -> Result<CallToolResult, McpError> {
        Ok(self.fetch(Endpoint::UntargetedStudies, None).await)
    }

    #[tool(description = "Fetch list of studies with named metabolites in NMDR")]
    async fn get_study_named_metabolites(
        &self,
        Parameters(params): Parameters<StudyIdParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .fetch(Endpoint::StudyNamedMetabolites, Some(&params.study_id))
            .await)
    }

    #[tool(description = "Show number of named metabolites in a study")]
    async fn get_study_number_of_metabolites(
        &self,
        Parameters(params): Parameters<StudyIdParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .fetch(Endpoint::StudyMetaboliteCount, Some(&params.study_id))
            .await)
    }
}

#[tool_handler]
impl ServerHandler for WorkbenchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
