//! Gemini `generateContent` backend.

use std::collections::HashMap;

use crate::model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Part, Role, ToolCall, ToolResult,
    ToolSpec, Usage,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<ApiToolConfig>,
    generation_config: ApiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<ApiFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<ApiFunctionResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiTool {
    function_declarations: Vec<ApiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiFunctionDeclaration {
    name: String,
    description: String,
    parameters_json_schema: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiToolConfig {
    function_calling_config: ApiFunctionCallingConfig,
}

#[derive(Debug, Serialize)]
struct ApiFunctionCallingConfig {
    mode: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    usage_metadata: Option<ApiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

/// Builder for creating a Gemini backend.
#[derive(Debug, Clone)]
pub struct GeminiBackendBuilder {
    api_key: String,
    model: String,
    max_tokens: u32,
    system: Option<String>,
    api_base: String,
}

impl GeminiBackendBuilder {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 1000,
            system: None,
            api_base: GEMINI_API_BASE.to_string(),
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Override the API root (the part before `/models/...`).
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn build(self) -> GeminiBackend {
        GeminiBackend {
            client: reqwest::Client::new(),
            api_key: self.api_key,
            model: self.model,
            max_tokens: self.max_tokens,
            system: self.system,
            api_base: self.api_base,
        }
    }
}

/// Gemini API backend.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    system: Option<String>,
    api_base: String,
}

impl GeminiBackend {
    pub fn builder(api_key: impl Into<String>, model: impl Into<String>) -> GeminiBackendBuilder {
        GeminiBackendBuilder::new(api_key, model)
    }

    fn endpoint(&self) -> String {
        let api_base = &self.api_base;
        let model = &self.model;
        format!("{api_base}/models/{model}:generateContent")
    }

    /// Function responses must name the function; results only carry the
    /// call ID, so names are resolved from earlier calls in the history.
    fn messages_to_api(messages: &[Message]) -> Vec<ApiContent> {
        let names: HashMap<&str, &str> = messages
            .iter()
            .flat_map(|m| &m.parts)
            .filter_map(|p| match p {
                Part::ToolCall(call) => Some((call.id.as_str(), call.name.as_str())),
                _ => None,
            })
            .collect();

        messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                let role = match m.role {
                    Role::Assistant => "model",
                    Role::User | Role::System => "user",
                };
                let parts = m
                    .parts
                    .iter()
                    .map(|part| match part {
                        Part::Text(text) => ApiPart {
                            text: Some(text.clone()),
                            ..Default::default()
                        },
                        Part::ToolCall(call) => ApiPart {
                            function_call: Some(ApiFunctionCall {
                                id: Some(call.id.clone()),
                                name: call.name.clone(),
                                args: call.input.clone(),
                            }),
                            ..Default::default()
                        },
                        Part::ToolResult(result) => {
                            let id = result.tool_call_id();
                            let response = match result {
                                ToolResult::Success { output, .. } => json!({ "content": output }),
                                ToolResult::Failure { error, .. } => {
                                    json!({ "error": error.to_string() })
                                }
                            };
                            ApiPart {
                                function_response: Some(ApiFunctionResponse {
                                    id: Some(id.to_string()),
                                    name: names.get(id).copied().unwrap_or_default().to_string(),
                                    response,
                                }),
                                ..Default::default()
                            }
                        }
                    })
                    .collect();
                ApiContent {
                    role: Some(role.to_string()),
                    parts,
                }
            })
            .collect()
    }

    fn tools_to_api(specs: &[ToolSpec]) -> Vec<ApiTool> {
        if specs.is_empty() {
            return Vec::new();
        }
        vec![ApiTool {
            function_declarations: specs
                .iter()
                .map(|spec| ApiFunctionDeclaration {
                    name: spec.name.clone(),
                    description: spec.description.clone(),
                    parameters_json_schema: spec.schema.clone(),
                })
                .collect(),
        }]
    }

    fn response_to_message(content: Option<ApiContent>) -> Message {
        let parts = content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| {
                if let Some(call) = part.function_call {
                    let id = call
                        .id
                        .unwrap_or_else(|| format!("call_{}", Uuid::new_v4().simple()));
                    let input = if call.args.is_null() {
                        json!({})
                    } else {
                        call.args
                    };
                    return Some(Part::ToolCall(ToolCall {
                        id,
                        name: call.name,
                        input,
                    }));
                }
                part.text.filter(|t| !t.is_empty()).map(Part::Text)
            })
            .collect();

        Message {
            role: Role::Assistant,
            parts,
        }
    }

    fn build_request(&self, request: &ModelRequest<'_>) -> ApiRequest {
        let tools = Self::tools_to_api(request.tools);
        let tool_config = (!tools.is_empty()).then_some(ApiToolConfig {
            function_calling_config: ApiFunctionCallingConfig { mode: "AUTO" },
        });

        ApiRequest {
            contents: Self::messages_to_api(request.messages),
            system_instruction: self.system.as_ref().map(|s| ApiContent {
                role: None,
                parts: vec![ApiPart {
                    text: Some(s.clone()),
                    ..Default::default()
                }],
            }),
            tools,
            tool_config,
            generation_config: ApiGenerationConfig {
                max_output_tokens: self.max_tokens,
            },
        }
    }
}

impl std::fmt::Display for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gemini({})", self.model)
    }
}

impl Backend for GeminiBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let api_request = self.build_request(&request);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let content = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content);
        let message = Self::response_to_message(content);
        let usage = api_response
            .usage_metadata
            .map(|u| Usage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        Ok(ModelResponse { message, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_names_the_model() {
        let backend = GeminiBackend::builder("test", "gemini-2.0-flash-001").build();
        assert_eq!(
            backend.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-001:generateContent"
        );
    }

    #[test]
    fn function_responses_are_named_after_their_call() {
        let messages = vec![
            Message::user("Summarise ST000001"),
            Message {
                role: Role::Assistant,
                parts: vec![Part::ToolCall(ToolCall {
                    id: "call_1".into(),
                    name: "get_study_summary".into(),
                    input: json!({"study_id": "ST000001"}),
                })],
            },
            Message::tool_results(vec![ToolResult::Success {
                tool_call_id: "call_1".into(),
                output: json!({"study_id": "ST000001"}),
            }]),
        ];
        let tools = vec![ToolSpec {
            name: "get_study_summary".into(),
            description: "Fetch summary information for a study".into(),
            schema: json!({"type": "object"}),
        }];

        let backend = GeminiBackend::builder("test", "gemini-2.0-flash-001").build();
        let wire = serde_json::to_value(backend.build_request(&ModelRequest {
            messages: &messages,
            tools: &tools,
        }))
        .unwrap();

        assert_eq!(wire["contents"][1]["role"], "model");
        assert_eq!(
            wire["contents"][1]["parts"][0]["functionCall"]["name"],
            "get_study_summary"
        );
        let response = &wire["contents"][2]["parts"][0]["functionResponse"];
        assert_eq!(response["name"], "get_study_summary");
        assert_eq!(response["response"]["content"]["study_id"], "ST000001");
        assert_eq!(
            wire["tools"][0]["functionDeclarations"][0]["parametersJsonSchema"],
            json!({"type": "object"})
        );
        assert_eq!(wire["toolConfig"]["functionCallingConfig"]["mode"], "AUTO");
        assert!(wire.get("systemInstruction").is_none());
    }

    #[test]
    fn calls_without_ids_get_generated_ones() {
        let body = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"functionCall": {"name": "get_study_summary",
                                                "args": {"study_id": "ST000001"}}}]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 40, "candidatesTokenCount": 6}
        });
        let response: ApiResponse = serde_json::from_value(body).unwrap();
        let content = response.candidates.into_iter().next().unwrap().content;
        let message = GeminiBackend::response_to_message(content);

        let calls = message.tool_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].id.starts_with("call_"));
        assert_eq!(calls[0].input["study_id"], "ST000001");
    }

    #[test]
    fn missing_candidate_is_an_empty_message() {
        let message = GeminiBackend::response_to_message(None);
        assert!(message.parts.is_empty());
    }
}
