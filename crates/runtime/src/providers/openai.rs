//! OpenAI Chat Completions backend.

use crate::model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Part, Role, ToolCall, ToolResult,
    ToolSpec, Usage,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
    max_completion_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
enum ApiMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ApiToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: ApiFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    /// JSON-encoded arguments.
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ApiTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ApiFunction,
}

#[derive(Debug, Serialize)]
struct ApiFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ApiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Builder for creating an OpenAI backend.
#[derive(Debug, Clone)]
pub struct OpenAiBackendBuilder {
    api_key: String,
    model: String,
    max_tokens: u32,
    system: Option<String>,
    api_url: String,
}

impl OpenAiBackendBuilder {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: 1000,
            system: None,
            api_url: OPENAI_API_URL.to_string(),
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

    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn build(self) -> OpenAiBackend {
        OpenAiBackend {
            client: reqwest::Client::new(),
            api_key: self.api_key,
            model: self.model,
            max_tokens: self.max_tokens,
            system: self.system,
            api_url: self.api_url,
        }
    }
}

/// OpenAI API backend.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    system: Option<String>,
    api_url: String,
}

impl OpenAiBackend {
    pub fn builder(api_key: impl Into<String>, model: impl Into<String>) -> OpenAiBackendBuilder {
        OpenAiBackendBuilder::new(api_key, model)
    }

    /// One conversation message can expand to several wire messages: each
    /// tool result is its own `tool` message.
    fn message_to_api(msg: &Message, out: &mut Vec<ApiMessage>) {
        match msg.role {
            Role::System => out.push(ApiMessage::System { content: msg.text() }),
            Role::Assistant => {
                let text = msg.text();
                let tool_calls = msg
                    .tool_calls()
                    .into_iter()
                    .map(|call| ApiToolCall {
                        id: call.id,
                        kind: "function".to_string(),
                        function: ApiFunctionCall {
                            name: call.name,
                            arguments: call.input.to_string(),
                        },
                    })
                    .collect();
                out.push(ApiMessage::Assistant {
                    content: (!text.is_empty()).then_some(text),
                    tool_calls,
                });
            }
            Role::User => {
                for part in &msg.parts {
                    match part {
                        Part::Text(text) => out.push(ApiMessage::User {
                            content: text.clone(),
                        }),
                        Part::ToolResult(ToolResult::Success {
                            tool_call_id,
                            output,
                        }) => out.push(ApiMessage::Tool {
                            tool_call_id: tool_call_id.clone(),
                            content: output.to_string(),
                        }),
                        Part::ToolResult(ToolResult::Failure {
                            tool_call_id,
                            error,
                        }) => out.push(ApiMessage::Tool {
                            tool_call_id: tool_call_id.clone(),
                            content: serde_json::json!({ "error": error.to_string() })
                                .to_string(),
                        }),
                        Part::ToolCall(_) => {}
                    }
                }
            }
        }
    }

    fn tool_to_api(spec: &ToolSpec) -> ApiTool {
        ApiTool {
            kind: "function",
            function: ApiFunction {
                name: spec.name.clone(),
                description: spec.description.clone(),
                parameters: spec.schema.clone(),
            },
        }
    }

    fn response_to_message(response: ApiResponseMessage) -> Result<Message, ModelError> {
        let mut parts = Vec::new();
        if let Some(text) = response.content.filter(|t| !t.is_empty()) {
            parts.push(Part::Text(text));
        }
        for call in response.tool_calls.unwrap_or_default() {
            let input: Value = if call.function.arguments.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&call.function.arguments).map_err(|e| {
                    ModelError::InvalidResponse(format!(
                        "tool call {} arguments: {e}",
                        call.function.name
                    ))
                })?
            };
            parts.push(Part::ToolCall(ToolCall {
                id: call.id,
                name: call.function.name,
                input,
            }));
        }

        Ok(Message {
            role: Role::Assistant,
            parts,
        })
    }

    fn build_request(&self, request: &ModelRequest<'_>) -> ApiRequest {
        let mut messages = Vec::new();
        if let Some(system) = &self.system {
            messages.push(ApiMessage::System {
                content: system.clone(),
            });
        }
        for msg in request.messages {
            Self::message_to_api(msg, &mut messages);
        }

        ApiRequest {
            model: self.model.clone(),
            messages,
            tools: request.tools.iter().map(Self::tool_to_api).collect(),
            max_completion_tokens: self.max_tokens,
        }
    }
}

impl std::fmt::Display for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "openai({})", self.model)
    }
}

impl Backend for OpenAiBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let api_request = self.build_request(&request);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
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

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("no choices".into()))?;

        let message = Self::response_to_message(choice.message)?;
        let usage = api_response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(ModelResponse { message, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolError;
    use serde_json::json;

    #[test]
    fn tool_results_become_tool_messages() {
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
            Message::tool_results(vec![
                ToolResult::Success {
                    tool_call_id: "call_1".into(),
                    output: json!({"study_id": "ST000001"}),
                },
                ToolResult::Failure {
                    tool_call_id: "call_2".into(),
                    error: ToolError::CapabilityDenied("get_study_species".into()),
                },
            ]),
        ];

        let backend = OpenAiBackend::builder("test", "gpt-5-nano")
            .system("Be brief.")
            .build();
        let request = backend.build_request(&ModelRequest {
            messages: &messages,
            tools: &[],
        });
        let wire = serde_json::to_value(&request).unwrap();
        let wire_messages = wire["messages"].as_array().unwrap();

        assert_eq!(wire_messages.len(), 5);
        assert_eq!(wire_messages[0]["role"], "system");
        assert_eq!(wire_messages[1]["role"], "user");
        assert_eq!(wire_messages[2]["role"], "assistant");
        assert!(wire_messages[2].get("content").is_none());
        assert_eq!(
            wire_messages[2]["tool_calls"][0]["function"]["arguments"],
            r#"{"study_id":"ST000001"}"#
        );
        assert_eq!(wire_messages[3]["role"], "tool");
        assert_eq!(wire_messages[3]["tool_call_id"], "call_1");
        assert_eq!(wire_messages[4]["tool_call_id"], "call_2");
        assert!(
            wire_messages[4]["content"]
                .as_str()
                .unwrap()
                .contains("capability denied")
        );
        assert!(wire.get("tools").is_none());
    }

    #[test]
    fn response_tool_calls_are_decoded() {
        let body = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "get_study_summary",
                                     "arguments": "{\"study_id\":\"ST000001\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 30, "completion_tokens": 5}
        });
        let response: ApiResponse = serde_json::from_value(body).unwrap();
        let choice = response.choices.into_iter().next().unwrap();
        let message = OpenAiBackend::response_to_message(choice.message).unwrap();

        let calls = message.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].input, json!({"study_id": "ST000001"}));
        assert!(message.text().is_empty());
    }

    #[test]
    fn malformed_arguments_are_rejected() {
        let message = ApiResponseMessage {
            content: None,
            tool_calls: Some(vec![ApiToolCall {
                id: "call_1".into(),
                kind: "function".into(),
                function: ApiFunctionCall {
                    name: "get_study_summary".into(),
                    arguments: "{not json".into(),
                },
            }]),
        };
        assert!(matches!(
            OpenAiBackend::response_to_message(message),
            Err(ModelError::InvalidResponse(_))
        ));
    }
}
