//! OpenAI client implementation using async-openai library

use crate::config::ResolvedLlmConfig;
use crate::error::{LlmError, Result};
use crate::llm::{
    ChatOptions, ContentBlock, FinishReason, LlmClient, LlmMessage, LlmResponse, MessageContent,
    MessageRole, ToolDefinition, Usage,
};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
        ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessage,
        ChatCompletionRequestToolMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse, FunctionObject,
    },
    Client,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

/// OpenAI-compatible client using async-openai library
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiClient {
    /// Create a new OpenAI client from resolved LLM config
    pub fn new(config: &ResolvedLlmConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::Authentication {
                message: "No API key found for OpenAI".to_string(),
            }
            .into());
        }

        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(config.base_url.trim_end_matches('/'));

        let mut client = Client::with_config(openai_config);

        if !config.headers.is_empty() {
            let mut headers = HeaderMap::new();
            for (key, value) in &config.headers {
                let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                    LlmError::InvalidRequest {
                        message: format!("Invalid header name '{}': {}", key, e),
                    }
                })?;
                let value = HeaderValue::from_str(value).map_err(|e| LlmError::InvalidRequest {
                    message: format!("Invalid value for header '{}': {}", key, e),
                })?;
                headers.insert(name, value);
            }
            let http_client = reqwest::Client::builder()
                .default_headers(headers)
                .build()
                .map_err(|e| LlmError::InvalidRequest {
                    message: format!("Failed to build HTTP client: {}", e),
                })?;
            client = client.with_http_client(http_client);
        }

        Ok(Self {
            client,
            model: config.model.clone(),
        })
    }

    /// Convert our internal message format to async-openai format
    fn convert_messages(
        &self,
        messages: Vec<LlmMessage>,
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut converted = Vec::with_capacity(messages.len());

        for message in messages {
            match message.role {
                MessageRole::System => {
                    let content = extract_text_content(&message.content);
                    converted.push(ChatCompletionRequestMessage::System(
                        ChatCompletionRequestSystemMessage {
                            content: content.into(),
                            name: None,
                        },
                    ));
                }
                MessageRole::User => {
                    let content = extract_text_content(&message.content);
                    converted.push(ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessage {
                            content: content.into(),
                            name: None,
                        },
                    ));
                }
                MessageRole::Assistant => {
                    converted.push(ChatCompletionRequestMessage::Assistant(
                        convert_assistant(&message.content),
                    ));
                }
                MessageRole::Tool => {
                    let mut pushed_any = false;
                    if let MessageContent::Blocks(blocks) = &message.content {
                        for block in blocks {
                            if let ContentBlock::ToolResult {
                                tool_use_id,
                                content,
                                ..
                            } = block
                            {
                                converted.push(ChatCompletionRequestMessage::Tool(
                                    ChatCompletionRequestToolMessage {
                                        content: ChatCompletionRequestToolMessageContent::Text(
                                            content.clone(),
                                        ),
                                        tool_call_id: tool_use_id.clone(),
                                    },
                                ));
                                pushed_any = true;
                            }
                        }
                    }
                    if !pushed_any {
                        return Err(LlmError::InvalidRequest {
                            message: "Tool message must contain ToolResult".to_string(),
                        }
                        .into());
                    }
                }
            }
        }

        Ok(converted)
    }

    /// Convert our tool definitions to async-openai format
    fn convert_tools(&self, tools: Vec<ToolDefinition>) -> Vec<ChatCompletionTool> {
        tools
            .into_iter()
            .map(|tool| ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: tool.function.name,
                    description: Some(tool.function.description),
                    parameters: Some(tool.function.parameters),
                    strict: None,
                },
            })
            .collect()
    }

    /// Convert async-openai response to our internal format
    fn convert_response(&self, response: CreateChatCompletionResponse) -> Result<LlmResponse> {
        let choice =
            response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| LlmError::InvalidRequest {
                    message: "No choices in response".to_string(),
                })?;

        let text = choice.message.content.filter(|c| !c.is_empty());
        let message_content = match choice.message.tool_calls {
            Some(tool_calls) if !tool_calls.is_empty() => {
                let mut blocks = Vec::with_capacity(tool_calls.len() + 1);
                if let Some(text) = text {
                    blocks.push(ContentBlock::Text { text });
                }
                blocks.extend(tool_calls.into_iter().map(convert_tool_call));
                MessageContent::Blocks(blocks)
            }
            _ => MessageContent::Text(text.unwrap_or_default()),
        };

        let usage = response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        let finish_reason = choice.finish_reason.map(|reason| match reason {
            async_openai::types::FinishReason::Stop => FinishReason::Stop,
            async_openai::types::FinishReason::Length => FinishReason::Length,
            async_openai::types::FinishReason::ToolCalls => FinishReason::ToolCalls,
            async_openai::types::FinishReason::ContentFilter => FinishReason::ContentFilter,
            async_openai::types::FinishReason::FunctionCall => FinishReason::ToolCalls,
        });

        Ok(LlmResponse {
            message: LlmMessage {
                role: MessageRole::Assistant,
                content: message_content,
            },
            usage,
            model: response.model,
            finish_reason,
        })
    }
}

/// Extract text content from MessageContent
fn extract_text_content(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(text) => text.clone(),
        MessageContent::Blocks(blocks) => blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn convert_assistant(content: &MessageContent) -> ChatCompletionRequestAssistantMessage {
    let mut text = String::new();
    let mut tool_calls = Vec::new();

    match content {
        MessageContent::Text(t) => text.push_str(t),
        MessageContent::Blocks(blocks) => {
            for block in blocks {
                match block {
                    ContentBlock::Text { text: t } => {
                        if !text.is_empty() {
                            text.push('\n');
                        }
                        text.push_str(t);
                    }
                    ContentBlock::ToolUse { id, name, input } => {
                        tool_calls.push(ChatCompletionMessageToolCall {
                            id: id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: async_openai::types::FunctionCall {
                                name: name.clone(),
                                arguments: input.to_string(),
                            },
                        });
                    }
                    ContentBlock::ToolResult { .. } => {}
                }
            }
        }
    }

    ChatCompletionRequestAssistantMessage {
        content: if text.is_empty() {
            None
        } else {
            Some(ChatCompletionRequestAssistantMessageContent::Text(text))
        },
        tool_calls: if tool_calls.is_empty() {
            None
        } else {
            Some(tool_calls)
        },
        ..Default::default()
    }
}

fn convert_tool_call(tool_call: ChatCompletionMessageToolCall) -> ContentBlock {
    // Unparseable arguments are passed through as a string and rejected by validation
    let input: Value = serde_json::from_str(&tool_call.function.arguments)
        .unwrap_or(Value::String(tool_call.function.arguments));

    ContentBlock::ToolUse {
        id: tool_call.id,
        name: tool_call.function.name,
        input,
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat_completion(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> Result<LlmResponse> {
        let converted_messages = self.convert_messages(messages)?;
        let converted_tools = tools
            .filter(|t| !t.is_empty())
            .map(|t| self.convert_tools(t));

        if let Some(ref tools) = converted_tools {
            tracing::debug!("OpenAI request with {} tools enabled", tools.len());
        }

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model);
        request_builder.messages(converted_messages);

        if let Some(tools) = converted_tools {
            request_builder.tools(tools);
        }

        if let Some(opts) = options {
            if let Some(max_tokens) = opts.max_tokens {
                request_builder.max_completion_tokens(max_tokens);
            }
            if let Some(temperature) = opts.temperature {
                request_builder.temperature(temperature);
            }
            if let Some(top_p) = opts.top_p {
                request_builder.top_p(top_p);
            }
        }

        let request = request_builder.build().map_err(|e| {
            tracing::error!("Failed to build OpenAI request: {}", e);
            LlmError::InvalidRequest {
                message: format!("Failed to build request: {}", e),
            }
        })?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            tracing::error!("OpenAI API call failed: {}", e);
            LlmError::ApiError {
                // async-openai doesn't expose status codes directly
                status: 500,
                message: e.to_string(),
            }
        })?;

        let result = self.convert_response(response)?;

        let calls = result.message.tool_calls();
        if !calls.is_empty() {
            tracing::debug!("OpenAI response contains {} tool calls", calls.len());
            for call in &calls {
                tracing::debug!("Tool call: {} (id: {})", call.name, call.id);
            }
        }

        Ok(result)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Protocol;
    use crate::tools::ToolCall;
    use serde_json::json;

    fn client() -> OpenAiClient {
        let config = ResolvedLlmConfig::new(
            Protocol::OpenAICompat,
            "https://api.openai.com/v1".to_string(),
            "sk-test".to_string(),
            "gpt-4.1-mini".to_string(),
        );
        OpenAiClient::new(&config).unwrap()
    }

    #[test]
    fn test_rejects_empty_api_key() {
        let config = ResolvedLlmConfig::new(
            Protocol::OpenAICompat,
            "https://api.openai.com/v1".to_string(),
            String::new(),
            "gpt-4.1-mini".to_string(),
        );
        assert!(OpenAiClient::new(&config).is_err());
    }

    #[test]
    fn test_convert_conversation_with_tool_round_trip() {
        let messages = vec![
            LlmMessage::system("You are a researcher."),
            LlmMessage::user("Research X"),
            LlmMessage::assistant_with_tool_calls(
                None,
                vec![ToolCall::with_id(
                    "call_1",
                    "web_search",
                    json!({"queries": ["X overview"]}),
                )],
            ),
            LlmMessage::tool_result("call_1", "<search_results/>", false),
        ];

        let converted = client().convert_messages(messages).unwrap();
        assert_eq!(converted.len(), 4);
        match &converted[2] {
            ChatCompletionRequestMessage::Assistant(assistant) => {
                assert!(assistant.content.is_none());
                let calls = assistant.tool_calls.as_ref().unwrap();
                assert_eq!(calls[0].id, "call_1");
                assert_eq!(calls[0].function.name, "web_search");
            }
            other => panic!("unexpected message: {:?}", other),
        }
        match &converted[3] {
            ChatCompletionRequestMessage::Tool(tool) => assert_eq!(tool.tool_call_id, "call_1"),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_tool_message_without_result_is_rejected() {
        let bad = LlmMessage {
            role: MessageRole::Tool,
            content: MessageContent::Text("orphan".to_string()),
        };
        assert!(client().convert_messages(vec![bad]).is_err());
    }

    #[test]
    fn test_unparseable_arguments_become_string() {
        let block = convert_tool_call(ChatCompletionMessageToolCall {
            id: "call_2".to_string(),
            r#type: ChatCompletionToolType::Function,
            function: async_openai::types::FunctionCall {
                name: "scrape_pages".to_string(),
                arguments: "{not json".to_string(),
            },
        });

        match block {
            ContentBlock::ToolUse { input, .. } => {
                assert_eq!(input, Value::String("{not json".to_string()))
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }
}
