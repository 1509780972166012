//! OpenAI chat-completions collaborator with structured JSON output.

use super::{InferenceClient, ListQuery, RecordQuery};
use crate::config::InferenceSettings;
use crate::error::{Result, TunegrabError};
use crate::openai::create_client_with_timeout;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    ResponseFormatJsonSchema,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument};

/// OpenAI-backed inference collaborator.
pub struct OpenAIInference {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    search_model: String,
}

impl OpenAIInference {
    /// Create a collaborator from inference settings.
    pub fn new(settings: &InferenceSettings) -> Result<Self> {
        let client = create_client_with_timeout(Duration::from_secs(settings.timeout_seconds))?;

        Ok(Self {
            client,
            model: settings.model.clone(),
            search_model: settings.search_model.clone(),
        })
    }

    /// Model used for a request, depending on web search augmentation.
    fn model_for(&self, web_search: bool) -> &str {
        if web_search {
            &self.search_model
        } else {
            &self.model
        }
    }

    async fn complete(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        response_format: ResponseFormat,
    ) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| TunegrabError::Inference(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| TunegrabError::Inference(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .response_format(response_format)
            .build()
            .map_err(|e| TunegrabError::Inference(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| TunegrabError::OpenAI(format!("{} API error: {}", model, e)))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| TunegrabError::Inference("Empty response from model".to_string()))?;

        debug!("Model response: {}", content.chars().take(500).collect::<String>());
        Ok(content)
    }
}

#[async_trait]
impl InferenceClient for OpenAIInference {
    #[instrument(skip(self, query), fields(web_search = query.web_search))]
    async fn list_query(&self, query: &ListQuery) -> Result<String> {
        let model = self.model_for(query.web_search);
        self.complete(model, &query.system, &query.prompt, list_response_format())
            .await
    }

    #[instrument(skip(self, query))]
    async fn record_query(&self, query: &RecordQuery) -> Result<String> {
        self.complete(&self.model, &query.system, &query.prompt, record_response_format())
            .await
    }
}

/// Structured outputs need an object at the top level, so the list is wrapped
/// under `videos`.
fn list_response_format() -> ResponseFormat {
    ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            description: Some("Ordered list of candidate videos".into()),
            name: "video_search_results".into(),
            schema: Some(list_schema()),
            strict: Some(true),
        },
    }
}

fn record_response_format() -> ResponseFormat {
    ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            description: Some("Descriptive metadata for one video".into()),
            name: "video_info".into(),
            schema: Some(record_schema()),
            strict: Some(true),
        },
    }
}

fn list_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "videos": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "title": { "type": "string" },
                        "channel": { "type": "string" },
                        "duration": { "type": "string" },
                        "url": { "type": "string" }
                    },
                    "required": ["id", "title", "channel", "duration", "url"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["videos"],
        "additionalProperties": false
    })
}

fn record_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "channel": { "type": "string" },
            "duration": { "type": "string" }
        },
        "required": ["title", "channel", "duration"],
        "additionalProperties": false
    })
}
