pub mod fake;
pub mod real;

use crate::conversation::{to_request_messages, Message};
use anyhow::Result;
use async_openai::types::{
    ChatCompletionRequestMessage, CreateChatCompletionResponse, Model,
};
use async_trait::async_trait;
use tracing::{debug, warn};

/// A struct to define what was sent for a request
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model_name: String,
    pub messages: Vec<ChatCompletionRequestMessage>,
}

/// Abstracts the OpenAI-compatible endpoint serving the vision-language
/// model, so the evaluation pipeline can run against a scripted fake.
#[async_trait]
pub trait OpenAIClientTrait: Send + Sync {
    /// Creates a chat completion by sending messages to the model
    ///
    /// # Arguments
    /// * `model` - The model identifier served by the endpoint
    /// * `messages` - A sequence of messages using OpenAI types
    async fn chat_completion(
        &self,
        model: String,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<CreateChatCompletionResponse, anyhow::Error>;

    /// Retrieves a list of available models
    async fn list_models(&self) -> Result<Vec<Model>, anyhow::Error>;
}

/// Text of the first choice, if the model produced any.
pub fn first_content(response: &CreateChatCompletionResponse) -> Option<String> {
    response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_ref())
        .map(String::from)
}

/// Sends a conversation and returns the reply text.
///
/// Never fails: a failed call or a reply without content is logged and
/// comes back as an empty string, which downstream extraction treats as
/// "no answer".
pub async fn respond(
    client: &dyn OpenAIClientTrait,
    model: &str,
    conversation: &[Message],
) -> String {
    let messages = match to_request_messages(conversation) {
        Ok(messages) => messages,
        Err(e) => {
            warn!("Failed to build request for {}: {}", model, e);
            return String::new();
        }
    };

    match client.chat_completion(model.to_string(), messages).await {
        Ok(response) => {
            let content = first_content(&response).unwrap_or_default();
            debug!("Model {} replied with {} bytes", model, content.len());
            content
        }
        Err(e) => {
            warn!("Chat completion with {} failed: {}", model, e);
            String::new()
        }
    }
}
