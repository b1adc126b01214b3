use crate::openai::OpenAIClientTrait;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, CreateChatCompletionRequestArgs,
    CreateChatCompletionResponse, Model,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::info;

// Client for any OpenAI-compatible endpoint (OpenAI, vLLM, ...)
pub struct RealOpenAIClient {
    client: Client<OpenAIConfig>,
}

impl RealOpenAIClient {
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self { client }
    }

    /// Builds a client from optional credentials. Unset values keep the
    /// async-openai defaults (environment key, public API base).
    pub fn from_settings(
        api_key: Option<&str>,
        api_base: Option<&str>,
    ) -> Self {
        let mut config = OpenAIConfig::new();
        if let Some(api_base) = api_base {
            info!("Using OpenAI-compatible endpoint at {}", api_base);
            config = config.with_api_base(api_base);
        }
        if let Some(api_key) = api_key {
            config = config.with_api_key(api_key);
        }
        Self::new(Client::with_config(config))
    }
}

#[async_trait]
impl OpenAIClientTrait for RealOpenAIClient {
    async fn chat_completion(
        &self,
        model: String,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<CreateChatCompletionResponse, anyhow::Error> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .build()?;

        let response = self.client.chat().create(request).await?;
        Ok(response)
    }

    async fn list_models(&self) -> Result<Vec<Model>, anyhow::Error> {
        let response = self.client.models().list().await?;
        Ok(response.data)
    }
}
