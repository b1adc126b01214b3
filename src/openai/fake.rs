use anyhow::Result;
use async_openai::types::{
    ChatChoice, ChatCompletionRequestMessage, ChatCompletionResponseMessage,
    CompletionUsage, CreateChatCompletionResponse, FinishReason, Model, Role,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::openai::{ModelRequest, OpenAIClientTrait};

const DEFAULT_RESPONSE: &str = "Fake default response";

#[derive(Debug, Clone)]
enum ScriptedReply {
    Content(Option<String>),
    Failure(String),
}

/// A scripted stand-in for the model endpoint.
///
/// Replies are handed out in the order they were added; once the script is
/// exhausted every call gets a fixed default response. All requests are
/// recorded for later assertions.
///
/// # Example
///
/// ```
/// use geovote::conversation::Message;
/// use geovote::openai::fake::FakeOpenAIClient;
/// use geovote::openai::respond;
///
/// #[tokio::main]
/// async fn main() {
///     let client = FakeOpenAIClient::new()
///         .with_response("AD")
///         .with_failure("timed out");
///
///     let question = [Message::user_text("Which segment is tangent?")];
///     assert_eq!(respond(&client, "qwen-vl", &question).await, "AD");
///     assert_eq!(respond(&client, "qwen-vl", &question).await, "");
/// }
/// ```
pub struct FakeOpenAIClient {
    replies: Mutex<VecDeque<ScriptedReply>>,
    models: Vec<Model>,
    // Track requests for verification in tests
    pub requests: Mutex<Vec<ModelRequest>>,
}

impl Default for FakeOpenAIClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeOpenAIClient {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            models: vec![],
            requests: Mutex::new(vec![]),
        }
    }

    fn push(self, reply: ScriptedReply) -> Self {
        self.replies
            .lock()
            .expect("fake client script poisoned")
            .push_back(reply);
        self
    }

    /// Add a response to be returned by the fake client
    pub fn with_response(self, response: &str) -> Self {
        self.push(ScriptedReply::Content(Some(response.to_string())))
    }

    /// Add multiple responses to be returned in sequence
    pub fn with_responses(self, responses: Vec<&str>) -> Self {
        responses
            .into_iter()
            .fold(self, |client, response| client.with_response(response))
    }

    /// Configure the client to return a response with None content
    pub fn with_none_content_response(self) -> Self {
        self.push(ScriptedReply::Content(None))
    }

    /// Make the next call fail, as a timed out or refused request would
    pub fn with_failure(self, error: &str) -> Self {
        self.push(ScriptedReply::Failure(error.to_string()))
    }

    pub fn with_models(mut self, models: Vec<Model>) -> Self {
        self.models = models;
        self
    }

    pub fn create_model(id: &str, provider: &str) -> Model {
        Model {
            id: id.to_string(),
            created: 0,
            object: "model".to_string(),
            owned_by: provider.to_string(),
        }
    }

    /// Number of scripted replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.replies
            .lock()
            .expect("fake client script poisoned")
            .len()
    }
}

#[async_trait]
impl OpenAIClientTrait for FakeOpenAIClient {
    #[allow(deprecated)]
    async fn chat_completion(
        &self,
        model: String,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<CreateChatCompletionResponse, anyhow::Error> {
        self.requests
            .lock()
            .expect("fake client requests poisoned")
            .push(ModelRequest {
                model_name: model.clone(),
                messages,
            });

        let reply = self
            .replies
            .lock()
            .expect("fake client script poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                ScriptedReply::Content(Some(DEFAULT_RESPONSE.to_string()))
            });

        let content = match reply {
            ScriptedReply::Content(content) => content,
            ScriptedReply::Failure(error) => {
                return Err(anyhow::anyhow!(error));
            }
        };

        let message = ChatCompletionResponseMessage {
            role: Role::Assistant,
            content,
            #[allow(deprecated)]
            function_call: None,
            tool_calls: None,
            #[allow(deprecated)]
            refusal: None,
            audio: None,
        };

        let chat_choice = ChatChoice {
            index: 0,
            message,
            finish_reason: Some(FinishReason::Stop),
            logprobs: None,
        };

        let usage = CompletionUsage {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            prompt_tokens_details: None,
            completion_tokens_details: None,
        };

        Ok(CreateChatCompletionResponse {
            id: "fake_id".to_string(),
            object: "chat.completion".to_string(),
            created: 0,
            model,
            system_fingerprint: Some("fake-fingerprint".to_string()),
            service_tier: None,
            choices: vec![chat_choice],
            usage: Some(usage),
        })
    }

    async fn list_models(&self) -> Result<Vec<Model>, anyhow::Error> {
        Ok(self.models.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::first_content;

    #[tokio::test]
    async fn test_scripted_replies_then_default() {
        let client =
            FakeOpenAIClient::new().with_responses(vec!["AD", "{B}"]);
        assert_eq!(client.remaining(), 2);

        let mut replies = Vec::new();
        for _ in 0..3 {
            let response = client
                .chat_completion("qwen-vl".to_string(), vec![])
                .await
                .unwrap();
            replies.push(first_content(&response));
        }

        assert_eq!(
            replies,
            vec![
                Some("AD".to_string()),
                Some("{B}".to_string()),
                Some(DEFAULT_RESPONSE.to_string())
            ]
        );
        assert_eq!(client.remaining(), 0);
    }

    #[tokio::test]
    async fn test_failure_is_returned_as_error() {
        let client = FakeOpenAIClient::new().with_failure("connection reset");
        let result = client.chat_completion("m".to_string(), vec![]).await;
        let error = result.unwrap_err();
        assert!(error.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_none_content_response() {
        let client = FakeOpenAIClient::new().with_none_content_response();
        let response =
            client.chat_completion("m".to_string(), vec![]).await.unwrap();
        assert_eq!(first_content(&response), None);
    }

    #[tokio::test]
    async fn test_models() {
        let client = FakeOpenAIClient::new().with_models(vec![
            FakeOpenAIClient::create_model("qwen2.5-vl-7b", "vllm"),
            FakeOpenAIClient::create_model("qwen2.5-vl-72b", "vllm"),
        ]);
        let models = client.list_models().await.unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[1].id, "qwen2.5-vl-72b");
    }
}
