use crate::prompts::{answer_system_prompt, option_system_prompt};
use anyhow::Result;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs,
    ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
    ChatCompletionRequestUserMessageContent,
    ChatCompletionRequestUserMessageContentPart, ImageUrlArgs,
};
use serde::Serialize;
use std::path::Path;

/// Reference to a diagram. Plain paths are sent as `file://` URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn url(&self) -> String {
        let reference = self.0.trim();
        let is_url = ["http://", "https://", "file://", "data:"]
            .iter()
            .any(|scheme| reference.starts_with(scheme));
        if is_url {
            reference.to_string()
        } else {
            format!("file://{}", reference)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ContentPart {
    Text(String),
    Image(ImageRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UserContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One conversation turn. Only user turns may carry images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum Message {
    System(String),
    User(UserContent),
    Assistant(String),
}

impl Message {
    pub fn user_text(text: impl Into<String>) -> Self {
        Message::User(UserContent::Text(text.into()))
    }

    pub fn user_with_image(text: impl Into<String>, image: ImageRef) -> Self {
        Message::User(UserContent::Parts(vec![
            ContentPart::Text(text.into()),
            ContentPart::Image(image),
        ]))
    }

    pub fn role(&self) -> &'static str {
        match self {
            Message::System(_) => "system",
            Message::User(_) => "user",
            Message::Assistant(_) => "assistant",
        }
    }
}

/// A worked question shown to the model before the real one.
#[derive(Debug, Clone)]
pub struct FewShotExample {
    pub question: &'static str,
    pub image_file: &'static str,
    pub answer: &'static str,
}

pub const DEFAULT_FEW_SHOT: [FewShotExample; 3] = [
    FewShotExample {
        question: "Which tangent line intersects with the circle at point D?",
        image_file: "3854.png",
        answer: "AD\n",
    },
    FewShotExample {
        question: "What point is the intersection point of the tangent AB with circle ⊙O?",
        image_file: "3861.png",
        answer: "P\n",
    },
    FewShotExample {
        question: "What is the inscribed angle corresponding to the arc BC?",
        image_file: "1230.png",
        answer: "∠BAC",
    },
];

/// The kind of answer a question expects, which decides the system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerFormat {
    /// One option letter, voted on across variants.
    OptionLetter,
    /// Up to `k_answers` free-text answers separated by commas.
    OpenForm { k_answers: usize },
}

impl AnswerFormat {
    pub fn system_prompt(&self) -> String {
        match self {
            AnswerFormat::OptionLetter => option_system_prompt(),
            AnswerFormat::OpenForm { k_answers } => {
                answer_system_prompt(*k_answers)
            }
        }
    }
}

/// Builds the answering conversation for one question.
///
/// Few-shot turns are only included for open-form questions, and only when
/// `few_shot_dir` points at the directory holding their diagrams.
pub fn answer_conversation(
    question: &str,
    image: &ImageRef,
    format: AnswerFormat,
    few_shot_dir: Option<&Path>,
) -> Vec<Message> {
    let mut messages = vec![Message::System(format.system_prompt())];

    let few_shot_dir = match format {
        AnswerFormat::OpenForm { .. } => few_shot_dir,
        AnswerFormat::OptionLetter => None,
    };
    if let Some(dir) = few_shot_dir {
        for example in DEFAULT_FEW_SHOT.iter() {
            let image_path = dir.join(example.image_file);
            messages.push(Message::user_with_image(
                example.question,
                ImageRef(image_path.display().to_string()),
            ));
            messages.push(Message::Assistant(example.answer.to_string()));
        }
    }

    messages.push(Message::user_with_image(question, image.clone()));
    messages
}

fn to_user_part(
    part: &ContentPart,
) -> Result<ChatCompletionRequestUserMessageContentPart> {
    let converted = match part {
        ContentPart::Text(text) => {
            ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartTextArgs::default()
                    .text(text.as_str())
                    .build()
                    .map_err(|e| {
                        anyhow::anyhow!("Failed to build text part: {}", e)
                    })?,
            )
        }
        ContentPart::Image(image) => {
            let image_url =
                ImageUrlArgs::default().url(image.url()).build().map_err(
                    |e| anyhow::anyhow!("Failed to build image url: {}", e),
                )?;
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImageArgs::default()
                    .image_url(image_url)
                    .build()
                    .map_err(|e| {
                        anyhow::anyhow!("Failed to build image part: {}", e)
                    })?,
            )
        }
    };
    Ok(converted)
}

/// Converts a conversation into chat-completion request messages.
pub fn to_request_messages(
    messages: &[Message],
) -> Result<Vec<ChatCompletionRequestMessage>> {
    messages
        .iter()
        .map(|message| {
            let converted = match message {
                Message::System(text) => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(text.as_str())
                        .build()
                        .map_err(|e| {
                            anyhow::anyhow!(
                                "Failed to build system message: {}",
                                e
                            )
                        })?,
                ),
                Message::User(content) => {
                    let content = match content {
                        UserContent::Text(text) => {
                            ChatCompletionRequestUserMessageContent::Text(
                                text.clone(),
                            )
                        }
                        UserContent::Parts(parts) => {
                            ChatCompletionRequestUserMessageContent::Array(
                                parts
                                    .iter()
                                    .map(to_user_part)
                                    .collect::<Result<Vec<_>>>()?,
                            )
                        }
                    };
                    ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessageArgs::default()
                            .content(content)
                            .build()
                            .map_err(|e| {
                                anyhow::anyhow!(
                                    "Failed to build user message: {}",
                                    e
                                )
                            })?,
                    )
                }
                Message::Assistant(text) => {
                    ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessageArgs::default()
                            .content(text.as_str())
                            .build()
                            .map_err(|e| {
                                anyhow::anyhow!(
                                    "Failed to build assistant message: {}",
                                    e
                                )
                            })?,
                    )
                }
            };
            Ok(converted)
        })
        .collect()
}
