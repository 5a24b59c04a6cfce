use crate::config::Settings;
use crate::error::{GlimpseError, Result};
use crate::image::ImagePayload;
use serde::Serialize;
use serde_json::Value;

/// Message role in a chat completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
}

/// Reference to an image, either a URL or a data URI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// A part of multimodal message content
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// Message in a chat completion request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: Vec<ContentPart>,
}

impl ChatMessage {
    /// Create a user message holding a prompt followed by an image
    pub fn user_with_image(prompt: impl Into<String>, data_uri: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: vec![
                ContentPart::Text {
                    text: prompt.into(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: data_uri.into(),
                    },
                },
            ],
        }
    }
}

/// Body of a `POST /chat/completions` request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
}

impl ChatRequest {
    pub fn for_image(settings: &Settings, image: &ImagePayload, prompt: &str) -> Self {
        Self {
            model: settings.model.clone(),
            messages: vec![ChatMessage::user_with_image(prompt, image.data_uri())],
            temperature: settings.temperature,
        }
    }
}

/// Extract the text of the first choice from a chat completion response body.
pub fn extract_answer(body: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        GlimpseError::MalformedResponse(format!("response body is not valid JSON: {}", e))
    })?;

    let Some(choices) = value.get("choices") else {
        // OpenRouter reports some upstream failures as a 200 carrying an error object
        if let Some(message) = value["error"]["message"].as_str() {
            return Err(GlimpseError::MalformedResponse(format!(
                "missing 'choices' field, API reported: {}",
                message
            )));
        }
        return Err(GlimpseError::MalformedResponse("missing 'choices' field".to_string()));
    };

    let first = choices
        .as_array()
        .ok_or_else(|| GlimpseError::MalformedResponse("'choices' is not a list".to_string()))?
        .first()
        .ok_or_else(|| GlimpseError::MalformedResponse("'choices' is empty".to_string()))?;

    first["message"]["content"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| {
            GlimpseError::MalformedResponse(
                "first choice has no text 'message.content'".to_string(),
            )
        })
}
