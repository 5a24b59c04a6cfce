use crate::config::{EndpointConfig, Settings};
use crate::error::{GlimpseError, Result};
use crate::image::ImagePayload;
use crate::llm::models::{extract_answer, ChatRequest};
use crate::llm::transport::HttpTransport;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Gateway for the OpenRouter chat completion API.
///
/// Each call to [`OpenRouterGateway::describe_image`] issues exactly one request
/// through the configured transport. Nothing is retried.
pub struct OpenRouterGateway {
    transport: Arc<dyn HttpTransport>,
    endpoint: EndpointConfig,
}

impl OpenRouterGateway {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoint: EndpointConfig) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    /// Send an image and prompt to the model and return its text answer.
    pub async fn describe_image(
        &self,
        settings: &Settings,
        image: &ImagePayload,
        prompt: &str,
    ) -> Result<String> {
        let request = ChatRequest::for_image(settings, image, prompt);
        let body = serde_json::to_value(&request)?;
        let url = self.endpoint.chat_completions_url();

        info!(model = %settings.model, temperature = settings.temperature, "Sending image to OpenRouter");
        debug!(url = %url, image_bytes = image.bytes.len(), prompt_chars = prompt.len(), "Request details");

        let response = self.transport.post_json(&url, &settings.api_key, &body).await?;

        if !response.is_success() {
            warn!(status = response.status, "OpenRouter returned an error status");
            return Err(GlimpseError::Api {
                status: response.status,
                body: response.body,
            });
        }

        extract_answer(&response.body)
    }
}
