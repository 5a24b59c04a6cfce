//! Glimpse: describe local images with multimodal models through OpenRouter.
//!
//! The pipeline is [`config`] → [`image`] → [`llm`] → [`output`], wired together
//! by [`app::run`].

pub mod app;
pub mod config;
pub mod error;
pub mod image;
pub mod llm;
pub mod output;

pub use error::{GlimpseError, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::app::{run, Invocation, DEFAULT_PROMPT};
    pub use crate::config::{ConfigLayer, EndpointConfig, Settings};
    pub use crate::error::{GlimpseError, Result};
    pub use crate::image::{ImageFormat, ImagePayload};
    pub use crate::llm::{HttpTransport, OpenRouterGateway, ReqwestTransport};
}
