//! The end-to-end pipeline: resolve settings, load the image, ask the model,
//! print the answer.

use crate::config::{ConfigLayer, Settings};
use crate::error::Result;
use crate::image::ImagePayload;
use crate::llm::OpenRouterGateway;
use crate::output::render_answer;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_PROMPT: &str = "Describe what you see in the image";

/// What the user asked for on the command line.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub image_path: PathBuf,
    pub prompt: String,
    pub overrides: ConfigLayer,
}

impl Invocation {
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
            prompt: DEFAULT_PROMPT.to_string(),
            overrides: ConfigLayer::default(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_overrides(mut self, overrides: ConfigLayer) -> Self {
        self.overrides = overrides;
        self
    }
}

/// Run one invocation and write the answer to `out`.
///
/// The image is checked first. Only then are the configuration layers below the
/// command line loaded (`load_ambient`, highest precedence first) and the
/// gateway built (`connect`). Input and configuration errors are raised before
/// any request is sent.
pub async fn run<W, L, C>(
    invocation: &Invocation,
    load_ambient: L,
    connect: C,
    out: &mut W,
) -> Result<()>
where
    W: Write,
    L: FnOnce() -> Result<Vec<ConfigLayer>>,
    C: FnOnce() -> Result<OpenRouterGateway>,
{
    let image = ImagePayload::load(&invocation.image_path)?;
    info!(path = %image.path.display(), mime = image.format.mime_type(), "Image ready");

    let mut layers = vec![invocation.overrides.clone()];
    layers.extend(load_ambient()?);
    let settings = Settings::resolve(&layers)?;

    let gateway = connect()?;
    let answer = gateway.describe_image(&settings, &image, &invocation.prompt).await?;
    render_answer(out, &answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EndpointConfig;
    use crate::error::GlimpseError;
    use crate::llm::transport::fake::FakeTransport;
    use std::sync::Arc;
    use tempfile::{Builder, NamedTempFile};

    const APPLE: &str = r#"{"choices":[{"message":{"content":"a red apple"}}]}"#;

    fn temp_image(suffix: &str, data: &[u8]) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(data).unwrap();
        file
    }

    fn env_layer(api_key: Option<&str>, model: Option<&str>, temperature: Option<&str>) -> ConfigLayer {
        ConfigLayer {
            api_key: api_key.map(String::from),
            model: model.map(String::from),
            temperature: temperature.map(String::from),
        }
    }

    async fn run_with(
        invocation: &Invocation,
        ambient: &[ConfigLayer],
        transport: Arc<FakeTransport>,
    ) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = run(
            invocation,
            || Ok(ambient.to_vec()),
            || Ok(OpenRouterGateway::new(transport, EndpointConfig::default())),
            &mut out,
        )
        .await;
        (result, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn test_run_prints_answer() {
        let image = temp_image(".jpg", b"\xff\xd8\xff\xe0 jpeg bytes");
        let transport = Arc::new(FakeTransport::new(200, APPLE));

        let (result, stdout) = run_with(
            &Invocation::new(image.path()),
            &[env_layer(Some("sk-test"), None, None)],
            transport.clone(),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(stdout, "a red apple\n");
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_run_sends_data_uri_of_image_bytes() {
        let image = temp_image(".png", b"hello");
        let transport = Arc::new(FakeTransport::new(200, APPLE));

        let (result, _) = run_with(
            &Invocation::new(image.path()).with_prompt("What is written here?"),
            &[env_layer(Some("sk-test"), None, None)],
            transport.clone(),
        )
        .await;
        assert!(result.is_ok());

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let content = &requests[0].body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "What is written here?");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,aGVsbG8=");
    }

    #[tokio::test]
    async fn test_run_uses_defaults() {
        let image = temp_image(".jpeg", b"data");
        let transport = Arc::new(FakeTransport::new(200, APPLE));

        let (result, _) = run_with(
            &Invocation::new(image.path()),
            &[env_layer(Some("sk-test"), None, None)],
            transport.clone(),
        )
        .await;
        assert!(result.is_ok());

        let body = &transport.requests()[0].body;
        assert_eq!(body["model"], "google/gemini-2.5-flash");
        assert_eq!(body["temperature"], 0.4);
        assert_eq!(body["messages"][0]["content"][0]["text"], DEFAULT_PROMPT);
    }

    #[tokio::test]
    async fn test_run_cli_overrides_configured_values() {
        let image = temp_image(".jpg", b"data");
        let transport = Arc::new(FakeTransport::new(200, APPLE));
        let overrides = env_layer(None, Some("X"), Some("0.9"));

        let (result, _) = run_with(
            &Invocation::new(image.path()).with_overrides(overrides),
            &[env_layer(Some("sk-test"), Some("env/model"), Some("0.1"))],
            transport.clone(),
        )
        .await;
        assert!(result.is_ok());

        let body = &transport.requests()[0].body;
        assert_eq!(body["model"], "X");
        assert_eq!(body["temperature"], 0.9);
    }

    #[tokio::test]
    async fn test_run_missing_api_key_sends_nothing() {
        let image = temp_image(".jpg", b"data");
        let transport = Arc::new(FakeTransport::new(200, APPLE));

        let (result, stdout) = run_with(
            &Invocation::new(image.path()),
            &[ConfigLayer::default(), ConfigLayer::default()],
            transport.clone(),
        )
        .await;

        assert!(matches!(result, Err(GlimpseError::Config(_))));
        assert!(stdout.is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_run_missing_file_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(FakeTransport::new(200, APPLE));

        let (result, stdout) = run_with(
            &Invocation::new(dir.path().join("nope.jpg")),
            &[env_layer(Some("sk-test"), None, None)],
            transport.clone(),
        )
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, GlimpseError::FileNotFound(_)));
        assert!(err.diagnostic().contains("not found"));
        assert!(stdout.is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_run_unsupported_format_sends_nothing() {
        let image = temp_image(".gif", b"GIF89a");
        let transport = Arc::new(FakeTransport::new(200, APPLE));

        let (result, stdout) = run_with(
            &Invocation::new(image.path()),
            &[env_layer(Some("sk-test"), None, None)],
            transport.clone(),
        )
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, GlimpseError::UnsupportedFormat(_)));
        assert!(err.diagnostic().contains("Unsupported image format"));
        assert!(stdout.is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_run_malformed_response() {
        let image = temp_image(".jpg", b"data");
        let transport = Arc::new(FakeTransport::new(200, r#"{"id":"gen-123"}"#));

        let (result, stdout) = run_with(
            &Invocation::new(image.path()),
            &[env_layer(Some("sk-test"), None, None)],
            transport.clone(),
        )
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, GlimpseError::MalformedResponse(_)));
        assert_ne!(err.exit_code(), 0);
        assert!(stdout.is_empty());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_run_api_error() {
        let image = temp_image(".jpg", b"data");
        let transport = Arc::new(FakeTransport::new(402, "Insufficient credits"));

        let (result, stdout) = run_with(
            &Invocation::new(image.path()),
            &[env_layer(Some("sk-test"), None, None)],
            transport,
        )
        .await;

        match result {
            Err(GlimpseError::Api { status, body }) => {
                assert_eq!(status, 402);
                assert_eq!(body, "Insufficient credits");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
        assert!(stdout.is_empty());
    }

    #[tokio::test]
    async fn test_run_rejects_out_of_range_temperature() {
        let image = temp_image(".jpg", b"data");
        let transport = Arc::new(FakeTransport::new(200, APPLE));
        let overrides = env_layer(None, None, Some("1.5"));

        let (result, _) = run_with(
            &Invocation::new(image.path()).with_overrides(overrides),
            &[env_layer(Some("sk-test"), None, None)],
            transport.clone(),
        )
        .await;

        assert!(matches!(result, Err(GlimpseError::Config(_))));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_run_missing_file_reported_before_missing_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(FakeTransport::new(200, APPLE));

        let (result, _) = run_with(
            &Invocation::new(dir.path().join("nope.gif")),
            &[ConfigLayer::default()],
            transport.clone(),
        )
        .await;

        assert!(matches!(result, Err(GlimpseError::FileNotFound(_))));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_run_bad_input_skips_config_loading() {
        let image = temp_image(".bmp", b"BM");
        let mut out = Vec::new();

        let result = run(
            &Invocation::new(image.path()),
            || -> Result<Vec<ConfigLayer>> { panic!("config must not be loaded for bad input") },
            || -> Result<OpenRouterGateway> { panic!("gateway must not be built for bad input") },
            &mut out,
        )
        .await;

        assert!(matches!(result, Err(GlimpseError::UnsupportedFormat(_))));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_run_config_error_skips_gateway() {
        let image = temp_image(".png", b"data");
        let mut out = Vec::new();

        let result = run(
            &Invocation::new(image.path()),
            || Err(GlimpseError::Config("cannot parse config file".to_string())),
            || -> Result<OpenRouterGateway> { panic!("gateway must not be built") },
            &mut out,
        )
        .await;

        assert!(matches!(result, Err(GlimpseError::Config(_))));
    }
}
