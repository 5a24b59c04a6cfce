//! Glimpse CLI - send an image and a prompt to OpenRouter, print the answer.

use clap::Parser;
use glimpse::config::{self, ConfigLayer, EndpointConfig};
use glimpse::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Analyze images using the OpenRouter API
#[derive(Parser, Debug)]
#[command(name = "glimpse")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the image file (JPG or PNG)
    image_path: PathBuf,

    /// Prompt to send with the image
    #[arg(short, long, default_value = DEFAULT_PROMPT)]
    prompt: String,

    /// Override the configured model (e.g. 'mistralai/mistral-medium-3', 'openai/o4-mini')
    #[arg(short, long)]
    model: Option<String>,

    /// Override the configured sampling temperature (0.0 to 1.0)
    #[arg(short, long, allow_hyphen_values = true)]
    temperature: Option<String>,

    /// Enable verbose logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("glimpse=debug")
        } else {
            EnvFilter::new("glimpse=warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

impl Args {
    fn into_invocation(self) -> Invocation {
        Invocation::new(self.image_path)
            .with_prompt(self.prompt)
            .with_overrides(ConfigLayer {
                api_key: None,
                model: self.model,
                temperature: self.temperature,
            })
    }
}

fn connect() -> Result<OpenRouterGateway> {
    let endpoint = EndpointConfig::from_env()?;
    let transport = ReqwestTransport::new(endpoint.timeout)?;
    Ok(OpenRouterGateway::new(Arc::new(transport), endpoint))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let invocation = args.into_invocation();
    match run(&invocation, config::ambient_layers, connect, &mut std::io::stdout()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.diagnostic());
            ExitCode::from(e.exit_code())
        }
    }
}
