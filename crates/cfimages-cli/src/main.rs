//! cfimages CLI: drive a Cloudflare Images field upload from the terminal.
//!
//! Reads `CFIMAGES_*` variables (and `.env`). The backend must expose the
//! upload-url endpoint; set CFIMAGES_CSRF_TOKEN when it enforces CSRF.

use anyhow::Context;
use cfimages_cli::{init_tracing, read_selected_file, TerminalSurface};
use cfimages_client::ApiClient;
use cfimages_core::{preview_path, validate, ClientConfig, ErrorMetadata, UploadConfiguration};
use cfimages_widget::{UploadOrchestrator, Widget};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "cfimages", about = "Cloudflare Images field upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file into a field and print the committed value
    Upload {
        /// Path to the image to upload
        file: std::path::PathBuf,
        /// Form field name
        #[arg(long, default_value = "image")]
        field: String,
        /// Value the field already holds (kept if the upload fails)
        #[arg(long)]
        value: Option<String>,
        #[command(flatten)]
        overrides: ConfigOverrides,
    },
    /// Check a file against the upload constraints without uploading
    Validate {
        /// Path to the image to check
        file: std::path::PathBuf,
        #[command(flatten)]
        overrides: ConfigOverrides,
    },
    /// Print the preview address for an asset identifier
    Preview {
        /// Asset identifier
        id: String,
    },
    /// Print the widget context a host would hand to its client module
    Context {
        /// Form field name
        name: String,
        /// Current field value
        #[arg(long)]
        value: Option<String>,
        /// Explicit element id for the hidden input
        #[arg(long)]
        id: Option<String>,
        #[command(flatten)]
        overrides: ConfigOverrides,
    },
}

/// Command-line overrides applied on top of the environment configuration.
#[derive(clap::Args)]
struct ConfigOverrides {
    /// Maximum file size in bytes
    #[arg(long)]
    max_file_size: Option<u64>,
    /// Comma-separated allowed formats (empty string keeps the defaults)
    #[arg(long)]
    allowed_formats: Option<String>,
    /// Request signed delivery URLs
    #[arg(long)]
    require_signed_urls: bool,
}

impl ConfigOverrides {
    fn apply(&self, mut config: UploadConfiguration) -> UploadConfiguration {
        if let Some(max) = self.max_file_size {
            config = config.with_max_file_size(Some(max));
        }
        if let Some(formats) = &self.allowed_formats {
            config = config.with_allowed_formats(formats.split(','));
        }
        if self.require_signed_urls {
            config = config.with_require_signed_urls(true);
        }
        config
    }
}

#[derive(Serialize)]
struct UploadReport<'a> {
    field: &'a str,
    value: String,
    preview_src: Option<&'a str>,
    asset_id: Option<String>,
    error_code: Option<&'static str>,
    /// Whether a failure was raised before any network call
    #[serde(skip_serializing_if = "Option::is_none")]
    local_failure: Option<bool>,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = ClientConfig::from_env().context(
        "Failed to load configuration. Check CFIMAGES_BACKEND_URL and related variables",
    )?;
    tracing::debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Upload {
            file,
            field,
            value,
            overrides,
        } => {
            let upload_config = overrides.apply(config.upload.clone());
            let selected = read_selected_file(&file)?;
            let client = ApiClient::from_config(&config)?;
            let orchestrator = UploadOrchestrator::new(client);

            let widget = Widget::new(upload_config);
            let mut binding = widget.bind(
                &field,
                None,
                TerminalSurface::new(value.unwrap_or_default()),
            );
            orchestrator.attach(&mut binding);

            let outcome = orchestrator
                .upload(&selected, &mut binding, widget.config())
                .await;

            let report = UploadReport {
                field: &field,
                value: binding.value().map(|id| id.into_inner()).unwrap_or_default(),
                preview_src: binding.surface().preview_src(),
                asset_id: outcome.as_ref().ok().map(|id| id.to_string()),
                error_code: outcome.as_ref().err().map(|err| err.error_code()),
                local_failure: outcome.as_ref().err().map(|err| err.is_local()),
            };
            print_json(&report)?;

            if let Err(err) = outcome {
                return Err(anyhow::Error::new(err).context("Upload did not complete"));
            }
        }
        Commands::Validate { file, overrides } => {
            let upload_config = overrides.apply(config.upload.clone());
            let selected = read_selected_file(&file)?;
            let result = validate(&selected, &upload_config);
            print_json(&serde_json::json!({
                "file": selected.file_name,
                "media_type": selected.media_type,
                "size": selected.size(),
                "valid": result.is_ok(),
                "error_code": result.as_ref().err().map(|err| err.error_code()),
                "message": result.as_ref().err().map(|err| err.client_message()),
            }))?;
        }
        Commands::Preview { id } => {
            print_json(&serde_json::json!({ "preview_src": preview_path(&id) }))?;
        }
        Commands::Context {
            name,
            value,
            id,
            overrides,
        } => {
            let widget = Widget::new(overrides.apply(config.upload.clone()));
            let context = widget.context(&name, value.as_deref(), id.as_deref());
            print_json(&context)?;
        }
    }

    Ok(())
}
