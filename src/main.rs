use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use locator_docgen::{DocgenConfig, DocumentApi, DocumentApiOptions, DocumentSetRequest, EnhancedDocumentData};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Generate Word documents through the file handler service.
#[derive(Parser, Debug)]
#[command(name = "docgen", version, about)]
struct Cli {
    /// Directory the generated files are saved to
    #[arg(long, global = true, default_value = "output")]
    out: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one template into a .docx
    Document(DocumentArgs),

    /// Render several templates and bundle them into a .zip
    Set(SetArgs),
}

#[derive(Args, Debug)]
struct DocumentArgs {
    /// Template name known to the file handler
    #[arg(long)]
    template: String,

    /// JSON file with the template fields
    #[arg(long)]
    data: PathBuf,

    /// Output file name without extension
    #[arg(long)]
    filename: Option<String>,
}

#[derive(Args, Debug)]
struct SetArgs {
    /// JSON manifest: {"documents": [{"templateName": ..., "data": {...}}], "zipFilename": ...}
    #[arg(long)]
    manifest: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    // Load configuration (.env first, then DOCGEN_* variables)
    let config = DocgenConfig::from_env()?;
    tracing::info!("Using file handler at {}", config.generate_url());

    let ok = match cli.command {
        Command::Document(args) => {
            let data = read_json::<EnhancedDocumentData>(&args.data).await?;
            let mut options = report_to_console(DocumentApiOptions::new());
            options.filename = args.filename;

            let api = DocumentApi::with_download_dir(config, &cli.out, options)?;
            api.generate_document(&data, &args.template).await
        }
        Command::Set(args) => {
            let request = read_json::<DocumentSetRequest>(&args.manifest).await?;
            let api = DocumentApi::with_download_dir(config, &cli.out, report_to_console(DocumentApiOptions::new()))?;
            api.generate_document_set(&request).await
        }
    };

    ensure_generated(ok)
}

fn ensure_generated(ok: bool) -> Result<()> {
    if !ok {
        anyhow::bail!("generation failed");
    }
    Ok(())
}

fn report_to_console(options: DocumentApiOptions) -> DocumentApiOptions {
    options
        .on_success(|message| println!("{}", message))
        .on_error(|message| eprintln!("{}", message))
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_generation_is_an_error() {
        assert!(ensure_generated(true).is_ok());
        assert_eq!(ensure_generated(false).unwrap_err().to_string(), "generation failed");
    }

    #[tokio::test]
    async fn test_read_json_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("set.json");
        std::fs::write(
            &path,
            r#"{"documents": [{"templateName": "A", "data": {"ref_id": "42"}}], "zipFilename": "bundle"}"#,
        )
        .unwrap();

        let request = read_json::<DocumentSetRequest>(&path).await.unwrap();
        assert_eq!(request.documents[0].template_name, "A");
        assert_eq!(request.zip_filename.as_deref(), Some("bundle"));

        let missing = read_json::<DocumentSetRequest>(&tmp.path().join("nope.json")).await;
        assert!(missing.unwrap_err().to_string().starts_with("failed to read"));
    }
}
