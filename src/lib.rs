use anyhow::{Context, Result, anyhow};
use std::path::Path;
use tokio::io::AsyncWriteExt;

pub mod caption;
pub mod color;
pub mod error;
pub mod logging;
pub mod memes;
pub mod server;
pub mod service;
pub mod settings;

pub use error::CaptionError;
pub use memes::{MemeCatalog, MemeDefinition};
pub use service::MemeService;

/// Write target meaning "standard output" for `--output`.
pub const STDOUT_OUTPUT: &str = "-";

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub meme: Option<String>,
    pub texts: Vec<String>,
    pub output: Option<String>,
    pub list_memes: bool,
    pub serve: bool,
    pub addr: Option<String>,
    pub settings_path: Option<String>,
    pub exact_width: bool,
    pub debug_boxes: bool,
}

/// Runs one CLI invocation and returns the text to print, which is empty when
/// the image itself went to stdout.
pub async fn run(config: Config) -> Result<String> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let mut settings = settings::load_settings(settings_path)?;
    if config.exact_width {
        settings.exact_width = true;
    }
    if config.debug_boxes {
        settings.debug_boxes = true;
    }

    if config.list_memes {
        let catalog = MemeCatalog::load(&settings.memes_path)?;
        return Ok(format_meme_list(&catalog));
    }

    let service = MemeService::from_settings(&settings)?;

    if config.serve {
        let addr = config.addr.unwrap_or_else(|| settings.server_addr.clone());
        server::run_server(service, addr).await?;
        return Ok(String::new());
    }

    let meme = config
        .meme
        .ok_or_else(|| anyhow!("--meme is required unless --list-memes or --serve is given"))?;
    let jpeg = service
        .generate(&meme, &config.texts)
        .with_context(|| format!("failed to generate meme {meme:?}"))?;

    let output = config.output.unwrap_or_else(|| format!("{meme}.jpg"));
    if output == STDOUT_OUTPUT {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(&jpeg).await?;
        stdout.flush().await?;
        return Ok(String::new());
    }
    std::fs::write(&output, &jpeg).with_context(|| format!("failed to write output: {output}"))?;
    Ok(format!("wrote {} ({} bytes)", output, jpeg.len()))
}

/// One `id<TAB>name<TAB>box-count` line per meme, sorted by id.
pub fn format_meme_list(catalog: &MemeCatalog) -> String {
    catalog
        .list()
        .iter()
        .map(|meme| format!("{}\t{}\t{}", meme.id, meme.name, meme.boxes.len()))
        .collect::<Vec<_>>()
        .join("\n")
}
