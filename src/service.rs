use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::caption::{CaptionFonts, CaptionOptions, Canvas, Watermark, compose, resolve_font};
use crate::color::parse_hex_color;
use crate::error::CaptionError;
use crate::memes::MemeCatalog;
use crate::settings::{CAPTION_FONT_FALLBACK, CREDITS_FONT_FALLBACK, Settings};

pub const JPEG_QUALITY: u8 = 99;

/// Everything needed to turn a meme id and captions into a JPEG.
#[derive(Debug, Clone)]
pub struct MemeService {
    pub catalog: MemeCatalog,
    pub fonts: CaptionFonts,
    pub assets_dir: PathBuf,
    pub options: CaptionOptions,
    pub watermark: Watermark,
}

impl MemeService {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let catalog = MemeCatalog::load(&settings.memes_path)?;
        if catalog.is_empty() {
            warn!(path = %settings.memes_path.display(), "meme catalog is empty");
        }
        let caption = resolve_font(
            settings.caption_font_path.as_deref(),
            settings.caption_font_family.as_deref(),
            CAPTION_FONT_FALLBACK,
        )
        .with_context(|| "failed to load caption font")?;
        let credits = resolve_font(
            settings.credits_font_path.as_deref(),
            settings.credits_font_family.as_deref(),
            CREDITS_FONT_FALLBACK,
        )
        .with_context(|| "failed to load watermark font")?;
        let watermark = Watermark {
            text: settings.watermark_text.clone(),
            color: parse_hex_color(&settings.watermark_color)
                .with_context(|| "invalid watermark color")?,
        };
        info!(
            memes = catalog.len(),
            caption_font = caption.family().unwrap_or("<unnamed>"),
            credits_font = credits.family().unwrap_or("<unnamed>"),
            "meme service ready"
        );
        Ok(Self {
            catalog,
            fonts: CaptionFonts { caption, credits },
            assets_dir: settings.assets_dir.clone(),
            options: CaptionOptions {
                width_mode: settings.width_mode(),
                debug_boxes: settings.debug_boxes,
            },
            watermark,
        })
    }

    /// Renders `texts` onto the meme's template and returns JPEG bytes.
    pub fn generate(&self, meme_id: &str, texts: &[String]) -> Result<Vec<u8>, CaptionError> {
        let meme = self.catalog.find(meme_id)?;
        let path = self.assets_dir.join(&meme.filename);
        let bytes = std::fs::read(&path).map_err(|source| CaptionError::Asset {
            path: path.clone(),
            source,
        })?;
        let mut canvas = Canvas::decode(&bytes)?;
        let boxes = meme.boxes();
        compose(
            &mut canvas,
            &self.fonts,
            &boxes,
            texts,
            meme.font_color()?,
            self.options,
            &self.watermark,
        )?;
        let jpeg = canvas.encode_jpeg(JPEG_QUALITY)?;
        info!(
            meme = meme_id,
            captions = texts.len(),
            bytes = jpeg.len(),
            "generated meme"
        );
        Ok(jpeg)
    }
}
