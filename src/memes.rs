use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use image::Rgba;
use serde::Deserialize;

use crate::caption::{Alignment, BoxConfig, BoxRect};
use crate::color::parse_hex_color;
use crate::error::CaptionError;

/// A template image and the caption boxes drawn on it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MemeDefinition {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub filename: String,
    pub font_color: String,
    pub line_chars: usize,
    #[serde(default)]
    pub margin_left: i32,
    #[serde(default)]
    pub text_align: Alignment,
    pub boxes: Vec<BoxEntry>,
}

/// A box is either a bare `[x0, y0, x1, y1]` or an object overriding the
/// meme-level wrap, margin and alignment.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BoxEntry {
    Rect(BoxRect),
    Detailed(DetailedBox),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DetailedBox {
    pub rect: BoxRect,
    pub line_chars: Option<usize>,
    pub margin_left: Option<i32>,
    pub text_align: Option<Alignment>,
}

impl MemeDefinition {
    pub fn font_color(&self) -> Result<Rgba<u8>, CaptionError> {
        parse_hex_color(&self.font_color)
    }

    /// Box configurations in caption order.
    pub fn boxes(&self) -> Vec<BoxConfig> {
        self.boxes
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let id = format!("{}#{}", self.id, index);
                match entry {
                    BoxEntry::Rect(rect) => BoxConfig {
                        id,
                        rect: *rect,
                        margin_left: self.margin_left,
                        alignment: self.text_align,
                        line_chars: self.line_chars,
                    },
                    BoxEntry::Detailed(detail) => BoxConfig {
                        id,
                        rect: detail.rect,
                        margin_left: detail.margin_left.unwrap_or(self.margin_left),
                        alignment: detail.text_align.unwrap_or(self.text_align),
                        line_chars: detail.line_chars.unwrap_or(self.line_chars),
                    },
                }
            })
            .collect()
    }

    fn validate(&self) -> Result<(), CaptionError> {
        self.font_color()?;
        for (index, config) in self.boxes().iter().enumerate() {
            if config.rect.width() < 0 || config.rect.height() < 0 {
                return Err(CaptionError::InvalidBox {
                    meme: self.id.clone(),
                    index,
                });
            }
        }
        Ok(())
    }
}

/// All known memes keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MemeCatalog {
    memes: HashMap<String, MemeDefinition>,
}

impl MemeCatalog {
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, MemeDefinition> =
            serde_json::from_str(json).with_context(|| "failed to parse meme catalog")?;
        let mut memes = HashMap::with_capacity(raw.len());
        for (key, mut meme) in raw {
            if meme.id.trim().is_empty() {
                meme.id = key.clone();
            }
            meme.validate()
                .with_context(|| format!("invalid meme definition {key:?}"))?;
            if memes.contains_key(&meme.id) {
                return Err(anyhow!("duplicate meme id {:?} (key {key:?})", meme.id));
            }
            memes.insert(meme.id.clone(), meme);
        }
        Ok(Self { memes })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read meme catalog: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("failed to load meme catalog: {}", path.display()))
    }

    pub fn find(&self, id: &str) -> Result<&MemeDefinition, CaptionError> {
        self.memes
            .get(id)
            .ok_or_else(|| CaptionError::MemeNotFound(id.to_string()))
    }

    /// Memes sorted by id.
    pub fn list(&self) -> Vec<&MemeDefinition> {
        let mut memes: Vec<_> = self.memes.values().collect();
        memes.sort_by(|a, b| a.id.cmp(&b.id));
        memes
    }

    pub fn len(&self) -> usize {
        self.memes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memes.is_empty()
    }
}
