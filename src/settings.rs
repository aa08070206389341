use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::caption::{WATERMARK_TEXT, WidthMode};

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

pub const CAPTION_FONT_FALLBACK: &[&str] = &["DejaVu Sans Mono", "Liberation Mono", "monospace"];
pub const CREDITS_FONT_FALLBACK: &[&str] = &["DejaVu Sans", "Liberation Sans", "sans-serif"];

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_addr: String,
    pub assets_dir: PathBuf,
    pub memes_path: PathBuf,
    pub caption_font_path: Option<PathBuf>,
    pub caption_font_family: Option<String>,
    pub credits_font_path: Option<PathBuf>,
    pub credits_font_family: Option<String>,
    pub exact_width: bool,
    pub debug_boxes: bool,
    pub watermark_text: String,
    pub watermark_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8080".to_string(),
            assets_dir: PathBuf::from("web"),
            memes_path: PathBuf::from("web/memes.json"),
            caption_font_path: None,
            caption_font_family: None,
            credits_font_path: None,
            credits_font_family: None,
            exact_width: false,
            debug_boxes: false,
            watermark_text: WATERMARK_TEXT.to_string(),
            watermark_color: "#fe4365".to_string(),
        }
    }
}

impl Settings {
    pub fn width_mode(&self) -> WidthMode {
        if self.exact_width {
            WidthMode::Exact
        } else {
            WidthMode::SpaceAdvance
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    server: Option<ServerSettings>,
    assets: Option<AssetSettings>,
    fonts: Option<FontSettings>,
    render: Option<RenderSettings>,
    watermark: Option<WatermarkSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSettings {
    addr: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AssetSettings {
    dir: Option<String>,
    memes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FontSettings {
    caption_path: Option<String>,
    caption_family: Option<String>,
    credits_path: Option<String>,
    credits_family: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RenderSettings {
    exact_width: Option<bool>,
    debug_boxes: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct WatermarkSettings {
    text: Option<String>,
    color: Option<String>,
}

/// Embedded defaults, then `meme-caption.toml` and `meme-caption.local.toml`
/// from the working directory, then `extra_path` (which must exist).
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    settings.merge(parse_settings(DEFAULT_SETTINGS_TOML, Path::new("<embedded>"))?);

    let mut ordered_paths = vec![
        PathBuf::from("meme-caption.toml"),
        PathBuf::from("meme-caption.local.toml"),
    ];
    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            settings.merge(parse_settings(&content, &path)?);
        }
    }

    Ok(settings)
}

fn parse_settings(content: &str, path: &Path) -> Result<SettingsFile> {
    toml::from_str(content).with_context(|| format!("failed to parse settings: {}", path.display()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(server) = incoming.server {
            if let Some(addr) = non_empty(server.addr) {
                self.server_addr = addr;
            }
        }
        if let Some(assets) = incoming.assets {
            if let Some(dir) = non_empty(assets.dir) {
                self.assets_dir = PathBuf::from(dir);
            }
            if let Some(memes) = non_empty(assets.memes) {
                self.memes_path = PathBuf::from(memes);
            }
        }
        if let Some(fonts) = incoming.fonts {
            if let Some(path) = non_empty(fonts.caption_path) {
                self.caption_font_path = Some(PathBuf::from(path));
            }
            if let Some(family) = non_empty(fonts.caption_family) {
                self.caption_font_family = Some(family);
            }
            if let Some(path) = non_empty(fonts.credits_path) {
                self.credits_font_path = Some(PathBuf::from(path));
            }
            if let Some(family) = non_empty(fonts.credits_family) {
                self.credits_font_family = Some(family);
            }
        }
        if let Some(render) = incoming.render {
            if let Some(exact_width) = render.exact_width {
                self.exact_width = exact_width;
            }
            if let Some(debug_boxes) = render.debug_boxes {
                self.debug_boxes = debug_boxes;
            }
        }
        if let Some(watermark) = incoming.watermark {
            if let Some(text) = non_empty(watermark.text) {
                self.watermark_text = text;
            }
            if let Some(color) = non_empty(watermark.color) {
                self.watermark_color = color;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_match_struct_defaults() {
        let mut settings = Settings::default();
        settings.merge(parse_settings(DEFAULT_SETTINGS_TOML, Path::new("<embedded>")).unwrap());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn later_files_override_earlier_values() {
        let mut settings = Settings::default();
        settings.merge(
            toml::from_str(
                r##"
                [assets]
                dir = "/srv/memes"

                [fonts]
                caption_family = "Fira Mono"

                [render]
                exact_width = true

                [watermark]
                color = "#000"
                "##,
            )
            .unwrap(),
        );
        assert_eq!(settings.assets_dir, PathBuf::from("/srv/memes"));
        assert_eq!(settings.memes_path, PathBuf::from("web/memes.json"));
        assert_eq!(settings.caption_font_family.as_deref(), Some("Fira Mono"));
        assert_eq!(settings.width_mode(), WidthMode::Exact);
        assert!(!settings.debug_boxes);
        assert_eq!(settings.watermark_color, "#000");
        assert_eq!(settings.watermark_text, WATERMARK_TEXT);
    }

    #[test]
    fn blank_values_do_not_clear_settings() {
        let mut settings = Settings::default();
        settings.merge(toml::from_str("[server]\naddr = \"  \"\n").unwrap());
        assert_eq!(settings.server_addr, "127.0.0.1:8080");
    }

    #[test]
    fn explicit_settings_file_must_exist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.toml");
        let err = load_settings(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("settings file not found"));
    }

    #[test]
    fn explicit_settings_file_is_merged_last() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[render]\ndebug_boxes = true\n").expect("write settings");
        let settings = load_settings(Some(&path)).expect("settings");
        assert!(settings.debug_boxes);
    }
}
