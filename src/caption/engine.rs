use image::Rgba;
use tracing::debug;

use super::BoxRect;
use super::align::Alignment;
use super::canvas::Canvas;
use super::fit::{WidthMode, solve};
use super::font::{FontResource, TextMetrics};
use super::render::{Rasterizer, TextStyle, draw_block, render_lines};
use super::wrap::wrap;
use crate::error::CaptionError;

/// Line advance multiplier used for captions and the watermark.
pub const LINE_SPACING: f32 = 1.0;

pub const WATERMARK_TEXT: &str = "generated by meme-caption";
pub const WATERMARK_SIZE: u32 = 32;
pub const WATERMARK_MARGIN: i32 = 12;
pub const WATERMARK_COLOR: Rgba<u8> = Rgba([0xfe, 0x43, 0x65, 0xff]);

const DEBUG_BOX_COLOR: Rgba<u8> = Rgba([0xff, 0x00, 0x00, 0xff]);

/// One caption region of a meme, resolved from the catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxConfig {
    pub id: String,
    pub rect: BoxRect,
    pub margin_left: i32,
    pub alignment: Alignment,
    pub line_chars: usize,
}

/// The two process-wide fonts: one for captions, one for the watermark.
#[derive(Clone, Debug)]
pub struct CaptionFonts {
    pub caption: FontResource,
    pub credits: FontResource,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CaptionOptions {
    pub width_mode: WidthMode,
    /// Outline every box before drawing its caption.
    pub debug_boxes: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Watermark {
    pub text: String,
    pub color: Rgba<u8>,
}

impl Default for Watermark {
    fn default() -> Self {
        Self {
            text: WATERMARK_TEXT.to_string(),
            color: WATERMARK_COLOR,
        }
    }
}

/// Wraps, fits and draws `texts[i]` into `boxes[i]`.
///
/// An empty `texts` slice skips captions entirely; otherwise the counts must
/// match and nothing is drawn when they don't.
pub fn draw_captions<F, R>(
    surface: &mut R,
    font: &F,
    boxes: &[BoxConfig],
    texts: &[String],
    color: Rgba<u8>,
    width_mode: WidthMode,
) -> Result<(), CaptionError>
where
    F: TextMetrics + ?Sized,
    R: Rasterizer<F> + ?Sized,
{
    if texts.is_empty() {
        return Ok(());
    }
    if texts.len() != boxes.len() {
        return Err(CaptionError::CaptionCount {
            expected: boxes.len(),
            actual: texts.len(),
        });
    }
    for (config, text) in boxes.iter().zip(texts) {
        let lines: Vec<String> = wrap(text, config.line_chars).collect();
        let size = solve(font, LINE_SPACING, &lines, config.rect, width_mode);
        debug!(
            box_id = %config.id,
            size,
            lines = lines.len(),
            "fitted caption"
        );
        let style = TextStyle {
            size,
            spacing: LINE_SPACING,
            color,
            alignment: config.alignment,
        };
        render_lines(surface, font, style, &lines, config.rect, config.margin_left)?;
    }
    Ok(())
}

/// Draws the watermark right-aligned near the bottom-right corner.
pub fn draw_watermark<F, R>(
    surface: &mut R,
    font: &F,
    canvas_width: i32,
    canvas_height: i32,
    watermark: &Watermark,
) -> Result<(), CaptionError>
where
    F: TextMetrics + ?Sized,
    R: Rasterizer<F> + ?Sized,
{
    let width = font.text_width(WATERMARK_SIZE, &watermark.text);
    let left = canvas_width - width - WATERMARK_MARGIN;
    let line_height = font.line_height(WATERMARK_SIZE);
    let top = canvas_height - (line_height as f32 * 1.5) as i32;
    let style = TextStyle {
        size: WATERMARK_SIZE,
        spacing: LINE_SPACING,
        color: watermark.color,
        alignment: Alignment::Left,
    };
    draw_block(
        surface,
        font,
        style,
        std::slice::from_ref(&watermark.text),
        left,
        top,
        0,
    )
}

/// Full caption pass over a canvas: optional box outlines, captions, then
/// the watermark, which is always drawn.
pub fn compose(
    canvas: &mut Canvas,
    fonts: &CaptionFonts,
    boxes: &[BoxConfig],
    texts: &[String],
    color: Rgba<u8>,
    options: CaptionOptions,
    watermark: &Watermark,
) -> Result<(), CaptionError> {
    if options.debug_boxes {
        for config in boxes {
            canvas.stroke_rect(config.rect, DEBUG_BOX_COLOR);
        }
    }
    draw_captions(canvas, &fonts.caption, boxes, texts, color, options.width_mode)?;
    let (width, height) = (canvas.width(), canvas.height());
    draw_watermark(canvas, &fonts.credits, width, height, watermark)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caption::render::tests::{HalfEm, Recorder};

    const INK: Rgba<u8> = Rgba([0x11, 0x22, 0x33, 0xff]);

    fn drake_boxes() -> Vec<BoxConfig> {
        [[600, 0, 1199, 599], [600, 600, 1199, 1199]]
            .into_iter()
            .enumerate()
            .map(|(index, rect)| BoxConfig {
                id: format!("drake#{index}"),
                rect: rect.into(),
                margin_left: 55,
                alignment: Alignment::Left,
                line_chars: 13,
            })
            .collect()
    }

    fn texts(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn draws_each_caption_in_its_box() {
        let boxes = drake_boxes();
        let mut recorder = Recorder::default();
        draw_captions(
            &mut recorder,
            &HalfEm,
            &boxes,
            &texts(&["Hello world this is a meme", "no"]),
            INK,
            WidthMode::SpaceAdvance,
        )
        .expect("captions");

        let drawn: Vec<&str> = recorder.calls.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(drawn, vec!["Hello world", "this is a", "meme", "no"]);
        assert!(recorder.calls.iter().all(|c| c.color == INK));

        // 11 chars * (size / 2) <= 599 -> 109; 3 lines * 109 fits 599
        assert!(recorder.calls[..3].iter().all(|c| c.size == 109));
        assert!(recorder.calls[..3].iter().all(|c| c.x == 655));
        // "no": width 2 * 255/2 = 254 fits, height 255 fits
        assert_eq!(recorder.calls[3].size, 255);
        assert!(recorder.calls[3].baseline > 600);
    }

    #[test]
    fn rejects_caption_count_mismatch_before_drawing() {
        let boxes = drake_boxes();
        let mut recorder = Recorder::default();
        let err = draw_captions(
            &mut recorder,
            &HalfEm,
            &boxes,
            &texts(&["only one"]),
            INK,
            WidthMode::SpaceAdvance,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CaptionError::CaptionCount {
                expected: 2,
                actual: 1
            }
        ));
        assert!(recorder.calls.is_empty());

        let err = draw_captions(
            &mut recorder,
            &HalfEm,
            &boxes,
            &texts(&["a", "b", "c"]),
            INK,
            WidthMode::SpaceAdvance,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected 2 caption(s) for this meme, got 3"
        );
    }

    #[test]
    fn no_texts_skips_captions() {
        let mut recorder = Recorder::default();
        draw_captions(
            &mut recorder,
            &HalfEm,
            &drake_boxes(),
            &[],
            INK,
            WidthMode::SpaceAdvance,
        )
        .expect("captions");
        assert!(recorder.calls.is_empty());
    }

    #[test]
    fn blank_caption_draws_nothing_in_its_box() {
        let mut recorder = Recorder::default();
        draw_captions(
            &mut recorder,
            &HalfEm,
            &drake_boxes(),
            &texts(&["   ", "bottom"]),
            INK,
            WidthMode::SpaceAdvance,
        )
        .expect("captions");
        let drawn: Vec<&str> = recorder.calls.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(drawn, vec!["bottom"]);
    }

    #[test]
    fn watermark_sits_in_bottom_right_corner() {
        let mut recorder = Recorder::default();
        let watermark = Watermark::default();
        draw_watermark(&mut recorder, &HalfEm, 1200, 1200, &watermark).expect("watermark");

        assert_eq!(recorder.calls.len(), 1);
        let call = &recorder.calls[0];
        // 25 chars * 16px = 400; top = 1200 - 48
        assert_eq!(call.text, WATERMARK_TEXT);
        assert_eq!(call.size, WATERMARK_SIZE);
        assert_eq!(call.color, WATERMARK_COLOR);
        assert_eq!((call.x, call.baseline), (788, 1184));
    }

    #[test]
    fn rasterizer_error_aborts_remaining_boxes() {
        let mut recorder = Recorder {
            fail_on: Some("top".to_string()),
            ..Recorder::default()
        };
        let err = draw_captions(
            &mut recorder,
            &HalfEm,
            &drake_boxes(),
            &texts(&["top", "bottom"]),
            INK,
            WidthMode::SpaceAdvance,
        )
        .unwrap_err();
        assert!(matches!(err, CaptionError::Raster(_)));
        assert!(recorder.calls.is_empty());
    }
}
