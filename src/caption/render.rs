use image::Rgba;

use super::BoxRect;
use super::align::Alignment;
use super::font::{TextMetrics, line_step};
use crate::error::CaptionError;

/// Something that can draw one line of text with its baseline at
/// `(x, baseline)`.
pub trait Rasterizer<F: ?Sized> {
    fn draw_line(
        &mut self,
        font: &F,
        size: u32,
        color: Rgba<u8>,
        x: i32,
        baseline: i32,
        text: &str,
    ) -> Result<(), CaptionError>;
}

/// Style shared by every line of one text block.
#[derive(Clone, Copy, Debug)]
pub struct TextStyle {
    pub size: u32,
    pub spacing: f32,
    pub color: Rgba<u8>,
    pub alignment: Alignment,
}

/// Draws `lines` vertically centered in `bounds`, each line aligned inside
/// the box width and shifted right by `margin_left`.
pub fn render_lines<F, R>(
    surface: &mut R,
    font: &F,
    style: TextStyle,
    lines: &[String],
    bounds: BoxRect,
    margin_left: i32,
) -> Result<(), CaptionError>
where
    F: TextMetrics + ?Sized,
    R: Rasterizer<F> + ?Sized,
{
    let block_height = font.block_height(style.size, style.spacing, lines.len());
    let top = bounds.y0 + (bounds.height() - block_height) / 2;
    draw_block(
        surface,
        font,
        style,
        lines,
        bounds.x0 + margin_left,
        top,
        bounds.width(),
    )
}

/// Draws `lines` with the first line's top at `top`. Alignment offsets are
/// computed against `align_width`.
pub(crate) fn draw_block<F, R>(
    surface: &mut R,
    font: &F,
    style: TextStyle,
    lines: &[String],
    left: i32,
    top: i32,
    align_width: i32,
) -> Result<(), CaptionError>
where
    F: TextMetrics + ?Sized,
    R: Rasterizer<F> + ?Sized,
{
    let step = line_step(style.size, style.spacing);
    let mut baseline = top + font.line_height(style.size);
    for line in lines {
        let width = font.text_width(style.size, line);
        let x = left + style.alignment.offset(width, align_width);
        surface.draw_line(font, style.size, style.color, x, baseline, line)?;
        baseline += step;
    }
    Ok(())
}
