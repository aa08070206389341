//! Caption layout: wrap each caption, pick the largest font size that fits its
//! box, align and vertically center the lines, then rasterize them.

mod align;
mod canvas;
mod engine;
mod fit;
mod font;
mod render;
mod wrap;

use serde::{Deserialize, Serialize};

pub use align::Alignment;
pub use canvas::Canvas;
pub use engine::{
    BoxConfig, CaptionFonts, CaptionOptions, LINE_SPACING, WATERMARK_COLOR, WATERMARK_MARGIN, WATERMARK_SIZE,
    WATERMARK_TEXT, Watermark, compose, draw_captions, draw_watermark,
};
pub use fit::{MAX_FONT_SIZE, MIN_FONT_SIZE, WidthMode, fits, solve};
pub use font::{FontResource, TextMetrics, line_step, resolve_font};
pub use render::{Rasterizer, TextStyle, render_lines};
pub use wrap::{WordWrap, wrap};

/// Rectangle in source-image pixels, written `[x0, y0, x1, y1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoxRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BoxRect {
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }
}

impl From<[i32; 4]> for BoxRect {
    fn from([x0, y0, x1, y1]: [i32; 4]) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

impl From<BoxRect> for [i32; 4] {
    fn from(rect: BoxRect) -> Self {
        [rect.x0, rect.y0, rect.x1, rect.y1]
    }
}
