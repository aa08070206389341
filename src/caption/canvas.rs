use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage, Rgba};
use tiny_skia::{
    ColorU8, FillRule, IntSize, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform,
};
use ttf_parser::OutlineBuilder;

use super::BoxRect;
use super::font::FontResource;
use super::render::Rasterizer;
use crate::error::CaptionError;

/// Pixel buffer for one render, seeded from the decoded background image.
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    pub fn from_image(image: &DynamicImage) -> Result<Self, CaptionError> {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let size = IntSize::from_wh(width, height)
            .ok_or_else(|| CaptionError::Raster(format!("invalid canvas size {width}x{height}")))?;
        let mut data = Vec::with_capacity(rgba.as_raw().len());
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            let premultiplied = ColorU8::from_rgba(r, g, b, a).premultiply();
            data.extend_from_slice(&[
                premultiplied.red(),
                premultiplied.green(),
                premultiplied.blue(),
                premultiplied.alpha(),
            ]);
        }
        let pixmap = Pixmap::from_vec(data, size)
            .ok_or_else(|| CaptionError::Raster("failed to build canvas".to_string()))?;
        Ok(Self { pixmap })
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CaptionError> {
        let image = image::load_from_memory(bytes).map_err(CaptionError::Decode)?;
        Self::from_image(&image)
    }

    pub fn width(&self) -> i32 {
        self.pixmap.width() as i32
    }

    pub fn height(&self) -> i32 {
        self.pixmap.height() as i32
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x >= self.pixmap.width() || y >= self.pixmap.height() {
            return None;
        }
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgba([color.red(), color.green(), color.blue(), color.alpha()]))
    }

    /// Outlines `bounds` with a 1px line.
    pub fn stroke_rect(&mut self, bounds: BoxRect, color: Rgba<u8>) {
        let Some(rect) = Rect::from_ltrb(
            bounds.x0 as f32 + 0.5,
            bounds.y0 as f32 + 0.5,
            bounds.x1 as f32 + 0.5,
            bounds.y1 as f32 + 0.5,
        ) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let stroke = Stroke {
            width: 1.0,
            ..Stroke::default()
        };
        let mut paint = solid_paint(color);
        paint.anti_alias = false;
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        let mut image = RgbImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let color = src.demultiply();
            *dst = Rgb([color.red(), color.green(), color.blue()]);
        }
        image
    }

    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, CaptionError> {
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality)
            .encode_image(&self.to_rgb_image())
            .map_err(CaptionError::Encode)?;
        Ok(bytes)
    }
}

impl Rasterizer<FontResource> for Canvas {
    fn draw_line(
        &mut self,
        font: &FontResource,
        size: u32,
        color: Rgba<u8>,
        x: i32,
        baseline: i32,
        text: &str,
    ) -> Result<(), CaptionError> {
        let face = font
            .face()
            .ok_or_else(|| CaptionError::Raster("font face could not be parsed".to_string()))?;
        let scale = font.scale(size);
        let paint = solid_paint(color);
        let mut pen_x = x as f32;
        for ch in text.chars() {
            let glyph = FontResource::glyph_for(&face, ch);
            let mut outline = GlyphOutline {
                builder: PathBuilder::new(),
                scale,
                origin_x: pen_x,
                baseline: baseline as f32,
            };
            // glyphs without contours (spaces) only advance the pen
            if face.outline_glyph(glyph, &mut outline).is_some() {
                if let Some(path) = outline.builder.finish() {
                    self.pixmap
                        .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }
            pen_x += f32::from(font.advance_units(&face, glyph)) * scale;
            if !pen_x.is_finite() {
                return Err(CaptionError::Raster(format!(
                    "glyph position overflowed while drawing {text:?}"
                )));
            }
        }
        Ok(())
    }
}

fn solid_paint(color: Rgba<u8>) -> Paint<'static> {
    let [r, g, b, a] = color.0;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

/// Converts font-unit outlines (y up) into canvas pixels (y down).
struct GlyphOutline {
    builder: PathBuilder,
    scale: f32,
    origin_x: f32,
    baseline: f32,
}

impl GlyphOutline {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.baseline - y * self.scale)
    }
}

impl OutlineBuilder for GlyphOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_background(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
    }

    #[test]
    fn keeps_background_pixels() {
        let canvas = Canvas::from_image(&solid_background(8, 4, [10, 200, 30])).expect("canvas");
        assert_eq!((canvas.width(), canvas.height()), (8, 4));
        assert_eq!(canvas.pixel(7, 3), Some(Rgba([10, 200, 30, 255])));
        assert_eq!(canvas.pixel(8, 0), None);
        assert_eq!(canvas.pixel(0, 4), None);
    }

    #[test]
    fn stroke_rect_marks_box_edges() {
        let mut canvas = Canvas::from_image(&solid_background(20, 20, [255, 255, 255])).expect("canvas");
        let bounds = BoxRect {
            x0: 2,
            y0: 2,
            x1: 12,
            y1: 12,
        };
        canvas.stroke_rect(bounds, Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(2, 7), Some(Rgba([255, 0, 0, 255])));
        assert_eq!(canvas.pixel(7, 7), Some(Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn encodes_decodable_jpeg_of_same_size() {
        let canvas = Canvas::from_image(&solid_background(32, 16, [0, 0, 0])).expect("canvas");
        let bytes = canvas.encode_jpeg(99).expect("jpeg");
        assert_eq!(&bytes[..2], &[0xff, 0xd8]);
        let decoded = Canvas::decode(&bytes).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (32, 16));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            Canvas::decode(b"not an image"),
            Err(CaptionError::Decode(_))
        ));
    }
}
