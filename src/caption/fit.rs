use super::BoxRect;
use super::font::TextMetrics;

pub const MIN_FONT_SIZE: u32 = 1;
pub const MAX_FONT_SIZE: u32 = 255;

/// How the solver estimates the pixel width of a wrapped line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WidthMode {
    /// `chars(line) * space_advance(size)`: treats the font as monospace.
    #[default]
    SpaceAdvance,
    /// Summed per-glyph advances.
    Exact,
}

/// Largest size in `MIN_FONT_SIZE..=MAX_FONT_SIZE` whose wrapped block fits
/// `bounds`, assuming that fitting is monotone in size.
///
/// The final candidate is returned without being re-checked, so when nothing
/// fits the result is `MIN_FONT_SIZE`, and non-monotone metrics can yield a
/// size that overflows.
pub fn solve<M>(metrics: &M, spacing: f32, lines: &[String], bounds: BoxRect, mode: WidthMode) -> u32
where
    M: TextMetrics + ?Sized,
{
    let mut low = MIN_FONT_SIZE;
    let mut high = MAX_FONT_SIZE;
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if fits(metrics, spacing, lines, bounds, mode, mid) {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    low
}

pub fn fits<M>(
    metrics: &M,
    spacing: f32,
    lines: &[String],
    bounds: BoxRect,
    mode: WidthMode,
    size: u32,
) -> bool
where
    M: TextMetrics + ?Sized,
{
    let height = metrics.block_height(size, spacing, lines.len());
    height <= bounds.height() && block_width(metrics, lines, mode, size) <= bounds.width()
}

fn block_width<M>(metrics: &M, lines: &[String], mode: WidthMode, size: u32) -> i32
where
    M: TextMetrics + ?Sized,
{
    match mode {
        WidthMode::SpaceAdvance => {
            let char_width = metrics.space_advance(size);
            lines
                .iter()
                .map(|line| line.chars().count() as i32 * char_width)
                .max()
                .unwrap_or(0)
        }
        WidthMode::Exact => lines
            .iter()
            .map(|line| metrics.text_width(size, line))
            .max()
            .unwrap_or(0),
    }
}
