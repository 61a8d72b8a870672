//! Pixel buffers to terminal glyphs: grayscale density ramp or 24-bit half blocks

use crate::config::ImageMode;
use image::imageops::FilterType;
use image::{DynamicImage, Pixel, RgbImage, RgbaImage};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

/// Sparse to dense
pub const ASCII_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are roughly twice as tall as they are wide
pub const ASCII_VERTICAL_FACTOR: f64 = 0.5;

/// Color transparent pixels are blended onto
pub const BACKDROP: [u8; 3] = [30, 30, 30];

/// Fits `original` to at most `target_width` columns, preserving aspect ratio.
///
/// The height is scaled by `vertical_factor` and never drops below one row.
/// Images narrower than the target keep their width.
pub fn fit_to_width(
    original_width: u32,
    original_height: u32,
    target_width: u32,
    vertical_factor: f64,
) -> (u32, u32) {
    if original_width == 0 || original_height == 0 || target_width == 0 {
        return (0, 0);
    }

    let width = target_width.min(original_width);
    let aspect = original_height as f64 / original_width as f64;
    let height = ((width as f64) * aspect * vertical_factor) as u32;

    (width, height.max(1))
}

/// Picks the ramp glyph for an 8-bit intensity
pub fn ramp_glyph(intensity: u8) -> char {
    let index = (intensity as usize * ASCII_RAMP.len() / 256).min(ASCII_RAMP.len() - 1);
    ASCII_RAMP[index]
}

/// Grayscale ASCII art, one pixel per cell
pub fn ascii_lines(img: &DynamicImage, target_width: u32) -> Vec<Line<'static>> {
    let (width, height) = fit_to_width(
        img.width(),
        img.height(),
        target_width,
        ASCII_VERTICAL_FACTOR,
    );
    if width == 0 {
        return Vec::new();
    }

    let gray = img
        .resize_exact(width, height, FilterType::Triangle)
        .to_luma8();

    gray.rows()
        .map(|row| {
            let text: String = row.map(|p| ramp_glyph(p.0[0])).collect();
            Line::from(text)
        })
        .collect()
}

/// Blends every pixel onto `backdrop` by its alpha
pub fn composite_onto(img: &RgbaImage, backdrop: [u8; 3]) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let [r, g, b, a] = img.get_pixel(x, y).0;
        if a == 255 {
            return image::Rgb([r, g, b]);
        }
        let a = a as u16;
        let blend = |c: u8, bg: u8| ((c as u16 * a + bg as u16 * (255 - a)) / 255) as u8;
        image::Rgb([
            blend(r, backdrop[0]),
            blend(g, backdrop[1]),
            blend(b, backdrop[2]),
        ])
    })
}

/// Renders an RGB buffer using the upper half block (▀): foreground is the
/// upper pixel, background the lower one. A trailing unpaired row uses its
/// own pixel for both halves.
pub fn halfblock_lines(img: &RgbImage) -> Vec<Line<'static>> {
    let (width, height) = img.dimensions();
    let mut lines = Vec::with_capacity(height.div_ceil(2) as usize);

    for upper_y in (0..height).step_by(2) {
        let lower_y = upper_y + 1;
        let mut spans = Vec::with_capacity(width as usize);

        for x in 0..width {
            let upper = img.get_pixel(x, upper_y).to_rgb();
            let lower = if lower_y < height {
                img.get_pixel(x, lower_y).to_rgb()
            } else {
                upper
            };

            let style = Style::default()
                .fg(Color::Rgb(upper[0], upper[1], upper[2]))
                .bg(Color::Rgb(lower[0], lower[1], lower[2]));
            spans.push(Span::styled("▀", style));
        }

        lines.push(Line::from(spans));
    }

    lines
}

/// Target size for half-block rendering: full aspect ratio, even height
pub fn truecolor_size(original_width: u32, original_height: u32, target_width: u32) -> (u32, u32) {
    let (width, height) = fit_to_width(original_width, original_height, target_width, 1.0);
    if width == 0 {
        return (0, 0);
    }
    (width, height + height % 2)
}

/// Downsamples and renders in 24-bit color, compositing any alpha first
pub fn truecolor_lines(img: &DynamicImage, target_width: u32) -> Vec<Line<'static>> {
    let (width, height) = truecolor_size(img.width(), img.height(), target_width);
    if width == 0 {
        return Vec::new();
    }

    // Triangle is fast enough for 4K sources and looks fine at this scale
    let resized = img.resize_exact(width, height, FilterType::Triangle);
    let rgb = if resized.color().has_alpha() {
        composite_onto(&resized.to_rgba8(), BACKDROP)
    } else {
        resized.to_rgb8()
    };

    halfblock_lines(&rgb)
}

pub fn render(img: &DynamicImage, mode: ImageMode, target_width: u32) -> Vec<Line<'static>> {
    match mode {
        ImageMode::Ascii => ascii_lines(img, target_width),
        ImageMode::TrueColor => truecolor_lines(img, target_width),
    }
}
