//! SVG files are rasterized with `resvg` and drawn with half blocks

use super::{pixels, spawn_worker, PaneSpec, Renderer, Surface};
use crate::config::ViewerConfig;
use crate::domain::{FileTarget, PaneKey};
use crate::error::{Result, ViewerError};
use crate::shell::UiHandle;
use crate::tui::colors;
use image::{DynamicImage, RgbaImage};
use ratatui::text::{Line, Span};
use resvg::{tiny_skia, usvg};
use std::fs;
use tracing::debug;

pub const EXTENSIONS: &[&str] = &[".svg"];

const MAX_SVG_DIMENSION: f32 = 2048.0;

pub struct Rasterized {
    pub original_width: u32,
    pub original_height: u32,
    pub image: DynamicImage,
}

/// Scale that brings the document to `target_width` columns, bounded so that
/// neither side exceeds the rasterization limit
fn raster_scale(width: f32, height: f32, target_width: u32) -> f32 {
    let fit = target_width as f32 / width;
    let limit = (MAX_SVG_DIMENSION / width).min(MAX_SVG_DIMENSION / height);
    fit.min(limit)
}

/// Parses and rasterizes at roughly `target_width` pixels wide.
/// The returned buffer is straight (not premultiplied) RGBA.
pub fn rasterize(data: &[u8], target_width: u32) -> Result<Rasterized> {
    let tree = usvg::Tree::from_data(data, &usvg::Options::default())
        .map_err(|e| ViewerError::malformed("SVG", e))?;
    let size = tree.size();
    let scale = raster_scale(size.width(), size.height(), target_width);

    let width = ((size.width() * scale).ceil() as u32).max(1);
    let height = ((size.height() * scale).ceil() as u32).max(1);
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| ViewerError::malformed("SVG", "image has no drawable area"))?;

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    let straight: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    let buffer = RgbaImage::from_raw(width, height, straight)
        .ok_or_else(|| ViewerError::malformed("SVG", "pixel buffer size mismatch"))?;

    Ok(Rasterized {
        original_width: size.width().round() as u32,
        original_height: size.height().round() as u32,
        image: DynamicImage::ImageRgba8(buffer),
    })
}

pub fn svg_lines(data: &[u8], target_width: u32) -> Result<Vec<Line<'static>>> {
    let raster = rasterize(data, target_width)?;
    let (width, height) =
        pixels::truecolor_size(raster.image.width(), raster.image.height(), target_width);
    debug!(width, height, "svg rasterized");

    let mut lines = vec![
        Line::from(Span::styled(
            format!(
                "SVG: {}x{} → {}x{}",
                raster.original_width, raster.original_height, width, height
            ),
            colors::heading(),
        )),
        Line::from(""),
    ];
    lines.extend(pixels::truecolor_lines(&raster.image, target_width));
    Ok(lines)
}

pub struct SvgRenderer {
    target: FileTarget,
    ui: UiHandle,
    width: u32,
    pane: PaneKey,
}

impl SvgRenderer {
    pub fn new(target: FileTarget, ui: UiHandle, config: &ViewerConfig) -> Self {
        Self {
            target,
            ui,
            width: config.svg_width,
            pane: PaneKey::new("svg-view"),
        }
    }
}

pub fn construct(target: FileTarget, ui: UiHandle, config: &ViewerConfig) -> Box<dyn Renderer> {
    Box::new(SvgRenderer::new(target, ui, config))
}

impl Renderer for SvgRenderer {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn compose(&mut self) -> Surface {
        Surface::single(PaneSpec::new(self.pane.clone(), self.target.name.clone()))
    }

    fn load(&mut self) {
        let path = self.target.path.clone();
        let width = self.width;
        let pane = self.pane.clone();

        spawn_worker("svg", self.ui.clone(), self.pane.clone(), move |ui| {
            let data = fs::read(&path)?;
            ui.show_text(&pane, svg_lines(&data, width)?);
            Ok(())
        });
    }
}
