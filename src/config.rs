//! Renderer tunables. Everything here comes from the command line; there is
//! no configuration file.

use std::time::Duration;

/// How raster pixels are turned into terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageMode {
    /// Grayscale density ramp, one pixel per cell
    Ascii,
    /// Half-block glyphs with 24-bit colors, two pixels per cell
    #[default]
    TrueColor,
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Explicit delimiter for tabular files; sniffed when absent
    pub delimiter: Option<u8>,
    pub image_mode: ImageMode,
    pub highlight: bool,

    pub ascii_width: u32,
    pub color_width: u32,
    /// Narrower than `color_width` to bound the cost of rendering every frame
    pub animated_width: u32,
    pub svg_width: u32,
    pub video_width: u32,

    pub waveform_width: usize,
    pub waveform_height: usize,

    pub min_frame_delay: Duration,
    pub video_frame_period: Duration,
    pub video_min_frames: usize,
    pub video_max_frames: usize,

    pub sniff_sample_bytes: usize,
    pub highlight_line_limit: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            delimiter: None,
            image_mode: ImageMode::TrueColor,
            highlight: true,
            ascii_width: 120,
            color_width: 100,
            animated_width: 60,
            svg_width: 100,
            video_width: 80,
            waveform_width: 100,
            waveform_height: 20,
            min_frame_delay: Duration::from_millis(50),
            video_frame_period: Duration::from_millis(500),
            video_min_frames: 8,
            video_max_frames: 20,
            sniff_sample_bytes: 8192,
            highlight_line_limit: 5000,
        }
    }
}

impl ViewerConfig {
    /// Target width for static images in the configured mode
    pub fn image_width(&self) -> u32 {
        match self.image_mode {
            ImageMode::Ascii => self.ascii_width,
            ImageMode::TrueColor => self.color_width,
        }
    }
}
