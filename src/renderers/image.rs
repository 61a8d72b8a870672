//! Raster images, with frame-by-frame playback for animated GIF and WebP

use super::{format_size, info_line, pixels, spawn_worker, title_line, PaneSpec, Renderer, Surface};
use crate::config::{ImageMode, ViewerConfig};
use crate::domain::{FileTarget, Frame, FrameSequence, PaneKey};
use crate::error::{Result, ViewerError};
use crate::shell::UiHandle;
use image::codecs::gif::GifDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, DynamicImage};
use ratatui::text::Line;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".tiff", ".ico",
];

/// Decoded frames with their authored delays
type RawFrames = Vec<(DynamicImage, Duration)>;

fn decode_error(e: image::ImageError) -> ViewerError {
    match e {
        image::ImageError::Unsupported(reason) => ViewerError::MissingCapability {
            capability: "Image format".to_string(),
            hint: reason.to_string(),
        },
        image::ImageError::IoError(io) => ViewerError::Io(io),
        other => ViewerError::malformed("image", other),
    }
}

fn collect<'a, D: AnimationDecoder<'a>>(decoder: D) -> Result<RawFrames> {
    let frames = decoder.into_frames().collect_frames().map_err(decode_error)?;
    Ok(frames
        .into_iter()
        .map(|frame| {
            let (numer, denom) = frame.delay().numer_denom_ms();
            let millis = if denom == 0 { 0 } else { numer / denom };
            (
                DynamicImage::ImageRgba8(frame.into_buffer()),
                Duration::from_millis(millis as u64),
            )
        })
        .collect())
}

/// All frames of a GIF or animated WebP; `None` for single-frame sources
fn decode_animation(path: &Path, extension: &str) -> Result<Option<RawFrames>> {
    let reader = || -> Result<BufReader<File>> { Ok(BufReader::new(File::open(path)?)) };

    let frames = match extension {
        ".gif" => collect(GifDecoder::new(reader()?).map_err(decode_error)?)?,
        ".webp" => {
            let decoder = WebPDecoder::new(reader()?).map_err(decode_error)?;
            if !decoder.has_animation() {
                return Ok(None);
            }
            collect(decoder)?
        }
        _ => return Ok(None),
    };

    if frames.len() > 1 {
        Ok(Some(frames))
    } else {
        Ok(None)
    }
}

fn header(name: &str, width: u32, height: u32, size: u64, frames: Option<usize>) -> Vec<Line<'static>> {
    let mut detail = format!("Dimensions: {}×{} px  Size: {}", width, height, format_size(size));
    if let Some(count) = frames {
        detail.push_str(&format!("  Frames: {}", count));
    }
    vec![title_line("Image", name), info_line(detail), Line::from("")]
}

/// Renders every frame and clamps each delay to `min_delay`
pub fn build_frames(
    raw: RawFrames,
    header: &[Line<'static>],
    mode: ImageMode,
    width: u32,
    min_delay: Duration,
) -> Option<FrameSequence> {
    let frames = raw
        .into_iter()
        .map(|(img, delay)| {
            let mut lines = header.to_vec();
            lines.extend(pixels::render(&img, mode, width));
            Frame {
                lines,
                duration: delay.max(min_delay),
            }
        })
        .collect();
    FrameSequence::new(frames)
}

pub struct ImageRenderer {
    target: FileTarget,
    ui: UiHandle,
    config: ViewerConfig,
    pane: PaneKey,
}

impl ImageRenderer {
    pub fn new(target: FileTarget, ui: UiHandle, config: &ViewerConfig) -> Self {
        Self {
            target,
            ui,
            config: config.clone(),
            pane: PaneKey::new("image-content"),
        }
    }
}

pub fn construct(target: FileTarget, ui: UiHandle, config: &ViewerConfig) -> Box<dyn Renderer> {
    Box::new(ImageRenderer::new(target, ui, config))
}

impl Renderer for ImageRenderer {
    fn name(&self) -> &'static str {
        "image"
    }

    fn compose(&mut self) -> Surface {
        Surface::single(PaneSpec::new(self.pane.clone(), self.target.name.clone()))
    }

    fn load(&mut self) {
        let target = self.target.clone();
        let config = self.config.clone();
        let pane = self.pane.clone();

        spawn_worker("image", self.ui.clone(), self.pane.clone(), move |ui| {
            if let Some(raw) = decode_animation(&target.path, &target.extension)? {
                let (width, height) = (raw[0].0.width(), raw[0].0.height());
                debug!(frames = raw.len(), "animated image");
                let header = header(&target.name, width, height, target.size, Some(raw.len()));

                if let Some(frames) = build_frames(
                    raw,
                    &header,
                    config.image_mode,
                    config.animated_width,
                    config.min_frame_delay,
                ) {
                    ui.animate(&pane, frames);
                }
                return Ok(());
            }

            let img = image::open(&target.path).map_err(decode_error)?;
            let mut lines = header(&target.name, img.width(), img.height(), target.size, None);
            lines.extend(pixels::render(&img, config.image_mode, config.image_width()));
            ui.show_text(&pane, lines);
            Ok(())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{all_text, collect_until, line_text};
    use super::*;
    use crate::shell::{UiQueue, UiUpdate};
    use image::codecs::gif::GifEncoder;
    use image::{Delay, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    fn write_gif(path: &Path, delays_ms: &[u32]) {
        let file = File::create(path).unwrap();
        let mut encoder = GifEncoder::new(file);
        let frames = delays_ms.iter().enumerate().map(|(i, ms)| {
            let shade = (i * 80) as u8;
            image::Frame::from_parts(
                RgbaImage::from_pixel(8, 8, Rgba([shade, 0, 0, 255])),
                0,
                0,
                Delay::from_numer_denom_ms(*ms, 1),
            )
        });
        encoder.encode_frames(frames).unwrap();
    }

    fn run(path: &Path, config: &ViewerConfig) -> UiUpdate {
        let mut queue = UiQueue::new();
        let mut renderer = ImageRenderer::new(FileTarget::new(path).unwrap(), queue.handle(), config);
        renderer.compose();
        renderer.load();
        collect_until(&mut queue, |u| !u.is_empty())
            .into_iter()
            .next()
            .expect("renderer posted nothing")
    }

    mod static_tests {
        use super::*;

        #[test]
        fn test_png_renders_header_and_pixels() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("photo.png");
            RgbImage::from_pixel(40, 20, image::Rgb([10, 200, 30])).save(&path).unwrap();

            match run(&path, &ViewerConfig::default()) {
                UiUpdate::Text { lines, .. } => {
                    assert!(line_text(&lines[0]).contains("photo.png"));
                    assert!(line_text(&lines[1]).contains("40×20"));
                    // 20 pixel rows at two per line
                    assert_eq!(lines.len(), 3 + 10);
                    assert_eq!(lines[3].spans.len(), 40);
                }
                other => panic!("Expected text, got {:?}", other),
            }
        }

        #[test]
        fn test_ascii_mode() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("photo.png");
            RgbImage::from_pixel(40, 20, image::Rgb([255, 255, 255])).save(&path).unwrap();

            let config = ViewerConfig {
                image_mode: ImageMode::Ascii,
                ..ViewerConfig::default()
            };
            match run(&path, &config) {
                UiUpdate::Text { lines, .. } => {
                    assert_eq!(lines.len(), 3 + 10);
                    assert!(line_text(&lines[3]).chars().all(|c| c == '@'));
                }
                other => panic!("Expected text, got {:?}", other),
            }
        }

        #[test]
        fn test_corrupt_image_is_inline_error() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("broken.png");
            std::fs::write(&path, b"not a png").unwrap();

            match run(&path, &ViewerConfig::default()) {
                UiUpdate::Text { lines, .. } => assert!(all_text(&lines).starts_with("Error:")),
                other => panic!("Expected error text, got {:?}", other),
            }
        }

        #[test]
        fn test_single_frame_gif_is_static() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("still.gif");
            write_gif(&path, &[100]);

            assert!(matches!(
                run(&path, &ViewerConfig::default()),
                UiUpdate::Text { .. }
            ));
        }
    }

    mod animation_tests {
        use super::*;

        #[test]
        fn test_gif_frames_and_delay_floor() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("spin.gif");
            write_gif(&path, &[100, 20, 200]);

            match run(&path, &ViewerConfig::default()) {
                UiUpdate::Animate { frames, .. } => {
                    assert_eq!(frames.len(), 3);
                    assert_eq!(frames.get(0).duration, Duration::from_millis(100));
                    assert_eq!(frames.get(1).duration, Duration::from_millis(50));
                    assert_eq!(frames.get(2).duration, Duration::from_millis(200));
                    assert!(line_text(&frames.get(0).lines[1]).contains("Frames: 3"));
                }
                other => panic!("Expected animation, got {:?}", other),
            }
        }

        #[test]
        fn test_build_frames_empty_input() {
            assert!(build_frames(Vec::new(), &[], ImageMode::TrueColor, 60, Duration::ZERO).is_none());
        }
    }
}
