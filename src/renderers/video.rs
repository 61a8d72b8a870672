//! Video previews: evenly spaced stills extracted with ffmpeg, played back as
//! a looping animation

use super::media;
use super::{error_lines, info_line, pixels, spawn_worker, title_line, PaneSpec, Renderer, Surface};
use crate::config::ViewerConfig;
use crate::domain::{FileTarget, Frame, FrameSequence, PaneKey};
use crate::error::{Result, ViewerError};
use crate::shell::UiHandle;
use crate::tui::colors;
use ratatui::text::{Line, Span};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info, warn};

pub const EXTENSIONS: &[&str] = &[
    ".mp4", ".mkv", ".avi", ".mov", ".webm", ".wmv", ".flv", ".m4v",
];

/// One preview frame per second of footage, within `[min, max]`
pub fn preview_frame_count(duration_secs: f64, min: usize, max: usize) -> usize {
    (duration_secs.max(0.0) as usize).clamp(min, max)
}

/// `count` timestamps splitting the clip into `count + 1` equal intervals,
/// so neither the very first nor the very last frame is sampled
pub fn frame_timestamps(duration_secs: f64, count: usize) -> Vec<f64> {
    let interval = duration_secs / (count + 1) as f64;
    (1..=count).map(|i| interval * i as f64).collect()
}

fn extract_frame(source: &Path, timestamp: f64, output: &Path) -> Result<()> {
    let timestamp = format!("{:.3}", timestamp);
    let args: [&OsStr; 10] = [
        OsStr::new("-y"),
        OsStr::new("-ss"),
        OsStr::new(&timestamp),
        OsStr::new("-i"),
        source.as_os_str(),
        OsStr::new("-vframes"),
        OsStr::new("1"),
        OsStr::new("-q:v"),
        OsStr::new("2"),
        output.as_os_str(),
    ];
    media::ffmpeg(args, "video").map(|_| ())
}

/// Extracts what it can; individual failures are skipped
fn extract_frames(source: &Path, dir: &Path, timestamps: &[f64]) -> Vec<PathBuf> {
    timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &t)| {
            let output = dir.join(format!("frame_{:03}.png", i));
            match extract_frame(source, t, &output) {
                Ok(()) if output.exists() => Some(output),
                Ok(()) => None,
                Err(e) => {
                    debug!(timestamp = t, error = %e, "frame extraction failed");
                    None
                }
            }
        })
        .collect()
}

struct VideoJob {
    target: FileTarget,
    frames_dir: PathBuf,
    width: u32,
    period: Duration,
    min_frames: usize,
    max_frames: usize,
}

impl VideoJob {
    fn run(self, ui: &UiHandle, pane: &PaneKey) -> Result<()> {
        media::require_ffmpeg()?;
        media::require_ffprobe()?;

        let report = media::probe(&self.target.path)?;
        let duration = report
            .duration()
            .filter(|&d| d > 0.0)
            .ok_or_else(|| ViewerError::malformed("video", "Could not read video duration"))?;

        let count = preview_frame_count(duration, self.min_frames, self.max_frames);
        ui.show_text(
            pane,
            vec![Line::from(Span::styled(
                format!("Extracting {} frames from video...", count),
                colors::dim(),
            ))],
        );

        let paths = extract_frames(
            &self.target.path,
            &self.frames_dir,
            &frame_timestamps(duration, count),
        );
        if paths.is_empty() {
            return Err(ViewerError::malformed(
                "video",
                "Could not extract frames from video",
            ));
        }

        let images = paths
            .iter()
            .map(|p| image::open(p).map_err(|e| ViewerError::malformed("video frame", e)))
            .collect::<Result<Vec<_>>>()?;

        let (width, height) = report
            .stream("video")
            .and_then(|s| Some((s.width?, s.height?)))
            .unwrap_or_else(|| (images[0].width(), images[0].height()));

        let header = vec![
            title_line("Video", &self.target.name),
            info_line(format!(
                "{}x{} | {:.1}s | {} preview frames",
                width, height, duration, count
            )),
            Line::from(""),
        ];

        let frames = images
            .iter()
            .map(|img| {
                let mut lines = header.clone();
                lines.extend(pixels::truecolor_lines(img, self.width));
                Frame {
                    lines,
                    duration: self.period,
                }
            })
            .collect();

        if let Some(sequence) = FrameSequence::new(frames) {
            info!(frames = sequence.len(), "video preview ready");
            ui.animate(pane, sequence);
        }
        Ok(())
    }
}

pub struct VideoRenderer {
    target: FileTarget,
    ui: UiHandle,
    config: ViewerConfig,
    pane: PaneKey,
    frames_dir: Option<TempDir>,
}

impl VideoRenderer {
    pub fn new(target: FileTarget, ui: UiHandle, config: &ViewerConfig) -> Self {
        Self {
            target,
            ui,
            config: config.clone(),
            pane: PaneKey::new("video-view"),
            frames_dir: None,
        }
    }

    /// Where extracted frames are written, while the renderer is alive
    pub fn frames_dir(&self) -> Option<&Path> {
        self.frames_dir.as_ref().map(|d| d.path())
    }
}

pub fn construct(target: FileTarget, ui: UiHandle, config: &ViewerConfig) -> Box<dyn Renderer> {
    Box::new(VideoRenderer::new(target, ui, config))
}

impl Renderer for VideoRenderer {
    fn name(&self) -> &'static str {
        "video"
    }

    fn compose(&mut self) -> Surface {
        Surface::single(PaneSpec::new(self.pane.clone(), self.target.name.clone()))
    }

    fn load(&mut self) {
        let dir = match tempfile::Builder::new().prefix("quickview_").tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                warn!(error = %e, "cannot create frame directory");
                self.ui.show_text(&self.pane, error_lines(&ViewerError::Io(e)));
                return;
            }
        };

        let job = VideoJob {
            target: self.target.clone(),
            frames_dir: dir.path().to_path_buf(),
            width: self.config.video_width,
            period: self.config.video_frame_period,
            min_frames: self.config.video_min_frames,
            max_frames: self.config.video_max_frames,
        };
        self.frames_dir = Some(dir);

        let pane = self.pane.clone();
        spawn_worker("video", self.ui.clone(), self.pane.clone(), move |ui| {
            job.run(ui, &pane)
        });
    }

    fn teardown(&mut self) {
        if let Some(dir) = self.frames_dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                warn!(path = %path.display(), error = %e, "failed to remove frame directory");
            }
        }
    }
}

impl Drop for VideoRenderer {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{all_text, collect_until};
    use super::*;
    use crate::shell::{UiQueue, UiUpdate};
    use std::process::Command;

    fn ffmpeg_available() -> bool {
        media::require_ffmpeg().is_ok() && media::require_ffprobe().is_ok()
    }

    mod sampling_tests {
        use super::*;

        #[test]
        fn test_frame_count_bounds() {
            assert_eq!(preview_frame_count(2.0, 8, 20), 8);
            assert_eq!(preview_frame_count(12.7, 8, 20), 12);
            assert_eq!(preview_frame_count(3600.0, 8, 20), 20);
            assert_eq!(preview_frame_count(-1.0, 8, 20), 8);
        }

        #[test]
        fn test_timestamps_are_evenly_spaced_inside_clip() {
            let stamps = frame_timestamps(9.0, 8);
            assert_eq!(stamps.len(), 8);
            assert!((stamps[0] - 1.0).abs() < 1e-9);
            assert!((stamps[7] - 8.0).abs() < 1e-9);
            assert!(stamps.iter().all(|&t| t > 0.0 && t < 9.0));
        }
    }

    mod lifecycle_tests {
        use super::*;
        use tempfile::TempDir;

        #[test]
        fn test_teardown_removes_frame_directory() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("clip.mp4");
            std::fs::write(&path, b"not really a video").unwrap();

            let mut queue = UiQueue::new();
            let mut renderer =
                VideoRenderer::new(FileTarget::new(&path).unwrap(), queue.handle(), &ViewerConfig::default());
            renderer.compose();
            renderer.load();

            let frames_dir = renderer.frames_dir().unwrap().to_path_buf();
            assert!(frames_dir.exists());

            // The worker fails on this input either way; wait for it
            let updates = collect_until(&mut queue, |u| {
                u.iter().any(|u| match u {
                    UiUpdate::Text { lines, .. } => all_text(lines).starts_with("Error:"),
                    _ => false,
                })
            });
            assert!(!updates.is_empty());

            renderer.teardown();
            assert!(!frames_dir.exists());
            assert!(renderer.frames_dir().is_none());

            // Second teardown is a no-op
            renderer.teardown();
        }

        #[test]
        fn test_drop_removes_frame_directory() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("clip.mkv");
            std::fs::write(&path, b"x").unwrap();

            let queue = UiQueue::new();
            let mut renderer =
                VideoRenderer::new(FileTarget::new(&path).unwrap(), queue.handle(), &ViewerConfig::default());
            renderer.load();
            let frames_dir = renderer.frames_dir().unwrap().to_path_buf();

            drop(renderer);
            assert!(!frames_dir.exists());
        }
    }

    mod extraction_tests {
        use super::*;
        use tempfile::TempDir;

        #[test]
        fn test_generated_clip_animates() {
            if !ffmpeg_available() {
                eprintln!("Skipping video test: ffmpeg not available");
                return;
            }

            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("clip.mp4");
            let status = Command::new("ffmpeg")
                .args(["-v", "error", "-f", "lavfi", "-i", "testsrc=duration=3:size=64x48:rate=10"])
                .arg(&path)
                .status()
                .unwrap();
            if !status.success() {
                eprintln!("Skipping video test: ffmpeg cannot encode the test clip");
                return;
            }

            let mut queue = UiQueue::new();
            let mut renderer =
                VideoRenderer::new(FileTarget::new(&path).unwrap(), queue.handle(), &ViewerConfig::default());
            renderer.compose();
            renderer.load();

            let updates = collect_until(&mut queue, |u| {
                u.iter().any(|u| matches!(u, UiUpdate::Animate { .. }))
            });

            match &updates[0] {
                UiUpdate::Text { lines, .. } => {
                    assert_eq!(all_text(lines), "Extracting 8 frames from video...")
                }
                other => panic!("Expected progress text, got {:?}", other),
            }
            match updates.last() {
                Some(UiUpdate::Animate { frames, .. }) => {
                    assert!(frames.len() > 1);
                    assert_eq!(frames.get(0).duration, Duration::from_millis(500));
                    let header = all_text(&frames.get(0).lines[..2]);
                    assert!(header.contains("Video: clip.mp4"));
                    assert!(header.contains("64x48"));
                }
                other => panic!("Expected animation, got {:?}", other),
            }

            renderer.teardown();
        }
    }
}
