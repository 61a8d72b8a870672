//! Audio metadata and a min/max waveform plot, decoded through ffmpeg

use super::media::{self, ProbeReport};
use super::{spawn_worker, PaneSpec, Renderer, Surface};
use crate::config::ViewerConfig;
use crate::domain::{FileTarget, PaneKey};
use crate::error::{Result, ViewerError};
use crate::shell::UiHandle;
use crate::tui::colors;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, info};

pub const EXTENSIONS: &[&str] = &[
    ".mp3", ".wav", ".flac", ".ogg", ".m4a", ".aac", ".wma", ".opus",
];

/// Ramp glyphs indexed by intensity, 0 is blank
const BLOCK_CHARS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

const BASELINE: &str = "─";

/// Decoded signal plus the facts shown in the header
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// Mono samples
    pub samples: Vec<i32>,
    pub channels: u32,
    pub sample_rate: u32,
    pub bit_depth: u32,
}

impl AudioClip {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Averages interleaved channels into one
pub fn downmix(interleaved: &[i16], channels: usize) -> Vec<i32> {
    if channels <= 1 {
        return interleaved.iter().map(|&s| s as i32).collect();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().map(|&s| s as i32).sum::<i32>() / channels as i32)
        .collect()
}

/// Min and max of each of `width` consecutive chunks. Chunks past the end
/// of the signal are `(0, 0)`.
pub fn waveform_columns(samples: &[i32], width: usize) -> Vec<(i32, i32)> {
    let chunk = (samples.len() / width.max(1)).max(1);

    (0..width)
        .map(|i| {
            let start = (i * chunk).min(samples.len());
            let end = (start + chunk).min(samples.len());
            let slice = &samples[start..end];
            match (slice.iter().min(), slice.iter().max()) {
                (Some(&min), Some(&max)) => (min, max),
                _ => (0, 0),
            }
        })
        .collect()
}

fn ramp_intensity(excess: i64, half: i64) -> usize {
    let scaled = ((excess + 1) as f64 / half as f64 * 8.0) as i64 + 4;
    scaled.clamp(0, 8) as usize
}

/// Symmetric bar chart about a center baseline, `height` rows tall.
///
/// Each column is normalized against the largest absolute value across all
/// columns; an all-silent signal is treated as amplitude one.
pub fn render_waveform(columns: &[(i32, i32)], height: usize) -> Vec<Line<'static>> {
    let half = (height.max(2) / 2) as i64;
    let max_amplitude = columns
        .iter()
        .map(|&(lo, hi)| (lo as i64).abs().max((hi as i64).abs()))
        .max()
        .filter(|&m| m > 0)
        .unwrap_or(1);

    let normalized: Vec<(i64, i64)> = columns
        .iter()
        .map(|&(lo, hi)| {
            let scale = |v: i32| (v as f64 / max_amplitude as f64 * half as f64) as i64;
            (scale(lo), scale(hi))
        })
        .collect();

    let upper = Style::default().fg(colors::ACCENT_HIGHLIGHT);
    let lower = Style::default().fg(colors::ACCENT_DIRECTORY);
    let straddle = Style::default().fg(colors::ACCENT_SECONDARY);

    (0..height.max(2) as i64)
        .map(|row| {
            let offset = row - half;
            let spans: Vec<Span<'static>> = normalized
                .iter()
                .map(|&(lo, hi)| {
                    if offset == 0 {
                        let style = if lo <= 0 && 0 <= hi { straddle } else { colors::dim() };
                        Span::styled(BASELINE, style)
                    } else if offset < 0 {
                        let threshold = -offset;
                        if hi >= threshold {
                            let glyph = BLOCK_CHARS[ramp_intensity(hi - threshold, half)];
                            Span::styled(glyph.to_string(), upper)
                        } else {
                            Span::raw(" ")
                        }
                    } else {
                        let threshold = -offset;
                        if lo <= threshold {
                            let glyph = BLOCK_CHARS[ramp_intensity(threshold - lo, half)];
                            Span::styled(glyph.to_string(), lower)
                        } else {
                            Span::raw(" ")
                        }
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// `0:00` at the left edge, `END` at the right
pub fn time_marker(width: usize) -> Line<'static> {
    Line::from(Span::styled(
        format!("0:00{}END", " ".repeat(width.saturating_sub(10))),
        colors::dim(),
    ))
}

pub fn format_duration(secs: f64) -> String {
    let minutes = (secs / 60.0).floor() as u64;
    let rest = secs - minutes as f64 * 60.0;
    format!("{}:{:05.2}", minutes, rest)
}

pub fn channel_label(channels: u32) -> String {
    match channels {
        1 => "Mono".to_string(),
        2 => "Stereo".to_string(),
        n => format!("{}ch", n),
    }
}

/// 44100 -> "44,100"
pub fn group_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<13}", label), colors::dim()),
        Span::raw(value),
    ])
}

pub fn audio_lines(name: &str, clip: &AudioClip, width: usize, height: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(format!("♫ Audio File: {}", name), colors::heading())),
        Line::from(""),
        field("Duration:", format_duration(clip.duration_secs())),
        field(
            "Channels:",
            format!("{} ({})", clip.channels, channel_label(clip.channels)),
        ),
        field("Sample Rate:", format!("{} Hz", group_thousands(clip.sample_rate))),
        field("Bit Depth:", format!("{}-bit", clip.bit_depth)),
        Line::from(""),
        Line::from(Span::styled("Waveform:", colors::bold())),
        Line::from(""),
    ];

    if clip.samples.is_empty() {
        lines.push(Line::from(Span::styled("<No audio data>", colors::dim())));
    } else {
        lines.extend(render_waveform(&waveform_columns(&clip.samples, width), height));
        lines.push(time_marker(width));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("─".repeat(width), colors::dim())));
    lines
}

fn decode(path: &Path, report: &ProbeReport) -> Result<AudioClip> {
    let stream = report
        .stream("audio")
        .ok_or_else(|| ViewerError::malformed("audio", "no audio stream found"))?;
    let channels = stream.channels.unwrap_or(1).max(1);
    let sample_rate = stream
        .sample_rate()
        .ok_or_else(|| ViewerError::malformed("audio", "unknown sample rate"))?;

    let args: [&OsStr; 9] = [
        OsStr::new("-v"),
        OsStr::new("error"),
        OsStr::new("-i"),
        path.as_os_str(),
        OsStr::new("-f"),
        OsStr::new("s16le"),
        OsStr::new("-acodec"),
        OsStr::new("pcm_s16le"),
        OsStr::new("-"),
    ];
    let output = media::ffmpeg(args, "audio")?;

    let interleaved: Vec<i16> = output
        .stdout
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();
    debug!(samples = interleaved.len(), channels, "audio decoded");

    Ok(AudioClip {
        samples: downmix(&interleaved, channels as usize),
        channels,
        sample_rate,
        bit_depth: stream.bit_depth().unwrap_or(16),
    })
}

pub struct AudioRenderer {
    target: FileTarget,
    ui: UiHandle,
    width: usize,
    height: usize,
    pane: PaneKey,
}

impl AudioRenderer {
    pub fn new(target: FileTarget, ui: UiHandle, config: &ViewerConfig) -> Self {
        Self {
            target,
            ui,
            width: config.waveform_width,
            height: config.waveform_height,
            pane: PaneKey::new("audio-content"),
        }
    }
}

pub fn construct(target: FileTarget, ui: UiHandle, config: &ViewerConfig) -> Box<dyn Renderer> {
    Box::new(AudioRenderer::new(target, ui, config))
}

impl Renderer for AudioRenderer {
    fn name(&self) -> &'static str {
        "audio"
    }

    fn compose(&mut self) -> Surface {
        Surface::single(PaneSpec::new(self.pane.clone(), self.target.name.clone()))
    }

    fn load(&mut self) {
        let target = self.target.clone();
        let (width, height) = (self.width, self.height);
        let pane = self.pane.clone();

        spawn_worker("audio", self.ui.clone(), self.pane.clone(), move |ui| {
            media::require_ffprobe()?;
            media::require_ffmpeg()?;

            let report = media::probe(&target.path)?;
            let clip = decode(&target.path, &report)?;
            info!(
                duration = clip.duration_secs(),
                channels = clip.channels,
                "audio ready"
            );

            ui.show_text(&pane, audio_lines(&target.name, &clip, width, height));
            Ok(())
        });
    }
}
