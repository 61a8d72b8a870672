//! `ffprobe` and `ffmpeg` invocations shared by the audio and video renderers

use super::require_tool;
use crate::error::{Result, ViewerError, FFMPEG_HINT};
use serde::Deserialize;
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Command, Output};
use tracing::debug;

/// The subset of `ffprobe -of json` output the renderers read
#[derive(Debug, Default, Deserialize)]
pub struct ProbeReport {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
    #[serde(default)]
    pub format: Option<ProbeFormat>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProbeStream {
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub channels: Option<u32>,
    pub sample_rate: Option<String>,
    pub sample_fmt: Option<String>,
    pub bits_per_sample: Option<u32>,
    pub bits_per_raw_sample: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProbeFormat {
    pub duration: Option<String>,
}

impl ProbeReport {
    pub fn parse(json: &[u8]) -> Result<Self> {
        serde_json::from_slice(json).map_err(|e| ViewerError::malformed("media metadata", e))
    }

    pub fn stream(&self, codec_type: &str) -> Option<&ProbeStream> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(codec_type))
    }

    /// Container duration, falling back to the first stream that has one
    pub fn duration(&self) -> Option<f64> {
        self.format
            .as_ref()
            .and_then(|f| f.duration.as_deref())
            .or_else(|| self.streams.iter().find_map(|s| s.duration.as_deref()))
            .and_then(|d| d.trim().parse::<f64>().ok())
            .filter(|d| d.is_finite())
    }
}

impl ProbeStream {
    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate.as_deref()?.parse().ok().filter(|&r| r > 0)
    }

    /// Bit depth as stored, then as implied by the decoder's sample format
    pub fn bit_depth(&self) -> Option<u32> {
        let raw = self
            .bits_per_raw_sample
            .as_deref()
            .and_then(|b| b.parse::<u32>().ok());
        raw.into_iter()
            .chain(self.bits_per_sample)
            .find(|&b| b > 0)
            .or_else(|| match self.sample_fmt.as_deref()? {
                "u8" | "u8p" => Some(8),
                "s16" | "s16p" => Some(16),
                "s32" | "s32p" | "flt" | "fltp" => Some(32),
                "s64" | "s64p" | "dbl" | "dblp" => Some(64),
                _ => None,
            })
    }
}

pub fn require_ffmpeg() -> Result<()> {
    require_tool("ffmpeg", FFMPEG_HINT)
}

pub fn require_ffprobe() -> Result<()> {
    require_tool("ffprobe", FFMPEG_HINT)
}

fn spawn_failure(tool: &str, e: std::io::Error) -> ViewerError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ViewerError::MissingTool {
            tool: tool.to_string(),
            hint: FFMPEG_HINT.to_string(),
        }
    } else {
        ViewerError::Io(e)
    }
}

pub fn probe(path: &Path) -> Result<ProbeReport> {
    let output = Command::new("ffprobe")
        .args(["-v", "error", "-show_format", "-show_streams", "-of", "json"])
        .arg(path)
        .output()
        .map_err(|e| spawn_failure("ffprobe", e))?;

    if !output.status.success() {
        return Err(classify_failure("media", &output));
    }
    ProbeReport::parse(&output.stdout)
}

/// Runs `ffmpeg` with the given arguments and returns its output on success
pub fn ffmpeg<I, S>(args: I, what: &str) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
    debug!(?args, "running ffmpeg");

    let output = Command::new("ffmpeg")
        .args(&args)
        .output()
        .map_err(|e| spawn_failure("ffmpeg", e))?;

    if output.status.success() {
        Ok(output)
    } else {
        Err(classify_failure(what, &output))
    }
}

/// A missing codec is reported as a missing capability, anything else as
/// malformed input carrying ffmpeg's last diagnostic line
pub fn classify_failure(what: &str, output: &Output) -> ViewerError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    classify_stderr(what, &stderr)
}

pub fn classify_stderr(what: &str, stderr: &str) -> ViewerError {
    let lower = stderr.to_lowercase();
    if (lower.contains("decoder") && lower.contains("not found"))
        || lower.contains("unknown decoder")
        || lower.contains("no decoder")
    {
        return ViewerError::MissingCapability {
            capability: "A decoder for this codec".to_string(),
            hint: format!("Your ffmpeg build cannot decode this file.\n{}", FFMPEG_HINT),
        };
    }

    let reason = stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("ffmpeg exited with an error")
        .to_string();
    ViewerError::malformed(what, reason)
}
