//! Error types shared by the renderers and the application shell

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViewerError>;

#[derive(Debug, Error)]
pub enum ViewerError {
    /// A decode library or codec is not available on this system
    #[error("{capability} is not available")]
    MissingCapability {
        capability: String,
        hint: String,
    },

    /// An external command-line tool could not be found
    #[error("{tool} not found")]
    MissingTool { tool: String, hint: String },

    /// The file content failed to parse
    #[error("Error loading {what}: {reason}")]
    Malformed { what: String, reason: String },

    /// The archive container itself is unreadable
    #[error("Invalid or corrupted archive: {0}")]
    CorruptArchive(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The command line named something we cannot open
    #[error("{0}")]
    Invocation(String),
}

impl ViewerError {
    pub fn malformed(what: impl Into<String>, reason: impl ToString) -> Self {
        ViewerError::Malformed {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    /// Install guidance for the missing-dependency variants
    pub fn hint(&self) -> Option<&str> {
        match self {
            ViewerError::MissingCapability { hint, .. } | ViewerError::MissingTool { hint, .. } => {
                Some(hint)
            }
            _ => None,
        }
    }

    pub fn is_missing_dependency(&self) -> bool {
        matches!(
            self,
            ViewerError::MissingCapability { .. } | ViewerError::MissingTool { .. }
        )
    }
}

/// Install hint shared by every renderer that shells out to ffmpeg/ffprobe
pub const FFMPEG_HINT: &str = "Install ffmpeg:\n  macOS:   brew install ffmpeg\n  Ubuntu:  sudo apt install ffmpeg\n  Windows: choco install ffmpeg";
