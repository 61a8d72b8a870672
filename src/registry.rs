//! Extension-based renderer selection.
//!
//! The registry is an ordered list of descriptors; the first descriptor whose
//! extension set contains the file's extension wins. Exactly one catch-all
//! descriptor must exist and it must be last, which is checked when the
//! registry is built.

use crate::config::ViewerConfig;
use crate::domain::FileTarget;
use crate::renderers::{
    archive, audio, document, image, pdf, spreadsheet, svg, tabular, text, video, Renderer,
};
use crate::shell::UiHandle;
use thiserror::Error;
use tracing::debug;

/// Builds a renderer for one file
pub type Constructor = fn(FileTarget, UiHandle, &ViewerConfig) -> Box<dyn Renderer>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionSet {
    /// Lowercase extensions including the leading dot
    Exact(&'static [&'static str]),
    CatchAll,
}

impl ExtensionSet {
    pub fn matches(&self, extension: &str) -> bool {
        match self {
            ExtensionSet::Exact(extensions) => {
                let extension = extension.to_lowercase();
                extensions.iter().any(|e| *e == extension)
            }
            ExtensionSet::CatchAll => true,
        }
    }
}

#[derive(Clone, Copy)]
pub struct RendererDescriptor {
    pub name: &'static str,
    pub extensions: ExtensionSet,
    pub construct: Constructor,
}

impl std::fmt::Debug for RendererDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererDescriptor")
            .field("name", &self.name)
            .field("extensions", &self.extensions)
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("registry has no fallback renderer")]
    MissingFallback,

    #[error("registry has {0} fallback renderers, expected exactly one")]
    MultipleFallbacks(usize),

    #[error("fallback renderer '{0}' must be the last entry")]
    FallbackNotLast(&'static str),
}

#[derive(Debug, Clone)]
pub struct Registry {
    descriptors: Vec<RendererDescriptor>,
}

impl Registry {
    pub fn new(descriptors: Vec<RendererDescriptor>) -> Result<Self, RegistryError> {
        let fallbacks: Vec<usize> = descriptors
            .iter()
            .enumerate()
            .filter(|(_, d)| d.extensions == ExtensionSet::CatchAll)
            .map(|(i, _)| i)
            .collect();

        match fallbacks.as_slice() {
            [] => Err(RegistryError::MissingFallback),
            [index] if *index + 1 != descriptors.len() => {
                Err(RegistryError::FallbackNotLast(descriptors[*index].name))
            }
            [_] => Ok(Registry { descriptors }),
            many => Err(RegistryError::MultipleFallbacks(many.len())),
        }
    }

    /// Every built-in renderer, plain text last. Goes through the same
    /// fallback checks as [`Registry::new`].
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(builtin_descriptors())
    }

    pub fn descriptors(&self) -> &[RendererDescriptor] {
        &self.descriptors
    }

    /// First descriptor matching `extension`; never fails thanks to the fallback
    pub fn select(&self, extension: &str) -> &RendererDescriptor {
        let last = self.descriptors.len() - 1;
        self.descriptors
            .iter()
            .find(|d| d.extensions.matches(extension))
            .unwrap_or(&self.descriptors[last])
    }

    pub fn dispatch(
        &self,
        target: FileTarget,
        ui: UiHandle,
        config: &ViewerConfig,
    ) -> Box<dyn Renderer> {
        let descriptor = self.select(&target.extension);
        debug!(extension = %target.extension, renderer = descriptor.name, "dispatching");
        (descriptor.construct)(target, ui, config)
    }
}

fn builtin_descriptors() -> Vec<RendererDescriptor> {
    vec![
        RendererDescriptor {
            name: "table",
            extensions: ExtensionSet::Exact(tabular::EXTENSIONS),
            construct: tabular::construct,
        },
        RendererDescriptor {
            name: "spreadsheet",
            extensions: ExtensionSet::Exact(spreadsheet::EXTENSIONS),
            construct: spreadsheet::construct,
        },
        RendererDescriptor {
            name: "pdf",
            extensions: ExtensionSet::Exact(pdf::EXTENSIONS),
            construct: pdf::construct,
        },
        RendererDescriptor {
            name: "archive",
            extensions: ExtensionSet::Exact(archive::EXTENSIONS),
            construct: archive::construct,
        },
        RendererDescriptor {
            name: "document",
            extensions: ExtensionSet::Exact(document::EXTENSIONS),
            construct: document::construct,
        },
        RendererDescriptor {
            name: "audio",
            extensions: ExtensionSet::Exact(audio::EXTENSIONS),
            construct: audio::construct,
        },
        RendererDescriptor {
            name: "image",
            extensions: ExtensionSet::Exact(image::EXTENSIONS),
            construct: image::construct,
        },
        RendererDescriptor {
            name: "svg",
            extensions: ExtensionSet::Exact(svg::EXTENSIONS),
            construct: svg::construct,
        },
        RendererDescriptor {
            name: "video",
            extensions: ExtensionSet::Exact(video::EXTENSIONS),
            construct: video::construct,
        },
        RendererDescriptor {
            name: "text",
            extensions: ExtensionSet::CatchAll,
            construct: text::construct,
        },
    ]
}
