//! Asset loading
//!
//! Descriptors name an asset and its source; the [`AssetLoader`] routes each
//! one to the [`FormatHandler`] registered for its suffix and tracks a single
//! load session that completes exactly once.

pub mod descriptor;
pub mod handlers;
pub mod image_loader;
pub mod loader;
pub mod payload;

pub use descriptor::{AssetDescriptor, AssetManifest};
pub use handlers::{Decoder, FileHandler, FormatHandler, LoadCompletion};
pub use image_loader::ImageData;
pub use loader::{
    AssetLoader, LoadSession, LoadedItems, LoaderConfig, LoaderEvent, LoaderEventKind,
    UnresolvedAsset, UnresolvedPolicy,
};
pub use payload::{AssetPayload, GltfSummary};

use crate::config::ConfigError;

/// Why a descriptor could not be routed to a handler
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnresolvedReason {
    /// The source path has no extension
    #[error("source '{0}' has no format suffix")]
    MissingSuffix(String),
    /// No handler claims the extension
    #[error("no handler registered for suffix '{0}'")]
    NoHandler(String),
}

/// Asset errors
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// Another handler already owns the suffix
    #[error("suffix '{suffix}' is already handled by handler #{existing}")]
    DuplicateSuffix {
        /// Suffix being registered
        suffix: String,
        /// Index of the handler that owns it
        existing: usize,
    },

    /// Suffix is empty or not lowercase ASCII
    #[error("invalid suffix '{0}': expected lowercase ASCII letters")]
    InvalidSuffix(String),

    /// Handler registered after the first submit
    #[error("handlers cannot be registered once loading has started")]
    RegistrationClosed,

    /// No handler can take the descriptor
    #[error("cannot load '{name}': {reason}")]
    Unresolvable {
        /// Descriptor name
        name: String,
        /// Why it could not be routed
        reason: UnresolvedReason,
    },

    /// Decoding failed
    #[error("Load failed: {0}")]
    LoadFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest could not be read
    #[error("Manifest error: {0}")]
    Manifest(#[from] ConfigError),
}
