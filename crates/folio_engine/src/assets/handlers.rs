//! Format handlers
//!
//! A handler receives a descriptor plus a [`LoadCompletion`] and must eventually
//! deliver exactly one payload through it. Handlers may finish on any thread;
//! the loader applies results on its own thread in [`AssetLoader::pump`].
//!
//! [`AssetLoader::pump`]: crate::assets::AssetLoader::pump

use crate::assets::{AssetDescriptor, AssetError, AssetPayload, GltfSummary, ImageData};
use crossbeam_channel::Sender;
use std::path::{Path, PathBuf};

/// Message posted back to the loader when a load finishes
#[derive(Debug)]
pub(crate) struct Completion {
    pub(crate) ticket: u64,
    pub(crate) descriptor: AssetDescriptor,
    pub(crate) payload: AssetPayload,
}

/// One-shot callback handed to a [`FormatHandler`]
///
/// Consumed by [`LoadCompletion::complete`] or [`LoadCompletion::fail`].
/// Dropping it without delivering anything records the load as failed.
#[derive(Debug)]
pub struct LoadCompletion {
    ticket: u64,
    descriptor: AssetDescriptor,
    sender: Option<Sender<Completion>>,
}

impl LoadCompletion {
    pub(crate) fn new(
        ticket: u64,
        descriptor: AssetDescriptor,
        sender: Sender<Completion>,
    ) -> Self {
        Self {
            ticket,
            descriptor,
            sender: Some(sender),
        }
    }

    /// Descriptor this completion belongs to
    pub fn descriptor(&self) -> &AssetDescriptor {
        &self.descriptor
    }

    /// Deliver the decoded payload
    pub fn complete(mut self, payload: AssetPayload) {
        self.deliver(payload);
    }

    /// Deliver a failure; it is stored like any other payload
    pub fn fail(self, reason: impl Into<String>) {
        self.complete(AssetPayload::Failed(reason.into()));
    }

    fn deliver(&mut self, payload: AssetPayload) {
        let Some(sender) = self.sender.take() else { return };
        let completion = Completion {
            ticket: self.ticket,
            descriptor: self.descriptor.clone(),
            payload,
        };
        if sender.send(completion).is_err() {
            log::debug!(
                "Loader gone before '{}' finished, dropping result",
                self.descriptor.name()
            );
        }
    }
}

impl Drop for LoadCompletion {
    fn drop(&mut self) {
        if self.sender.is_some() {
            log::warn!("Handler abandoned load of '{}'", self.descriptor.name());
            self.deliver(AssetPayload::Failed("load abandoned".to_string()));
        }
    }
}

/// Format-specific loading strategy
pub trait FormatHandler {
    /// Start loading `descriptor`; deliver the result through `completion`
    fn load(&self, descriptor: &AssetDescriptor, completion: LoadCompletion);
}

impl<F> FormatHandler for F
where
    F: Fn(&AssetDescriptor, LoadCompletion),
{
    fn load(&self, descriptor: &AssetDescriptor, completion: LoadCompletion) {
        self(descriptor, completion);
    }
}

/// Decoder applied to raw file bytes on the loading thread
pub type Decoder = fn(&[u8]) -> Result<AssetPayload, AssetError>;

/// Handler that reads a file under an asset root on a worker thread and decodes it
///
/// Loads run concurrently with no cap, one thread per asset.
pub struct FileHandler {
    label: &'static str,
    root: PathBuf,
    decode: Decoder,
}

impl FileHandler {
    /// Create a handler with a custom decoder
    pub fn new(label: &'static str, root: impl Into<PathBuf>, decode: Decoder) -> Self {
        Self {
            label,
            root: root.into(),
            decode,
        }
    }

    /// PNG / JPEG textures
    pub fn images(root: impl Into<PathBuf>) -> Self {
        Self::new("image", root, decode_image)
    }

    /// Draco-compressed geometry, passed through undecoded
    pub fn draco(root: impl Into<PathBuf>) -> Self {
        Self::new("draco", root, |bytes| Ok(binary("drc", bytes)))
    }

    /// glTF / GLB scenes
    pub fn gltf(root: impl Into<PathBuf>) -> Self {
        Self::new("gltf", root, decode_gltf)
    }

    /// FBX scenes, passed through undecoded
    pub fn fbx(root: impl Into<PathBuf>) -> Self {
        Self::new("fbx", root, |bytes| Ok(binary("fbx", bytes)))
    }

    /// Label used in log messages
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl FormatHandler for FileHandler {
    fn load(&self, descriptor: &AssetDescriptor, completion: LoadCompletion) {
        let path = self.root.join(descriptor.source());
        let decode = self.decode;
        let label = self.label;

        log::debug!("[{}] loading '{}' from {}", label, descriptor.name(), path.display());

        let spawned = std::thread::Builder::new()
            .name(format!("load-{}", descriptor.name()))
            .spawn(move || {
                let payload = read_and_decode(&path, decode).unwrap_or_else(|e| {
                    log::warn!("[{}] {} failed: {}", label, path.display(), e);
                    AssetPayload::Failed(e.to_string())
                });
                completion.complete(payload);
            });

        // On failure the closure is dropped with the completion inside,
        // which reports the load as abandoned
        if let Err(e) = spawned {
            log::error!("[{}] could not spawn loader thread: {}", label, e);
        }
    }
}

fn read_and_decode(path: &Path, decode: Decoder) -> Result<AssetPayload, AssetError> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

fn decode_image(bytes: &[u8]) -> Result<AssetPayload, AssetError> {
    ImageData::from_bytes(bytes).map(AssetPayload::Image)
}

fn decode_gltf(bytes: &[u8]) -> Result<AssetPayload, AssetError> {
    GltfSummary::from_bytes(bytes).map(AssetPayload::Gltf)
}

fn binary(format: &str, bytes: &[u8]) -> AssetPayload {
    AssetPayload::Binary {
        format: format.to_string(),
        bytes: bytes.to_vec(),
    }
}
