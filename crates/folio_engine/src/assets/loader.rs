//! Asset loader - suffix-dispatched loading with session tracking
//!
//! The loader owns a closed set of [`FormatHandler`]s keyed by file suffix.
//! [`AssetLoader::submit`] dispatches every descriptor to its handler, and
//! [`AssetLoader::pump`] applies finished loads on the owning thread:
//!
//! ```text
//! submit ──> handler (any thread) ──> channel ──> pump ──> store + events
//! ```
//!
//! Per finished load the loader stores the payload, bumps the completed count
//! and emits `FileEnd` then `Progress`; the load that completes the session
//! also emits `End`, exactly once.

use crate::assets::handlers::Completion;
use crate::assets::{
    AssetDescriptor, AssetError, AssetPayload, FileHandler, FormatHandler, LoadCompletion,
    UnresolvedReason,
};
use crate::events::{Event, EventEmitter, SubscriptionId};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// What to do with a descriptor that no handler can load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Keep it requested but never completed; the session can then never finish
    #[default]
    Stall,
    /// Record a failed payload and count it as completed
    CountAsFailed,
}

/// Loader settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directory that descriptor sources are resolved against
    pub asset_root: PathBuf,
    /// Handling of descriptors without a usable suffix or handler
    pub unresolved: UnresolvedPolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("resources"),
            unresolved: UnresolvedPolicy::Stall,
        }
    }
}

/// Request/completion counters for the startup load session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSession {
    requested: usize,
    completed: usize,
    finished: bool,
}

impl LoadSession {
    /// Descriptors submitted so far
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Loads finished so far (successful or failed)
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// True once every requested load has completed
    ///
    /// Latches: a later `submit` raises `requested` but leaves the session
    /// finished, so this can stay true while `completed < requested`.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Completed over requested, 0.0 before anything was requested
    pub fn progress(&self) -> f32 {
        if self.requested == 0 {
            0.0
        } else {
            self.completed as f32 / self.requested as f32
        }
    }

    /// Latch the finished flag; true only on the call that finishes the session
    fn try_finish(&mut self) -> bool {
        if self.finished || self.requested == 0 || self.completed != self.requested {
            return false;
        }
        self.finished = true;
        true
    }
}

/// Store of decoded payloads by descriptor name
#[derive(Debug, Default)]
pub struct LoadedItems {
    items: HashMap<String, Arc<AssetPayload>>,
}

impl LoadedItems {
    /// Payload stored under `name`
    pub fn get(&self, name: &str) -> Option<&Arc<AssetPayload>> {
        self.items.get(name)
    }

    /// True if `name` has been loaded
    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Number of stored payloads
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing has loaded yet
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stored names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.items.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn insert(&mut self, name: &str, payload: Arc<AssetPayload>) {
        if self.items.insert(name.to_string(), payload).is_some() {
            log::warn!("Asset '{}' loaded twice, keeping the latest payload", name);
        }
    }
}

/// Descriptor that could not be dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedAsset {
    /// The rejected descriptor
    pub descriptor: AssetDescriptor,
    /// Why no handler was found
    pub reason: UnresolvedReason,
}

/// Events emitted by the loader
#[derive(Debug, Clone)]
pub enum LoaderEvent {
    /// Completed over requested after a load finished
    Progress(f32),
    /// One asset finished loading
    FileEnd {
        /// Descriptor of the finished asset
        descriptor: AssetDescriptor,
        /// Stored payload
        payload: Arc<AssetPayload>,
    },
    /// Every requested asset has completed (emitted once)
    End,
}

/// Kinds of [`LoaderEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderEventKind {
    /// [`LoaderEvent::Progress`]
    Progress,
    /// [`LoaderEvent::FileEnd`]
    FileEnd,
    /// [`LoaderEvent::End`]
    End,
}

impl Event for LoaderEvent {
    type Kind = LoaderEventKind;

    fn kind(&self) -> LoaderEventKind {
        match self {
            Self::Progress(_) => LoaderEventKind::Progress,
            Self::FileEnd { .. } => LoaderEventKind::FileEnd,
            Self::End => LoaderEventKind::End,
        }
    }
}

struct RegisteredHandler {
    suffixes: Vec<String>,
    handler: Box<dyn FormatHandler>,
}

/// Suffix-dispatched asset loader
///
/// Event handlers run while the loader is being pumped and must not call back
/// into it.
pub struct AssetLoader {
    config: LoaderConfig,
    handlers: Vec<RegisteredHandler>,
    by_suffix: HashMap<String, usize>,
    session: LoadSession,
    items: LoadedItems,
    unresolved: Vec<UnresolvedAsset>,
    in_flight: HashSet<u64>,
    next_ticket: u64,
    sealed: bool,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    events: EventEmitter<LoaderEvent>,
}

impl AssetLoader {
    /// Create a loader with no handlers
    pub fn new(config: LoaderConfig) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        log::info!("Creating AssetLoader with config: {:?}", config);
        Self {
            config,
            handlers: Vec::new(),
            by_suffix: HashMap::new(),
            session: LoadSession::default(),
            items: LoadedItems::default(),
            unresolved: Vec::new(),
            in_flight: HashSet::new(),
            next_ticket: 0,
            sealed: false,
            sender,
            receiver,
            events: EventEmitter::new(),
        }
    }

    /// Create a loader with the image, Draco, glTF and FBX handlers
    pub fn with_default_handlers(config: LoaderConfig) -> Result<Self, AssetError> {
        let root = config.asset_root.clone();
        let mut loader = Self::new(config);
        loader.register_handler(&["jpg", "png"], FileHandler::images(&root))?;
        loader.register_handler(&["drc"], FileHandler::draco(&root))?;
        loader.register_handler(&["glb", "gltf"], FileHandler::gltf(&root))?;
        loader.register_handler(&["fbx"], FileHandler::fbx(&root))?;
        Ok(loader)
    }

    /// Register a handler for a set of suffixes
    ///
    /// Fails if any suffix is malformed or already taken, or once loading has
    /// started. Nothing is registered on failure.
    pub fn register_handler<H>(&mut self, suffixes: &[&str], handler: H) -> Result<(), AssetError>
    where
        H: FormatHandler + 'static,
    {
        if self.sealed {
            return Err(AssetError::RegistrationClosed);
        }

        let index = self.handlers.len();
        let mut claimed: HashMap<String, usize> = HashMap::new();
        for suffix in suffixes {
            if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_lowercase()) {
                return Err(AssetError::InvalidSuffix((*suffix).to_string()));
            }
            let existing = self.by_suffix.get(*suffix).or_else(|| claimed.get(*suffix));
            if let Some(&existing) = existing {
                return Err(AssetError::DuplicateSuffix {
                    suffix: (*suffix).to_string(),
                    existing,
                });
            }
            claimed.insert((*suffix).to_string(), index);
        }

        log::debug!("Registered handler #{} for {:?}", index, suffixes);
        self.by_suffix.extend(claimed);
        self.handlers.push(RegisteredHandler {
            suffixes: suffixes.iter().map(|s| (*s).to_string()).collect(),
            handler: Box::new(handler),
        });
        Ok(())
    }

    /// Dispatch descriptors to their handlers, returns how many were dispatched
    ///
    /// Every descriptor counts as requested before any is dispatched, so a
    /// batch can never finish the session halfway through.
    pub fn submit<I>(&mut self, descriptors: I) -> usize
    where
        I: IntoIterator<Item = AssetDescriptor>,
    {
        let descriptors: Vec<AssetDescriptor> = descriptors.into_iter().collect();
        self.sealed = true;
        if self.session.is_finished() {
            log::warn!(
                "Submitting {} asset(s) after the load session finished; it will not finish again",
                descriptors.len()
            );
        }
        self.session.requested += descriptors.len();

        let mut dispatched = 0;
        for descriptor in descriptors {
            match self.resolve(&descriptor) {
                Ok(index) => {
                    let completion = self.issue(descriptor.clone());
                    self.handlers[index].handler.load(&descriptor, completion);
                    dispatched += 1;
                }
                Err(reason) => self.reject(descriptor, reason),
            }
        }
        dispatched
    }

    /// Apply every load that has finished so far, returns how many were applied
    pub fn pump(&mut self) -> usize {
        let finished: Vec<Completion> = self.receiver.try_iter().collect();
        let count = finished.len();
        for completion in finished {
            self.finish(completion);
        }
        count
    }

    /// Block up to `timeout` for at least one finished load, then pump
    pub fn pump_timeout(&mut self, timeout: Duration) -> usize {
        match self.receiver.recv_timeout(timeout) {
            Ok(first) => {
                self.finish(first);
                1 + self.pump()
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => 0,
        }
    }

    /// Counters of the load session
    pub fn session(&self) -> LoadSession {
        self.session
    }

    /// Loaded item store
    pub fn items(&self) -> &LoadedItems {
        &self.items
    }

    /// Descriptors that no handler could take, with the reason
    pub fn unresolved(&self) -> &[UnresolvedAsset] {
        &self.unresolved
    }

    /// Number of loads dispatched but not yet applied
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Loader configuration
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Suffixes of the registered handlers, in registration order
    pub fn suffixes(&self) -> Vec<&str> {
        self.handlers
            .iter()
            .flat_map(|h| h.suffixes.iter().map(String::as_str))
            .collect()
    }

    /// Event registry (`Progress`, `FileEnd`, `End`)
    pub fn events(&self) -> &EventEmitter<LoaderEvent> {
        &self.events
    }

    /// Subscribe to one loader event kind
    pub fn on<F>(&self, kind: LoaderEventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&LoaderEvent) + 'static,
    {
        self.events.on(kind, handler)
    }

    /// Remove a loader event subscription
    pub fn off(&self, subscription: SubscriptionId) -> bool {
        self.events.off(subscription)
    }

    fn resolve(&self, descriptor: &AssetDescriptor) -> Result<usize, UnresolvedReason> {
        let suffix = descriptor
            .suffix()
            .ok_or_else(|| UnresolvedReason::MissingSuffix(descriptor.source().to_string()))?;
        self.by_suffix
            .get(suffix)
            .copied()
            .ok_or_else(|| UnresolvedReason::NoHandler(suffix.to_string()))
    }

    fn issue(&mut self, descriptor: AssetDescriptor) -> LoadCompletion {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight.insert(ticket);
        LoadCompletion::new(ticket, descriptor, self.sender.clone())
    }

    fn reject(&mut self, descriptor: AssetDescriptor, reason: UnresolvedReason) {
        let error = AssetError::Unresolvable {
            name: descriptor.name().to_string(),
            reason: reason.clone(),
        };
        log::warn!("{}", error);

        self.unresolved.push(UnresolvedAsset {
            descriptor: descriptor.clone(),
            reason,
        });

        if self.config.unresolved == UnresolvedPolicy::CountAsFailed {
            // Routed through the channel so it completes in order with real loads
            self.issue(descriptor).fail(error.to_string());
        }
    }

    fn finish(&mut self, completion: Completion) {
        let Completion { ticket, descriptor, payload } = completion;
        if !self.in_flight.remove(&ticket) {
            log::warn!("Ignoring stray completion for '{}'", descriptor.name());
            return;
        }

        let payload = Arc::new(payload);
        self.items.insert(descriptor.name(), Arc::clone(&payload));
        self.session.completed += 1;
        debug_assert!(self.session.completed <= self.session.requested);

        log::debug!(
            "Loaded '{}' ({}/{})",
            descriptor.name(),
            self.session.completed,
            self.session.requested
        );

        self.events.emit(&LoaderEvent::FileEnd { descriptor, payload });
        self.events.emit(&LoaderEvent::Progress(self.session.progress()));

        if self.session.try_finish() {
            log::info!("All {} asset(s) loaded", self.session.completed);
            self.events.emit(&LoaderEvent::End);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Parked = Rc<RefCell<Vec<LoadCompletion>>>;

    /// Handler that parks completions so tests resolve them in any order
    fn parking_handler(parked: &Parked) -> impl Fn(&AssetDescriptor, LoadCompletion) {
        let parked = Rc::clone(parked);
        move |_: &AssetDescriptor, completion: LoadCompletion| parked.borrow_mut().push(completion)
    }

    #[derive(Default)]
    struct Recorder {
        file_ends: Vec<String>,
        progress: Vec<f32>,
        ends: usize,
    }

    fn record(loader: &AssetLoader) -> Rc<RefCell<Recorder>> {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let sink = Rc::clone(&recorder);
        loader.on(LoaderEventKind::FileEnd, move |event| {
            if let LoaderEvent::FileEnd { descriptor, .. } = event {
                sink.borrow_mut().file_ends.push(descriptor.name().to_string());
            }
        });
        let sink = Rc::clone(&recorder);
        loader.on(LoaderEventKind::Progress, move |event| {
            if let LoaderEvent::Progress(value) = event {
                sink.borrow_mut().progress.push(*value);
            }
        });
        let sink = Rc::clone(&recorder);
        loader.on(LoaderEventKind::End, move |_| sink.borrow_mut().ends += 1);
        recorder
    }

    fn loader_with_parking(parked: &Parked) -> AssetLoader {
        let mut loader = AssetLoader::new(LoaderConfig::default());
        loader.register_handler(&["jpg", "png"], parking_handler(parked)).unwrap();
        loader.register_handler(&["glb", "gltf"], parking_handler(parked)).unwrap();
        loader
    }

    fn image() -> AssetPayload {
        AssetPayload::Image(crate::assets::ImageData { data: vec![0; 4], width: 1, height: 1 })
    }

    #[test]
    fn test_duplicate_suffix_is_configuration_error() {
        let parked = Parked::default();
        let mut loader = loader_with_parking(&parked);

        let result = loader.register_handler(&["fbx", "png"], parking_handler(&parked));
        assert!(matches!(
            result,
            Err(AssetError::DuplicateSuffix { ref suffix, existing: 0 }) if suffix == "png"
        ));
        // Nothing from the failed registration leaked in
        assert_eq!(loader.suffixes(), vec!["jpg", "png", "glb", "gltf"]);

        let result = loader.register_handler(&["obj", "obj"], parking_handler(&parked));
        assert!(matches!(result, Err(AssetError::DuplicateSuffix { .. })));
        assert!(matches!(
            loader.register_handler(&["Obj"], parking_handler(&parked)),
            Err(AssetError::InvalidSuffix(_))
        ));
    }

    #[test]
    fn test_registration_closes_after_submit() {
        let parked = Parked::default();
        let mut loader = loader_with_parking(&parked);
        loader.submit(vec![AssetDescriptor::new("a", "a.png")]);

        let result = loader.register_handler(&["fbx"], parking_handler(&parked));
        assert!(matches!(result, Err(AssetError::RegistrationClosed)));
    }

    #[test]
    fn test_two_asset_session() {
        let parked = Parked::default();
        let mut loader = loader_with_parking(&parked);
        let recorder = record(&loader);

        let dispatched = loader.submit(vec![
            AssetDescriptor::new("a", "a.png"),
            AssetDescriptor::new("b", "b.glb"),
        ]);
        assert_eq!(dispatched, 2);
        assert_eq!(loader.session().requested(), 2);
        assert_eq!(loader.pump(), 0);

        let mut completions = parked.borrow_mut().drain(..).collect::<Vec<_>>().into_iter();
        completions.next().unwrap().complete(image());
        loader.pump();
        assert_eq!(recorder.borrow().ends, 0);

        completions.next().unwrap().complete(AssetPayload::Gltf(Default::default()));
        loader.pump();

        let recorder = recorder.borrow();
        assert_eq!(loader.items().names(), vec!["a", "b"]);
        assert_eq!(recorder.file_ends, vec!["a", "b"]);
        assert_eq!(recorder.progress, vec![0.5, 1.0]);
        assert_eq!(recorder.ends, 1);
        assert!(loader.session().is_finished());
    }

    #[test]
    fn test_completion_order_does_not_matter() {
        let parked = Parked::default();
        let mut loader = loader_with_parking(&parked);
        let recorder = record(&loader);

        let names = ["a", "b", "c", "d", "e"];
        loader.submit(names.iter().map(|n| AssetDescriptor::new(*n, format!("{}.jpg", n))));

        let mut completions: Vec<LoadCompletion> = parked.borrow_mut().drain(..).collect();
        // Resolve in reverse, pumping between each
        while let Some(completion) = completions.pop() {
            completion.complete(image());
            loader.pump();
            let session = loader.session();
            assert!(session.completed() <= session.requested());
        }

        let recorder = recorder.borrow();
        assert_eq!(recorder.file_ends, vec!["e", "d", "c", "b", "a"]);
        assert_eq!(recorder.ends, 1);
        assert_eq!(loader.items().len(), names.len());
    }

    #[test]
    fn test_unrecognized_suffix_stalls_session() {
        let parked = Parked::default();
        let mut loader = loader_with_parking(&parked);
        let recorder = record(&loader);

        let dispatched = loader.submit(vec![AssetDescriptor::new("c", "c.xyz")]);
        loader.pump();

        assert_eq!(dispatched, 0);
        assert!(parked.borrow().is_empty());
        assert_eq!(loader.session().requested(), 1);
        assert_eq!(loader.session().completed(), 0);
        assert_eq!(recorder.borrow().ends, 0);
        assert!(recorder.borrow().progress.iter().all(|p| *p < 1.0));
        assert_eq!(
            loader.unresolved(),
            &[UnresolvedAsset {
                descriptor: AssetDescriptor::new("c", "c.xyz"),
                reason: UnresolvedReason::NoHandler("xyz".into()),
            }]
        );
    }

    #[test]
    fn test_missing_suffix_never_reaches_a_handler() {
        let parked = Parked::default();
        let mut loader = loader_with_parking(&parked);
        let recorder = record(&loader);

        loader.submit(vec![
            AssetDescriptor::new("a", "a.png"),
            AssetDescriptor::new("noext", "textures/noext"),
        ]);
        parked.borrow_mut().pop().unwrap().complete(image());
        loader.pump();

        assert_eq!(parked.borrow().len(), 0);
        assert_eq!(loader.session().completed(), 1);
        assert_eq!(recorder.borrow().progress, vec![0.5]);
        assert_eq!(recorder.borrow().ends, 0);
        assert!(matches!(
            loader.unresolved()[0].reason,
            UnresolvedReason::MissingSuffix(_)
        ));
    }

    #[test]
    fn test_count_as_failed_policy_finishes_session() {
        let parked = Parked::default();
        let mut loader = AssetLoader::new(LoaderConfig {
            unresolved: UnresolvedPolicy::CountAsFailed,
            ..LoaderConfig::default()
        });
        loader.register_handler(&["png"], parking_handler(&parked)).unwrap();
        let recorder = record(&loader);

        loader.submit(vec![
            AssetDescriptor::new("c", "c.xyz"),
            AssetDescriptor::new("a", "a.png"),
        ]);
        loader.pump();
        // The failed one is counted, the real load is still out
        assert_eq!(loader.session().completed(), 1);
        assert_eq!(recorder.borrow().ends, 0);

        parked.borrow_mut().pop().unwrap().complete(image());
        loader.pump();

        assert_eq!(recorder.borrow().ends, 1);
        assert!(loader.items().get("c").unwrap().is_failed());
        assert_eq!(loader.unresolved().len(), 1);
    }

    #[test]
    fn test_end_fires_once_and_never_for_empty_session() {
        let parked = Parked::default();
        let mut loader = loader_with_parking(&parked);
        let recorder = record(&loader);

        loader.submit(Vec::new());
        loader.pump();
        assert_eq!(recorder.borrow().ends, 0);
        assert!(!loader.session().is_finished());

        loader.submit(vec![AssetDescriptor::new("a", "a.png")]);
        parked.borrow_mut().pop().unwrap().complete(image());
        loader.pump();
        loader.pump();
        assert_eq!(recorder.borrow().ends, 1);

        // A late submission never re-arms the session
        loader.submit(vec![AssetDescriptor::new("b", "b.png")]);
        assert!(loader.session().is_finished());
        assert!(loader.session().completed() < loader.session().requested());
        parked.borrow_mut().pop().unwrap().complete(image());
        loader.pump();
        assert_eq!(recorder.borrow().ends, 1);
        assert!(loader.session().is_finished());
        assert_eq!(loader.session().completed(), loader.session().requested());
    }

    #[test]
    fn test_failure_is_stored_as_payload() {
        let parked = Parked::default();
        let mut loader = loader_with_parking(&parked);
        let recorder = record(&loader);

        loader.submit(vec![AssetDescriptor::new("broken", "broken.png")]);
        parked.borrow_mut().pop().unwrap().fail("decode error");
        loader.pump();

        assert!(loader.items().get("broken").unwrap().is_failed());
        assert_eq!(recorder.borrow().ends, 1);
    }

    #[test]
    fn test_default_handlers_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let texture = image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255]));
        texture.save(dir.path().join("matcap.png")).unwrap();
        std::fs::write(dir.path().join("car.drc"), b"draco").unwrap();

        let mut loader = AssetLoader::with_default_handlers(LoaderConfig {
            asset_root: dir.path().to_path_buf(),
            ..LoaderConfig::default()
        })
        .unwrap();
        loader.submit(vec![
            AssetDescriptor::new("matcap", "matcap.png"),
            AssetDescriptor::new("car", "car.drc"),
        ]);

        let mut waited = 0;
        while !loader.session().is_finished() && waited < 50 {
            loader.pump_timeout(Duration::from_millis(100));
            waited += 1;
        }

        assert!(loader.session().is_finished());
        let matcap = loader.items().get("matcap").unwrap();
        assert_eq!(matcap.as_image().map(|i| (i.width, i.height)), Some((2, 2)));
        assert!(matches!(
            loader.items().get("car").unwrap().as_ref(),
            AssetPayload::Binary { format, .. } if format == "drc"
        ));
        assert_eq!(loader.in_flight(), 0);
    }
}
