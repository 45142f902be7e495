//! Headless portfolio world
//!
//! Loads the configured manifest, builds the world, walks through the
//! starting screen as soon as it opens and runs until the reveal finishes.
//! Usage: `folio [config.toml]`

use folio_engine::assets::{AssetError, AssetLoader, AssetManifest, LoadSession};
use folio_engine::config::{Config, ConfigError, WorldConfig};
use folio_engine::foundation::logging;
use folio_engine::foundation::math::Vec2;
use folio_engine::foundation::sizes::Sizes;
use folio_engine::foundation::time::{Clock, Timer};
use folio_engine::world::{World, WorldError, WorldPhase};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const STEP: f32 = 1.0 / 60.0;
const FRAME_CAP: u64 = 60 * 30;

#[derive(thiserror::Error, Debug)]
enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("World error: {0}")]
    World(#[from] WorldError),

    #[error("Loading stalled at {}/{} assets", .0.completed(), .0.requested())]
    Stalled(LoadSession),

    #[error("World not revealed after {0} frames")]
    FrameCap(u64),
}

struct FolioApp {
    world: World,
    resources: Rc<RefCell<AssetLoader>>,
    timer: Timer,
    entered: bool,
}

impl FolioApp {
    fn new(config: WorldConfig) -> Result<Self, AppError> {
        let manifest = AssetManifest::load(&config.manifest)?;
        let mut loader = AssetLoader::with_default_handlers(config.loader.clone())?;
        let requested = loader.submit(manifest.assets);
        log::info!("Submitted {} asset(s), handlers for {:?}", requested, loader.suffixes());

        let resources = Rc::new(RefCell::new(loader));
        let world =
            World::new(config, Clock::new(), Rc::new(Sizes::default()), Rc::clone(&resources))?;
        Ok(Self {
            world,
            resources,
            timer: Timer::new(),
            entered: false,
        })
    }

    fn run(&mut self) -> Result<(), AppError> {
        while self.timer.frame_count() < FRAME_CAP {
            self.timer.update();
            if self.resources.borrow().in_flight() > 0 {
                // Wait on worker threads instead of spinning
                self.resources.borrow_mut().pump_timeout(Duration::from_secs_f32(STEP));
            }
            self.world.frame(STEP)?;

            if !self.entered && self.world.starting_screen().zone().is_active() {
                log::info!("Entering world at frame {}", self.timer.frame_count());
                self.entered = self.world.interact_at(Vec2::zeros())?;
            }
            if self.world.phase() == WorldPhase::Revealed {
                log::info!(
                    "Revealed in {} frames ({:.2}s wall time)",
                    self.timer.frame_count(),
                    self.timer.total_time()
                );
                return Ok(());
            }
        }

        let loader = self.resources.borrow();
        let session = loader.session();
        if !session.is_finished() {
            for unresolved in loader.unresolved() {
                log::warn!(
                    "Unresolved asset '{}': {}",
                    unresolved.descriptor.name(),
                    unresolved.reason
                );
            }
            return Err(AppError::Stalled(session));
        }
        Err(AppError::FrameCap(FRAME_CAP))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    log::info!("Starting Folio");

    let path = std::env::args().nth(1).unwrap_or_else(|| "folio.toml".to_string());
    let config = WorldConfig::load_or_default(&path)?;

    let mut app = FolioApp::new(config)?;
    let result = app.run();
    app.world.destroy()?;

    match result {
        Ok(()) => {
            log::info!("Folio completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Folio failed: {}", e);
            Err(e.into())
        }
    }
}
