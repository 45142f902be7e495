//! # Folio Engine
//!
//! Asset loading and staged scene composition for a drivable portfolio world.
//!
//! ## Features
//!
//! - **Asset Loading**: Format handlers keyed by file suffix, aggregate progress
//!   and a completion event that fires exactly once
//! - **Two-Phase Bootstrap**: Only the starting screen is built up front; the
//!   rest of the world waits for the player
//! - **Reveal Sequencing**: Tweened choreography driven by a per-frame clock
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use folio_engine::prelude::*;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = WorldConfig::default();
//!     let mut loader = AssetLoader::with_default_handlers(config.loader.clone())?;
//!     loader.submit(AssetManifest::load(&config.manifest)?.assets);
//!
//!     let clock = Clock::new();
//!     let loader = Rc::new(RefCell::new(loader));
//!     let mut world = World::new(config, clock, Rc::new(Sizes::default()), loader)?;
//!     world.frame(1.0 / 60.0)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod events;
pub mod config;
pub mod assets;
pub mod tween;
pub mod scene;
pub mod audio;
pub mod physics;
pub mod input;
pub mod world;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{
            AssetDescriptor, AssetError, AssetLoader, AssetManifest, AssetPayload, LoadCompletion,
            LoaderConfig, LoaderEvent, LoaderEventKind, UnresolvedPolicy,
        },
        config::{Config, ConfigError, WorldConfig},
        foundation::{
            math::{Vec2, Vec3},
            sizes::Sizes,
            time::{Clock, Timer},
        },
        input::KeyCode,
        tween::{Ease, Param, Timeline, Tween},
        world::{World, WorldError, WorldPhase},
    };
}
