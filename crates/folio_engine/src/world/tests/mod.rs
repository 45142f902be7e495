//! End-to-end world scenarios

mod bootstrap;

use crate::assets::{AssetDescriptor, AssetLoader, AssetPayload, LoadCompletion, LoaderConfig};
use crate::config::WorldConfig;
use crate::foundation::sizes::Sizes;
use crate::foundation::time::Clock;
use crate::world::World;
use std::cell::RefCell;
use std::rc::Rc;

/// Frame step used by every scenario; exact in binary so sums stay exact
pub(super) const STEP: f32 = 0.125;

/// World over a loader whose handler parks completions for the test to deliver
pub(super) struct Harness {
    pub world: World,
    pub clock: Clock,
    pub sizes: Rc<Sizes>,
    pub loader: Rc<RefCell<AssetLoader>>,
    pub parked: Rc<RefCell<Vec<LoadCompletion>>>,
}

impl Harness {
    pub fn new(config: WorldConfig) -> Self {
        let mut loader = AssetLoader::new(LoaderConfig::default());
        let parked = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&parked);
        loader
            .register_handler(&["png", "glb"], move |_: &AssetDescriptor, c: LoadCompletion| {
                sink.borrow_mut().push(c);
            })
            .unwrap();

        let clock = Clock::new();
        let sizes = Rc::new(Sizes::new(1600, 900));
        let loader = Rc::new(RefCell::new(loader));
        let world =
            World::new(config, clock.clone(), Rc::clone(&sizes), Rc::clone(&loader)).unwrap();
        Self {
            world,
            clock,
            sizes,
            loader,
            parked,
        }
    }

    /// Submit `a.png` and `b.glb`
    pub fn submit(&self) {
        self.loader
            .borrow_mut()
            .submit(vec![AssetDescriptor::new("a", "a.png"), AssetDescriptor::new("b", "b.glb")]);
    }

    /// Deliver every parked load
    pub fn complete_all(&self) {
        for completion in self.parked.borrow_mut().drain(..) {
            completion.complete(AssetPayload::Binary {
                format: "test".into(),
                bytes: Vec::new(),
            });
        }
    }

    pub fn frames(&mut self, count: usize) {
        for _ in 0..count {
            self.world.frame(STEP).unwrap();
        }
    }

    /// Load everything, let the start zone fade in and interact with it
    pub fn open_gate(&mut self) {
        self.submit();
        self.complete_all();
        self.frames(4);
        assert!(self.world.interact_at(crate::foundation::math::Vec2::zeros()).unwrap());
    }
}
