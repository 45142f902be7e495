//! Starting-screen gate
//!
//! Shows load progress in the start zone's border, turns the zone on once
//! every asset is in, and raises the [`StartSignal`] when the player
//! interacts with it. The world polls the signal; the gate never starts
//! anything itself.

use crate::assets::{AssetLoader, LoaderEvent, LoaderEventKind};
use crate::events::SubscriptionId;
use crate::foundation::math::Vec2;
use crate::scene::{NodeId, SceneError, SceneGraph};
use crate::tween::{Param, Timeline, Tween};
use crate::world::areas::{Areas, ZoneEventKind, ZoneFlags, ZoneHandle, ZoneSpec};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// One-way flag raised by the gate and consumed by the world
#[derive(Debug, Clone, Default)]
pub struct StartSignal(Rc<Cell<bool>>);

impl StartSignal {
    /// Raise the signal
    pub fn raise(&self) {
        self.0.set(true);
    }

    /// True while raised and not yet taken
    pub fn is_raised(&self) -> bool {
        self.0.get()
    }

    /// Consume the signal, returns whether it was raised
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}

/// Starting screen
pub struct StartingScreen {
    container: NodeId,
    zone: ZoneHandle,
    loading_label: Param,
    start_label: Param,
    signal: StartSignal,
    loader_subscriptions: Vec<SubscriptionId>,
    zone_subscription: SubscriptionId,
}

impl StartingScreen {
    const FADE: f32 = 0.3;

    /// Register the start zone and hook the loader events
    pub fn new(
        scene: &mut SceneGraph,
        areas: &mut Areas,
        loader: &AssetLoader,
        timeline: &Rc<RefCell<Timeline>>,
    ) -> Result<Self, SceneError> {
        let container = scene.create("starting_screen");
        scene.create_child(container, "loading_label")?;
        scene.create_child(container, "start_label")?;

        let zone = areas.register(
            scene,
            ZoneSpec::new(Vec2::zeros(), Vec2::new(2.35, 1.5)).with_flags(ZoneFlags::empty()),
        )?;
        let loading_label = Param::new(1.0);
        let start_label = Param::new(0.0);
        let signal = StartSignal::default();

        let border = zone.border().clone();
        let on_progress = loader.on(LoaderEventKind::Progress, move |event| {
            if let LoaderEvent::Progress(progress) = event {
                border.alpha.set(1.0);
                border.load_progress.set(*progress);
            }
        });

        let on_end = {
            let zone = Rc::downgrade(&zone);
            let timeline = Rc::clone(timeline);
            let loading_label = loading_label.clone();
            let start_label = start_label.clone();
            loader.on(LoaderEventKind::End, move |_| {
                let Some(zone) = zone.upgrade() else { return };
                log::info!("Assets ready, activating start zone");
                zone.activate();

                let alpha = &zone.border().alpha;
                let mut timeline = timeline.borrow_mut();
                timeline.to(Tween::new(alpha.get(), 0.3, Self::FADE), alpha.setter());
                timeline.to(
                    Tween::new(loading_label.get(), 0.0, Self::FADE),
                    loading_label.setter(),
                );
                timeline.to(
                    Tween::new(start_label.get(), 1.0, Self::FADE).with_delay(Self::FADE),
                    start_label.setter(),
                );
            })
        };

        let zone_subscription = {
            let weak: Weak<_> = Rc::downgrade(&zone);
            let timeline = Rc::clone(timeline);
            let start_label = start_label.clone();
            let signal = signal.clone();
            zone.on(ZoneEventKind::Interact, move |_| {
                let Some(zone) = weak.upgrade() else { return };
                log::info!("Start zone interaction");
                zone.deactivate();

                let progress = &zone.border().progress;
                let mut timeline = timeline.borrow_mut();
                timeline.to(
                    Tween::new(progress.get(), 0.0, Self::FADE).with_delay(0.4),
                    progress.setter(),
                );
                timeline.to(
                    Tween::new(start_label.get(), 0.0, Self::FADE).with_delay(0.4),
                    start_label.setter(),
                );
                signal.raise();
            })
        };

        Ok(Self {
            container,
            zone,
            loading_label,
            start_label,
            signal,
            loader_subscriptions: vec![on_progress, on_end],
            zone_subscription,
        })
    }

    /// Container node
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// The start zone
    pub fn zone(&self) -> &ZoneHandle {
        &self.zone
    }

    /// Opacity of the "loading" label
    pub fn loading_label(&self) -> &Param {
        &self.loading_label
    }

    /// Opacity of the "start" label
    pub fn start_label(&self) -> &Param {
        &self.start_label
    }

    /// Signal raised on interaction
    pub fn signal(&self) -> &StartSignal {
        &self.signal
    }

    /// Drop the loader and zone subscriptions
    pub fn detach(&self, loader: &AssetLoader) {
        for subscription in &self.loader_subscriptions {
            loader.off(*subscription);
        }
        self.zone.off(self.zone_subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetDescriptor, AssetPayload, LoadCompletion, LoaderConfig};
    use approx::assert_relative_eq;

    struct Fixture {
        scene: SceneGraph,
        areas: Areas,
        loader: AssetLoader,
        timeline: Rc<RefCell<Timeline>>,
        parked: Rc<RefCell<Vec<LoadCompletion>>>,
    }

    fn fixture() -> Fixture {
        let mut scene = SceneGraph::new();
        let areas = Areas::new(&mut scene);
        let mut loader = AssetLoader::new(LoaderConfig::default());
        let parked = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&parked);
        loader
            .register_handler(&["png"], move |_: &AssetDescriptor, c: LoadCompletion| {
                sink.borrow_mut().push(c);
            })
            .unwrap();
        Fixture {
            scene,
            areas,
            loader,
            timeline: Rc::new(RefCell::new(Timeline::new())),
            parked,
        }
    }

    #[test]
    fn test_gate_opens_after_load_and_interaction() {
        let mut f = fixture();
        let screen =
            StartingScreen::new(&mut f.scene, &mut f.areas, &f.loader, &f.timeline).unwrap();
        assert!(!screen.zone().is_active());

        f.loader
            .submit(vec![AssetDescriptor::new("a", "a.png"), AssetDescriptor::new("b", "b.png")]);
        f.parked.borrow_mut().pop().unwrap().complete(AssetPayload::Failed("x".into()));
        f.loader.pump();

        assert_relative_eq!(screen.zone().border().load_progress.get(), 0.5);
        assert_relative_eq!(screen.zone().border().alpha.get(), 1.0);
        assert!(!screen.zone().interact());
        assert!(!screen.signal().is_raised());

        f.parked.borrow_mut().pop().unwrap().complete(AssetPayload::Failed("y".into()));
        f.loader.pump();
        assert!(screen.zone().is_active());

        f.timeline.borrow_mut().advance(1.0);
        assert_relative_eq!(screen.loading_label().get(), 0.0);
        assert_relative_eq!(screen.start_label().get(), 1.0);
        assert_relative_eq!(screen.zone().border().alpha.get(), 0.3);

        assert!(screen.zone().interact());
        assert!(!screen.zone().is_active());
        assert!(screen.signal().take());
        assert!(!screen.signal().take());

        f.timeline.borrow_mut().advance(1.0);
        assert_relative_eq!(screen.start_label().get(), 0.0);
        assert_relative_eq!(screen.zone().border().progress.get(), 0.0);
    }

    #[test]
    fn test_detach_stops_listening() {
        let mut f = fixture();
        let screen =
            StartingScreen::new(&mut f.scene, &mut f.areas, &f.loader, &f.timeline).unwrap();
        screen.detach(&f.loader);

        f.loader.submit(vec![AssetDescriptor::new("a", "a.png")]);
        f.parked.borrow_mut().pop().unwrap().complete(AssetPayload::Failed("x".into()));
        f.loader.pump();

        assert!(!screen.zone().is_active());
        assert_relative_eq!(screen.zone().border().load_progress.get(), 1.0);
    }
}
