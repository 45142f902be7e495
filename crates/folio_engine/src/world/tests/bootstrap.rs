use super::{Harness, STEP};
use crate::assets::LoaderEventKind;
use crate::config::WorldConfig;
use crate::foundation::math::Vec2;
use crate::input::KeyCode;
use crate::scene::SceneError;
use crate::world::{BootstrapPhase, WorldError, WorldPhase};
use std::rc::Rc;

#[test]
fn test_eager_phase_order_and_gate() {
    let h = Harness::new(WorldConfig::default());
    let eager: Vec<_> = h.world.construction_log().iter().map(|(_, name)| *name).collect();
    assert_eq!(eager, ["sounds", "controls", "floor", "areas", "starting_screen"]);
    assert!(h.world.construction_log().iter().all(|(phase, _)| *phase == BootstrapPhase::Eager));

    assert_eq!(h.world.phase(), WorldPhase::Gated);
    assert!(h.world.deferred().is_none());
    assert!(h.world.scene().is_in_scene(h.world.floor().container()));
    assert!(h.world.scene().is_in_scene(h.world.starting_screen().container()));
}

#[test]
fn test_nothing_starts_before_interaction() {
    let mut h = Harness::new(WorldConfig::default());
    h.submit();
    h.complete_all();
    h.frames(40);

    assert!(h.world.starting_screen().zone().is_active());
    assert_eq!(h.world.phase(), WorldPhase::Gated);
    assert!(h.world.deferred().is_none());
}

#[test]
fn test_interaction_ignored_while_loading() {
    let mut h = Harness::new(WorldConfig::default());
    h.submit();
    h.frames(2);

    assert!(!h.world.interact_at(Vec2::zeros()).unwrap());
    assert_eq!(h.world.phase(), WorldPhase::Gated);
}

#[test]
fn test_deferred_phase_order() {
    let mut h = Harness::new(WorldConfig::default());
    h.open_gate();

    let deferred: Vec<_> = h
        .world
        .construction_log()
        .iter()
        .filter(|(phase, _)| *phase == BootstrapPhase::Deferred)
        .map(|(_, name)| *name)
        .collect();
    assert_eq!(
        deferred,
        [
            "materials",
            "shadows",
            "physics",
            "zones",
            "objects",
            "car",
            "tiles",
            "walls",
            "sections",
            "easter_eggs",
            "reveal"
        ]
    );
    assert_eq!(h.world.phase(), WorldPhase::Revealing);
    assert!(h.world.areas().borrow().has_car());
    for container in h.world.containers() {
        assert!(h.world.scene().is_in_scene(container));
    }
}

#[test]
fn test_second_start_is_rejected() {
    let mut h = Harness::new(WorldConfig::default());
    h.open_gate();

    let materials = Rc::clone(&h.world.deferred().unwrap().materials);
    let car = Rc::clone(&h.world.deferred().unwrap().car);
    let subscribers = h.clock.subscriber_count();
    let log_len = h.world.construction_log().len();

    assert!(matches!(h.world.start(), Err(WorldError::AlreadyStarted)));

    let deferred = h.world.deferred().unwrap();
    assert!(Rc::ptr_eq(&materials, &deferred.materials));
    assert!(Rc::ptr_eq(&car, &deferred.car));
    assert_eq!(h.clock.subscriber_count(), subscribers);
    assert_eq!(h.world.construction_log().len(), log_len);
}

#[test]
fn test_start_waits_for_the_gate() {
    let mut h = Harness::new(WorldConfig::default());
    let subscribers = h.clock.subscriber_count();

    assert!(matches!(h.world.start(), Err(WorldError::GateClosed)));

    h.submit();
    h.complete_all();
    h.frames(4);
    assert!(h.world.starting_screen().zone().is_active());
    assert!(matches!(h.world.start(), Err(WorldError::GateClosed)));

    assert_eq!(h.world.phase(), WorldPhase::Gated);
    assert!(h.world.deferred().is_none());
    assert_eq!(h.world.construction_log().len(), 5);
    assert_eq!(h.clock.subscriber_count(), subscribers);

    assert!(h.world.interact_at(Vec2::zeros()).unwrap());
    assert_eq!(h.world.phase(), WorldPhase::Revealing);
    h.frames(28);
    assert_eq!(h.world.phase(), WorldPhase::Revealed);
}

#[test]
fn test_direct_start_after_signal_still_reveals() {
    let mut h = Harness::new(WorldConfig::default());
    h.submit();
    h.complete_all();
    h.frames(4);

    assert!(h.world.starting_screen().zone().interact());
    assert!(h.world.starting_screen().signal().is_raised());
    h.world.start().unwrap();
    assert_eq!(h.world.phase(), WorldPhase::Started);
    assert!(!h.world.starting_screen().signal().is_raised());

    h.frames(1);
    assert_eq!(h.world.phase(), WorldPhase::Revealing);
    h.frames(28);
    assert_eq!(h.world.phase(), WorldPhase::Revealed);
}

#[test]
fn test_failed_start_leaves_world_untouched() {
    let mut h = Harness::new(WorldConfig::default());
    h.submit();
    h.complete_all();
    h.frames(4);

    // Link zones of the projects section register under this container
    let areas_container = h.world.areas().borrow().container();
    h.world.scene.remove(areas_container).unwrap();

    let root = h.world.scene().root();
    let root_children = h.world.scene().children(root).to_vec();
    let nodes = h.world.scene().len();
    let zones = h.world.areas().borrow().zones().len();
    let subscribers = h.clock.subscriber_count();

    let assert_untouched = |h: &Harness| {
        assert_eq!(h.world.phase(), WorldPhase::Gated);
        assert!(h.world.deferred().is_none());
        assert_eq!(h.world.construction_log().len(), 5);
        assert_eq!(h.world.scene().children(root), root_children.as_slice());
        assert_eq!(h.world.scene().len(), nodes);
        assert_eq!(h.world.areas().borrow().zones().len(), zones);
        assert!(!h.world.areas().borrow().has_car());
        assert_eq!(h.clock.subscriber_count(), subscribers);
    };

    let result = h.world.interact_at(Vec2::zeros());
    assert!(matches!(result, Err(WorldError::Scene(SceneError::UnknownNode(_)))));
    assert_untouched(&h);
    assert!(h.world.starting_screen().signal().is_raised());

    // A retry rebuilds from scratch instead of stacking on the first attempt
    assert!(matches!(h.world.start(), Err(WorldError::Scene(_))));
    assert_untouched(&h);
}

#[test]
fn test_reveal_needs_start() {
    let mut h = Harness::new(WorldConfig::default());
    assert!(matches!(h.world.reveal_go(), Err(WorldError::NotStarted)));
}

#[test]
fn test_camera_pan_enabled_after_start() {
    let mut h = Harness::new(WorldConfig::default());
    h.open_gate();
    assert!(!h.world.camera().borrow().is_pan_enabled());

    h.frames(15);
    assert!(!h.world.camera().borrow().is_pan_enabled());
    h.frames(2);
    assert!(h.world.camera().borrow().is_pan_enabled());
}

#[test]
fn test_resize_reaches_camera() {
    let h = Harness::new(WorldConfig::default());
    h.sizes.resize(1000, 500);
    approx::assert_relative_eq!(h.world.camera().borrow().aspect(), 2.0);
}

#[test]
fn test_konami_drops_lemons_after_start() {
    let mut h = Harness::new(WorldConfig::default());
    h.open_gate();
    let sequence = crate::world::easter_eggs::KONAMI_SEQUENCE;
    for key in sequence {
        h.world.key(key, true).unwrap();
        h.world.key(key, false).unwrap();
    }
    assert!(h.world.deferred().unwrap().easter_eggs.borrow().lemons_dropped());
    assert!(!h.world.key(KeyCode::Enter, true).unwrap());
}

#[test]
fn test_destroy_unsubscribes_and_detaches() {
    let mut h = Harness::new(WorldConfig::default());
    h.open_gate();
    let containers = h.world.containers();
    assert!(h.clock.subscriber_count() > 0);

    h.world.destroy().unwrap();
    assert_eq!(h.clock.subscriber_count(), 0);
    assert_eq!(h.loader.borrow().events().subscriber_count(LoaderEventKind::End), 0);
    assert_eq!(h.loader.borrow().events().subscriber_count(LoaderEventKind::Progress), 0);
    for container in containers {
        assert!(!h.world.scene().is_in_scene(container));
    }

    let frame = h.clock.frame();
    h.world.frame(STEP).unwrap();
    assert_eq!(h.clock.frame(), frame);
}
