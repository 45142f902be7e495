//! Reveal sequencer
//!
//! [`Reveal::go`] schedules the choreography that takes the scene from its
//! loading look to fully visible. [`Reveal::tick`] runs on every clock tick,
//! before and after `go`: it samples the timeline and then pushes the two
//! progress values to their targets, each only when it changed since the last
//! push.
//!
//! Schedule, relative to `go`:
//!
//! | target                  | from → to | duration | delay |
//! |-------------------------|-----------|----------|-------|
//! | matcap progress         | 0 → 1     | 3        | 0     |
//! | floor shadow progress   | 0 → 1     | 3        | 0.5   |
//! | ambient shadow alpha    | 0 → 0.5   | 3        | 0.5   |
//! | instructions label      | 0 → 1     | 0.3      | 0.5   |
//! | other instructions      | 0 → 1     | 0.3      | 0.75  |
//! | master volume (ease-in) | 0 → 0.7   | 0.5      | 0.3   |
//!
//! One-shots: the chassis sleeps at the start position immediately and wakes
//! at 0.3; the `reveal` sound plays at 0.4, as does the touch overlay reveal.

use crate::audio::Sounds;
use crate::foundation::math::Vec3;
use crate::input::Controls;
use crate::physics::PhysicsWorld;
use crate::tween::{Ease, Param, Timeline, Tween};
use crate::world::materials::Materials;
use crate::world::objects::Objects;
use crate::world::WorldError;
use std::cell::RefCell;
use std::rc::Rc;

/// Chassis position while the reveal plays
pub const CAR_START: [f32; 3] = [0.0, 0.0, 12.0];

/// Subsystems the reveal drives
pub struct RevealTargets {
    /// Shade materials receiving the matcap progress
    pub materials: Rc<RefCell<Materials>>,
    /// Objects owning the floor shadows
    pub objects: Rc<RefCell<Objects>>,
    /// Ambient shadow alpha
    pub shadows_alpha: Param,
    /// Intro instructions label opacity, if the intro exists
    pub instructions_label: Option<Param>,
    /// Second intro label opacity, if present
    pub other_instructions_label: Option<Param>,
    /// Physics world holding the chassis
    pub physics: Rc<RefCell<PhysicsWorld>>,
    /// Sounds for the volume fade and the reveal sound
    pub sounds: Rc<RefCell<Sounds>>,
    /// Controls, for the touch overlay
    pub controls: Rc<RefCell<Controls>>,
}

/// Progress values and the values last pushed to the targets
#[derive(Debug, Clone, Default)]
pub struct RevealState {
    /// Matcap reveal progress
    pub matcap_progress: Param,
    /// Floor shadow reveal progress
    pub floor_shadow_progress: Param,
    /// Matcap progress last pushed, `None` before the first push
    pub previous_matcap_progress: Option<f32>,
    /// Floor shadow progress last pushed, `None` before the first push
    pub previous_floor_shadow_progress: Option<f32>,
}

/// How many times each progress was pushed to its targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyCounts {
    /// Pushes to the shade materials
    pub matcap: u32,
    /// Pushes to the floor shadows
    pub floor_shadow: u32,
}

/// Reveal sequencer
pub struct Reveal {
    state: RevealState,
    targets: RevealTargets,
    timeline: Timeline,
    started: bool,
    trace: bool,
    applied: ApplyCounts,
}

impl Reveal {
    /// Create the sequencer; nothing moves until [`Reveal::go`]
    pub fn new(targets: RevealTargets, trace: bool) -> Self {
        Self {
            state: RevealState::default(),
            targets,
            timeline: Timeline::new(),
            started: false,
            trace,
            applied: ApplyCounts::default(),
        }
    }

    /// Schedule the reveal; only the first call does anything
    pub fn go(&mut self) -> Result<(), WorldError> {
        if self.started {
            log::warn!("Reveal already started, ignoring");
            return Err(WorldError::RevealAlreadyStarted);
        }
        self.started = true;
        log::info!("Revealing world");

        let timeline = &mut self.timeline;
        let targets = &self.targets;

        timeline.from_to(Tween::new(0.0, 1.0, 3.0), self.state.matcap_progress.setter());
        timeline.from_to(
            Tween::new(0.0, 1.0, 3.0).with_delay(0.5),
            self.state.floor_shadow_progress.setter(),
        );
        timeline.from_to(Tween::new(0.0, 0.5, 3.0).with_delay(0.5), targets.shadows_alpha.setter());

        if let Some(label) = &targets.instructions_label {
            timeline.from_to(Tween::new(0.0, 1.0, 0.3).with_delay(0.5), label.setter());
            if let Some(other) = &targets.other_instructions_label {
                timeline.from_to(Tween::new(0.0, 1.0, 0.3).with_delay(0.75), other.setter());
            }
        }

        {
            let mut physics = targets.physics.borrow_mut();
            let chassis = physics.chassis_mut();
            chassis.sleep();
            chassis.set_position(Vec3::from(CAR_START));
        }
        let physics = Rc::clone(&targets.physics);
        timeline.call_after(0.3, move || physics.borrow_mut().chassis_mut().wake_up());

        let volume = targets.sounds.borrow().master_volume().clone();
        timeline.from_to(
            Tween::new(0.0, 0.7, 0.5).with_delay(0.3).with_ease(Ease::CubicIn),
            volume.setter(),
        );
        let sounds = Rc::clone(&targets.sounds);
        timeline.call_after(0.4, move || {
            sounds.borrow_mut().play("reveal");
        });

        if targets.controls.borrow().touch().is_some() {
            let controls = Rc::clone(&targets.controls);
            timeline.call_after(0.4, move || {
                if let Some(touch) = controls.borrow_mut().touch_mut() {
                    touch.reveal();
                }
            });
        }

        Ok(())
    }

    /// Per-tick step: sample the timeline, then push changed progress values
    pub fn tick(&mut self, delta: f32) {
        self.timeline.advance(delta);
        self.apply();
    }

    /// Push each progress to its targets if it changed since the last push
    ///
    /// Returns which of the two were pushed.
    pub fn apply(&mut self) -> (bool, bool) {
        let matcap = self.state.matcap_progress.get();
        let push_matcap = self.state.previous_matcap_progress != Some(matcap);
        if push_matcap {
            for shade in self.targets.materials.borrow_mut().shades_mut() {
                shade.set_reveal_progress(matcap);
            }
            self.state.previous_matcap_progress = Some(matcap);
            self.applied.matcap += 1;
        }

        let floor_shadow = self.state.floor_shadow_progress.get();
        let push_floor_shadow = self.state.previous_floor_shadow_progress != Some(floor_shadow);
        if push_floor_shadow {
            for shadow in self.targets.objects.borrow_mut().floor_shadows_mut() {
                shadow.set_alpha(floor_shadow);
            }
            self.state.previous_floor_shadow_progress = Some(floor_shadow);
            self.applied.floor_shadow += 1;
        }

        if self.trace && (push_matcap || push_floor_shadow) {
            log::trace!("Reveal matcap {:.4} floor shadows {:.4}", matcap, floor_shadow);
        }
        (push_matcap, push_floor_shadow)
    }

    /// Progress values and last pushed values
    pub fn state(&self) -> &RevealState {
        &self.state
    }

    /// Current matcap progress
    pub fn matcap_progress(&self) -> f32 {
        self.state.matcap_progress.get()
    }

    /// Current floor shadow progress
    pub fn floor_shadow_progress(&self) -> f32 {
        self.state.floor_shadow_progress.get()
    }

    /// True once [`Reveal::go`] ran
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// True once started and every scheduled step has completed
    pub fn is_settled(&self) -> bool {
        self.started && self.timeline.is_idle()
    }

    /// Push counters
    pub fn apply_counts(&self) -> ApplyCounts {
        self.applied
    }
}
