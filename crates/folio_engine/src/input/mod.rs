//! Input management
//!
//! [`Controls`] folds key presses into a held [`Actions`] set and re-emits raw
//! key events for listeners such as the easter eggs. Touch devices get an
//! extra [`TouchControls`] overlay that stays hidden until the reveal.

use crate::events::{Event, EventEmitter, SubscriptionId};
use bitflags::bitflags;

bitflags! {
    /// Driving actions currently held
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Actions: u8 {
        /// Accelerate
        const UP = 1 << 0;
        /// Reverse
        const DOWN = 1 << 1;
        /// Steer left
        const LEFT = 1 << 2;
        /// Steer right
        const RIGHT = 1 << 3;
        /// Brake
        const BRAKE = 1 << 4;
        /// Boost
        const BOOST = 1 << 5;
    }
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A key
    A,
    /// B key
    B,
    /// D key
    D,
    /// H key
    H,
    /// M key
    M,
    /// S key
    S,
    /// W key
    W,
    /// Z key
    Z,
    /// Q key
    Q,
    /// Space bar
    Space,
    /// Enter key
    Enter,
    /// Shift key
    Shift,
    /// Escape key
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

impl KeyCode {
    /// Driving action bound to this key (arrows, WASD and ZQSD)
    pub fn action(self) -> Option<Actions> {
        match self {
            Self::Up | Self::W | Self::Z => Some(Actions::UP),
            Self::Down | Self::S => Some(Actions::DOWN),
            Self::Left | Self::A | Self::Q => Some(Actions::LEFT),
            Self::Right | Self::D => Some(Actions::RIGHT),
            Self::Space => Some(Actions::BRAKE),
            Self::Shift => Some(Actions::BOOST),
            _ => None,
        }
    }
}

/// Raw key notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Key went down
    KeyDown(KeyCode),
    /// Key went up
    KeyUp(KeyCode),
}

/// Kinds of [`ControlEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlEventKind {
    /// [`ControlEvent::KeyDown`]
    KeyDown,
    /// [`ControlEvent::KeyUp`]
    KeyUp,
}

impl Event for ControlEvent {
    type Kind = ControlEventKind;

    fn kind(&self) -> ControlEventKind {
        match self {
            Self::KeyDown(_) => ControlEventKind::KeyDown,
            Self::KeyUp(_) => ControlEventKind::KeyUp,
        }
    }
}

/// On-screen joystick and buttons for touch devices
#[derive(Debug, Default)]
pub struct TouchControls {
    revealed: bool,
}

impl TouchControls {
    /// Fade the touch overlay in
    pub fn reveal(&mut self) {
        if !self.revealed {
            log::debug!("Revealing touch controls");
        }
        self.revealed = true;
    }

    /// True once revealed
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }
}

/// Keyboard and touch controls
pub struct Controls {
    actions: Actions,
    touch: Option<TouchControls>,
    events: EventEmitter<ControlEvent>,
}

impl Controls {
    /// Create controls, with the touch overlay when `touch` is set
    pub fn new(touch: bool) -> Self {
        log::debug!("Creating Controls (touch: {})", touch);
        Self {
            actions: Actions::empty(),
            touch: touch.then(TouchControls::default),
            events: EventEmitter::new(),
        }
    }

    /// Feed a key transition
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if let Some(action) = key.action() {
            self.actions.set(action, pressed);
        }
        let event = if pressed {
            ControlEvent::KeyDown(key)
        } else {
            ControlEvent::KeyUp(key)
        };
        self.events.emit(&event);
    }

    /// Release every held action
    pub fn release_all(&mut self) {
        self.actions = Actions::empty();
    }

    /// Actions currently held
    pub fn actions(&self) -> Actions {
        self.actions
    }

    /// Switch to touch mode; returns false if it already was
    pub fn enable_touch(&mut self) -> bool {
        if self.touch.is_some() {
            return false;
        }
        log::info!("Touch controls enabled");
        self.touch = Some(TouchControls::default());
        true
    }

    /// Touch overlay, present in touch mode
    pub fn touch(&self) -> Option<&TouchControls> {
        self.touch.as_ref()
    }

    /// Mutable touch overlay
    pub fn touch_mut(&mut self) -> Option<&mut TouchControls> {
        self.touch.as_mut()
    }

    /// Subscribe to raw key events
    pub fn on<F>(&self, kind: ControlEventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&ControlEvent) + 'static,
    {
        self.events.on(kind, handler)
    }

    /// Remove a key event subscription
    pub fn off(&self, subscription: SubscriptionId) -> bool {
        self.events.off(subscription)
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_keys_fold_into_actions() {
        let mut controls = Controls::new(false);
        controls.handle_key(KeyCode::W, true);
        controls.handle_key(KeyCode::Left, true);
        assert_eq!(controls.actions(), Actions::UP | Actions::LEFT);

        controls.handle_key(KeyCode::W, false);
        assert_eq!(controls.actions(), Actions::LEFT);

        controls.release_all();
        assert!(controls.actions().is_empty());
    }

    #[test]
    fn test_key_events_are_emitted() {
        let mut controls = Controls::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        controls.on(ControlEventKind::KeyDown, move |event| sink.borrow_mut().push(*event));

        controls.handle_key(KeyCode::Enter, true);
        controls.handle_key(KeyCode::Enter, false);

        assert_eq!(*seen.borrow(), vec![ControlEvent::KeyDown(KeyCode::Enter)]);
    }

    #[test]
    fn test_touch_enabled_once() {
        let mut controls = Controls::new(false);
        assert!(controls.touch().is_none());
        assert!(controls.enable_touch());
        assert!(!controls.enable_touch());

        controls.touch_mut().unwrap().reveal();
        assert!(controls.touch().unwrap().is_revealed());
    }
}
