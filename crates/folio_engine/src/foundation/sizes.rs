//! Viewport size tracking

use crate::events::{Event, EventEmitter, SubscriptionId};
use std::cell::Cell;

/// Viewport dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Width over height, 1.0 for a degenerate viewport
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Resize notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resized(pub Viewport);

/// Kind of [`Resized`] events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeKind {
    /// Viewport changed size
    Resize,
}

impl Event for Resized {
    type Kind = ResizeKind;

    fn kind(&self) -> ResizeKind {
        ResizeKind::Resize
    }
}

/// Current viewport size plus resize notifications
pub struct Sizes {
    viewport: Cell<Viewport>,
    events: EventEmitter<Resized>,
}

impl Sizes {
    /// Create a tracker with an initial viewport
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Cell::new(Viewport { width, height }),
            events: EventEmitter::new(),
        }
    }

    /// Current viewport
    pub fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    /// Record a new size and notify subscribers if it changed
    pub fn resize(&self, width: u32, height: u32) {
        let viewport = Viewport { width, height };
        if viewport == self.viewport.get() {
            return;
        }
        self.viewport.set(viewport);
        log::debug!("Viewport resized to {}x{}", width, height);
        self.events.emit(&Resized(viewport));
    }

    /// Subscribe to resize notifications
    pub fn on_resize<F>(&self, handler: F) -> SubscriptionId
    where
        F: FnMut(&Resized) + 'static,
    {
        self.events.on(ResizeKind::Resize, handler)
    }

    /// Remove a resize subscription
    pub fn off_resize(&self, subscription: SubscriptionId) -> bool {
        self.events.off(subscription)
    }
}

impl Default for Sizes {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}
