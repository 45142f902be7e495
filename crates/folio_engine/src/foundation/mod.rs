//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Frame clock and timers
//! - Viewport size tracking
//! - Logging utilities

pub mod math;
pub mod time;
pub mod sizes;
pub mod logging;
