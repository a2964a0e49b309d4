//! bottompin Core
//!
//! Platform-agnostic "always-on-bottom" pinning for a single window.
//!
//! This crate implements the corrective maintenance loop where:
//! - The window's stacking depth and geometry are polled on a fixed interval
//! - Any drift from the last enforced state triggers one placement call
//! - The placement sends the window to the bottom of the z-order without
//!   activating it, applying whichever geometry fields were constrained
//!
//! The OS windowing primitives are abstracted behind [`WindowSystem`] so the
//! controller can be driven by the Win32 backend or by a test double.

pub mod controller;
pub mod geometry;
pub mod system;

pub use controller::{PinController, PinOptions, PinState, DEFAULT_POLL_INTERVAL};
pub use geometry::{Geometry, Rect};
pub use system::{
    ExtendedStyle, Placement, PlacementFlags, WindowId, WindowStyle, WindowSystem,
    WindowSystemError, ZOrder,
};
