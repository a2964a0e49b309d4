//! OS windowing capability consumed by the controller.
//!
//! The controller never talks to the OS directly. A backend (Win32 in
//! production, an in-memory fake in tests) implements [`WindowSystem`].

use crate::geometry::{Geometry, Rect};
use thiserror::Error;

/// Unique identifier for a window.
/// On Windows, this is the HWND cast to u64.
pub type WindowId = u64;

/// Errors reported by a [`WindowSystem`] backend.
///
/// The pinning loop never surfaces these to its caller; they only decide
/// whether an iteration is skipped and are logged.
#[derive(Debug, Error)]
pub enum WindowSystemError {
    #[error("Window {0:#x} is not a valid window")]
    InvalidWindow(WindowId),

    #[error("Failed to query window state: {0}")]
    QueryFailed(String),

    #[error("Failed to set window position: {0}")]
    SetPositionFailed(String),

    #[error("Failed to set window style: {0}")]
    SetStyleFailed(String),
}

/// Where a placement inserts the window in the stacking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    /// The logical bottom of the stacking order (`HWND_BOTTOM`).
    Bottom,
}

/// Flags accompanying a placement call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementFlags {
    /// Show the window.
    pub show: bool,
    /// Do not activate the window or steal focus.
    pub no_activate: bool,
    /// Keep the current position, ignoring `rect.x` / `rect.y`.
    pub no_move: bool,
    /// Keep the current size, ignoring `rect.width` / `rect.height`.
    pub no_size: bool,
}

/// A single atomic reposition/restack request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub insert_after: ZOrder,
    pub rect: Rect,
    pub flags: PlacementFlags,
}

impl Placement {
    /// Build the bottom-of-stack correction for `target` given the window's
    /// current rectangle.
    ///
    /// The rect always carries fully resolved values. `no_move` / `no_size`
    /// are only set when the whole pair is unconstrained.
    pub fn to_bottom(target: &Geometry, current: &Rect) -> Self {
        Self {
            insert_after: ZOrder::Bottom,
            rect: target.resolve(current),
            flags: PlacementFlags {
                show: true,
                no_activate: true,
                no_move: !target.constrains_position(),
                no_size: !target.constrains_size(),
            },
        }
    }
}

/// Extended window styles the controller may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedStyle {
    /// Tool window: excluded from the taskbar and Alt-Tab (`WS_EX_TOOLWINDOW`).
    ToolWindow,
}

/// Base window styles the controller may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStyle {
    /// No caption, border or system menu.
    Bare,
}

/// Capability interface over the OS windowing primitives.
///
/// Implementations must be callable from any thread. Calls are expected to
/// be fast and non-blocking; the controller never awaits across them.
pub trait WindowSystem: Send + Sync + 'static {
    /// Number of windows encountered walking the stacking order from
    /// `window` downward, counting `window` itself.
    fn stacking_depth(&self, window: WindowId) -> Result<usize, WindowSystemError>;

    /// Current outer rectangle of `window` in screen coordinates.
    fn window_rect(&self, window: WindowId) -> Result<Rect, WindowSystemError>;

    /// Reposition and restack `window` in one call.
    fn set_placement(
        &self,
        window: WindowId,
        placement: &Placement,
    ) -> Result<(), WindowSystemError>;

    /// Replace the extended style of `window`.
    fn set_extended_style(
        &self,
        window: WindowId,
        style: ExtendedStyle,
    ) -> Result<(), WindowSystemError>;

    /// Replace the base style of `window`.
    fn set_style(&self, window: WindowId, style: WindowStyle) -> Result<(), WindowSystemError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_unconstrained_keeps_position_and_size() {
        let current = Rect::new(10, 20, 300, 400);
        let placement = Placement::to_bottom(&Geometry::unconstrained(), &current);
        assert_eq!(placement.insert_after, ZOrder::Bottom);
        assert_eq!(placement.rect, current);
        assert!(placement.flags.show);
        assert!(placement.flags.no_activate);
        assert!(placement.flags.no_move);
        assert!(placement.flags.no_size);
    }

    #[test]
    fn test_placement_partial_constraints() {
        let current = Rect::new(50, 50, 300, 400);
        let target = Geometry::unconstrained().with_x(100).with_width(200);
        let placement = Placement::to_bottom(&target, &current);
        assert_eq!(placement.rect, Rect::new(100, 50, 200, 400));
        assert!(!placement.flags.no_move);
        assert!(!placement.flags.no_size);
    }

    #[test]
    fn test_placement_position_only() {
        let current = Rect::new(0, 0, 640, 480);
        let placement = Placement::to_bottom(&Geometry::unconstrained().with_y(30), &current);
        assert!(!placement.flags.no_move);
        assert!(placement.flags.no_size);
        assert_eq!(placement.rect, Rect::new(0, 30, 640, 480));
    }

    #[test]
    fn test_error_display() {
        let err = WindowSystemError::InvalidWindow(0x1a2b);
        assert_eq!(err.to_string(), "Window 0x1a2b is not a valid window");
    }
}
