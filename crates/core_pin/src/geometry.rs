//! Window rectangles and partially constrained target geometry.

use serde::{Deserialize, Serialize};

/// A rectangle in screen coordinates (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a rectangle from edge coordinates, as reported by `GetWindowRect`.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }
}

/// Target geometry for a pinned window.
///
/// Each field is independently optional. `None` means the field is
/// unconstrained: whatever value the window currently has is accepted and
/// passed through unchanged when a correction is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    /// Left edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    /// Top edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    /// Outer width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    /// Outer height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
}

impl Geometry {
    /// Geometry with every field unconstrained. Only stacking drift will
    /// trigger corrections.
    pub fn unconstrained() -> Self {
        Self::default()
    }

    pub fn with_x(mut self, x: i32) -> Self {
        self.x = Some(x);
        self
    }

    pub fn with_y(mut self, y: i32) -> Self {
        self.y = Some(y);
        self
    }

    pub fn with_width(mut self, width: i32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: i32) -> Self {
        self.height = Some(height);
        self
    }

    /// Whether no field is constrained.
    pub fn is_unconstrained(&self) -> bool {
        !self.constrains_position() && !self.constrains_size()
    }

    /// Whether either of `x` / `y` is constrained.
    pub fn constrains_position(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }

    /// Whether either of `width` / `height` is constrained.
    pub fn constrains_size(&self) -> bool {
        self.width.is_some() || self.height.is_some()
    }

    /// Check every constrained field against the window's current rectangle.
    ///
    /// Height is compared against the current `bottom - top`.
    pub fn matches(&self, current: &Rect) -> bool {
        fn field_ok(target: Option<i32>, actual: i32) -> bool {
            target.map_or(true, |t| t == actual)
        }

        field_ok(self.x, current.x)
            && field_ok(self.y, current.y)
            && field_ok(self.width, current.width)
            && field_ok(self.height, current.height)
    }

    /// Resolve against the current rectangle: constrained fields win,
    /// unconstrained fields keep the current value.
    pub fn resolve(&self, current: &Rect) -> Rect {
        Rect {
            x: self.x.unwrap_or(current.x),
            y: self.y.unwrap_or(current.y),
            width: self.width.unwrap_or(current.width),
            height: self.height.unwrap_or(current.height),
        }
    }
}
