use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Width and height of a rendered node, in pixels.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn longest_side(self) -> f64 {
        self.width.max(self.height)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn center(self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// Axis-aligned rectangle in viewport coordinates.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[must_use]
    pub const fn at(x: f64, y: f64, size: Size) -> Self {
        Self::new(x, y, size.width, size.height)
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Two rectangles are disjoint only when one lies strictly before the
    /// other on some axis; shared edges count as overlap.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.right() < other.left
            || other.right() < self.left
            || self.bottom() < other.top
            || other.bottom() < self.top)
    }

    #[must_use]
    pub fn within(&self, viewport: Viewport) -> bool {
        self.left >= 0.0
            && self.top >= 0.0
            && self.right() <= viewport.width
            && self.bottom() <= viewport.height
    }
}

/// Where a blurb is in its show/fade/remove cycle.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Pending,
    Active,
    FadingOut,
    Removed,
}

impl LifecycleState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::FadingOut => "fading_out",
            Self::Removed => "removed",
        }
    }

    /// Whether `next` is the single legal successor of `self`.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Active)
                | (Self::Active, Self::FadingOut)
                | (Self::FadingOut, Self::Removed)
        )
    }
}

impl Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
