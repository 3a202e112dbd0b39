mod bounds;

use serde::{Deserialize, Serialize};

pub use bounds::BoundsPolicy;

/// Half-extent of the avatar box at scale 1.
pub const AVATAR_BASE_HALF_EXTENT_PX: i32 = 24;

/// Pixel-space point. y grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
}

impl Dimensions {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_positive(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Axis-aligned box in pixel space. `right` and `bottom` are exclusive edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingBox {
    pub fn from_center(center: Position, half_extent: i32) -> Self {
        Self {
            left: center.x.saturating_sub(half_extent),
            top: center.y.saturating_sub(half_extent),
            right: center.x.saturating_add(half_extent),
            bottom: center.y.saturating_add(half_extent),
        }
    }

    pub fn from_origin(origin: Position, dimensions: Dimensions) -> Self {
        Self {
            left: origin.x,
            top: origin.y,
            right: origin.x.saturating_add(dimensions.width),
            bottom: origin.y.saturating_add(dimensions.height),
        }
    }

    /// Open-interval overlap: boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

pub fn avatar_half_extent(scale: i32) -> i32 {
    AVATAR_BASE_HALF_EXTENT_PX.saturating_mul(scale.max(1))
}

pub fn avatar_bounds(position: Position, scale: i32) -> BoundingBox {
    BoundingBox::from_center(position, avatar_half_extent(scale))
}
