use super::{Dimensions, Position};

/// Walkable-area clamp for the avatar center.
///
/// The limits are the walkable edges inset by the avatar half-extent. When the
/// area is narrower than the avatar on an axis, both limits collapse onto the
/// area midpoint for that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundsPolicy {
    min: Position,
    max: Position,
}

impl BoundsPolicy {
    pub fn new(walkable: Dimensions, half_extent: i32) -> Self {
        let (min_x, max_x) = inset_axis(walkable.width, half_extent);
        let (min_y, max_y) = inset_axis(walkable.height, half_extent);
        Self {
            min: Position::new(min_x, min_y),
            max: Position::new(max_x, max_y),
        }
    }

    pub fn min(&self) -> Position {
        self.min
    }

    pub fn max(&self) -> Position {
        self.max
    }

    pub fn clamp(&self, candidate: Position) -> Position {
        Position {
            x: candidate.x.clamp(self.min.x, self.max.x),
            y: candidate.y.clamp(self.min.y, self.max.y),
        }
    }

    pub fn contains(&self, position: Position) -> bool {
        self.clamp(position) == position
    }
}

fn inset_axis(length: i32, half_extent: i32) -> (i32, i32) {
    let half_extent = half_extent.max(0);
    let low = half_extent;
    let high = length.saturating_sub(half_extent);
    if high < low {
        let mid = length.max(0) / 2;
        return (mid, mid);
    }
    (low, high)
}
