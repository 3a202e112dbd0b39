use crate::geometry::{avatar_bounds, avatar_half_extent, BoundingBox, BoundsPolicy, Position};
use crate::input::Direction;
use crate::EngineConfig;

/// Owns the avatar position and applies one clamped step per input.
#[derive(Debug, Clone)]
pub struct MovementController {
    position: Position,
    bounds: BoundsPolicy,
    step_px: i32,
    scale: i32,
}

impl MovementController {
    pub fn new(config: &EngineConfig) -> Self {
        let config = config.normalized();
        let bounds = BoundsPolicy::new(config.walkable, avatar_half_extent(config.scale));
        Self {
            position: bounds.clamp(config.initial_position),
            bounds,
            step_px: config.step_px(),
            scale: config.scale,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn bounds_policy(&self) -> &BoundsPolicy {
        &self.bounds
    }

    pub fn avatar_bounds(&self) -> BoundingBox {
        avatar_bounds(self.position, self.scale)
    }

    /// Returns `true` when the position changed. A step into a boundary the
    /// avatar already sits on leaves the position untouched.
    pub fn step(&mut self, direction: Direction) -> bool {
        let (dx, dy) = direction.unit();
        let candidate = Position {
            x: self.position.x.saturating_add(dx * self.step_px),
            y: self.position.y.saturating_add(dy * self.step_px),
        };
        let next = self.bounds.clamp(candidate);
        if next == self.position {
            return false;
        }
        self.position = next;
        true
    }
}
