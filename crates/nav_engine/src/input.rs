use crate::geometry::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Maps a key name (DOM `key` or physical key code spelling) to a direction.
    /// Anything else is `None` and is ignored by the engine.
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowUp" | "KeyW" => Some(Direction::Up),
            "ArrowDown" | "KeyS" => Some(Direction::Down),
            "ArrowLeft" | "KeyA" => Some(Direction::Left),
            "ArrowRight" | "KeyD" => Some(Direction::Right),
            _ => None,
        }
    }

    pub(crate) const fn unit(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Discrete input delivered to a mounted engine through the
/// [`InputBus`](crate::InputBus).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(String),
    /// Pointer press at a pixel-space point.
    PointerClick(Position),
    /// Press on a rendered zone sprite, identified by zone id.
    ZoneClick(String),
}

impl InputEvent {
    pub fn key(name: impl Into<String>) -> Self {
        InputEvent::Key(name.into())
    }
}
