use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Dimensions, Position};

pub const ADMIN_ROLE_CLAIM: &str = "ROLE_ADMIN";

/// Resolved privilege level. Unknown or absent claims are never elevated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn from_claim(claim: Option<&str>) -> Self {
        match claim {
            Some(ADMIN_ROLE_CLAIM) => Role::Admin,
            _ => Role::User,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Everyone,
    Admin,
}

impl Visibility {
    pub fn visible_for(self, role: Role) -> bool {
        match self {
            Visibility::Everyone => true,
            Visibility::Admin => role == Role::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneAction {
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneEffect {
    Navigate(String),
    Invoke(ZoneAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub id: String,
    pub position: Position,
    pub dimensions: Dimensions,
    pub asset: String,
    pub label: String,
    pub effect: ZoneEffect,
    pub visibility: Visibility,
}

impl Zone {
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_origin(self.position, self.dimensions)
    }

    pub fn visible_for(&self, role: Role) -> bool {
        self.visibility.visible_for(role)
    }
}
