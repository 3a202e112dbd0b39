//! Avatar navigation and interaction-zone engine for the PixelMed home screen.
//!
//! Keyboard input moves the avatar in fixed grid steps inside the walkable
//! area; after each burst of movement settles, the avatar box is tested against
//! the zones visible to the current role and the first overlapping zone's
//! effect is dispatched once per visit.

mod collision;
mod config;
mod geometry;
mod input;
mod interaction;
mod movement;
mod sprite_keys;
mod zones;

pub use collision::{detect, zone_at_point};
pub use config::{EngineConfig, DEBOUNCE_ENV_VAR, SCALE_ENV_VAR, STEP_CELLS_ENV_VAR};
pub use geometry::{
    avatar_bounds, avatar_half_extent, BoundingBox, BoundsPolicy, Dimensions, Position,
    AVATAR_BASE_HALF_EXTENT_PX,
};
pub use input::{Direction, InputEvent};
pub use interaction::{
    Dispatch, DispatchTrigger, InputBus, InputSubscription, InteractionCoordinator,
    InteractionStats, MountContext, Occupancy, ZoneHandler, LOGIN_ROUTE,
};
pub use movement::MovementController;
pub use sprite_keys::{validate_sprite_key, SpriteKeyError};
pub use zones::{
    default_catalog, default_zone_specs, CatalogError, Role, Visibility, VisibleZones, Zone,
    ZoneAction, ZoneCatalog, ZoneEffect, ZoneRegistry, ZoneSpec, ZoneSpecError,
    ADMIN_ROLE_CLAIM, CREATE_DRUG_ZONE_ID, LOGOUT_ZONE_ID, PHARMACY_ZONE_ID, PROFILE_ZONE_ID,
};
