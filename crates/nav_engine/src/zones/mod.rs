mod catalog;
mod registry;
mod types;

pub use catalog::{
    default_catalog, default_zone_specs, CatalogError, ZoneCatalog, ZoneSpec, ZoneSpecError,
    CREATE_DRUG_ZONE_ID, LOGOUT_ZONE_ID, PHARMACY_ZONE_ID, PROFILE_ZONE_ID,
};
pub use registry::{VisibleZones, ZoneRegistry};
pub use types::{Role, Visibility, Zone, ZoneAction, ZoneEffect, ADMIN_ROLE_CLAIM};
