use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::geometry::{Dimensions, Position};
use crate::sprite_keys::{validate_sprite_key, SpriteKeyError};

use super::types::{Visibility, Zone, ZoneAction, ZoneEffect};

pub const PROFILE_ZONE_ID: &str = "profile-zone";
pub const PHARMACY_ZONE_ID: &str = "pharmacy-zone";
pub const LOGOUT_ZONE_ID: &str = "logout-zone";
pub const CREATE_DRUG_ZONE_ID: &str = "create-drug-zone";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read zone catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("zone catalog is not valid at '{json_path}': {source}")]
    Parse {
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoneSpecError {
    #[error("zone id must not be empty")]
    EmptyId,
    #[error("zone id '{id}' is declared more than once")]
    DuplicateId { id: String },
    #[error("zone '{id}' has non-positive dimensions {width}x{height}")]
    NonPositiveDimensions { id: String, width: i32, height: i32 },
    #[error("zone '{id}' has an invalid asset key: {source}")]
    InvalidAsset {
        id: String,
        #[source]
        source: SpriteKeyError,
    },
    #[error("zone '{id}' navigates to an empty path")]
    EmptyPath { id: String },
    #[error("zone entry {index} could not be decoded at '{json_path}': {message}")]
    Malformed {
        index: usize,
        json_path: String,
        message: String,
    },
}

/// Declarative zone description as it appears in catalog JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub id: String,
    pub position: Position,
    pub dimensions: Dimensions,
    pub asset: String,
    pub label: String,
    pub effect: ZoneEffect,
    #[serde(default)]
    pub visible_for: Visibility,
}

impl ZoneSpec {
    fn into_zone(self) -> Result<Zone, ZoneSpecError> {
        if self.id.trim().is_empty() {
            return Err(ZoneSpecError::EmptyId);
        }
        if !self.dimensions.is_positive() {
            return Err(ZoneSpecError::NonPositiveDimensions {
                id: self.id,
                width: self.dimensions.width,
                height: self.dimensions.height,
            });
        }
        if let Err(source) = validate_sprite_key(&self.asset) {
            return Err(ZoneSpecError::InvalidAsset {
                id: self.id,
                source,
            });
        }
        if let ZoneEffect::Navigate(path) = &self.effect {
            if path.trim().is_empty() {
                return Err(ZoneSpecError::EmptyPath { id: self.id });
            }
        }
        Ok(Zone {
            id: self.id,
            position: self.position,
            dimensions: self.dimensions,
            asset: self.asset,
            label: self.label,
            effect: self.effect,
            visibility: self.visible_for,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    zones: Vec<serde_json::Value>,
}

/// Validated, ordered zone list. Declaration order is preserved and is the
/// collision tie-break order.
#[derive(Debug, Clone, Default)]
pub struct ZoneCatalog {
    zones: Vec<Zone>,
    rejected: Vec<ZoneSpecError>,
}

impl ZoneCatalog {
    pub fn from_specs<I>(specs: I) -> Self
    where
        I: IntoIterator<Item = ZoneSpec>,
    {
        let mut catalog = Self::default();
        let mut seen_ids = HashSet::new();
        for spec in specs {
            catalog.admit(spec, &mut seen_ids);
        }
        catalog
    }

    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let deserializer = &mut serde_json::Deserializer::from_str(text);
        let document: CatalogDocument =
            serde_path_to_error::deserialize(deserializer).map_err(|error| CatalogError::Parse {
                json_path: error.path().to_string(),
                source: error.into_inner(),
            })?;

        let mut catalog = Self::default();
        let mut seen_ids = HashSet::new();
        for (index, entry) in document.zones.into_iter().enumerate() {
            match serde_path_to_error::deserialize::<_, ZoneSpec>(entry) {
                Ok(spec) => catalog.admit(spec, &mut seen_ids),
                Err(error) => catalog.reject(ZoneSpecError::Malformed {
                    index,
                    json_path: error.path().to_string(),
                    message: error.inner().to_string(),
                }),
            }
        }
        Ok(catalog)
    }

    pub fn load_json_file(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&text)?;
        info!(
            path = %path.display(),
            zone_count = catalog.zones.len(),
            rejected_count = catalog.rejected.len(),
            "zone_catalog_loaded"
        );
        Ok(catalog)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn rejected(&self) -> &[ZoneSpecError] {
        &self.rejected
    }

    pub(crate) fn into_zones(self) -> Vec<Zone> {
        self.zones
    }

    fn admit(&mut self, spec: ZoneSpec, seen_ids: &mut HashSet<String>) {
        if seen_ids.contains(&spec.id) {
            self.reject(ZoneSpecError::DuplicateId { id: spec.id });
            return;
        }
        match spec.into_zone() {
            Ok(zone) => {
                seen_ids.insert(zone.id.clone());
                self.zones.push(zone);
            }
            Err(error) => self.reject(error),
        }
    }

    fn reject(&mut self, error: ZoneSpecError) {
        warn!(error = %error, "zone_excluded");
        self.rejected.push(error);
    }
}

/// Home-screen layout: three zones along the top row and the admin-only
/// create-drug zone in the middle of the room.
pub fn default_zone_specs() -> Vec<ZoneSpec> {
    vec![
        ZoneSpec {
            id: PROFILE_ZONE_ID.to_string(),
            position: Position::new(96, 96),
            dimensions: Dimensions::new(160, 160),
            asset: "zones/profile".to_string(),
            label: "My Profile".to_string(),
            effect: ZoneEffect::Navigate("/profile".to_string()),
            visible_for: Visibility::Everyone,
        },
        ZoneSpec {
            id: PHARMACY_ZONE_ID.to_string(),
            position: Position::new(400, 96),
            dimensions: Dimensions::new(160, 160),
            asset: "zones/pharmacy".to_string(),
            label: "Pharmacy".to_string(),
            effect: ZoneEffect::Navigate("/drugs".to_string()),
            visible_for: Visibility::Everyone,
        },
        ZoneSpec {
            id: LOGOUT_ZONE_ID.to_string(),
            position: Position::new(704, 96),
            dimensions: Dimensions::new(160, 160),
            asset: "zones/logout".to_string(),
            label: "Logout".to_string(),
            effect: ZoneEffect::Invoke(ZoneAction::Logout),
            visible_for: Visibility::Everyone,
        },
        ZoneSpec {
            id: CREATE_DRUG_ZONE_ID.to_string(),
            position: Position::new(400, 352),
            dimensions: Dimensions::new(160, 160),
            asset: "zones/create-drug".to_string(),
            label: "Create Drug".to_string(),
            effect: ZoneEffect::Navigate("/drugs/create".to_string()),
            visible_for: Visibility::Admin,
        },
    ]
}

pub fn default_catalog() -> ZoneCatalog {
    ZoneCatalog::from_specs(default_zone_specs())
}
