use std::slice;

use super::catalog::{default_catalog, ZoneCatalog};
use super::types::{Role, Zone};

/// Fixed zone catalog, established once per mounted engine.
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
}

impl ZoneRegistry {
    pub fn new(catalog: ZoneCatalog) -> Self {
        Self {
            zones: catalog.into_zones(),
        }
    }

    pub fn home_screen() -> Self {
        Self::new(default_catalog())
    }

    /// Catalog filtered by role visibility, in declaration order. The sequence
    /// is lazy; calling again (or cloning) restarts it.
    pub fn zones_for(&self, role: Role) -> VisibleZones<'_> {
        VisibleZones {
            inner: self.zones.iter(),
            role,
        }
    }

    pub fn visible_zone(&self, id: &str, role: Role) -> Option<&Zone> {
        self.zones_for(role).find(|zone| zone.id == id)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct VisibleZones<'a> {
    inner: slice::Iter<'a, Zone>,
    role: Role,
}

impl<'a> Iterator for VisibleZones<'a> {
    type Item = &'a Zone;

    fn next(&mut self) -> Option<Self::Item> {
        let role = self.role;
        self.inner.find(|zone| zone.visible_for(role))
    }
}
