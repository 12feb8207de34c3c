use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::module::{HazardZone, ResponseUnit};

/// Zones and units one planning call runs against.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    /// Hazard zones, in catalog order.
    pub zones: Vec<HazardZone>,
    /// Response units, in catalog order.
    pub units: Vec<ResponseUnit>,
}

impl Catalog {
    /// Builds a catalog from zone and unit sequences.
    #[must_use]
    pub fn new(
        zones: impl IntoIterator<Item = HazardZone>,
        units: impl IntoIterator<Item = ResponseUnit>,
    ) -> Self {
        Self {
            zones: zones.into_iter().collect(),
            units: units.into_iter().collect(),
        }
    }

    /// Number of units currently flagged available.
    #[must_use]
    pub fn available_units(&self) -> usize {
        self.units.iter().filter(|unit| unit.available()).count()
    }
}

/// Versioned catalog holder with copy-on-write updates.
///
/// Readers take an `Arc` snapshot and never observe a partially applied update.
#[derive(Debug, Default)]
pub struct CatalogStore {
    current: RwLock<Versioned>,
}

#[derive(Debug, Default)]
struct Versioned {
    version: u64,
    catalog: Arc<Catalog>,
}

impl CatalogStore {
    /// Wraps an initial catalog as version 0.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Versioned {
                version: 0,
                catalog: Arc::new(catalog),
            }),
        }
    }

    /// Current catalog.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Catalog> {
        Arc::clone(&self.current.read().catalog)
    }

    /// Current version number; bumps on every change.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.current.read().version
    }

    /// Swaps in a whole new catalog and returns the new version.
    pub fn replace(&self, catalog: Catalog) -> u64 {
        let mut guard = self.current.write();
        guard.catalog = Arc::new(catalog);
        guard.version += 1;
        guard.version
    }

    /// Inserts a unit, replacing any unit with the same id in place.
    ///
    /// Returns the new version, or `None` when an identical unit was already present.
    pub fn upsert_unit(&self, unit: ResponseUnit) -> Option<u64> {
        self.update(|catalog| upsert_by_id(&mut catalog.units, unit, ResponseUnit::id))
    }

    /// Removes a unit by id; returns the new version, or `None` when no unit matched.
    pub fn remove_unit(&self, unit_id: &str) -> Option<u64> {
        self.update(|catalog| remove_by_id(&mut catalog.units, unit_id, ResponseUnit::id))
    }

    /// Inserts a zone, replacing any zone with the same id in place.
    ///
    /// Returns the new version, or `None` when an identical zone was already present.
    pub fn upsert_zone(&self, zone: HazardZone) -> Option<u64> {
        self.update(|catalog| upsert_by_id(&mut catalog.zones, zone, HazardZone::id))
    }

    /// Removes a zone by id; returns the new version, or `None` when no zone matched.
    pub fn remove_zone(&self, zone_id: &str) -> Option<u64> {
        self.update(|catalog| remove_by_id(&mut catalog.zones, zone_id, HazardZone::id))
    }

    fn update(&self, apply: impl FnOnce(&mut Catalog) -> bool) -> Option<u64> {
        let mut guard = self.current.write();
        let mut next = Catalog::clone(&guard.catalog);
        if !apply(&mut next) {
            return None;
        }
        guard.catalog = Arc::new(next);
        guard.version += 1;
        Some(guard.version)
    }
}

fn upsert_by_id<T: PartialEq>(items: &mut Vec<T>, item: T, id: impl Fn(&T) -> &str) -> bool {
    match items.iter_mut().find(|existing| id(&**existing) == id(&item)) {
        Some(existing) if *existing == item => false,
        Some(existing) => {
            *existing = item;
            true
        }
        None => {
            items.push(item);
            true
        }
    }
}

fn remove_by_id<T>(items: &mut Vec<T>, wanted: &str, id: impl Fn(&T) -> &str) -> bool {
    let before = items.len();
    items.retain(|item| id(item) != wanted);
    items.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Coordinate;

    fn unit(id: &str, available: bool) -> ResponseUnit {
        ResponseUnit::new(id, "ambulance", Coordinate::new(1.0, 1.0).unwrap(), 60.0, vec![])
            .unwrap()
            .with_availability(available)
    }

    #[test]
    fn snapshots_survive_updates() {
        let store = CatalogStore::new(Catalog::new(vec![], vec![unit("A", true)]));
        let before = store.snapshot();
        assert_eq!(store.upsert_unit(unit("B", true)), Some(1));
        assert_eq!(before.units.len(), 1);
        assert_eq!(store.snapshot().units.len(), 2);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let store = CatalogStore::new(Catalog::new(
            vec![],
            vec![unit("A", true), unit("B", true)],
        ));
        store.upsert_unit(unit("A", false));
        let snapshot = store.snapshot();
        assert_eq!(snapshot.units[0].id(), "A");
        assert!(!snapshot.units[0].available());
        assert_eq!(snapshot.available_units(), 1);
    }

    #[test]
    fn removals_report_outcome() {
        let zone = HazardZone::new("Z", Coordinate::new(0.0, 0.0).unwrap(), 1.0, "flood", 1.0)
            .unwrap();
        let store = CatalogStore::new(Catalog::new(vec![zone.clone()], vec![unit("A", true)]));
        assert_eq!(store.remove_unit("A"), Some(1));
        assert_eq!(store.remove_unit("A"), None);
        assert_eq!(store.remove_zone("Z"), Some(2));
        assert_eq!(store.upsert_zone(zone), Some(3));
        assert_eq!(store.snapshot().zones.len(), 1);
        assert_eq!(store.replace(Catalog::default()), 4);
        assert!(store.snapshot().zones.is_empty());
    }

    #[test]
    fn version_only_moves_on_real_changes() {
        let store = CatalogStore::new(Catalog::new(vec![], vec![unit("A", true)]));
        let before = store.snapshot();
        assert_eq!(store.remove_unit("missing"), None);
        assert_eq!(store.remove_zone("missing"), None);
        assert_eq!(store.upsert_unit(unit("A", true)), None);
        assert_eq!(store.version(), 0);
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
        assert_eq!(store.upsert_unit(unit("A", false)), Some(1));
    }
}
