//! Vehicle registry lookup
//!
//! Keys are normalized by trimming surrounding whitespace and uppercasing.
//! Internal formatting (e.g. the space in `GJ01 JY0887`) is significant and kept.

use std::collections::HashMap;

use inlo_common::config::VehicleEntry;
use serde::Serialize;

/// Owner and insurance details of a registered vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleRecord {
    pub owner: String,
    pub insurance: String,
}

/// Read-only vehicle lookup capability
pub trait VehicleRegistry: Send + Sync {
    /// Exact-match lookup of an already normalized vehicle number
    fn lookup(&self, normalized: &str) -> Option<VehicleRecord>;
}

/// Normalize a raw vehicle number into a registry key
pub fn normalize_vehicle_number(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// In-memory registry built from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticVehicleRegistry {
    vehicles: HashMap<String, VehicleRecord>,
}

impl StaticVehicleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = VehicleEntry>) -> Self {
        let mut registry = Self::new();
        for entry in entries {
            registry.insert(&entry.number, entry.owner, entry.insurance);
        }
        registry
    }

    /// Register a vehicle; the key is normalized the same way lookups are
    pub fn insert(&mut self, number: &str, owner: impl Into<String>, insurance: impl Into<String>) {
        self.vehicles.insert(
            normalize_vehicle_number(number),
            VehicleRecord {
                owner: owner.into(),
                insurance: insurance.into(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

impl VehicleRegistry for StaticVehicleRegistry {
    fn lookup(&self, normalized: &str) -> Option<VehicleRecord> {
        self.vehicles.get(normalized).cloned()
    }
}
