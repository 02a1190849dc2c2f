//! Who is in the space.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Occupancy report as served by the space network endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    /// Known people currently connected.
    #[serde(default)]
    pub who: Vec<String>,
    /// Devices that could not be attributed to anyone.
    #[serde(rename = "n_unknown_macs", default)]
    pub unknown_devices: u32,
}

impl Occupancy {
    /// Creates a new occupancy report.
    pub fn new(who: Vec<String>, unknown_devices: u32) -> Self {
        Self {
            who,
            unknown_devices,
        }
    }

    /// Removes exact-duplicate names, keeping the first occurrence.
    #[must_use]
    pub fn deduplicated(mut self) -> Self {
        self.who = dedup(self.who);
        self
    }

    /// Number of known people.
    pub fn known_count(&self) -> usize {
        self.who.len()
    }

    /// Returns true if at least one known person is present.
    pub fn has_known(&self) -> bool {
        !self.who.is_empty()
    }
}

/// Removes exact duplicates in one left-to-right pass, preserving the order
/// of first occurrence.
pub fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
