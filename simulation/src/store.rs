//! Family Store - registry of family name → family
//!
//! Owned by the host and handed to every component by reference; there is
//! no process-wide registry. Family names are matched normalized.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::FamilyError;
use crate::family::Family;
use crate::matrix::{Coord, GenerationalMatrix};
use crate::names;
use crate::record::{PersonRecord, Roster};

/// Store shared between the calendar runner (writer) and query callers.
pub type SharedStore = Arc<RwLock<FamilyStore>>;

#[derive(Default)]
pub struct FamilyStore {
    families: BTreeMap<String, Family>,
}

impl FamilyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    pub fn create_family(&mut self, name: &str) -> Result<&mut Family, FamilyError> {
        let key = names::normalize(name);
        if key.is_empty() {
            return Err(FamilyError::FamilyNotFound(name.to_string()));
        }
        if self.families.contains_key(&key) {
            return Err(FamilyError::FamilyExists(name.to_string()));
        }
        info!(family = name, "created family");
        Ok(self.families.entry(key).or_insert_with(|| Family::new(name.trim())))
    }

    pub fn family(&self, name: &str) -> Result<&Family, FamilyError> {
        self.families
            .get(&names::normalize(name))
            .ok_or_else(|| FamilyError::FamilyNotFound(name.to_string()))
    }

    pub fn family_mut(&mut self, name: &str) -> Result<&mut Family, FamilyError> {
        self.families
            .get_mut(&names::normalize(name))
            .ok_or_else(|| FamilyError::FamilyNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.families.contains_key(&names::normalize(name))
    }

    /// Display names, in stable (normalized) order.
    pub fn family_names(&self) -> Vec<String> {
        self.families.values().map(|f| f.name().to_string()).collect()
    }

    pub fn families(&self) -> impl Iterator<Item = &Family> {
        self.families.values()
    }

    pub fn families_mut(&mut self) -> impl Iterator<Item = &mut Family> {
        self.families.values_mut()
    }

    pub fn matrix(&self, name: &str) -> Result<&GenerationalMatrix, FamilyError> {
        self.family(name).map(Family::matrix)
    }

    pub fn replace_matrix(
        &mut self,
        name: &str,
        matrix: GenerationalMatrix,
    ) -> Result<(), FamilyError> {
        self.family_mut(name)?.replace_matrix(matrix)
    }

    pub fn append(
        &mut self,
        name: &str,
        record: &PersonRecord,
        generation: usize,
        lineage: usize,
        today: NaiveDate,
    ) -> Result<Coord, FamilyError> {
        self.family_mut(name)?
            .register(record, generation, lineage, today)
    }

    pub fn remove_family(&mut self, name: &str) -> Result<Family, FamilyError> {
        self.families
            .remove(&names::normalize(name))
            .ok_or_else(|| FamilyError::FamilyNotFound(name.to_string()))
    }

    /// Drop every family.
    pub fn reset(&mut self) {
        self.families.clear();
    }

    /// Register a roster. Families are created on demand; a rejected entry is
    /// logged and skipped so one bad row does not discard the rest. Returns
    /// the number of entries placed.
    pub fn import_roster(&mut self, roster: &Roster, today: NaiveDate) -> usize {
        let mut placed = 0;
        for roster_family in &roster.families {
            if !self.contains(&roster_family.name) {
                if let Err(err) = self.create_family(&roster_family.name) {
                    warn!(family = %roster_family.name, %err, "skipping roster family");
                    continue;
                }
            }
            for entry in &roster_family.members {
                match self.append(
                    &roster_family.name,
                    &entry.person,
                    entry.generation,
                    entry.lineage,
                    today,
                ) {
                    Ok(_) => placed += 1,
                    Err(err) => warn!(
                        family = %roster_family.name,
                        person = %entry.person.full_name(),
                        %err,
                        "skipping roster entry"
                    ),
                }
            }
        }
        placed
    }
}
