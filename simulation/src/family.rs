//! Family - one generational matrix plus the people it refers to
//!
//! People are entities in a private `hecs::World`; the matrix stores their
//! stable `PersonId`s and `index` maps those back to entities. A person may
//! appear at several coordinates (as a child, later as a partner) while
//! remaining a single entity.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use hecs::{Component, Entity, EntityBuilder, World};
use tracing::debug;

use crate::components::*;
use crate::error::FamilyError;
use crate::matrix::{is_union_row, Coord, GenerationalMatrix};
use crate::names;
use crate::record::PersonRecord;

pub struct Family {
    name: String,
    matrix: GenerationalMatrix,
    pub(crate) world: World,
    index: HashMap<PersonId, Entity>,
    next_person_id: u64,
    civil_id_counters: HashMap<char, u32>,
}

impl Family {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            matrix: GenerationalMatrix::new(),
            world: World::new(),
            index: HashMap::new(),
            next_person_id: 1,
            civil_id_counters: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matrix(&self) -> &GenerationalMatrix {
        &self.matrix
    }

    pub(crate) fn matrix_mut(&mut self) -> &mut GenerationalMatrix {
        &mut self.matrix
    }

    /// Swap in a new matrix. Every id it references must belong to this family.
    pub fn replace_matrix(&mut self, matrix: GenerationalMatrix) -> Result<(), FamilyError> {
        if let Some(unknown) = matrix
            .person_ids()
            .into_iter()
            .find(|id| !self.index.contains_key(id))
        {
            return Err(FamilyError::PersonNotFound(unknown.to_string()));
        }
        if let Some((generation, lineage)) = matrix.overfull_union() {
            return Err(FamilyError::UnionCellFull {
                generation,
                lineage,
            });
        }
        self.matrix = matrix;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Component access
    // ------------------------------------------------------------------

    pub fn entity(&self, id: PersonId) -> Option<Entity> {
        self.index.get(&id).copied()
    }

    pub fn get<T: Component>(&self, id: PersonId) -> Option<hecs::Ref<'_, T>> {
        let entity = self.entity(id)?;
        self.world.get::<&T>(entity).ok()
    }

    pub fn get_mut<T: Component>(&mut self, id: PersonId) -> Option<hecs::RefMut<'_, T>> {
        let entity = self.entity(id)?;
        self.world.get::<&mut T>(entity).ok()
    }

    pub fn has<T: Component>(&self, id: PersonId) -> bool {
        self.get::<T>(id).is_some()
    }

    pub fn insert<T: Component>(&mut self, id: PersonId, component: T) {
        if let Some(entity) = self.entity(id) {
            let _ = self.world.insert_one(entity, component);
        }
    }

    pub fn remove<T: Component>(&mut self, id: PersonId) -> Option<T> {
        let entity = self.entity(id)?;
        self.world.remove_one::<T>(entity).ok()
    }

    // ------------------------------------------------------------------
    // Person views
    // ------------------------------------------------------------------

    pub fn contains(&self, id: PersonId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn full_name(&self, id: PersonId) -> String {
        self.get::<Person>(id)
            .map(|p| p.full_name())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn civil_id(&self, id: PersonId) -> String {
        self.get::<Person>(id)
            .map(|p| p.civil_id.clone())
            .unwrap_or_default()
    }

    pub fn surnames(&self, id: PersonId) -> String {
        self.get::<Person>(id)
            .map(|p| p.surnames.clone())
            .unwrap_or_default()
    }

    pub fn sex(&self, id: PersonId) -> Option<Sex> {
        self.get::<Sex>(id).map(|s| *s)
    }

    pub fn is_alive(&self, id: PersonId) -> bool {
        self.has::<Alive>(id)
    }

    pub fn civil_status(&self, id: PersonId) -> CivilStatus {
        self.get::<CivilStatus>(id).map(|s| *s).unwrap_or_default()
    }

    /// Married, or holding a live partner link.
    pub fn is_partnered(&self, id: PersonId) -> bool {
        self.civil_status(id) == CivilStatus::Married || self.has::<Partner>(id)
    }

    pub fn interests(&self, id: PersonId) -> Vec<String> {
        self.get::<Profile>(id)
            .map(|p| p.interests.clone())
            .unwrap_or_default()
    }

    pub fn residence(&self, id: PersonId) -> String {
        self.get::<Profile>(id)
            .map(|p| p.residence.clone())
            .unwrap_or_default()
    }

    pub fn standing(&self, id: PersonId) -> Standing {
        self.get::<Standing>(id).map(|s| *s).unwrap_or_default()
    }

    /// Stored age when present, otherwise completed years from the birthdate
    /// to `today` (or to the death date for the deceased).
    pub fn effective_age(&self, id: PersonId, today: NaiveDate) -> Option<u32> {
        if let Some(age) = self.get::<Age>(id) {
            return Some(age.years);
        }
        let birth = self.get::<BirthDate>(id)?;
        let reference = self
            .get::<Deceased>(id)
            .map(|d| d.date)
            .unwrap_or(today);
        Some(birth.age_years(reference).max(0) as u32)
    }

    /// Every placed person once, in matrix order.
    pub fn people(&self) -> Vec<PersonId> {
        self.matrix.person_ids()
    }

    pub fn living(&self) -> Vec<PersonId> {
        self.people()
            .into_iter()
            .filter(|id| self.is_alive(*id))
            .collect()
    }

    pub fn population(&self) -> usize {
        self.world.query::<&Alive>().iter().count()
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Resolve a boundary key: exact civil id first, then normalized full name.
    pub fn resolve(&self, key: &str) -> Option<PersonId> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let people = self.lookup_order();
        if let Some(id) = people
            .iter()
            .copied()
            .find(|id| self.civil_id(*id) == key)
        {
            return Some(id);
        }
        let target = names::normalize(key);
        people
            .into_iter()
            .find(|id| names::normalize(&self.full_name(*id)) == target)
    }

    pub fn require(&self, key: &str) -> Result<PersonId, FamilyError> {
        self.resolve(key)
            .ok_or_else(|| FamilyError::PersonNotFound(key.to_string()))
    }

    /// Placed people in matrix order, then anyone not (yet) placed.
    fn lookup_order(&self) -> Vec<PersonId> {
        let mut people = self.people();
        let mut unplaced: Vec<PersonId> = self
            .index
            .keys()
            .copied()
            .filter(|id| !people.contains(id))
            .collect();
        unplaced.sort();
        people.extend(unplaced);
        people
    }

    fn find_identity(&self, record: &PersonRecord) -> Option<PersonId> {
        let civil_id = record.civil_id.trim();
        if !civil_id.is_empty() {
            return self
                .lookup_order()
                .into_iter()
                .find(|id| self.civil_id(*id) == civil_id);
        }
        let target = names::normalize(&record.full_name());
        self.lookup_order().into_iter().find(|id| {
            self.civil_id(*id).is_empty() && names::normalize(&self.full_name(*id)) == target
        })
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register `record` at `(generation, lineage)`.
    ///
    /// A record whose identity (civil id, else normalized full name) is
    /// already known places the existing person at the new coordinate. New
    /// people in a children row get parent back-references from the union
    /// directly above unless the record names its parents explicitly.
    pub fn register(
        &mut self,
        record: &PersonRecord,
        generation: usize,
        lineage: usize,
        today: NaiveDate,
    ) -> Result<Coord, FamilyError> {
        if let Some(existing) = self.find_identity(record) {
            return self.place(existing, generation, lineage);
        }

        let (birth, death) = record.validated_dates(today)?;
        let mother = self.resolve_parent_key(record.mother.as_deref())?;
        let father = self.resolve_parent_key(record.father.as_deref())?;

        let id = self.allocate_id();
        if !self.matrix.has_room(generation, lineage, id) {
            return Err(FamilyError::UnionCellFull {
                generation,
                lineage,
            });
        }

        let mut builder = EntityBuilder::new();
        builder
            .add(Person {
                id,
                first_name: record.first_name.trim().to_string(),
                surnames: record.surnames.trim().to_string(),
                civil_id: record.civil_id.trim().to_string(),
            })
            .add(BirthDate(birth))
            .add(CivilStatus::from_label(&record.civil_status))
            .add(Profile {
                residence: record.residence.trim().to_string(),
                interests: record.interests.clone(),
            });
        if let Some(sex) = Sex::from_marker(&record.sex) {
            builder.add(sex);
        }
        match death {
            Some(date) => {
                builder.add(Deceased { date });
            }
            None => {
                builder.add(Alive);
            }
        }
        if let Some(years) = record.age {
            builder.add(Age::new(years));
        }
        if let Some(year) = record.single_since {
            builder.add(SingleSince { year });
        }
        self.spawn(id, builder);

        let coord = self.matrix.push(generation, lineage, id);
        let parents = if mother.is_some() || father.is_some() {
            Some(Parents { mother, father })
        } else if !is_union_row(generation) && generation > 0 {
            self.infer_parents(generation - 1, lineage)
        } else {
            None
        };
        if let Some(parents) = parents {
            self.link_parents(id, parents);
        }

        debug!(family = %self.name, person = %id, ?coord, "registered person");
        Ok(coord)
    }

    /// Put an existing person at another coordinate.
    pub fn place(
        &mut self,
        id: PersonId,
        generation: usize,
        lineage: usize,
    ) -> Result<Coord, FamilyError> {
        if !self.contains(id) {
            return Err(FamilyError::PersonNotFound(id.to_string()));
        }
        if !self.matrix.has_room(generation, lineage, id) {
            return Err(FamilyError::UnionCellFull {
                generation,
                lineage,
            });
        }
        Ok(self.matrix.push(generation, lineage, id))
    }

    pub(crate) fn spawn(&mut self, id: PersonId, mut builder: EntityBuilder) -> Entity {
        let entity = self.world.spawn(builder.build());
        self.index.insert(id, entity);
        entity
    }

    pub(crate) fn allocate_id(&mut self) -> PersonId {
        let id = PersonId(self.next_person_id);
        self.next_person_id += 1;
        id
    }

    /// Civil id for a newborn: `<province prefix><YYYY><####>`.
    pub(crate) fn issue_civil_id(&mut self, province: &str, date: NaiveDate) -> String {
        let prefix = names::province_prefix(province);
        let counter = self.civil_id_counters.entry(prefix).or_insert(0);
        *counter += 1;
        format!("{}{:04}{:04}", prefix, date.year(), counter)
    }

    pub(crate) fn link_parents(&mut self, child: PersonId, parents: Parents) {
        for parent in [parents.mother, parents.father].into_iter().flatten() {
            let recorded = match self.get_mut::<Children>(parent) {
                Some(mut children) => {
                    if !children.0.contains(&child) {
                        children.0.push(child);
                    }
                    true
                }
                None => false,
            };
            if !recorded {
                self.insert(parent, Children(vec![child]));
            }
        }
        self.insert(child, parents);
    }

    fn resolve_parent_key(&self, key: Option<&str>) -> Result<Option<PersonId>, FamilyError> {
        match key.map(str::trim) {
            None | Some("") => Ok(None),
            Some(key) => self.require(key).map(Some),
        }
    }

    fn infer_parents(&self, generation: usize, lineage: usize) -> Option<Parents> {
        let cell = self.matrix.cell(generation, lineage);
        if cell.len() < 2 {
            return None;
        }
        let mut parents = Parents::default();
        for id in cell {
            match self.sex(*id) {
                Some(Sex::Female) if parents.mother.is_none() => parents.mother = Some(*id),
                Some(Sex::Male) if parents.father.is_none() => parents.father = Some(*id),
                _ => {}
            }
        }
        (parents.mother.is_some() || parents.father.is_some()).then_some(parents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_register_and_resolve() {
        let mut family = Family::new("Mora");
        let coord = family
            .register(&PersonRecord::new("José", "Mora Solís", "M", "1950-05-01"), 0, 0, today())
            .unwrap();
        assert_eq!(coord.slot, 0);
        let id = family.resolve("jose mora solis").unwrap();
        assert_eq!(family.full_name(id), "José Mora Solís");
        assert_eq!(family.effective_age(id, today()), Some(73));
        assert!(family.is_alive(id));
        assert!(family.resolve("nobody").is_none());
    }

    #[test]
    fn test_same_identity_reuses_person() {
        let mut family = Family::new("Mora");
        let e = PersonRecord::new("Eva", "Mora", "F", "1975-01-01");
        family.register(&e, 1, 0, today()).unwrap();
        family.register(&e, 2, 0, today()).unwrap();
        let id = family.resolve("Eva Mora").unwrap();
        assert_eq!(family.matrix().coords_of(id).len(), 2);
        assert_eq!(family.people().len(), 1);
    }

    #[test]
    fn test_distinct_civil_ids_do_not_collide() {
        let mut family = Family::new("Mora");
        family
            .register(&PersonRecord::new("Ana", "Mora", "F", "1970-01-01").with_civil_id("101"), 1, 0, today())
            .unwrap();
        family
            .register(&PersonRecord::new("Ana", "Mora", "F", "1990-01-01").with_civil_id("102"), 3, 0, today())
            .unwrap();
        assert_eq!(family.people().len(), 2);
        assert_ne!(family.resolve("101"), family.resolve("102"));
    }

    #[test]
    fn test_union_cell_capacity() {
        let mut family = Family::new("Mora");
        family.register(&PersonRecord::new("A", "", "M", "1950-01-01"), 0, 0, today()).unwrap();
        family.register(&PersonRecord::new("B", "", "F", "1950-01-01"), 0, 0, today()).unwrap();
        let third = family.register(&PersonRecord::new("C", "", "F", "1950-01-01"), 0, 0, today());
        assert_eq!(
            third,
            Err(FamilyError::UnionCellFull { generation: 0, lineage: 0 })
        );
    }

    #[test]
    fn test_children_row_infers_parents() {
        let mut family = Family::new("Mora");
        family.register(&PersonRecord::new("Dad", "", "M", "1950-01-01"), 0, 0, today()).unwrap();
        family.register(&PersonRecord::new("Mom", "", "F", "1952-01-01"), 0, 0, today()).unwrap();
        family.register(&PersonRecord::new("Kid", "", "F", "1980-01-01"), 1, 0, today()).unwrap();
        let kid = family.resolve("Kid").unwrap();
        let parents = *family.get::<Parents>(kid).unwrap();
        assert_eq!(parents.mother, family.resolve("Mom"));
        assert_eq!(parents.father, family.resolve("Dad"));
        let mom = family.resolve("Mom").unwrap();
        assert_eq!(family.get::<Children>(mom).unwrap().0, vec![kid]);
    }

    #[test]
    fn test_invalid_dates_rejected() {
        let mut family = Family::new("Mora");
        let result = family.register(&PersonRecord::new("X", "", "M", "31/31/2000"), 0, 0, today());
        assert!(matches!(result, Err(FamilyError::InvalidDate(_))));
        assert!(family.people().is_empty());
    }
}
