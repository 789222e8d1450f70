//! Query boundary
//!
//! Structured answers for hosts. Lookup failures become part of the answer
//! (an explanatory text, `ok: false`, ...) instead of aborting the caller.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::compatibility::{self, RuleCheck};
use crate::components::*;
use crate::error::FamilyError;
use crate::family::Family;
use crate::kinship::{self, Relation};
use crate::matrix::Coord;
use crate::names;
use crate::position::PositionIndex;
use crate::store::FamilyStore;
use crate::systems::place_union;

// ============================================================================
// Kinship
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationAnswer {
    pub family: String,
    pub a: String,
    pub b: String,
    /// `None` when either person (or the family) could not be found.
    pub relation: Option<Relation>,
    pub text: String,
}

pub fn relation(store: &FamilyStore, family: &str, a: &str, b: &str) -> RelationAnswer {
    let answer = |relation: Option<Relation>, text: String| RelationAnswer {
        family: family.to_string(),
        a: a.to_string(),
        b: b.to_string(),
        relation,
        text,
    };
    let found = match store.family(family) {
        Ok(found) => found,
        Err(err) => return answer(None, err.to_string()),
    };
    match kinship::relation_by_key(found, a, b) {
        Ok(relation) => {
            let a_name = found.resolve(a).map(|id| found.full_name(id)).unwrap_or_default();
            let b_name = found.resolve(b).map(|id| found.full_name(id)).unwrap_or_default();
            answer(Some(relation), relation.describe(&a_name, &b_name))
        }
        Err(_) => answer(None, format!("could not find {a} or {b}")),
    }
}

// ============================================================================
// Search
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    pub family: String,
    pub person_id: PersonId,
    pub name: String,
    pub civil_id: String,
    pub alive: bool,
    pub positions: Vec<Coord>,
}

/// Case- and accent-insensitive substring search over names and civil ids
/// in every family.
pub fn search(store: &FamilyStore, query: &str) -> Vec<SearchMatch> {
    let needle = names::normalize(query);
    if needle.is_empty() {
        return Vec::new();
    }
    let families: Vec<&Family> = store.families().collect();
    let mut matches: Vec<SearchMatch> = families
        .par_iter()
        .flat_map_iter(|family| {
            let needle = needle.as_str();
            family.people().into_iter().filter_map(move |id| {
                let name = family.full_name(id);
                let civil_id = family.civil_id(id);
                let hit = names::normalize(&name).contains(needle)
                    || (!civil_id.is_empty() && civil_id.contains(needle));
                hit.then(|| SearchMatch {
                    family: family.name().to_string(),
                    person_id: id,
                    name,
                    civil_id,
                    alive: family.is_alive(id),
                    positions: family.matrix().coords_of(id),
                })
            })
        })
        .collect();
    matches.sort_by(|x, y| {
        (&x.family, &x.name, x.person_id).cmp(&(&y.family, &y.name, y.person_id))
    });
    matches
}

// ============================================================================
// Profiles
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonProfile {
    pub family: String,
    pub person_id: PersonId,
    pub first_name: String,
    pub surnames: String,
    pub full_name: String,
    pub civil_id: String,
    pub sex: Option<Sex>,
    pub birthdate: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    /// Stored age, else derived; age at death for the deceased.
    pub age: Option<u32>,
    pub alive: bool,
    pub civil_status: CivilStatus,
    pub residence: String,
    pub interests: Vec<String>,
    pub partner: Option<String>,
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub guardians: Vec<String>,
    pub positions: Vec<Coord>,
    pub standing: Standing,
}

pub fn person(
    store: &FamilyStore,
    family: &str,
    key: &str,
    today: NaiveDate,
) -> Result<PersonProfile, FamilyError> {
    let found = store.family(family)?;
    let id = found.require(key)?;
    Ok(profile(found, id, today))
}

fn profile(family: &Family, id: PersonId, today: NaiveDate) -> PersonProfile {
    let index = PositionIndex::new(family.matrix());
    let names_of = |ids: &mut dyn Iterator<Item = PersonId>| -> Vec<String> {
        ids.map(|other| family.full_name(other)).collect()
    };

    let (first_name, surnames) = family
        .get::<Person>(id)
        .map(|p| (p.first_name.clone(), p.surnames.clone()))
        .unwrap_or_default();
    let partner = family
        .get::<Partner>(id)
        .map(|p| p.0)
        .or_else(|| index.partners_of(id).into_iter().next())
        .map(|p| family.full_name(p));
    let parents = match family.get::<Parents>(id).map(|p| *p) {
        Some(p) => names_of(&mut [p.mother, p.father].into_iter().flatten()),
        None => names_of(&mut index.parents_of_child(id).into_iter()),
    };
    let children = match family.get::<Children>(id) {
        Some(children) => names_of(&mut children.0.iter().copied()),
        None => names_of(&mut index.children_of(id).into_iter()),
    };
    let guardians = family
        .get::<Guardians>(id)
        .map(|g| names_of(&mut g.0.iter().copied()))
        .unwrap_or_default();

    PersonProfile {
        family: family.name().to_string(),
        person_id: id,
        full_name: family.full_name(id),
        first_name,
        surnames,
        civil_id: family.civil_id(id),
        sex: family.sex(id),
        birthdate: family.get::<BirthDate>(id).map(|b| b.0),
        death_date: family.get::<Deceased>(id).map(|d| d.date),
        age: family.effective_age(id, today),
        alive: family.is_alive(id),
        civil_status: family.civil_status(id),
        residence: family.residence(id),
        interests: family.interests(id),
        partner,
        parents,
        children,
        guardians,
        positions: index.locate(id),
        standing: family.standing(id),
    }
}

// ============================================================================
// Compatibility and unions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub score: u32,
    pub rules: Vec<RuleCheck>,
    pub reasons: Vec<String>,
}

impl ValidationReport {
    fn rejected(reason: String) -> Self {
        Self {
            ok: false,
            score: 0,
            rules: Vec::new(),
            reasons: vec![reason],
        }
    }
}

fn resolve_pair(family: &Family, a: &str, b: &str) -> Result<(PersonId, PersonId), FamilyError> {
    let a = family.require(a)?;
    let b = family.require(b)?;
    Ok((a, b))
}

fn evaluate_pair(family: &Family, a: PersonId, b: PersonId, today: NaiveDate) -> ValidationReport {
    if a == b {
        return ValidationReport::rejected("a person cannot form a union with themselves".to_string());
    }
    let report = compatibility::evaluate(family, a, b, today);
    ValidationReport {
        ok: report.eligible,
        score: report.score,
        rules: report.rules,
        reasons: report.reasons,
    }
}

pub fn validate(
    store: &FamilyStore,
    family: &str,
    a: &str,
    b: &str,
    today: NaiveDate,
) -> ValidationReport {
    let found = match store.family(family) {
        Ok(found) => found,
        Err(err) => return ValidationReport::rejected(err.to_string()),
    };
    match resolve_pair(found, a, b) {
        Ok((a, b)) => evaluate_pair(found, a, b, today),
        Err(err) => ValidationReport::rejected(err.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnionOutcome {
    pub report: ValidationReport,
    /// Union cell coordinate when the union was formed.
    pub placed: Option<Coord>,
}

/// Validate, then form the union when eligible.
pub fn union(
    store: &mut FamilyStore,
    family: &str,
    a: &str,
    b: &str,
    today: NaiveDate,
) -> UnionOutcome {
    let rejected = |reason: String| UnionOutcome {
        report: ValidationReport::rejected(reason),
        placed: None,
    };
    let found = match store.family_mut(family) {
        Ok(found) => found,
        Err(err) => return rejected(err.to_string()),
    };
    let (a_id, b_id) = match resolve_pair(found, a, b) {
        Ok(pair) => pair,
        Err(err) => return rejected(err.to_string()),
    };
    let report = evaluate_pair(found, a_id, b_id, today);
    if !report.ok {
        info!(family, a, b, reasons = ?report.reasons, "union rejected");
        return UnionOutcome {
            report,
            placed: None,
        };
    }
    match place_union(found, a_id, b_id) {
        Ok(coord) => {
            info!(family, a, b, ?coord, "union formed");
            UnionOutcome {
                report,
                placed: Some(coord),
            }
        }
        Err(err) => {
            warn!(family, a, b, %err, "union placement failed");
            rejected(err.to_string())
        }
    }
}

// ============================================================================
// Ages
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeEntry {
    pub name: String,
    pub civil_id: String,
    pub age: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgeSummary {
    pub living: Vec<AgeEntry>,
    /// Ages at death.
    pub deceased: Vec<AgeEntry>,
}

pub fn age_summary(
    store: &FamilyStore,
    family: &str,
    today: NaiveDate,
) -> Result<AgeSummary, FamilyError> {
    let found = store.family(family)?;
    let mut summary = AgeSummary::default();
    for id in found.people() {
        let entry = AgeEntry {
            name: found.full_name(id),
            civil_id: found.civil_id(id),
            age: found.effective_age(id, today),
        };
        if found.is_alive(id) {
            summary.living.push(entry);
        } else {
            summary.deceased.push(entry);
        }
    }
    Ok(summary)
}

// ============================================================================
// Bound family
// ============================================================================

/// A conversational selection of one family. Every helper fails with
/// `StaleFamilySelection` when nothing is bound or the family is gone.
#[derive(Debug, Clone, Default)]
pub struct FamilyBinding {
    family: Option<String>,
}

impl FamilyBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, family: &str) {
        self.family = Some(family.to_string());
    }

    pub fn bound(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub fn family<'s>(&self, store: &'s FamilyStore) -> Result<&'s Family, FamilyError> {
        let name = self
            .family
            .as_deref()
            .ok_or_else(|| FamilyError::StaleFamilySelection("no family selected".to_string()))?;
        store
            .family(name)
            .map_err(|_| FamilyError::StaleFamilySelection(name.to_string()))
    }

    pub fn relation(&self, store: &FamilyStore, a: &str, b: &str) -> Result<Relation, FamilyError> {
        kinship::relation_by_key(self.family(store)?, a, b)
    }

    pub fn cousins_of(&self, store: &FamilyStore, key: &str) -> Result<Vec<String>, FamilyError> {
        let family = self.family(store)?;
        let id = family.require(key)?;
        Ok(full_names(family, kinship::cousins_of(family, id)))
    }

    pub fn ancestors_of(&self, store: &FamilyStore, key: &str) -> Result<Vec<String>, FamilyError> {
        let family = self.family(store)?;
        let id = family.require(key)?;
        Ok(full_names(family, kinship::ancestors_of(family.matrix(), id)))
    }

    pub fn living_descendants_of(
        &self,
        store: &FamilyStore,
        key: &str,
    ) -> Result<Vec<String>, FamilyError> {
        let family = self.family(store)?;
        let id = family.require(key)?;
        Ok(full_names(family, kinship::living_descendants_of(family, id)))
    }
}

fn full_names(family: &Family, ids: Vec<PersonId>) -> Vec<String> {
    ids.into_iter().map(|id| family.full_name(id)).collect()
}
