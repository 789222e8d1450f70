//! ECS Components for family members
//!
//! Every person is one entity in their family's `hecs::World`. The
//! generational matrix only stores `PersonId`s; everything else about a
//! person lives here.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identity Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PersonId(pub u64);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub first_name: String,
    pub surnames: String,
    /// Civil registry number; empty when unknown.
    pub civil_id: String,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.surnames.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Accepts free-form markers such as "F", "female", "Femenino", "m".
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker.trim().chars().next()?.to_ascii_lowercase() {
            'f' => Some(Sex::Female),
            'm' => Some(Sex::Male),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Profile {
    pub residence: String,
    pub interests: Vec<String>,
}

// ============================================================================
// Life Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthDate(pub NaiveDate);

impl BirthDate {
    /// Whole years completed on `on`. Negative when `on` precedes the birth.
    pub fn age_years(&self, on: NaiveDate) -> i32 {
        age_on(self.0, on)
    }
}

/// Simulator-maintained age. Once present it is authoritative over the
/// birthdate-derived age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Age {
    pub years: u32,
}

impl Age {
    pub fn new(years: u32) -> Self {
        Self { years }
    }
}

/// Marker: entity is alive
#[derive(Debug, Clone, Copy, Default)]
pub struct Alive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deceased {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CivilStatus {
    #[default]
    Single,
    Married,
    Widowed,
    Divorced,
}

impl CivilStatus {
    /// Parses registry labels in English or Spanish ("Casado", "viuda", ...).
    pub fn from_label(label: &str) -> Self {
        let label = crate::names::normalize(label);
        if label.starts_with("cas") || label.starts_with("marr") || label.starts_with("unid") {
            CivilStatus::Married
        } else if label.starts_with("viud") || label.starts_with("widow") {
            CivilStatus::Widowed
        } else if label.starts_with("div") {
            CivilStatus::Divorced
        } else {
            CivilStatus::Single
        }
    }
}

// ============================================================================
// Relationship Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner(pub PersonId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Parents {
    pub mother: Option<PersonId>,
    pub father: Option<PersonId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Children(pub Vec<PersonId>);

/// Set by the mortality phase when a recorded parent dies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ParentLoss {
    pub mother_deceased: bool,
    pub father_deceased: bool,
}

impl ParentLoss {
    pub fn orphaned(&self) -> bool {
        self.mother_deceased && self.father_deceased
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Guardians(pub Vec<PersonId>);

// ============================================================================
// Standing Components
// ============================================================================

pub const BASELINE_EMOTIONAL_HEALTH: i32 = 100;
pub const BASELINE_LIFE_EXPECTANCY: i32 = 80;
pub const BASELINE_REPARTNER_PROBABILITY: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub emotional_health: i32,
    pub life_expectancy: i32,
    pub repartner_probability: i32,
}

impl Default for Standing {
    fn default() -> Self {
        Self {
            emotional_health: BASELINE_EMOTIONAL_HEALTH,
            life_expectancy: BASELINE_LIFE_EXPECTANCY,
            repartner_probability: BASELINE_REPARTNER_PROBABILITY,
        }
    }
}

/// Calendar year from which a single adult has been tracked as unpartnered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleSince {
    pub year: i32,
}

// ============================================================================
// Simulation Clock
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    pub today: NaiveDate,
}

impl SimClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn advance_years(&mut self, years: u32) {
        self.today = add_years(self.today, years as i32);
    }
}

/// Whole years between `birth` and `on`.
pub fn age_on(birth: NaiveDate, on: NaiveDate) -> i32 {
    let mut years = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}

/// Shifts a date by whole years; Feb 29 lands on Feb 28 in common years.
pub fn add_years(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() + years;
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
        .unwrap_or(date)
}
