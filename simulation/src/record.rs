//! Registration records
//!
//! The raw, form-shaped description of a person as it arrives from a host
//! (or a roster file), plus the date parsing and validation applied before
//! anyone is admitted to a family.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FamilyError;

/// Accepted date layouts, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d", "%m/%d/%Y"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonRecord {
    pub first_name: String,
    pub surnames: String,
    pub civil_id: String,
    pub birthdate: String,
    pub death_date: Option<String>,
    /// Free-form marker, e.g. "F", "Masculino".
    pub sex: String,
    pub residence: String,
    pub civil_status: String,
    pub interests: Vec<String>,
    /// Explicit stored age; becomes authoritative over the birthdate.
    pub age: Option<u32>,
    /// Lookup keys (civil id or full name) of already registered parents.
    pub mother: Option<String>,
    pub father: Option<String>,
    pub single_since: Option<i32>,
}

impl PersonRecord {
    pub fn new(first_name: &str, surnames: &str, sex: &str, birthdate: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            surnames: surnames.to_string(),
            sex: sex.to_string(),
            birthdate: birthdate.to_string(),
            ..Self::default()
        }
    }

    pub fn with_civil_id(mut self, civil_id: &str) -> Self {
        self.civil_id = civil_id.to_string();
        self
    }

    pub fn with_status(mut self, civil_status: &str) -> Self {
        self.civil_status = civil_status.to_string();
        self
    }

    pub fn with_interests(mut self, interests: &[&str]) -> Self {
        self.interests = interests.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_residence(mut self, residence: &str) -> Self {
        self.residence = residence.to_string();
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.surnames.trim())
            .trim()
            .to_string()
    }

    /// Parse and check birth/death dates against `today`.
    pub fn validated_dates(
        &self,
        today: NaiveDate,
    ) -> Result<(NaiveDate, Option<NaiveDate>), FamilyError> {
        let birth = parse_date(&self.birthdate)?;
        if birth > today {
            return Err(FamilyError::InvalidDate(format!(
                "birth {} is after {}",
                birth, today
            )));
        }
        let death = match self.death_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_date(raw)?),
        };
        if let Some(death) = death {
            if death < birth {
                return Err(FamilyError::InvalidDate(format!(
                    "death {} is before birth {}",
                    death, birth
                )));
            }
        }
        Ok((birth, death))
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, FamilyError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FamilyError::InvalidDate("missing date".to_string()));
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| FamilyError::InvalidDate(format!("{raw:?}")))
}

/// One placed registration inside a roster file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub generation: usize,
    pub lineage: usize,
    pub person: PersonRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterFamily {
    pub name: String,
    #[serde(default)]
    pub members: Vec<RosterEntry>,
}

/// Bulk registration input: families and their placed members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub families: Vec<RosterFamily>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(1990, 3, 25).unwrap();
        assert_eq!(parse_date("1990-03-25").unwrap(), expected);
        assert_eq!(parse_date("25/03/1990").unwrap(), expected);
        assert_eq!(parse_date("25-03-1990").unwrap(), expected);
        assert_eq!(parse_date("1990/03/25").unwrap(), expected);
        assert!(matches!(parse_date("yesterday"), Err(FamilyError::InvalidDate(_))));
        assert!(matches!(parse_date(""), Err(FamilyError::InvalidDate(_))));
    }

    #[test]
    fn test_future_birth_rejected() {
        let record = PersonRecord::new("Ana", "Mora", "F", "2030-01-01");
        assert!(matches!(
            record.validated_dates(today()),
            Err(FamilyError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_death_before_birth_rejected() {
        let mut record = PersonRecord::new("Ana", "Mora", "F", "1980-01-01");
        record.death_date = Some("1979-12-31".into());
        assert!(record.validated_dates(today()).is_err());

        record.death_date = Some(String::new());
        let (_, death) = record.validated_dates(today()).unwrap();
        assert!(death.is_none());
    }

    #[test]
    fn test_roster_from_json() {
        let json = r#"{"families":[{"name":"Mora","members":[
            {"generation":0,"lineage":0,"person":{"first_name":"Ana","surnames":"Mora","sex":"F","birthdate":"1950-01-01"}}
        ]}]}"#;
        let roster: Roster = serde_json::from_str(json).unwrap();
        assert_eq!(roster.families[0].members[0].person.full_name(), "Ana Mora");
    }
}
