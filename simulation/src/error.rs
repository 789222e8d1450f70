//! Error types shared by the store, the query boundary and the simulator.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FamilyError {
    #[error("person not found: {0}")]
    PersonNotFound(String),
    #[error("family not found: {0}")]
    FamilyNotFound(String),
    #[error("family already exists: {0}")]
    FamilyExists(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("union not allowed: {}", .0.join("; "))]
    IneligibleUnion(Vec<String>),
    #[error("no active family: {0}")]
    StaleFamilySelection(String),
    #[error("union cell at generation {generation}, lineage {lineage} is full")]
    UnionCellFull { generation: usize, lineage: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FamilyError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FamilyError::PersonNotFound(_) | FamilyError::FamilyNotFound(_)
        )
    }
}
