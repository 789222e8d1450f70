//! Kinship Simulation Engine
//!
//! Families stored as generational matrices, kinship inferred from matrix
//! positions, and a tick-driven life-event simulator (aging, mortality,
//! unions, births) running over an ECS world per family.

pub mod calendar_runner;
pub mod compatibility;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod family;
pub mod kinship;
pub mod matrix;
pub mod names;
pub mod position;
pub mod queries;
pub mod record;
pub mod seed;
pub mod simulator;
pub mod store;
pub mod systems;

pub use calendar_runner::CalendarRunner;
pub use compatibility::{CompatibilityReport, Rule, RuleCheck};
pub use components::*;
pub use config::SimulationConfig;
pub use error::FamilyError;
pub use events::{ChangeKind, ChangeRecord};
pub use family::Family;
pub use kinship::Relation;
pub use matrix::{Coord, GenerationalMatrix};
pub use position::PositionIndex;
pub use record::{PersonRecord, Roster};
pub use simulator::{Simulator, TickPhase, TickReport};
pub use store::{FamilyStore, SharedStore};
