//! ECS Systems - process one family's people each tick
//!
//! Run in this order: aging, death, collateral, matchmaking, birth.

pub mod aging;
pub mod birth;
pub mod collateral;
pub mod death;
pub mod matchmaking;

pub use aging::aging_system;
pub use birth::birth_system;
pub use collateral::collateral_system;
pub use death::death_system;
pub use matchmaking::{matchmaking_system, place_union};
