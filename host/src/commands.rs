pub mod calendar;
pub mod families;
pub mod kinship;
pub mod pairing;
pub mod people;
