//! Reference family
//!
//! A small four-generation family in the standard layout: founders' unions
//! in row 0, their children in row 1, the children's unions in row 2 and
//! grandchildren in row 3. Used by the host's demo and by tests.

use chrono::NaiveDate;

use crate::error::FamilyError;
use crate::matrix::is_union_row;
use crate::record::{PersonRecord, Roster, RosterEntry, RosterFamily};
use crate::store::FamilyStore;

pub const REFERENCE_FAMILY: &str = "Mora Vargas";

/// (generation, lineage, first name, surnames, sex, birthdate, interests)
type Row = (usize, usize, &'static str, &'static str, &'static str, &'static str, &'static [&'static str]);

const MEMBERS: &[Row] = &[
    (0, 0, "Alberto", "Mora Castillo", "M", "1940-03-12", &["pesca", "ajedrez"]),
    (0, 0, "Beatriz", "Solís Brenes", "F", "1942-07-30", &["jardinería", "cocina"]),
    (0, 1, "Carlos", "Vargas Quesada", "M", "1941-11-02", &["fútbol", "radio"]),
    (0, 1, "Dora", "Rojas Ulate", "F", "1943-01-19", &["costura", "cocina"]),
    (1, 0, "Elena", "Mora Solís", "F", "1965-05-04", &["música", "cine", "lectura"]),
    (1, 0, "Fernando", "Mora Solís", "M", "1967-09-21", &["fútbol", "cine", "viajes"]),
    (1, 0, "Gabriel", "Mora Solís", "M", "1969-02-14", &["música", "pintura"]),
    (1, 1, "Héctor", "Vargas Rojas", "M", "1964-08-08", &["música", "cine", "lectura"]),
    (1, 1, "Irene", "Vargas Rojas", "F", "1966-12-01", &["viajes", "cocina"]),
    (1, 1, "Julia", "Vargas Rojas", "F", "1970-04-17", &["cine", "música", "viajes"]),
    (2, 0, "Elena", "Mora Solís", "F", "1965-05-04", &[]),
    (2, 0, "Héctor", "Vargas Rojas", "M", "1964-08-08", &[]),
    (2, 1, "Fernando", "Mora Solís", "M", "1967-09-21", &[]),
    (2, 1, "Karla", "Jiménez Arias", "F", "1968-06-25", &["viajes", "fútbol"]),
    (2, 2, "Gabriel", "Mora Solís", "M", "1969-02-14", &[]),
    (2, 2, "Lucía", "Castro Méndez", "F", "1971-10-09", &["pintura", "música"]),
    (2, 3, "Irene", "Vargas Rojas", "F", "1966-12-01", &[]),
    (2, 3, "Mario", "Araya Pérez", "M", "1965-03-03", &["viajes", "cocina"]),
    (3, 0, "Natalia", "Vargas Mora", "F", "1990-01-15", &["música", "cine", "lectura"]),
    (3, 0, "Pablo", "Vargas Mora", "M", "1992-06-06", &["fútbol", "videojuegos", "cine"]),
    (3, 0, "Quintín", "Vargas Mora", "M", "1995-09-09", &["música", "cine", "lectura"]),
    (3, 1, "Rosa", "Mora Jiménez", "F", "1994-02-20", &["fútbol", "videojuegos", "cine"]),
    (3, 1, "Sergio", "Mora Jiménez", "M", "1996-11-11", &["viajes", "fotografía"]),
    (3, 2, "Olga", "Mora Castro", "F", "1998-05-05", &["pintura", "música"]),
    (3, 3, "Tomás", "Araya Vargas", "M", "1997-07-07", &["viajes", "fotografía", "cine"]),
];

/// The reference family as a roster. Everyone sitting in a union row is
/// registered as married.
pub fn reference_roster() -> Roster {
    let married = |first: &str| {
        MEMBERS
            .iter()
            .any(|row| is_union_row(row.0) && row.2 == first)
    };
    let members = MEMBERS
        .iter()
        .map(|(generation, lineage, first, surnames, sex, birth, interests)| {
            let status = if married(*first) { "Casado" } else { "Soltero" };
            RosterEntry {
                generation: *generation,
                lineage: *lineage,
                person: PersonRecord::new(first, surnames, sex, birth)
                    .with_interests(interests)
                    .with_residence("San José")
                    .with_status(status),
            }
        })
        .collect();
    Roster {
        families: vec![RosterFamily {
            name: REFERENCE_FAMILY.to_string(),
            members,
        }],
    }
}

/// Create the reference family in `store`.
pub fn seed_reference_family(store: &mut FamilyStore, today: NaiveDate) -> Result<(), FamilyError> {
    if store.contains(REFERENCE_FAMILY) {
        return Err(FamilyError::FamilyExists(REFERENCE_FAMILY.to_string()));
    }
    store.import_roster(&reference_roster(), today);
    Ok(())
}
