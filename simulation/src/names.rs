//! Name Generation and Matching
//!
//! Random first names for newborns, surname inheritance, and the
//! case/diacritic-insensitive normalization every name lookup goes through.

use rand::Rng;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::components::Sex;

/// First names for boys
const MALE_FIRST_NAMES: &[&str] = &[
    "Carlos", "Luis", "Mateo", "Diego", "Gabriel", "Bruno", "Iker", "Tomás",
    "Daniel", "Lucas", "Nicolás", "José", "Antonio", "Miguel", "Juan", "Pedro",
    "Andrés", "Santiago", "Sebastián", "Manuel",
];

/// First names for girls
const FEMALE_FIRST_NAMES: &[&str] = &[
    "María", "Ana", "Sofía", "Valeria", "Emma", "Camila", "Lucía", "Sara",
    "Zoe", "Luna", "Mía", "Carmen", "Laura", "Elena", "Isabel", "Gabriela",
    "Daniela", "Paula", "Valentina", "Julieta",
];

/// Residence used when neither parent has one on record.
pub const DEFAULT_PROVINCE: &str = "San José";

/// Pick a first name appropriate for `sex`
pub fn random_first_name<R: Rng + ?Sized>(sex: Sex, rng: &mut R) -> &'static str {
    let names = match sex {
        Sex::Male => MALE_FIRST_NAMES,
        Sex::Female => FEMALE_FIRST_NAMES,
    };
    names[rng.gen_range(0..names.len())]
}

/// Lowercase, trim, and strip diacritics so "José  " and "jose" compare equal.
pub fn normalize(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn first_surname(surnames: &str) -> &str {
    surnames.split_whitespace().next().unwrap_or("")
}

/// Child surnames: father's first surname followed by mother's first surname.
pub fn child_surnames(father_surnames: &str, mother_surnames: &str) -> String {
    format!(
        "{} {}",
        first_surname(father_surnames),
        first_surname(mother_surnames)
    )
    .trim()
    .to_string()
}

/// Leading digit of civil ids issued in a province.
pub fn province_prefix(province: &str) -> char {
    match normalize(province).as_str() {
        "alajuela" => '2',
        "cartago" => '3',
        "heredia" => '4',
        "guanacaste" => '5',
        "puntarenas" => '6',
        "limon" => '7',
        _ => '1',
    }
}
