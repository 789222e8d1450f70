//! Golden kinship table over the four-row letter family.
//!
//! Row 0: (0,0)[A,B] (0,1)[C,D]
//! Row 1: (1,0)[E,F,G] (1,1)[H,I,J]
//! Row 2: (2,0)[E,H] (2,1)[F,K] (2,2)[G,L] (2,3)[I,M]
//! Row 3: (3,0)[N,P,Q] (3,1)[R,S] (3,2)[O] (3,3)[T]

use chrono::NaiveDate;
use proptest::prelude::*;
use simulation::kinship::{relation, relation_by_key};
use simulation::{Family, PersonRecord, Relation};

const LAYOUT: &[(usize, usize, &[&str])] = &[
    (0, 0, &["A", "B"]),
    (0, 1, &["C", "D"]),
    (1, 0, &["E", "F", "G"]),
    (1, 1, &["H", "I", "J"]),
    (2, 0, &["E", "H"]),
    (2, 1, &["F", "K"]),
    (2, 2, &["G", "L"]),
    (2, 3, &["I", "M"]),
    (3, 0, &["N", "P", "Q"]),
    (3, 1, &["R", "S"]),
    (3, 2, &["O"]),
    (3, 3, &["T"]),
];

const LETTERS: &[&str] = &[
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R",
    "S", "T",
];

fn letter_family() -> Family {
    let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut family = Family::new("Letras");
    for (generation, lineage, members) in LAYOUT {
        for name in *members {
            family
                .register(&PersonRecord::new(name, "", "", "1950-01-01"), *generation, *lineage, today)
                .unwrap();
        }
    }
    family
}

fn rel(family: &Family, a: &str, b: &str) -> Relation {
    relation_by_key(family, a, b).unwrap()
}

/// Asserts `a` relates to `b` as `expected`, and `b` to `a` as its inverse.
fn check_pairs(family: &Family, expected: Relation, pairs: &[(&str, &str)]) {
    for (a, b) in pairs {
        assert_eq!(rel(family, a, b), expected, "{a} -> {b}");
        assert_eq!(rel(family, b, a), expected.inverse(), "{b} -> {a}");
    }
}

#[test]
fn test_partners() {
    let family = letter_family();
    check_pairs(
        &family,
        Relation::Partners,
        &[("A", "B"), ("C", "D"), ("E", "H"), ("F", "K"), ("G", "L"), ("I", "M")],
    );
}

#[test]
fn test_siblings() {
    let family = letter_family();
    check_pairs(
        &family,
        Relation::Siblings,
        &[
            ("E", "F"),
            ("E", "G"),
            ("F", "G"),
            ("H", "I"),
            ("H", "J"),
            ("I", "J"),
            ("N", "P"),
            ("N", "Q"),
            ("P", "Q"),
            ("R", "S"),
        ],
    );
}

#[test]
fn test_parents() {
    let family = letter_family();
    check_pairs(
        &family,
        Relation::ParentOf,
        &[
            ("A", "E"), ("B", "E"), ("A", "F"), ("B", "F"), ("A", "G"), ("B", "G"),
            ("C", "H"), ("D", "H"), ("C", "I"), ("D", "I"), ("C", "J"), ("D", "J"),
            ("E", "N"), ("H", "N"), ("E", "P"), ("H", "P"), ("E", "Q"), ("H", "Q"),
            ("F", "R"), ("K", "R"), ("F", "S"), ("K", "S"),
            ("G", "O"), ("L", "O"),
            ("I", "T"), ("M", "T"),
        ],
    );
}

#[test]
fn test_grandparents_fixed_offset() {
    let family = letter_family();
    check_pairs(
        &family,
        Relation::GrandparentOf,
        &[
            ("A", "N"), ("B", "N"), ("A", "P"), ("B", "P"), ("A", "Q"), ("B", "Q"),
            ("C", "R"), ("D", "R"), ("C", "S"), ("D", "S"),
        ],
    );
}

#[test]
fn test_parents_in_law() {
    let family = letter_family();
    check_pairs(
        &family,
        Relation::ParentInLawOf,
        &[
            ("A", "H"), ("B", "H"), ("C", "K"), ("D", "K"),
            ("A", "L"), ("B", "L"), ("C", "M"), ("D", "M"),
        ],
    );
}

#[test]
fn test_aunts_and_uncles() {
    let family = letter_family();
    check_pairs(
        &family,
        Relation::AuntUncleOf,
        &[
            ("E", "R"), ("E", "S"),
            ("F", "N"), ("F", "P"), ("F", "Q"),
            ("G", "N"), ("G", "P"), ("G", "Q"),
            ("E", "O"), ("F", "O"),
            ("I", "N"), ("I", "P"), ("I", "Q"),
            ("J", "N"), ("J", "P"), ("J", "Q"),
            ("H", "R"), ("H", "S"),
            ("K", "N"), ("K", "P"), ("K", "Q"),
            ("L", "N"), ("L", "P"), ("L", "Q"),
        ],
    );
}

#[test]
fn test_siblings_in_law() {
    let family = letter_family();
    check_pairs(
        &family,
        Relation::SiblingsInLaw,
        &[("E", "K"), ("E", "L"), ("E", "I"), ("E", "J"), ("G", "I")],
    );
}

#[test]
fn test_cousins() {
    let family = letter_family();
    check_pairs(
        &family,
        Relation::Cousins,
        &[
            ("N", "R"), ("N", "S"), ("P", "R"), ("P", "S"), ("Q", "R"), ("Q", "S"),
            ("N", "O"), ("P", "O"), ("Q", "O"),
            ("N", "T"), ("P", "T"), ("Q", "T"),
        ],
    );
}

#[test]
fn test_founders_and_unmarried_child() {
    let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut family = Family::new("Mora");
    for (name, generation) in [("F0a", 0), ("F0b", 0), ("C1a", 1), ("C1b", 1)] {
        family
            .register(&PersonRecord::new(name, "Mora", "", "1980-01-01"), generation, 0, today)
            .unwrap();
    }
    family
        .register(
            &PersonRecord::new("Joven", "Vargas", "F", "2008-01-01"),
            1,
            1,
            today,
        )
        .unwrap();

    assert_eq!(rel(&family, "F0a Mora", "C1a Mora"), Relation::ParentOf);
    assert_eq!(rel(&family, "C1a Mora", "C1b Mora"), Relation::Siblings);

    let c1a = family.resolve("C1a Mora").unwrap();
    let joven = family.resolve("Joven Vargas").unwrap();
    let report = simulation::compatibility::evaluate(&family, c1a, joven, today);
    assert!(!report.eligible);
    assert!(!report.passed(simulation::Rule::Adulthood));
    assert!(!report.reasons.is_empty());
}

#[test]
fn test_unknown_names_are_not_found() {
    let family = letter_family();
    assert!(relation_by_key(&family, "A", "Z").unwrap_err().is_not_found());
}

proptest! {
    #[test]
    fn prop_swap_yields_inverse(a in 0..LETTERS.len(), b in 0..LETTERS.len()) {
        let family = letter_family();
        let x = family.resolve(LETTERS[a]).unwrap();
        let y = family.resolve(LETTERS[b]).unwrap();
        let forward = relation(family.matrix(), x, y).unwrap();
        let backward = relation(family.matrix(), y, x).unwrap();
        prop_assert_eq!(forward.inverse(), backward);
        if forward.is_symmetric() {
            prop_assert_eq!(forward, backward);
        }
    }
}
