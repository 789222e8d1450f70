//! Compatibility Evaluator
//!
//! Decides whether two people may form a union. Every rule is evaluated
//! (no short-circuit) so the report lists all failures at once.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::components::{CivilStatus, PersonId, BASELINE_EMOTIONAL_HEALTH};
use crate::family::Family;
use crate::names;
use crate::position::PositionIndex;

/// Minimum age for a union
pub const ADULT_AGE: u32 = 18;

/// Maximum age difference between partners
pub const MAX_AGE_GAP: u32 = 15;

pub const MIN_SHARED_INTERESTS: usize = 2;
pub const MIN_AFFINITY: u32 = 70;

pub const AFFECTION_POOL: i32 = 100;
pub const WIDOWED_PENALTY: i32 = 20;
pub const LOW_MORALE_PENALTY: i32 = 10;
pub const MIN_AFFECTION: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Adulthood,
    NotPartnered,
    AgeGap,
    SharedInterests,
    Affection,
    NotRelated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCheck {
    pub rule: Rule,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    pub eligible: bool,
    /// Equal to `affinity`.
    pub score: u32,
    /// round(100 * |shared| / |union|) over normalized interests.
    pub affinity: u32,
    pub affection_points: i32,
    pub shared_interests: Vec<String>,
    pub rules: Vec<RuleCheck>,
    pub reasons: Vec<String>,
}

impl CompatibilityReport {
    pub fn passed(&self, rule: Rule) -> bool {
        self.rules.iter().any(|check| check.rule == rule && check.passed)
    }
}

/// Accumulates rule outcomes in evaluation order.
#[derive(Default)]
struct Checks {
    rules: Vec<RuleCheck>,
    reasons: Vec<String>,
}

impl Checks {
    fn record(&mut self, rule: Rule, passed: bool, reason: impl FnOnce() -> String) {
        self.rules.push(RuleCheck { rule, passed });
        if !passed {
            self.reasons.push(reason());
        }
    }
}

/// Shared interests (sorted) and the affinity percentage.
pub fn interest_affinity(a: &[String], b: &[String]) -> (Vec<String>, u32) {
    let normalize = |list: &[String]| -> BTreeSet<String> {
        list.iter()
            .map(|s| names::normalize(s))
            .filter(|s| !s.is_empty())
            .collect()
    };
    let a = normalize(a);
    let b = normalize(b);
    let shared: Vec<String> = a.intersection(&b).cloned().collect();
    let union = a.union(&b).count();
    let affinity = if union == 0 {
        0
    } else {
        ((100.0 * shared.len() as f64) / union as f64).round() as u32
    };
    (shared, affinity)
}

fn surname_tokens(surnames: &str) -> BTreeSet<String> {
    names::normalize(surnames)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Evaluate a prospective union between `a` and `b` on `today`.
pub fn evaluate(family: &Family, a: PersonId, b: PersonId, today: NaiveDate) -> CompatibilityReport {
    let mut checks = Checks::default();
    let name_a = family.full_name(a);
    let name_b = family.full_name(b);

    let age_a = family.effective_age(a, today);
    let age_b = family.effective_age(b, today);
    let adult = |age: Option<u32>| age.is_some_and(|years| years >= ADULT_AGE);
    checks.record(Rule::Adulthood, adult(age_a) && adult(age_b), || {
        format!("{name_a} and {name_b} must both be at least {ADULT_AGE}")
    });

    checks.record(
        Rule::NotPartnered,
        !family.is_partnered(a) && !family.is_partnered(b),
        || format!("{name_a} or {name_b} already has a partner"),
    );

    let gap_ok = match (age_a, age_b) {
        (Some(x), Some(y)) => x.abs_diff(y) <= MAX_AGE_GAP,
        _ => false,
    };
    checks.record(Rule::AgeGap, gap_ok, || {
        format!("age difference exceeds {MAX_AGE_GAP} years")
    });

    let (shared_interests, affinity) =
        interest_affinity(&family.interests(a), &family.interests(b));
    checks.record(
        Rule::SharedInterests,
        shared_interests.len() >= MIN_SHARED_INTERESTS && affinity >= MIN_AFFINITY,
        || {
            format!(
                "{} shared interests at {affinity}% affinity (need {MIN_SHARED_INTERESTS} and {MIN_AFFINITY}%)",
                shared_interests.len()
            )
        },
    );

    let mut affection_points = AFFECTION_POOL;
    if family.civil_status(a) == CivilStatus::Widowed || family.civil_status(b) == CivilStatus::Widowed {
        affection_points -= WIDOWED_PENALTY;
    }
    let low_morale = |id| family.standing(id).emotional_health < BASELINE_EMOTIONAL_HEALTH;
    if low_morale(a) || low_morale(b) {
        affection_points -= LOW_MORALE_PENALTY;
    }
    checks.record(Rule::Affection, affection_points >= MIN_AFFECTION, || {
        format!("affection points {affection_points} below {MIN_AFFECTION}")
    });

    let tokens_a = surname_tokens(&family.surnames(a));
    let tokens_b = surname_tokens(&family.surnames(b));
    let shares_surname = !tokens_a.is_disjoint(&tokens_b);
    let siblings = PositionIndex::new(family.matrix()).siblings_of(a).contains(&b);
    checks.record(Rule::NotRelated, !shares_surname && !siblings, || {
        if siblings {
            format!("{name_a} and {name_b} are siblings")
        } else {
            format!("{name_a} and {name_b} share a surname")
        }
    });

    CompatibilityReport {
        eligible: checks.reasons.is_empty(),
        score: affinity,
        affinity,
        affection_points,
        shared_interests,
        rules: checks.rules,
        reasons: checks.reasons,
    }
}
