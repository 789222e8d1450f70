//! Change records emitted by the life-event simulator
//!
//! One record per observable event in a tick, handed to the notification
//! observer and returned in the tick report. Serialized as flat JSON objects
//! tagged by `type`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::components::PersonId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub family: String,
    pub person_id: PersonId,
    pub civil_id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChangeKind {
    Birthday {
        #[serde(rename = "newAge")]
        new_age: u32,
    },
    Death {
        date: NaiveDate,
    },
    Union {
        #[serde(rename = "partnerName")]
        partner_name: String,
        score: u32,
        generation: usize,
        lineage: usize,
    },
    Birth {
        date: NaiveDate,
        parents: Vec<String>,
        generation: usize,
        lineage: usize,
    },
}

impl ChangeRecord {
    pub fn label(&self) -> &'static str {
        match self.kind {
            ChangeKind::Birthday { .. } => "birthday",
            ChangeKind::Death { .. } => "death",
            ChangeKind::Union { .. } => "union",
            ChangeKind::Birth { .. } => "birth",
        }
    }
}
