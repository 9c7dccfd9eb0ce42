//! House entity - A great house, its seat region and its current lord

use chrono::{DateTime, Utc};

use crate::domain::validation::{Constraint, Rule, Validate};
use crate::domain::value_objects::{CharacterId, HouseId};

const NAME_RULES: &[Rule] = &[Rule::Required, Rule::Min(3), Rule::Max(200)];
const REGION_RULES: &[Rule] = &[Rule::Required, Rule::Min(3), Rule::Max(100)];
const FOUNDATION_YEAR_RULES: &[Rule] = &[Rule::Required, Rule::Min(1), Rule::Max(5)];
const CURRENT_LORD_RULES: &[Rule] = &[Rule::Uuid];

/// A house of the realm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct House {
    pub id: HouseId,
    /// Unique among houses that are not deleted
    pub name: String,
    pub region: String,
    /// Kept as text so era-qualified years survive ("298AC")
    pub foundation_year: String,
    /// The character currently ruling the house, if any
    pub current_lord: Option<CharacterId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Set when the house is soft-deleted
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating or replacing a house
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HouseRequest {
    pub name: String,
    pub region: String,
    pub foundation_year: String,
    /// Empty means "no lord"
    pub current_lord: String,
}

impl HouseRequest {
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        foundation_year: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            foundation_year: foundation_year.into(),
            current_lord: String::new(),
        }
    }

    pub fn with_lord(mut self, lord: CharacterId) -> Self {
        self.current_lord = lord.to_string();
        self
    }

    /// The requested lord; only meaningful once the request has been validated
    pub fn lord(&self) -> Option<CharacterId> {
        if self.current_lord.is_empty() {
            None
        } else {
            CharacterId::parse(&self.current_lord).ok()
        }
    }
}

impl Validate for HouseRequest {
    fn constraints(&self) -> Vec<Constraint<'_>> {
        vec![
            Constraint::text("name", &self.name, NAME_RULES),
            Constraint::text("region", &self.region, REGION_RULES),
            Constraint::text("foundation_year", &self.foundation_year, FOUNDATION_YEAR_RULES),
            Constraint::text("current_lord", &self.current_lord, CURRENT_LORD_RULES),
        ]
    }
}

impl House {
    pub fn create(id: HouseId, request: HouseRequest, now: DateTime<Utc>) -> Self {
        let current_lord = request.lord();
        Self {
            id,
            name: request.name,
            region: request.region,
            foundation_year: request.foundation_year,
            current_lord,
            created_at: now,
            updated_at: None,
            deleted_at: None,
        }
    }

    /// Overwrite the fields that differ from the request and stamp `updated_at`.
    ///
    /// The stamp is applied even when nothing changed.
    pub fn merge(&mut self, request: &HouseRequest, now: DateTime<Utc>) {
        if request.name != self.name {
            self.name = request.name.clone();
        }
        if request.region != self.region {
            self.region = request.region.clone();
        }
        if request.foundation_year != self.foundation_year {
            self.foundation_year = request.foundation_year.clone();
        }
        let lord = request.lord();
        if lord != self.current_lord {
            self.current_lord = lord;
        }
        self.updated_at = Some(now);
    }

    pub fn clear_lord(&mut self, now: DateTime<Utc>) {
        self.current_lord = None;
        self.updated_at = Some(now);
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
