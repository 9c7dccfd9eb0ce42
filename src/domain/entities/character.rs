//! Character entity - Lords and other notable people of the series

use chrono::{DateTime, Utc};

use crate::domain::validation::{Constraint, Rule, Validate};
use crate::domain::value_objects::CharacterId;

const NAME_RULES: &[Rule] = &[Rule::Required, Rule::Min(3), Rule::Max(200)];
const TV_SERIES_RULES: &[Rule] = &[Rule::Required, Rule::Min(1)];

/// A character; names are not unique
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    /// Series (or seasons) the character appears in
    pub tv_series: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating or replacing a character
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterRequest {
    pub name: String,
    pub tv_series: Vec<String>,
}

impl CharacterRequest {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        tv_series: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            tv_series: tv_series.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validate for CharacterRequest {
    fn constraints(&self) -> Vec<Constraint<'_>> {
        vec![
            Constraint::text("name", &self.name, NAME_RULES),
            Constraint::list("tv_series", &self.tv_series, TV_SERIES_RULES),
        ]
    }
}

impl Character {
    pub fn create(id: CharacterId, request: CharacterRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: request.name,
            tv_series: request.tv_series,
            created_at: now,
            updated_at: None,
            deleted_at: None,
        }
    }

    /// Overwrite the fields that differ from the request and stamp `updated_at`.
    ///
    /// Series lists are compared by their comma-joined content, so order matters.
    pub fn merge(&mut self, request: &CharacterRequest, now: DateTime<Utc>) {
        if request.name != self.name {
            self.name = request.name.clone();
        }
        if request.tv_series.join(",") != self.tv_series.join(",") {
            self.tv_series = request.tv_series.clone();
        }
        self.updated_at = Some(now);
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
