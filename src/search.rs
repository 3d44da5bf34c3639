//! Filter/sort engine.
//!
//! The visible set is computed from the full record list in two steps:
//! a stable, case-insensitive sort on the selected column, then a
//! per-column substring filter with all four conditions ANDed.

use std::cmp::Ordering;
use std::fmt;

use crate::app::AppState;
use crate::model::{UserField, UserRecord};

/// Per-column substring patterns. An empty pattern places no constraint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
}

impl FilterCriteria {
    pub fn get(&self, field: UserField) -> &str {
        match field {
            UserField::Name => &self.name,
            UserField::Username => &self.username,
            UserField::Email => &self.email,
            UserField::Phone => &self.phone,
        }
    }

    pub fn get_mut(&mut self, field: UserField) -> &mut String {
        match field {
            UserField::Name => &mut self.name,
            UserField::Username => &mut self.username,
            UserField::Email => &mut self.email,
            UserField::Phone => &mut self.phone,
        }
    }

    pub fn set(&mut self, field: UserField, pattern: impl Into<String>) {
        *self.get_mut(field) = pattern.into();
    }

    /// Reset every pattern to empty.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        UserField::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    /// True when every column of `user` contains its pattern, ignoring case.
    pub fn matches(&self, user: &UserRecord) -> bool {
        UserField::ALL.iter().all(|f| {
            let pattern = self.get(*f);
            pattern.is_empty() || user.field(*f).to_lowercase().contains(&pattern.to_lowercase())
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Arrow shown next to the sorted column header.
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        })
    }
}

/// Selected sort column and direction. With no column, input order is kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub field: Option<UserField>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn by(field: UserField, direction: SortDirection) -> Self {
        Self {
            field: Some(field),
            direction,
        }
    }

    /// Column-header click semantics: the same column flips direction,
    /// another column is selected ascending.
    pub fn toggle(&mut self, field: UserField) {
        if self.field == Some(field) {
            self.direction = self.direction.flipped();
        } else {
            self.field = Some(field);
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Compare two records under this spec. `Equal` when no column is selected.
    pub fn compare(&self, a: &UserRecord, b: &UserRecord) -> Ordering {
        let Some(field) = self.field else {
            return Ordering::Equal;
        };
        let ord = a
            .field(field)
            .to_lowercase()
            .cmp(&b.field(field).to_lowercase());
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

/// Sort then filter `records` into the visible set. The input is untouched.
///
/// The sort is stable and compares lowercased text; the filter keeps a
/// record only when every non-empty pattern is a substring of its column.
///
/// # Arguments
///
/// * `records` - Full record list from the last fetch.
/// * `criteria` - Per-column substring patterns.
/// * `sort` - Selected column and direction, if any.
///
/// # Returns
///
/// A fresh vector holding the visible records in display order.
pub fn visible_users(
    records: &[UserRecord],
    criteria: &FilterCriteria,
    sort: &SortSpec,
) -> Vec<UserRecord> {
    let mut sorted: Vec<&UserRecord> = records.iter().collect();
    if sort.field.is_some() {
        // slice::sort_by is stable: equal keys keep input order
        sorted.sort_by(|a, b| sort.compare(a, b));
    }
    sorted
        .into_iter()
        .filter(|u| criteria.matches(u))
        .cloned()
        .collect()
}

/// Recompute `app.users` from `app.users_all` and keep the selection in range.
pub fn apply_filters_and_search(app: &mut AppState) {
    app.users = visible_users(&app.users_all, &app.filters, &app.sort);
    app.selected_user_index = app
        .selected_user_index
        .min(app.users.len().saturating_sub(1));
}
