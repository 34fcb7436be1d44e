//! Search filter domain model.
//!
//! A `Filter` is the full set of criteria sent to the remote search endpoint.
//! It is persisted as JSON and used (together with the page cursor) as the
//! page-cache key, so it is `Hash + Eq` by value.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PawError, Result};
use crate::validation::{ZIP_ERROR, is_valid_zip_code};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_AGE_MIN: u32 = 0;
pub const DEFAULT_AGE_MAX: u32 = 20;

/// Field the remote service sorts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Breed,
    Name,
    Age,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Sort criterion, written on the wire as `"<field>:<direction>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::new(SortField::Breed, SortDirection::Asc)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = match self.field {
            SortField::Breed => "breed",
            SortField::Name => "name",
            SortField::Age => "age",
        };
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{}:{}", field, direction)
    }
}

impl FromStr for SortOrder {
    type Err = PawError;

    fn from_str(s: &str) -> Result<Self> {
        let (field, direction) = s
            .split_once(':')
            .ok_or_else(|| PawError::validation("sort", format!("expected field:direction, got '{}'", s)))?;

        let field = match field {
            "breed" => SortField::Breed,
            "name" => SortField::Name,
            "age" => SortField::Age,
            other => return Err(PawError::validation("sort", format!("unknown sort field '{}'", other))),
        };
        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            other => {
                return Err(PawError::validation(
                    "sort",
                    format!("unknown sort direction '{}'", other),
                ));
            }
        };

        Ok(Self::new(field, direction))
    }
}

impl TryFrom<String> for SortOrder {
    type Error = PawError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SortOrder> for String {
    fn from(order: SortOrder) -> Self {
        order.to_string()
    }
}

/// Search criteria driving the remote query.
///
/// Invariants, upheld by [`Filter::apply`] and [`Filter::sanitized`]:
/// - `age_min <= age_max`
/// - `zip_codes`, when present, is non-empty and every entry is five digits
/// - `page_size >= 1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    #[serde(default)]
    pub breeds: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_codes: Option<Vec<String>>,
    #[serde(default)]
    pub age_min: u32,
    #[serde(default = "default_age_max")]
    pub age_max: u32,
    #[serde(default)]
    pub sort: SortOrder,
    #[serde(rename = "size", default = "default_page_size")]
    pub page_size: u32,
}

fn default_age_max() -> u32 {
    DEFAULT_AGE_MAX
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            breeds: BTreeSet::new(),
            zip_codes: None,
            age_min: DEFAULT_AGE_MIN,
            age_max: DEFAULT_AGE_MAX,
            sort: SortOrder::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Partial filter change. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub breeds: Option<BTreeSet<String>>,
    /// `Some(None)` removes the ZIP criterion
    pub zip_codes: Option<Option<Vec<String>>>,
    pub age_min: Option<u32>,
    pub age_max: Option<u32>,
    pub sort: Option<SortOrder>,
    pub page_size: Option<u32>,
}

impl FilterUpdate {
    pub fn breeds<I, S>(breeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            breeds: Some(breeds.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn age_range(min: u32, max: u32) -> Self {
        Self {
            age_min: Some(min),
            age_max: Some(max),
            ..Self::default()
        }
    }

    pub fn sort(sort: SortOrder) -> Self {
        Self {
            sort: Some(sort),
            ..Self::default()
        }
    }

    pub fn page_size(size: u32) -> Self {
        Self {
            page_size: Some(size),
            ..Self::default()
        }
    }

    pub fn zip_codes(zip_codes: Option<Vec<String>>) -> Self {
        Self {
            zip_codes: Some(zip_codes),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Rejects the update without touching any state.
    pub fn validate(&self) -> Result<()> {
        if let Some(Some(zips)) = &self.zip_codes {
            if zips.is_empty() {
                return Err(PawError::validation("zipCode", ZIP_ERROR));
            }
            if zips.iter().any(|z| !is_valid_zip_code(z)) {
                return Err(PawError::validation("zipCode", ZIP_ERROR));
            }
        }
        if self.page_size == Some(0) {
            return Err(PawError::validation("pageSize", "Page size must be at least 1"));
        }
        Ok(())
    }
}

impl Filter {
    /// Validates `update`, merges it, and normalizes the age range.
    ///
    /// On error the filter is left unchanged.
    pub fn apply(&mut self, update: FilterUpdate) -> Result<()> {
        update.validate()?;

        if let Some(breeds) = update.breeds {
            self.breeds = breeds;
        }
        if let Some(zip_codes) = update.zip_codes {
            self.zip_codes = zip_codes;
        }
        if let Some(age_min) = update.age_min {
            self.age_min = age_min;
        }
        if let Some(age_max) = update.age_max {
            self.age_max = age_max;
        }
        if let Some(sort) = update.sort {
            self.sort = sort;
        }
        if let Some(page_size) = update.page_size {
            self.page_size = page_size;
        }

        self.normalize_ages();
        Ok(())
    }

    /// Repairs a filter read from storage so every invariant holds.
    ///
    /// Invalid ZIP entries are dropped, a zero page size falls back to the
    /// default, and an inverted age range is swapped.
    pub fn sanitized(mut self) -> Self {
        if let Some(zips) = self.zip_codes.take() {
            let valid: Vec<String> = zips.into_iter().filter(|z| is_valid_zip_code(z)).collect();
            self.zip_codes = if valid.is_empty() { None } else { Some(valid) };
        }
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        self.normalize_ages();
        self
    }

    fn normalize_ages(&mut self) {
        if self.age_min > self.age_max {
            std::mem::swap(&mut self.age_min, &mut self.age_max);
        }
    }
}
