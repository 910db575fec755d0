//! Author data structure.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Sex as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Unknown,
    Female,
    Male,
}

impl Sex {
    /// Map the platform's numeric sex code.
    ///
    /// `0` is unknown, `1` female, `2` male. Any other code is not a sex.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Sex::Unknown),
            1 => Some(Sex::Female),
            2 => Some(Sex::Male),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Unknown => "Unknown",
            Sex::Female => "Female",
            Sex::Male => "Male",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unknown" => Ok(Sex::Unknown),
            "Female" => Ok(Sex::Female),
            "Male" => Ok(Sex::Male),
            other => Err(AppError::format(format!("unknown sex value '{other}'"))),
        }
    }
}

/// The author of a post or comment.
///
/// Only the id is known at parse time; sex and birth date are filled in by
/// the author enricher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Platform identifier (negative for communities)
    pub id: String,

    #[serde(default)]
    pub sex: Option<Sex>,

    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

impl Author {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sex: None,
            birth_date: None,
        }
    }

    /// Numeric id, if the id is numeric.
    pub fn numeric_id(&self) -> Option<i64> {
        self.id.parse().ok()
    }

    /// Whether the id belongs to a community account.
    pub fn is_community(&self) -> bool {
        self.numeric_id().is_some_and(|id| id < 0)
    }

    /// Whether the id belongs to a user account.
    pub fn is_user(&self) -> bool {
        self.numeric_id().is_some_and(|id| id > 0)
    }

    /// Age in full years as of today.
    pub fn age(&self) -> Option<u32> {
        self.age_on(Local::now().date_naive())
    }

    /// Age in full years as of `today`.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        if today < birth {
            return None;
        }
        let mut years = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }
}
