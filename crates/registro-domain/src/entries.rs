use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error as ThisError;

use crate::{UserId, YearMonth};

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

/// Kind of an entry. The backend stores the labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "Gasto")]
    Expense,
    #[serde(rename = "Nómina")]
    Payroll,
    #[serde(rename = "Otros Ingresos")]
    OtherIncome,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Expense, Source::Payroll, Source::OtherIncome];

    /// Label as stored in the backend
    pub fn label(&self) -> &'static str {
        match self {
            Source::Expense => "Gasto",
            Source::Payroll => "Nómina",
            Source::OtherIncome => "Otros Ingresos",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
#[error("unknown entry type {0:?}, expected one of: expense, payroll, other-income")]
pub struct UnknownSource(pub String);

impl FromStr for Source {
    type Err = UnknownSource;

    /// Accepts the stored labels as well as short english names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        for source in Source::ALL {
            if source.label().eq_ignore_ascii_case(needle) {
                return Ok(source);
            }
        }
        match needle.to_ascii_lowercase().as_str() {
            "expense" => Ok(Source::Expense),
            "payroll" => Ok(Source::Payroll),
            "other-income" | "other_income" | "other" => Ok(Source::OtherIncome),
            _ => Err(UnknownSource(s.to_string())),
        }
    }
}

/// Entry validation errors
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("the amount must be greater than 0")]
    AmountNotPositive,
    #[error("month {0} is out of range 1-12")]
    MonthOutOfRange(u32),
    #[error("year {0} is out of range 2000-2100")]
    YearOutOfRange(i32),
}

/// Check the fields of an entry. No user is needed for this.
pub fn check_entry(year: i32, month: u32, amount: Decimal) -> Result<(), EntryError> {
    if amount <= Decimal::ZERO {
        return Err(EntryError::AmountNotPositive);
    }
    if !(1..=12).contains(&month) {
        return Err(EntryError::MonthOutOfRange(month));
    }
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(EntryError::YearOutOfRange(year));
    }
    Ok(())
}

/// Parse an insertion time. Values without an offset
/// are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .into_iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) => parse_timestamp(&value)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp {:?}", value))),
        None => Ok(None),
    }
}

/// A recorded entry as read back from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeEntry {
    pub id: i64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,
    pub user_id: UserId,
    pub year: i32,
    pub month: u32,
    pub source: Source,
    pub amount: Decimal,
}

impl IncomeEntry {
    pub fn period(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }
}

/// The payload written for a new entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub user_id: UserId,
    pub year: i32,
    pub month: u32,
    pub source: Source,
    pub amount: Decimal,
}

impl NewEntry {
    /// Check the entry before it is sent anywhere.
    pub fn validate(&self) -> Result<(), EntryError> {
        check_entry(self.year, self.month, self.amount)
    }

    pub fn period(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }
}

/// Raw entries, tagged by whether the backend knows
/// when they were inserted.
#[derive(Debug, Clone, PartialEq)]
pub enum EntriesResult {
    WithTimestamp(Vec<IncomeEntry>),
    WithoutTimestamp(Vec<IncomeEntry>),
}

impl EntriesResult {
    pub fn entries(&self) -> &[IncomeEntry] {
        match self {
            EntriesResult::WithTimestamp(rows) => rows,
            EntriesResult::WithoutTimestamp(rows) => rows,
        }
    }

    pub fn has_timestamp(&self) -> bool {
        matches!(self, EntriesResult::WithTimestamp(_))
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
