use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use registro_domain::{
    EntriesResult,
    IncomeEntry,
    Profile,
    Source,
    UserId,
    YearMonth,
};

/// An inclusive range of calendar days, swapped when
/// given the wrong way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { from: a, to: b }
        } else {
            Self { from: b, to: a }
        }
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// The history selection. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub user: Option<UserId>,
    pub source: Option<Source>,
    /// Only honored when entries carry an insertion time
    pub created: Option<DateRange>,
}

/// An entry prepared for display
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub id: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub user_id: UserId,
    pub full_name: String,
    pub period: YearMonth,
    pub source: Source,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryView {
    pub has_timestamp: bool,
    pub rows: Vec<HistoryRow>,
}

/// Join display names onto raw entries. Entries of unknown
/// users are shown by id.
pub fn history_rows(entries: &[IncomeEntry], profiles: &[Profile]) -> Vec<HistoryRow> {
    let names: HashMap<UserId, &str> = profiles
        .iter()
        .map(|p| (p.user_id, p.full_name.as_str()))
        .collect();

    entries
        .iter()
        .map(|e| HistoryRow {
            id: e.id,
            created_at: e.created_at,
            user_id: e.user_id,
            full_name: names
                .get(&e.user_id)
                .map(|n| n.to_string())
                .unwrap_or_else(|| e.user_id.to_string()),
            period: e.period(),
            source: e.source,
            amount: e.amount,
        })
        .collect()
}

/// Apply the history selection. Newest entries first: by insertion
/// time when known, by period otherwise.
pub fn filter_history(
    entries: &EntriesResult,
    profiles: &[Profile],
    filter: &HistoryFilter,
) -> HistoryView {
    let mut rows: Vec<HistoryRow> = history_rows(entries.entries(), profiles)
        .into_iter()
        .filter(|r| filter.user.map_or(true, |user| r.user_id == user))
        .filter(|r| filter.source.map_or(true, |source| r.source == source))
        .collect();

    match entries {
        EntriesResult::WithTimestamp(_) => {
            if let Some(range) = filter.created {
                rows.retain(|r| {
                    r.created_at.map_or(false, |ts| range.contains(ts.date_naive()))
                });
            }
            rows.sort_by(|a, b| {
                b.created_at.cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            });
        },
        EntriesResult::WithoutTimestamp(_) => {
            rows.sort_by(|a, b| {
                b.period.cmp(&a.period)
                    .then_with(|| b.id.cmp(&a.id))
            });
        },
    }

    HistoryView {
        has_timestamp: entries.has_timestamp(),
        rows,
    }
}
