use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error as ThisError;

use registro_domain::{MonthlySummary, YearMonth};

/// What the dashboard plots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Metric {
    #[default]
    Income,
    Expenses,
    Savings,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Income, Metric::Expenses, Metric::Savings];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Income => "Income",
            Metric::Expenses => "Expenses",
            Metric::Savings => "Savings",
        }
    }

    /// The metric's value in a summary row, zero if missing
    pub fn value(&self, row: &MonthlySummary) -> Decimal {
        match self {
            Metric::Income => row.income_or_zero(),
            Metric::Expenses => row.expenses_or_zero(),
            Metric::Savings => row.savings_or_zero(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
#[error("unknown metric {0:?}, expected one of: income, expenses, savings")]
pub struct UnknownMetric(pub String);

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

/// An inclusive range of months. Bounds given the wrong
/// way round are swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    from: YearMonth,
    to: YearMonth,
}

impl MonthRange {
    pub fn new(a: YearMonth, b: YearMonth) -> Self {
        if a <= b {
            Self { from: a, to: b }
        } else {
            Self { from: b, to: a }
        }
    }

    /// The range from the first to the last month present in `rows`.
    pub fn spanning(rows: &[MonthlySummary]) -> Option<Self> {
        let first = rows.iter().map(MonthlySummary::period).min()?;
        let last = rows.iter().map(MonthlySummary::period).max()?;
        Some(Self::new(first, last))
    }

    pub fn from(&self) -> YearMonth {
        self.from
    }

    pub fn to(&self) -> YearMonth {
        self.to
    }

    pub fn contains(&self, period: YearMonth) -> bool {
        self.from <= period && period <= self.to
    }
}

impl fmt::Display for MonthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.from, self.to)
    }
}

/// The dashboard selection: one user, one metric, a range of months.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardFilter {
    pub full_name: String,
    pub metric: Metric,
    pub range: MonthRange,
}

/// A point of the metric chart
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub year_month: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub rows: Vec<MonthlySummary>,
    pub points: Vec<Point>,
}

impl DashboardView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Names offered by the user selector, sorted and distinct.
pub fn user_names(rows: &[MonthlySummary]) -> Vec<String> {
    let mut names: Vec<String> = rows.iter().map(|r| r.full_name.clone()).collect();
    names.sort();
    names.dedup();
    names
}

/// Apply the dashboard selection. Rows come out oldest month first.
pub fn filter_dashboard(rows: &[MonthlySummary], filter: &DashboardFilter) -> DashboardView {
    let mut rows: Vec<MonthlySummary> = rows
        .iter()
        .filter(|r| r.full_name == filter.full_name)
        .filter(|r| filter.range.contains(r.period()))
        .cloned()
        .collect();
    rows.sort_by_key(MonthlySummary::period);

    let points = rows
        .iter()
        .map(|r| Point {
            year_month: r.period().to_string(),
            value: filter.metric.value(r),
        })
        .collect();

    DashboardView { rows, points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn row(name: &str, year: i32, month: u32, income: i64, expenses: i64) -> MonthlySummary {
        MonthlySummary {
            full_name: name.to_string(),
            user_id: Uuid::nil(),
            year,
            month,
            year_month: format!("{:04}-{:02}", year, month),
            income: Some(Decimal::new(income, 0)),
            expenses: Some(Decimal::new(expenses, 0)),
            savings: Some(Decimal::new(income - expenses, 0)),
        }
    }

    fn sample() -> Vec<MonthlySummary> {
        vec![
            row("Ana", 2024, 3, 1500, 400),
            row("Luis", 2024, 1, 900, 100),
            row("Ana", 2023, 12, 1400, 900),
            row("Ana", 2024, 1, 1500, 1600),
            row("Ana", 2024, 5, 1500, 200),
        ]
    }

    #[test]
    fn test_month_range_swaps_bounds() {
        let range = MonthRange::new(ym("2024-05"), ym("2024-01"));
        assert_eq!(range.from(), ym("2024-01"));
        assert_eq!(range.to(), ym("2024-05"));
        assert!(range.contains(ym("2024-01")));
        assert!(range.contains(ym("2024-05")));
        assert!(!range.contains(ym("2023-12")));
    }

    #[test]
    fn test_month_range_spanning() {
        let range = MonthRange::spanning(&sample()).unwrap();
        assert_eq!(range.to_string(), "2023-12 → 2024-05");
        assert_eq!(MonthRange::spanning(&[]), None);
    }

    #[test]
    fn test_user_names() {
        assert_eq!(user_names(&sample()), vec!["Ana", "Luis"]);
    }

    #[test]
    fn test_filter_dashboard() {
        let filter = DashboardFilter {
            full_name: "Ana".to_string(),
            metric: Metric::Savings,
            range: MonthRange::new(ym("2024-01"), ym("2024-03")),
        };
        let view = filter_dashboard(&sample(), &filter);
        let months: Vec<&str> = view.rows.iter().map(|r| r.year_month.as_str()).collect();
        assert_eq!(months, vec!["2024-01", "2024-03"]);
        assert_eq!(view.points, vec![
            Point { year_month: "2024-01".to_string(), value: Decimal::new(-100, 0) },
            Point { year_month: "2024-03".to_string(), value: Decimal::new(1100, 0) },
        ]);
    }

    #[test]
    fn test_filter_dashboard_inverted_range_is_same() {
        let rows = sample();
        let forward = DashboardFilter {
            full_name: "Ana".to_string(),
            metric: Metric::Income,
            range: MonthRange::new(ym("2023-12"), ym("2024-04")),
        };
        let backward = DashboardFilter {
            range: MonthRange::new(ym("2024-04"), ym("2023-12")),
            ..forward.clone()
        };
        assert_eq!(filter_dashboard(&rows, &forward), filter_dashboard(&rows, &backward));
        assert_eq!(filter_dashboard(&rows, &forward).rows.len(), 3);
    }

    #[test]
    fn test_filter_dashboard_empty_range() {
        let filter = DashboardFilter {
            full_name: "Luis".to_string(),
            metric: Metric::Expenses,
            range: MonthRange::new(ym("2024-02"), ym("2024-06")),
        };
        assert!(filter_dashboard(&sample(), &filter).is_empty());
    }

    #[test]
    fn test_metric_parse() {
        assert_eq!("income".parse::<Metric>().unwrap(), Metric::Income);
        assert_eq!("SAVINGS".parse::<Metric>().unwrap(), Metric::Savings);
        assert!("profit".parse::<Metric>().is_err());
    }
}
