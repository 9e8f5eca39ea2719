use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{UserId, YearMonth};

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SummaryFilter {
    pub user_id: Option<UserId>,
}

/// One row of the monthly summary view: income, expenses and
/// savings of one user in one month, aggregated by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub full_name: String,
    pub user_id: UserId,
    pub year: i32,
    pub month: u32,
    pub year_month: String,
    #[serde(rename = "ingreso", default, deserialize_with = "lenient_decimal")]
    pub income: Option<Decimal>,
    #[serde(rename = "gastos", default, deserialize_with = "lenient_decimal")]
    pub expenses: Option<Decimal>,
    #[serde(rename = "ahorro", default, deserialize_with = "lenient_decimal")]
    pub savings: Option<Decimal>,
}

impl MonthlySummary {
    pub fn period(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }

    pub fn income_or_zero(&self) -> Decimal {
        self.income.unwrap_or_default()
    }

    pub fn expenses_or_zero(&self) -> Decimal {
        self.expenses.unwrap_or_default()
    }

    pub fn savings_or_zero(&self) -> Decimal {
        self.savings.unwrap_or_default()
    }
}

/// Parse a decimal from a number or a numeric string.
/// Anything else decodes as missing.
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let decimal = match value {
        Some(Value::Number(n)) => parse_decimal(&n.to_string()),
        Some(Value::String(s)) => parse_decimal(&s),
        _ => None,
    };
    Ok(decimal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_decode_view_row() {
        let json = r#"{
            "full_name": "Ana",
            "user_id": "6f1c1f5e-8a53-4c52-9a55-2b0c3b2c1d10",
            "year": 2024,
            "month": 3,
            "year_month": "2024-03",
            "ingreso": 1500.0,
            "gastos": "200.50",
            "ahorro": null
        }"#;
        let row: MonthlySummary = serde_json::from_str(json).unwrap();
        assert_eq!(row.income, Some(Decimal::new(1500, 0)));
        assert_eq!(row.expenses, Some(Decimal::new(20050, 2)));
        assert_eq!(row.savings, None);
        assert_eq!(row.savings_or_zero(), Decimal::ZERO);
        assert_eq!(row.period().to_string(), row.year_month);
    }

    #[test]
    fn test_summary_decode_garbage_as_missing() {
        let json = r#"{
            "full_name": "Luis",
            "user_id": "6f1c1f5e-8a53-4c52-9a55-2b0c3b2c1d11",
            "year": 2024,
            "month": 4,
            "year_month": "2024-04",
            "ingreso": "n/a",
            "ahorro": true
        }"#;
        let row: MonthlySummary = serde_json::from_str(json).unwrap();
        assert_eq!(row.income, None);
        assert_eq!(row.expenses, None);
        assert_eq!(row.savings, None);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal(" 12.30 "), Some(Decimal::new(1230, 2)));
        assert_eq!(parse_decimal("1e3"), Some(Decimal::new(1000, 0)));
        assert_eq!(parse_decimal("abc"), None);
    }
}
