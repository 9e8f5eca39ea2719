use rust_decimal::{Decimal, RoundingStrategy};

pub const CURRENCY_SYMBOL: &str = "€";

/// Format an amount as euros: `1.234,50 €`.
/// Rounds half away from zero to two decimals.
pub fn format_eur(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let digits = rounded.abs().to_string();
    let (units, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    format!("{}{},{} {}", sign, group_thousands(units), cents, CURRENCY_SYMBOL)
}

/// Insert a `.` between every group of three digits
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_eur() {
        assert_eq!(format_eur(Decimal::ZERO), "0,00 €");
        assert_eq!(format_eur(Decimal::new(12345, 1)), "1.234,50 €");
        assert_eq!(format_eur(Decimal::new(1_000_000, 0)), "1.000.000,00 €");
        assert_eq!(format_eur(Decimal::new(999, 0)), "999,00 €");
        assert_eq!(format_eur(Decimal::new(100_000, 0)), "100.000,00 €");
    }

    #[test]
    fn test_format_eur_rounding() {
        assert_eq!(format_eur(Decimal::new(1005, 3)), "1,01 €");
        assert_eq!(format_eur(Decimal::new(1004, 3)), "1,00 €");
        assert_eq!(format_eur(Decimal::new(99995, 3)), "100,00 €");
        assert_eq!(format_eur(Decimal::new(-25, 3)), "-0,03 €");
    }

    #[test]
    fn test_format_eur_negative() {
        assert_eq!(format_eur(Decimal::new(-123456, 2)), "-1.234,56 €");
        assert_eq!(format_eur(Decimal::new(-1, 3)), "0,00 €");
    }
}
