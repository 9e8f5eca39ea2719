use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use registro_domain::{MonthlySummary, Profile};
use registro_reports::{
    currency::format_eur,
    dashboard::{DashboardView, Point},
    history::HistoryView,
    savings::{show_user_cards, UserSavings},
};

const CHART_WIDTH: usize = 40;

pub trait PrintFormatted {
    fn print_formatted(&self);
}

impl PrintFormatted for Vec<Profile> {
    fn print_formatted(&self) {
        println!("{:<36}\t{}", "User ID", "Name");
        println!("{:-<80}", "-");
        for profile in self {
            println!("{:<36}\t{}", profile.user_id.to_string(), profile.full_name);
        }
    }
}

impl PrintFormatted for MonthlySummary {
    fn print_formatted(&self) {
        println!("User:\t\t{}", self.full_name);
        println!("Month:\t\t{}", self.year_month);
        println!("Income:\t\t{}", format_eur(self.income_or_zero()));
        println!("Expenses:\t{}", format_eur(self.expenses_or_zero()));
        println!("Savings:\t{}", format_eur(self.savings_or_zero()));
    }
}

impl PrintFormatted for Vec<UserSavings> {
    /// One card per user when few enough, a table otherwise
    fn print_formatted(&self) {
        if show_user_cards(self.len()) {
            let cards: Vec<String> = self
                .iter()
                .map(|u| format!("[ {}: {} ]", u.full_name, format_eur(u.total)))
                .collect();
            println!("{}", cards.join("  "));
            return;
        }

        println!("{:<30}\t{:>18}", "User", "Savings");
        println!("{:-<60}", "-");
        for user in self {
            println!("{:<30}\t{:>18}", user.full_name, format_eur(user.total));
        }
    }
}

impl PrintFormatted for DashboardView {
    fn print_formatted(&self) {
        println!(
            "{:<10}\t{:>18}\t{:>18}\t{:>18}",
            "Month", "Income", "Expenses", "Savings"
        );
        println!("{:-<80}", "-");
        for row in &self.rows {
            println!(
                "{:<10}\t{:>18}\t{:>18}\t{:>18}",
                row.year_month,
                format_eur(row.income_or_zero()),
                format_eur(row.expenses_or_zero()),
                format_eur(row.savings_or_zero()),
            );
        }
    }
}

impl PrintFormatted for HistoryView {
    fn print_formatted(&self) {
        println!(
            "{:>6}\t{:<20}\t{:<24}\t{:<8}\t{:<16}\t{:>16}",
            "ID", "Inserted", "User", "Month", "Type", "Amount"
        );
        println!("{:-<120}", "-");
        for row in &self.rows {
            let inserted = match row.created_at {
                Some(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
                None => "-".to_string(),
            };
            println!(
                "{:>6}\t{:<20}\t{:<24}\t{:<8}\t{:<16}\t{:>16}",
                row.id,
                inserted,
                row.full_name,
                row.period.to_string(),
                row.source.to_string(),
                format_eur(row.amount),
            );
        }
    }
}

/// Length of the bar for `value`, scaled so `max` fills the chart
fn bar_len(value: Decimal, max: Decimal) -> usize {
    if max.is_zero() {
        return 0;
    }
    (value.abs() / max * Decimal::from(CHART_WIDTH))
        .round()
        .to_usize()
        .unwrap_or(0)
}

/// Draw the metric over time as horizontal bars.
/// Negative values are drawn with a lighter bar.
pub fn print_chart(points: &[Point]) {
    let max = points
        .iter()
        .map(|p| p.value.abs())
        .max()
        .unwrap_or(Decimal::ZERO);

    for point in points {
        let glyph = if point.value.is_sign_negative() { "░" } else { "█" };
        let bar = glyph.repeat(bar_len(point.value, max));
        println!(
            "{:<8} {:<width$} {:>16}",
            point.year_month,
            bar,
            format_eur(point.value),
            width = CHART_WIDTH,
        );
    }
}
