use std::collections::BTreeMap;

use rust_decimal::Decimal;

use registro_domain::{MonthlySummary, UserId};

/// Up to this many users each get a card of their own.
pub const MAX_USER_CARDS: usize = 6;

/// Accumulated savings of one user
#[derive(Debug, Clone, PartialEq)]
pub struct UserSavings {
    pub full_name: String,
    pub user_id: UserId,
    pub total: Decimal,
}

/// Sum of savings over all rows. Missing values count as zero.
pub fn total_savings(rows: &[MonthlySummary]) -> Decimal {
    rows.iter().map(MonthlySummary::savings_or_zero).sum()
}

/// Savings per user, highest total first.
pub fn savings_by_user(rows: &[MonthlySummary]) -> Vec<UserSavings> {
    let mut totals: BTreeMap<(String, UserId), Decimal> = BTreeMap::new();
    for row in rows {
        *totals
            .entry((row.full_name.clone(), row.user_id))
            .or_insert(Decimal::ZERO) += row.savings_or_zero();
    }

    let mut users: Vec<UserSavings> = totals
        .into_iter()
        .map(|((full_name, user_id), total)| UserSavings { full_name, user_id, total })
        .collect();
    users.sort_by(|a, b| {
        b.total.cmp(&a.total)
            .then_with(|| a.full_name.cmp(&b.full_name))
    });
    users
}

/// Whether per-user cards fit, otherwise only the table is shown.
pub fn show_user_cards(users: usize) -> bool {
    users <= MAX_USER_CARDS
}
