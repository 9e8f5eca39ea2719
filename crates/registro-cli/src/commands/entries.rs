use anyhow::Result;
use clap::Args;
use inquire::Confirm;
use rust_decimal::Decimal;

use registro_domain::{
    MonthlySummary,
    Profile,
    Source,
    Store,
    SummaryFilter,
    YearMonth,
};
use registro_reports::{
    currency::format_eur,
    entry_form::EntryForm,
};

use crate::formatting::PrintFormatted;

#[derive(Args, Debug)]
pub struct AddEntry {
    /// Full name of the user
    #[clap(short, long)]
    pub user: String,
    /// expense, payroll or other-income
    #[clap(short, long)]
    pub source: Source,
    /// Defaults to the current year
    #[clap(short, long)]
    pub year: Option<i32>,
    /// Defaults to the current month
    #[clap(short, long)]
    pub month: Option<u32>,
    #[clap(short, long)]
    pub amount: Decimal,
    /// Do not ask for confirmation
    #[clap(long)]
    pub yes: bool,
}

impl AddEntry {
    fn form(&self, now: YearMonth) -> EntryForm {
        EntryForm {
            full_name: self.user.clone(),
            source: self.source,
            year: self.year.unwrap_or(now.year),
            month: self.month.unwrap_or(now.month),
            amount: self.amount,
        }
    }

    /// Run the command, record the entry and show the
    /// month it was booked to.
    pub async fn run<DB: Store>(self, db: &DB) -> Result<()> {
        let form = self.form(YearMonth::current());
        form.check()?;

        let profiles: Vec<Profile> = db.query(&()).await?;
        let entry = form.to_entry(&profiles)?;

        if !self.yes {
            let ok = Confirm::new(&format!(
                    "Record {} of {} for {} in {}?",
                    entry.source,
                    format_eur(entry.amount),
                    form.full_name,
                    entry.period()))
                .with_default(true)
                .prompt()?;
            if !ok {
                return Ok(());
            }
        }

        let inserted = form.submit(&profiles, db).await?;
        println!("Inserted ✅ (id {})", inserted.id);

        // The write invalidated the cache, this reads fresh data
        let rows: Vec<MonthlySummary> = db.query(&SummaryFilter {
            user_id: Some(inserted.user_id),
        }).await?;
        if let Some(row) = rows.iter().find(|r| r.period() == inserted.period()) {
            println!("");
            row.print_formatted();
        }
        Ok(())
    }
}
