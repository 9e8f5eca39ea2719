use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::Args;

use registro_domain::{find_profile, EntriesResult, Profile, Source, Store};
use registro_reports::history::{filter_history, DateRange, HistoryFilter};

use crate::formatting::PrintFormatted;

#[derive(Args, Debug, Default)]
pub struct ShowHistory {
    /// Full name of the user
    #[clap(short, long)]
    pub user: Option<String>,
    /// expense, payroll or other-income
    #[clap(short, long)]
    pub source: Option<Source>,
    /// Inserted on or after this day
    #[clap(short, long)]
    pub from: Option<NaiveDate>,
    /// Inserted on or before this day
    #[clap(short, long)]
    pub to: Option<NaiveDate>,
}

impl ShowHistory {
    /// Resolve the selection against the known users
    pub fn filter(&self, profiles: &[Profile]) -> Result<HistoryFilter> {
        let user = match &self.user {
            Some(name) => Some(find_profile(profiles, name)
                .ok_or_else(|| anyhow!("unknown user {:?}", name))?
                .user_id),
            None => None,
        };
        let created = match (self.from, self.to) {
            (None, None) => None,
            (from, to) => Some(DateRange::new(
                from.unwrap_or(NaiveDate::MIN),
                to.unwrap_or(NaiveDate::MAX))),
        };
        Ok(HistoryFilter { user, source: self.source, created })
    }

    /// Run the command and list matching entries, newest first
    pub async fn run<DB: Store>(self, db: &DB) -> Result<()> {
        let profiles: Vec<Profile> = db.query(&()).await?;
        let entries: EntriesResult = db.retrieve(&()).await?;
        if entries.is_empty() {
            println!("No entries recorded yet.");
            return Ok(());
        }

        let filter = self.filter(&profiles)?;
        if filter.created.is_some() && !entries.has_timestamp() {
            println!("Insertion dates are not available, ignoring the date range.");
        }

        let view = filter_history(&entries, &profiles, &filter);
        println!("{} entries.", view.rows.len());
        view.print_formatted();

        Ok(())
    }
}
