use std::fmt;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use inquire::{Confirm, CustomType, InquireError, Select};
use rust_decimal::Decimal;

use registro_domain::{
    EntriesResult,
    MonthlySummary,
    Profile,
    Source,
    Store,
    SummaryFilter,
    YearMonth,
};
use registro_reports::{
    dashboard::{user_names, Metric},
    entry_form::FormError,
};

use crate::commands::{AddEntry, ListProfiles, ShowDashboard, ShowHistory};

const ALL: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    AddEntry,
    Dashboard,
    History,
    Profiles,
    Quit,
}

impl Action {
    const ALL: [Action; 5] = [
        Action::AddEntry,
        Action::Dashboard,
        Action::History,
        Action::Profiles,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::AddEntry => "Add entry",
            Action::Dashboard => "Dashboard",
            Action::History => "History",
            Action::Profiles => "Users",
            Action::Quit => "Quit",
        })
    }
}

/// A prompt the user walked away from
fn is_canceled(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<InquireError>(),
        Some(InquireError::OperationCanceled | InquireError::OperationInterrupted)
    )
}

#[derive(Args, Debug)]
pub struct Session {}

impl Session {
    /// Run an interactive session. All actions share the store,
    /// so reads are served from its cache until they expire or
    /// an entry is added.
    pub async fn run<DB: Store>(self, db: &DB) -> Result<()> {
        loop {
            let action = match Select::new("What next?", Action::ALL.to_vec()).prompt() {
                Ok(action) => action,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    return Ok(());
                },
                Err(err) => return Err(err.into()),
            };

            let result = match action {
                Action::AddEntry => add_entry(db).await,
                Action::Dashboard => dashboard(db).await,
                Action::History => history(db).await,
                Action::Profiles => ListProfiles {}.run(db).await,
                Action::Quit => return Ok(()),
            };
            match result {
                Err(err) if is_canceled(&err) => {},
                Err(err) => println!("Error: {:#}", err),
                Ok(()) => {},
            }
            println!("");
        }
    }
}

async fn add_entry<DB: Store>(db: &DB) -> Result<()> {
    let profiles: Vec<Profile> = db.query(&()).await?;
    if profiles.is_empty() {
        println!("{}", FormError::NoProfiles);
        return Ok(());
    }
    let names: Vec<String> = profiles.iter().map(|p| p.full_name.clone()).collect();
    let now = YearMonth::current();

    let user = Select::new("User", names).prompt()?;
    let source = Select::new("Type", Source::ALL.to_vec()).prompt()?;
    let year = CustomType::<i32>::new("Year")
        .with_default(now.year)
        .with_error_message("Please type a valid year")
        .prompt()?;
    let month = Select::new("Month", (1..=12).collect::<Vec<u32>>())
        .with_starting_cursor(now.month as usize - 1)
        .prompt()?;
    let amount = CustomType::<Decimal>::new("Amount (€)")
        .with_error_message("Please type a valid amount")
        .prompt()?;

    AddEntry {
        user,
        source,
        year: Some(year),
        month: Some(month),
        amount,
        yes: true,
    }.run(db).await
}

async fn dashboard<DB: Store>(db: &DB) -> Result<()> {
    let rows: Vec<MonthlySummary> = db.query(&SummaryFilter::default()).await?;
    if rows.is_empty() {
        return ShowDashboard::default().run(db).await;
    }

    let user = Select::new("User", user_names(&rows)).prompt()?;
    let metric = Select::new("Metric", Metric::ALL.to_vec()).prompt()?;

    let mut months: Vec<YearMonth> = rows.iter().map(MonthlySummary::period).collect();
    months.sort();
    months.dedup();
    let from = Select::new("From", months.clone()).prompt()?;
    let to = Select::new("To", months.clone())
        .with_starting_cursor(months.len() - 1)
        .prompt()?;

    ShowDashboard {
        user: Some(user),
        metric,
        from: Some(from),
        to: Some(to),
    }.run(db).await
}

/// A selection with an "All" option in front
fn select_optional<T: Clone + fmt::Display>(message: &str, options: Vec<T>) -> Result<Option<T>> {
    let mut labels = vec![ALL.to_string()];
    labels.extend(options.iter().map(|o| o.to_string()));
    let choice = Select::new(message, labels).raw_prompt()?;
    Ok(match choice.index {
        0 => None,
        i => options.get(i - 1).cloned(),
    })
}

async fn history<DB: Store>(db: &DB) -> Result<()> {
    let profiles: Vec<Profile> = db.query(&()).await?;
    let entries: EntriesResult = db.retrieve(&()).await?;
    if entries.is_empty() {
        return ShowHistory::default().run(db).await;
    }

    let names: Vec<String> = profiles.iter().map(|p| p.full_name.clone()).collect();
    let user = select_optional("User", names)?;
    let source = select_optional("Type", Source::ALL.to_vec())?;

    let (mut from, mut to) = (None, None);
    if entries.has_timestamp()
        && Confirm::new("Filter by insertion date?").with_default(false).prompt()?
    {
        from = Some(CustomType::<NaiveDate>::new("From")
            .with_help_message("YYYY-MM-DD")
            .prompt()?);
        to = Some(CustomType::<NaiveDate>::new("To")
            .with_help_message("YYYY-MM-DD")
            .prompt()?);
    }

    ShowHistory { user, source, from, to }.run(db).await
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_is_canceled() {
        assert!(is_canceled(&InquireError::OperationCanceled.into()));
        assert!(is_canceled(&InquireError::OperationInterrupted.into()));
        assert!(!is_canceled(&anyhow!("connection refused")));
    }
}
