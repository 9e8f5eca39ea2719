use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error as ThisError;
use tracing::info;

use registro_domain::{
    check_entry,
    find_profile,
    EntryError,
    IncomeEntry,
    Insert,
    NewEntry,
    Profile,
    Source,
};

#[derive(ThisError, Debug)]
pub enum FormError {
    #[error("No users in finance.profiles.")]
    NoProfiles,
    #[error("unknown user {0:?}")]
    UnknownUser(String),
    #[error(transparent)]
    Invalid(#[from] EntryError),
    #[error("Error inserting: {0}")]
    Store(anyhow::Error),
}

/// What the user filled in to record an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryForm {
    pub full_name: String,
    pub source: Source,
    pub year: i32,
    pub month: u32,
    pub amount: Decimal,
}

impl EntryForm {
    /// The amount as it will be recorded
    pub fn rounded_amount(&self) -> Decimal {
        self.amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Check the values alone, before anything is fetched or sent.
    pub fn check(&self) -> Result<(), FormError> {
        check_entry(self.year, self.month, self.rounded_amount())?;
        Ok(())
    }

    /// Resolve the user and check the values. Nothing is sent anywhere.
    pub fn to_entry(&self, profiles: &[Profile]) -> Result<NewEntry, FormError> {
        if profiles.is_empty() {
            return Err(FormError::NoProfiles);
        }
        let profile = find_profile(profiles, &self.full_name)
            .ok_or_else(|| FormError::UnknownUser(self.full_name.clone()))?;

        let entry = NewEntry {
            user_id: profile.user_id,
            year: self.year,
            month: self.month,
            source: self.source,
            amount: self.rounded_amount(),
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Validate and write the entry. A single attempt: a failed
    /// write is handed back as is.
    pub async fn submit<DB>(
        &self,
        profiles: &[Profile],
        db: &DB,
    ) -> Result<IncomeEntry, FormError>
    where
        DB: Insert<NewEntry, Output = IncomeEntry> + Send + Sync,
    {
        self.check()?;
        let entry = self.to_entry(profiles)?;
        let inserted = db.insert(entry).await.map_err(FormError::Store)?;
        info!(id = inserted.id, user = %self.full_name, "entry inserted");
        Ok(inserted)
    }
}
