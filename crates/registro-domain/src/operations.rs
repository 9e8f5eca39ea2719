use anyhow::Result;
use async_trait::async_trait;

use crate::{
    EntriesResult,
    IncomeEntry,
    MonthlySummary,
    NewEntry,
    Profile,
    SummaryFilter,
};

#[async_trait]
pub trait Query<T> {
    type Filter;
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<T>>;
}

#[async_trait]
pub trait Insert<T> {
    type Output;
    async fn insert(&self, item: T) -> Result<Self::Output>;
}

#[async_trait]
pub trait Retrieve<T> {
    type Filter;
    async fn retrieve(&self, filter: &Self::Filter) -> Result<T>;
}

/// Everything the dashboard needs from a backend: the three
/// reads and the single write.
pub trait Store:
    Query<Profile, Filter = ()>
    + Query<MonthlySummary, Filter = SummaryFilter>
    + Retrieve<EntriesResult, Filter = ()>
    + Insert<NewEntry, Output = IncomeEntry>
    + Send
    + Sync
{
}

impl<T> Store for T where
    T: Query<Profile, Filter = ()>
        + Query<MonthlySummary, Filter = SummaryFilter>
        + Retrieve<EntriesResult, Filter = ()>
        + Insert<NewEntry, Output = IncomeEntry>
        + Send
        + Sync
{
}
