use anyhow::Result;
use async_trait::async_trait;
use sqlx::{sqlite::SqliteConnection, FromRow, QueryBuilder, Sqlite};
use tracing::{debug, warn};
use uuid::Uuid;

use registro_domain::{
    parse_decimal,
    parse_timestamp,
    EntriesResult,
    IncomeEntry,
    Insert,
    NewEntry,
    Retrieve,
    Source,
};

use crate::{Connection, StoreError};

const SELECT_WITH_TIMESTAMP: &str = r#"
    SELECT id, created_at, user_id, year, month, source, amount
    FROM income_entries
"#;

const SELECT_WITHOUT_TIMESTAMP: &str = r#"
    SELECT id, NULL AS created_at, user_id, year, month, source, amount
    FROM income_entries
"#;

#[derive(Debug, Clone, FromRow)]
struct EntryRow {
    id: i64,
    created_at: Option<String>,
    user_id: String,
    year: i64,
    month: i64,
    source: String,
    amount: String,
}

impl TryFrom<EntryRow> for IncomeEntry {
    type Error = StoreError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let created_at = match row.created_at {
            Some(ts) => Some(
                parse_timestamp(&ts).ok_or_else(|| invalid("created_at", &ts))?,
            ),
            None => None,
        };
        Ok(IncomeEntry {
            id: row.id,
            created_at,
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|_| invalid("user_id", &row.user_id))?,
            year: i32::try_from(row.year).map_err(|_| invalid("year", row.year))?,
            month: u32::try_from(row.month).map_err(|_| invalid("month", row.month))?,
            source: row.source.parse::<Source>()
                .map_err(|_| invalid("source", &row.source))?,
            amount: parse_decimal(&row.amount)
                .ok_or_else(|| invalid("amount", &row.amount))?,
        })
    }
}

fn invalid(column: &'static str, value: impl ToString) -> StoreError {
    StoreError::invalid("income_entries", column, value)
}

/// Older databases were created before entries had
/// an insertion timestamp.
async fn has_created_at(conn: &mut SqliteConnection) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('income_entries') WHERE name = 'created_at'")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count > 0)
}

fn to_entries(rows: Vec<EntryRow>) -> Result<Vec<IncomeEntry>> {
    let entries = rows
        .into_iter()
        .map(IncomeEntry::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

#[async_trait]
impl Retrieve<EntriesResult> for Connection {
    type Filter = ();

    /// Fetch all entries, newest first
    async fn retrieve(&self, _filter: &Self::Filter) -> Result<EntriesResult> {
        let mut conn = self.lock().await;
        if has_created_at(&mut conn).await? {
            let sql = format!("{} ORDER BY created_at DESC, id DESC", SELECT_WITH_TIMESTAMP);
            let rows: Vec<EntryRow> = sqlx::query_as(&sql).fetch_all(&mut *conn).await?;
            debug!(rows = rows.len(), "loaded income entries");
            return Ok(EntriesResult::WithTimestamp(to_entries(rows)?));
        }

        warn!("income_entries has no created_at column, ordering by period");
        let sql = format!(
            "{} ORDER BY year DESC, month DESC, id DESC",
            SELECT_WITHOUT_TIMESTAMP);
        let rows: Vec<EntryRow> = sqlx::query_as(&sql).fetch_all(&mut *conn).await?;
        Ok(EntriesResult::WithoutTimestamp(to_entries(rows)?))
    }
}

#[async_trait]
impl Insert<NewEntry> for Connection {
    type Output = IncomeEntry;

    async fn insert(&self, entry: NewEntry) -> Result<IncomeEntry> {
        let mut conn = self.lock().await;
        let id: i64 = {
            let mut qry = QueryBuilder::<Sqlite>::new(
                r#"INSERT INTO income_entries (
                    user_id,
                    year,
                    month,
                    source,
                    amount
                ) VALUES (
                "#,
            );
            qry.separated(", ")
                .push_bind(entry.user_id.to_string())
                .push_bind(entry.year)
                .push_bind(entry.month)
                .push_bind(entry.source.label())
                .push_bind(entry.amount.to_string());

            qry.push(") RETURNING id ")
                .build_query_scalar()
                .fetch_one(&mut *conn)
                .await?
        };

        let select = if has_created_at(&mut conn).await? {
            SELECT_WITH_TIMESTAMP
        } else {
            SELECT_WITHOUT_TIMESTAMP
        };
        let sql = format!("{} WHERE id = ?", select);
        let row: Option<EntryRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        let row = row.ok_or(StoreError::NotFound)?;
        Ok(IncomeEntry::try_from(row)?)
    }
}
