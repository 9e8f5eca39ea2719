use anyhow::Result;
use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite};
use uuid::Uuid;

use registro_domain::{parse_decimal, MonthlySummary, Query, SummaryFilter};

use crate::{Connection, StoreError};

#[derive(Debug, Clone, FromRow)]
struct SummaryRow {
    full_name: String,
    user_id: String,
    year: i64,
    month: i64,
    year_month: String,
    ingreso: Option<String>,
    gastos: Option<String>,
    ahorro: Option<String>,
}

impl TryFrom<SummaryRow> for MonthlySummary {
    type Error = StoreError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&row.user_id)
            .map_err(|_| StoreError::invalid("v_monthly_summary", "user_id", &row.user_id))?;
        let year = i32::try_from(row.year)
            .map_err(|_| StoreError::invalid("v_monthly_summary", "year", row.year))?;
        let month = u32::try_from(row.month)
            .map_err(|_| StoreError::invalid("v_monthly_summary", "month", row.month))?;
        Ok(MonthlySummary {
            full_name: row.full_name,
            user_id,
            year,
            month,
            year_month: row.year_month,
            income: row.ingreso.as_deref().and_then(parse_decimal),
            expenses: row.gastos.as_deref().and_then(parse_decimal),
            savings: row.ahorro.as_deref().and_then(parse_decimal),
        })
    }
}

#[async_trait]
impl Query<MonthlySummary> for Connection {
    type Filter = SummaryFilter;

    /// Monthly summary rows, oldest month first
    async fn query(&self, filter: &Self::Filter) -> Result<Vec<MonthlySummary>> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                full_name,
                user_id,
                year,
                month,
                year_month,
                ingreso,
                gastos,
                ahorro
            FROM v_monthly_summary
            WHERE 1
            "#,
        );
        if let Some(user_id) = filter.user_id {
            qry.push(" AND user_id = ").push_bind(user_id.to_string());
        }
        qry.push(" ORDER BY year ASC, month ASC");

        let rows: Vec<SummaryRow> = qry.build_query_as().fetch_all(&mut *conn).await?;
        let summary = rows
            .into_iter()
            .map(MonthlySummary::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::connection;
    use registro_domain::{Insert, NewEntry, Profile, Source};

    async fn add(db: &Connection, user: &Profile, year: i32, month: u32, source: Source, cents: i64) {
        db.insert(NewEntry {
            user_id: user.user_id,
            year,
            month,
            source,
            amount: Decimal::new(cents, 2),
        }).await.unwrap();
    }

    #[tokio::test]
    async fn test_summary_aggregates_per_month() {
        let (_handle, db) = connection::open_test().await;
        let ana = db.insert(Profile {
            user_id: Uuid::new_v4(),
            full_name: "Ana".to_string(),
        }).await.unwrap();

        add(&db, &ana, 2024, 3, Source::Payroll, 150000).await;
        add(&db, &ana, 2024, 3, Source::OtherIncome, 10050).await;
        add(&db, &ana, 2024, 3, Source::Expense, 40025).await;
        add(&db, &ana, 2024, 1, Source::Expense, 1000).await;

        let rows: Vec<MonthlySummary> = db.query(&SummaryFilter::default()).await.unwrap();
        assert_eq!(rows.len(), 2);

        // Oldest month first
        assert_eq!(rows[0].year_month, "2024-01");
        assert_eq!(rows[0].income, Some(Decimal::ZERO));
        assert_eq!(rows[0].savings, Some(Decimal::new(-1000, 2)));

        assert_eq!(rows[1].year_month, "2024-03");
        assert_eq!(rows[1].full_name, "Ana");
        assert_eq!(rows[1].income, Some(Decimal::new(160050, 2)));
        assert_eq!(rows[1].expenses, Some(Decimal::new(40025, 2)));
        assert_eq!(rows[1].savings, Some(Decimal::new(120025, 2)));
    }

    #[tokio::test]
    async fn test_summary_filter_by_user() {
        let (_handle, db) = connection::open_test().await;
        let ana = db.insert(Profile {
            user_id: Uuid::new_v4(),
            full_name: "Ana".to_string(),
        }).await.unwrap();
        let luis = db.insert(Profile {
            user_id: Uuid::new_v4(),
            full_name: "Luis".to_string(),
        }).await.unwrap();
        add(&db, &ana, 2024, 2, Source::Payroll, 100).await;
        add(&db, &luis, 2024, 2, Source::Payroll, 200).await;

        let rows: Vec<MonthlySummary> = db.query(&SummaryFilter {
            user_id: Some(luis.user_id),
        }).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].full_name, "Luis");
    }
}
