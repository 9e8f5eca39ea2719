use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use registro_domain::{
    EntriesResult,
    IncomeEntry,
    Insert,
    MonthlySummary,
    NewEntry,
    Profile,
    Query,
    Retrieve,
    SummaryFilter,
};

use crate::StoreError;

const PROFILE_COLUMNS: &str = "user_id,full_name";
const SUMMARY_COLUMNS: &str = "full_name,user_id,year,month,year_month,ingreso,gastos,ahorro";
const ENTRY_COLUMNS: &str = "id,created_at,user_id,year,month,source,amount";
const ENTRY_COLUMNS_WITHOUT_TIMESTAMP: &str = "id,user_id,year,month,source,amount";

/// Where and how to reach the remote data store
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Project url, without the `/rest/v1` suffix
    pub url: String,
    pub key: String,
    pub schema: String,
    pub timeout: Duration,
}

/// Client for a PostgREST backend exposing the finance schema
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    config: RestConfig,
}

impl RestClient {
    pub fn new(config: RestConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), table)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
    }

    /// Fetch rows of a table or view
    async fn fetch<T>(&self, table: &str, params: &[(&str, String)]) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        debug!(table, ?params, "fetching rows");
        let req = self.http
            .get(self.endpoint(table))
            .header("Accept-Profile", &self.config.schema)
            .query(params);
        let resp = self.authorized(req).send().await?;
        let rows: Vec<T> = check(resp).await?.json().await?;
        debug!(table, rows = rows.len(), "fetched rows");
        Ok(rows)
    }
}

/// Turn any non-success response into a store error
async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(StoreError::from_response(status.as_u16(), &body).into())
}

fn is_undefined_column(err: &anyhow::Error) -> bool {
    err.downcast_ref::<StoreError>()
        .map(StoreError::is_undefined_column)
        .unwrap_or(false)
}

#[async_trait]
impl Query<Profile> for RestClient {
    type Filter = ();

    async fn query(&self, _filter: &Self::Filter) -> Result<Vec<Profile>> {
        self.fetch("profiles", &[
            ("select", PROFILE_COLUMNS.to_string()),
            ("order", "user_id.asc".to_string()),
        ]).await
    }
}

#[async_trait]
impl Query<MonthlySummary> for RestClient {
    type Filter = SummaryFilter;

    async fn query(&self, filter: &Self::Filter) -> Result<Vec<MonthlySummary>> {
        let mut params = vec![
            ("select", SUMMARY_COLUMNS.to_string()),
            ("order", "year.asc,month.asc".to_string()),
        ];
        if let Some(user_id) = filter.user_id {
            params.push(("user_id", format!("eq.{}", user_id)));
        }
        self.fetch("v_monthly_summary", &params).await
    }
}

#[async_trait]
impl Retrieve<EntriesResult> for RestClient {
    type Filter = ();

    async fn retrieve(&self, _filter: &Self::Filter) -> Result<EntriesResult> {
        let with_timestamp = self.fetch("income_entries", &[
            ("select", ENTRY_COLUMNS.to_string()),
            ("order", "created_at.desc,id.desc".to_string()),
        ]).await;

        match with_timestamp {
            Ok(rows) => Ok(EntriesResult::WithTimestamp(rows)),
            Err(err) if is_undefined_column(&err) => {
                warn!("income_entries has no created_at column, ordering by period");
                let rows = self.fetch("income_entries", &[
                    ("select", ENTRY_COLUMNS_WITHOUT_TIMESTAMP.to_string()),
                    ("order", "year.desc,month.desc,id.desc".to_string()),
                ]).await?;
                Ok(EntriesResult::WithoutTimestamp(rows))
            },
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl Insert<NewEntry> for RestClient {
    type Output = IncomeEntry;

    async fn insert(&self, entry: NewEntry) -> Result<IncomeEntry> {
        debug!(?entry, "inserting entry");
        let req = self.http
            .post(self.endpoint("income_entries"))
            .header("Content-Profile", &self.config.schema)
            .header("Prefer", "return=representation")
            .json(&entry);
        let resp = self.authorized(req).send().await?;
        let mut rows: Vec<IncomeEntry> = check(resp).await?.json().await?;
        let inserted = rows.pop().ok_or(StoreError::NotFound)?;
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        extract::Query as QueryParams,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::get,
        Json,
        Router,
    };
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use uuid::Uuid;

    use super::*;
    use registro_domain::Source;

    const KEY: &str = "service-role-key";
    const ANA: &str = "6f1c1f5e-8a53-4c52-9a55-2b0c3b2c1d10";

    /// Serve `app` on a random local port
    async fn serve(app: Router) -> RestClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        RestClient::new(RestConfig {
            url: format!("http://{}/", addr),
            key: KEY.to_string(),
            schema: "finance".to_string(),
            timeout: Duration::from_secs(5),
        }).unwrap()
    }

    fn authorized(headers: &HeaderMap, profile_header: &str) -> bool {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        let bearer = format!("Bearer {}", KEY);
        header("apikey") == Some(KEY)
            && header("authorization") == Some(bearer.as_str())
            && header(profile_header) == Some("finance")
    }

    fn undefined_column() -> impl IntoResponse {
        (StatusCode::BAD_REQUEST, Json(json!({
            "code": "42703",
            "details": null,
            "hint": null,
            "message": "column income_entries.created_at does not exist",
        })))
    }

    fn entry_rows(with_timestamp: bool) -> Value {
        let mut first = json!({
            "id": 2, "user_id": ANA, "year": 2024, "month": 3,
            "source": "Nómina", "amount": 1500.0,
        });
        let mut second = json!({
            "id": 1, "user_id": ANA, "year": 2024, "month": 2,
            "source": "Gasto", "amount": "20.10",
        });
        if with_timestamp {
            first["created_at"] = json!("2024-03-02T08:00:00.123456+00:00");
            second["created_at"] = json!("2024-03-01T08:00:00+00:00");
        }
        json!([first, second])
    }

    #[tokio::test]
    async fn test_query_profiles() {
        let app = Router::new().route("/rest/v1/profiles", get(
            |headers: HeaderMap, QueryParams(params): QueryParams<HashMap<String, String>>| async move {
                if !authorized(&headers, "accept-profile") {
                    return StatusCode::UNAUTHORIZED.into_response();
                }
                assert_eq!(params["select"], "user_id,full_name");
                assert_eq!(params["order"], "user_id.asc");
                Json(json!([{"user_id": ANA, "full_name": "Ana"}])).into_response()
            }));
        let client = serve(app).await;

        let profiles: Vec<Profile> = client.query(&()).await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].full_name, "Ana");
        assert_eq!(profiles[0].user_id, Uuid::parse_str(ANA).unwrap());
    }

    #[tokio::test]
    async fn test_query_summary_with_user_filter() {
        let app = Router::new().route("/rest/v1/v_monthly_summary", get(
            |QueryParams(params): QueryParams<HashMap<String, String>>| async move {
                assert_eq!(params["order"], "year.asc,month.asc");
                assert_eq!(params["user_id"], format!("eq.{}", ANA));
                Json(json!([{
                    "full_name": "Ana", "user_id": ANA, "year": 2024, "month": 3,
                    "year_month": "2024-03", "ingreso": 1500, "gastos": 0, "ahorro": 1500,
                }]))
            }));
        let client = serve(app).await;

        let rows: Vec<MonthlySummary> = client.query(&SummaryFilter {
            user_id: Some(Uuid::parse_str(ANA).unwrap()),
        }).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].income, Some(Decimal::new(1500, 0)));
    }

    #[tokio::test]
    async fn test_read_errors_are_surfaced() {
        let app = Router::new().route("/rest/v1/v_monthly_summary", get(|| async {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({
                "code": "XX000",
                "message": "view is broken",
            })))
        }));
        let client = serve(app).await;

        let res: Result<Vec<MonthlySummary>> = client.query(&SummaryFilter::default()).await;
        let err = res.unwrap_err();
        match err.downcast_ref::<StoreError>() {
            Some(StoreError::Backend { status, message, .. }) => {
                assert_eq!(*status, 500);
                assert_eq!(message, "view is broken");
            },
            _ => panic!("unexpected error {:?}", err),
        }
    }

    #[tokio::test]
    async fn test_retrieve_entries_with_timestamp() {
        let app = Router::new().route("/rest/v1/income_entries", get(
            |QueryParams(params): QueryParams<HashMap<String, String>>| async move {
                assert_eq!(params["order"], "created_at.desc,id.desc");
                Json(entry_rows(true))
            }));
        let client = serve(app).await;

        let result: EntriesResult = client.retrieve(&()).await.unwrap();
        assert!(result.has_timestamp());
        assert_eq!(result.entries().len(), 2);
        assert!(result.entries()[0].created_at.unwrap() > result.entries()[1].created_at.unwrap());
        assert_eq!(result.entries()[1].amount, Decimal::new(2010, 2));
    }

    #[tokio::test]
    async fn test_retrieve_entries_falls_back_without_timestamp() {
        let app = Router::new().route("/rest/v1/income_entries", get(
            |QueryParams(params): QueryParams<HashMap<String, String>>| async move {
                if params["select"].contains("created_at") {
                    return undefined_column().into_response();
                }
                assert_eq!(params["order"], "year.desc,month.desc,id.desc");
                Json(entry_rows(false)).into_response()
            }));
        let client = serve(app).await;

        let result: EntriesResult = client.retrieve(&()).await.unwrap();
        assert!(!result.has_timestamp());
        assert_eq!(result.entries().len(), 2);
        assert_eq!(result.entries()[0].source, Source::Payroll);
        assert!(result.entries().iter().all(|e| e.created_at.is_none()));
    }

    #[tokio::test]
    async fn test_insert_entry() {
        let app = Router::new().route("/rest/v1/income_entries", axum::routing::post(
            |headers: HeaderMap, Json(body): Json<Value>| async move {
                if !authorized(&headers, "content-profile") {
                    return StatusCode::UNAUTHORIZED.into_response();
                }
                assert_eq!(
                    headers.get("prefer").and_then(|v| v.to_str().ok()),
                    Some("return=representation"));
                assert_eq!(body["source"], "Nómina");
                let mut row = body.clone();
                row["id"] = json!(42);
                row["created_at"] = json!("2024-03-02T08:00:00+00:00");
                (StatusCode::CREATED, Json(json!([row]))).into_response()
            }));
        let client = serve(app).await;

        let entry = client.insert(NewEntry {
            user_id: Uuid::parse_str(ANA).unwrap(),
            year: 2024,
            month: 3,
            source: Source::Payroll,
            amount: Decimal::new(150000, 2),
        }).await.unwrap();
        assert_eq!(entry.id, 42);
        assert_eq!(entry.amount, Decimal::new(150000, 2));
        assert!(entry.created_at.is_some());
    }

    #[tokio::test]
    async fn test_insert_failure_is_surfaced() {
        let app = Router::new().route("/rest/v1/income_entries", axum::routing::post(|| async {
            (StatusCode::CONFLICT, Json(json!({
                "code": "23503",
                "message": "insert or update violates foreign key constraint",
            })))
        }));
        let client = serve(app).await;

        let res = client.insert(NewEntry {
            user_id: Uuid::new_v4(),
            year: 2024,
            month: 3,
            source: Source::Expense,
            amount: Decimal::ONE,
        }).await;
        let err = res.unwrap_err();
        assert!(err.to_string().contains("foreign key"));
    }
}
