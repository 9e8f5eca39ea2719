use anyhow::Result;
use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite};
use uuid::Uuid;

use registro_domain::{Insert, Profile, Query};

use crate::{Connection, StoreError};

#[derive(Debug, Clone, FromRow)]
struct ProfileRow {
    user_id: String,
    full_name: String,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = StoreError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&row.user_id)
            .map_err(|_| StoreError::invalid("profiles", "user_id", &row.user_id))?;
        Ok(Profile { user_id, full_name: row.full_name })
    }
}

#[async_trait]
impl Query<Profile> for Connection {
    type Filter = ();

    /// All profiles ordered by user id
    async fn query(&self, _filter: &Self::Filter) -> Result<Vec<Profile>> {
        let mut conn = self.lock().await;
        let rows: Vec<ProfileRow> = sqlx::query_as(
            "SELECT user_id, full_name FROM profiles ORDER BY user_id")
            .fetch_all(&mut *conn)
            .await?;
        let profiles = rows
            .into_iter()
            .map(Profile::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(profiles)
    }
}

#[async_trait]
impl Insert<Profile> for Connection {
    type Output = Profile;

    async fn insert(&self, profile: Profile) -> Result<Profile> {
        let mut conn = self.lock().await;
        let mut qry = QueryBuilder::<Sqlite>::new(
            "INSERT INTO profiles (user_id, full_name) VALUES (");
        qry.separated(", ")
            .push_bind(profile.user_id.to_string())
            .push_bind(profile.full_name.clone());
        qry.push(")")
            .build()
            .execute(&mut *conn)
            .await?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection;

    #[tokio::test]
    async fn test_profiles_ordered_by_user_id() {
        let (_handle, db) = connection::open_test().await;
        let b = Uuid::parse_str("bbbbbbbb-0000-0000-0000-000000000000").unwrap();
        let a = Uuid::parse_str("aaaaaaaa-0000-0000-0000-000000000000").unwrap();
        db.insert(Profile { user_id: b, full_name: "Luis".to_string() }).await.unwrap();
        db.insert(Profile { user_id: a, full_name: "Ana".to_string() }).await.unwrap();

        let profiles: Vec<Profile> = db.query(&()).await.unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].user_id, a);
        assert_eq!(profiles[0].full_name, "Ana");
        assert_eq!(profiles[1].user_id, b);
    }

    #[tokio::test]
    async fn test_profiles_empty() {
        let (_handle, db) = connection::open_test().await;
        let profiles: Vec<Profile> = db.query(&()).await.unwrap();
        assert!(profiles.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_profile_fails() {
        let (_handle, db) = connection::open_test().await;
        let profile = Profile { user_id: Uuid::new_v4(), full_name: "Ana".to_string() };
        db.insert(profile.clone()).await.unwrap();
        assert!(db.insert(profile).await.is_err());
    }
}
