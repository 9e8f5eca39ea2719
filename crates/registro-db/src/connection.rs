use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteConnection},
    Connection as SqlConnection,
    Executor,
};
use tokio::sync::{Mutex, MutexGuard};

use crate::schema;


/// A thread safe connection to a local database
#[derive(Clone)]
pub struct Connection(Arc<Mutex<SqliteConnection>>);

impl Connection {
    fn new(conn: SqliteConnection) -> Self {
        Self(Arc::new(Mutex::new(conn)))
    }

    /// Acquire exclusive access to the underlying connection
    pub async fn lock(&self) -> MutexGuard<'_, SqliteConnection> {
        self.0.lock().await
    }
}


/// Open a connection to an existing database
pub async fn open(filename: &str) -> Result<Connection> {
    let conn = SqliteConnectOptions::from_str(filename)?
        .foreign_keys(true);
    let conn = SqliteConnection::connect_with(&conn).await?;
    Ok(Connection::new(conn))
}

/// Open a connection, creating the database file if needed
pub async fn create(filename: &str) -> Result<Connection> {
    let conn = SqliteConnectOptions::from_str(filename)?
        .create_if_missing(true)
        .foreign_keys(true);
    let conn = SqliteConnection::connect_with(&conn).await?;
    Ok(Connection::new(conn))
}

pub struct TestHandle {
    filename: String
}

impl Drop for TestHandle {
    fn drop(&mut self) {
        let path = Path::new(&self.filename);
        if path.exists() {
            fs::remove_file(path).unwrap();
        }
    }
}


/// Open a new test database connection.
/// The database will be created on each open.
pub async fn open_test() -> (TestHandle, Connection) {
    let (handle, conn) = open_test_with("").await;

    // Install the schema
    schema::install(&conn).await.unwrap();

    (handle, conn)
}

/// Open a new test database and run `sql` on it instead
/// of installing the current schema.
pub async fn open_test_with(sql: &str) -> (TestHandle, Connection) {
    let filename = format!("/tmp/registro_test_{}.sqlite3", rand::random::<u64>());
    let handle = TestHandle { filename: filename.clone() };

    let conn = create(&filename).await.unwrap();
    if !sql.is_empty() {
        let mut db = conn.lock().await;
        (&mut *db).execute(sql).await.unwrap();
    }

    (handle, conn)
}
