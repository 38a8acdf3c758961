//! The `schools` table.

use std::str::FromStr;

use schoolhouse_model::{NewSchool, SchoolRecord};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, Sqlite, SqliteConnection, SqlitePool};

use crate::config::DatabaseConfig;

const CREATE_SCHOOLS: &str = "CREATE TABLE IF NOT EXISTS schools (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    address TEXT NOT NULL,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    contact TEXT NOT NULL,
    image TEXT NOT NULL,
    email_id TEXT NOT NULL
)";

/// Connection pool over the records database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct SchoolRow {
    id: i64,
    name: String,
    address: String,
    city: String,
    state: String,
    contact: String,
    image: String,
    email_id: String,
}

impl From<SchoolRow> for SchoolRecord {
    fn from(row: SchoolRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            city: row.city,
            state: row.state,
            contact: row.contact,
            image: row.image,
            email_id: row.email_id,
        }
    }
}

impl Database {
    /// Opens a pool as described by `config`, creating the database file when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed or the database cannot be opened.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the `schools` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_SCHOOLS).execute(&self.pool).await?;
        Ok(())
    }

    /// Checks out a connection for one request. It returns to the pool when dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be obtained.
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>, sqlx::Error> {
        self.pool.acquire().await
    }
}

/// Inserts a submission and returns the assigned id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub async fn insert_school(conn: &mut SqliteConnection, school: &NewSchool, image: &str) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO schools (name, address, city, state, contact, image, email_id) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&school.name)
    .bind(&school.address)
    .bind(&school.city)
    .bind(&school.state)
    .bind(&school.contact)
    .bind(image)
    .bind(&school.email_id)
    .execute(conn)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Every record, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn list_schools(conn: &mut SqliteConnection) -> Result<Vec<SchoolRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, SchoolRow>(
        "SELECT id, name, address, city, state, contact, image, email_id FROM schools ORDER BY id DESC",
    )
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().map(SchoolRecord::from).collect())
}
