use std::{path::Path, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, Pool, Sqlite,
};

use crate::{
    entities::contact::{Contact, NewContact},
    error::{self, ServiceError},
};

use super::{Backend, ContactRepository};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS contacts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone TEXT NOT NULL,
        service TEXT NOT NULL DEFAULT 'other',
        message TEXT NOT NULL,
        ip_address TEXT,
        user_agent TEXT,
        created_at INTEGER NOT NULL
    )
"#;

#[derive(Debug, FromRow)]
struct ContactRow {
    id: i64,
    name: String,
    email: String,
    phone: String,
    service: String,
    message: String,
    ip_address: Option<String>,
    user_agent: Option<String>,
    /// Microseconds since the Unix epoch, UTC.
    created_at: i64,
}

impl TryFrom<ContactRow> for Contact {
    type Error = ServiceError;

    fn try_from(row: ContactRow) -> error::Result<Contact> {
        let created_at = DateTime::from_timestamp_micros(row.created_at).ok_or_else(|| {
            ServiceError::persistence(format!("Contact {} has invalid created_at", row.id))
        })?;
        Ok(Contact {
            id: row.id.to_string(),
            name: row.name,
            email: row.email,
            phone: row.phone,
            service: row.service,
            message: row.message,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: Pool<Sqlite>,
}

impl SqliteRepository {
    /// Opens (creating if missing) the database file and makes sure the
    /// `contacts` table exists.
    pub async fn open(path: impl AsRef<Path>) -> error::Result<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;

        log::info!("SQLite database ready at {}", path.display());

        Ok(Self { pool })
    }
}

#[async_trait]
impl ContactRepository for SqliteRepository {
    fn backend(&self) -> Backend {
        Backend::File
    }

    async fn create(&self, contact: &NewContact) -> error::Result<Contact> {
        // stored as whole microseconds
        let created_at = Utc::now().trunc_subsecs(6);

        let result = sqlx::query(
            r#"
            INSERT INTO contacts (name, email, phone, service, message, ip_address, user_agent, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(contact.service_or_default())
        .bind(&contact.message)
        .bind(&contact.ip_address)
        .bind(&contact.user_agent)
        .bind(created_at.timestamp_micros())
        .execute(&self.pool)
        .await?;

        Ok(Contact::from_new(
            result.last_insert_rowid().to_string(),
            contact,
            created_at,
        ))
    }

    async fn list(&self) -> error::Result<Vec<Contact>> {
        let rows: Vec<ContactRow> =
            sqlx::query_as("SELECT * FROM contacts ORDER BY created_at DESC, id DESC")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Contact::try_from).collect()
    }

    async fn delete(&self, id: &str) -> error::Result<bool> {
        let Ok(id) = id.parse::<i64>() else {
            return Ok(false);
        };
        let result = sqlx::query("DELETE FROM contacts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
