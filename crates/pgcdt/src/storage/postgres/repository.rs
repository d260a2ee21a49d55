//! PostgreSQL repository implementation.
//!
//! Implements the repository traits from `pgcdt_core::storage`. Every
//! operation opens its own connection and closes it before returning, on both
//! the success and the error path.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Postgres, QueryBuilder};

use pgcdt_core::contact::{
    encode_phone_numbers, encode_tagged_phone_numbers, tag_filter, Contact, ContactError,
    PhoneNumbers,
};
use pgcdt_core::person::{NewUser, User};
use pgcdt_core::plan::{ExplainTarget, QueryTiming};
use pgcdt_core::storage::{
    ContactRepository, QueryInspector, RepositoryError, Result, TaggedContactRepository,
    UserRepository,
};

use super::conversions::{row_to_contact, row_to_tagged_contact, row_to_user, PgAddress};
use super::error::map_sqlx_error;
use super::schema;

/// PostgreSQL-backed repository for contacts and users.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    options: PgConnectOptions,
}

impl PostgresRepository {
    /// Creates a repository from a `postgres://` connection URL.
    ///
    /// No connection is opened until the first operation.
    pub fn new(database_url: &str) -> Result<Self> {
        let options = PgConnectOptions::from_str(database_url)
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Ok(Self::with_options(options))
    }

    pub fn with_options(options: PgConnectOptions) -> Self {
        Self { options }
    }

    /// Creates the `address` type and the `users` / `contacts` tables.
    pub async fn provision(&self) -> Result<()> {
        self.run_script(schema::PROVISION, "Schema").await?;
        tracing::info!("Provisioned schema");
        Ok(())
    }

    /// Drops the tables and the `address` type.
    pub async fn teardown(&self) -> Result<()> {
        self.run_script(schema::TEARDOWN, "Schema").await?;
        tracing::info!("Dropped schema");
        Ok(())
    }

    /// Creates the pin-code expression index and the GIN index on phone numbers.
    pub async fn create_indexes(&self) -> Result<()> {
        self.run_script(schema::CREATE_INDEXES, "Index").await
    }

    async fn run_script(&self, script: &'static str, entity_type: &'static str) -> Result<()> {
        let mut conn = self.connect().await?;
        let result = sqlx::Executor::execute(&mut conn, sqlx::raw_sql(script))
            .await
            .map(|_| ())
            .map_err(|e| map_sqlx_error(e, entity_type));
        release(conn, result).await
    }

    async fn connect(&self) -> Result<PgConnection> {
        PgConnection::connect_with(&self.options)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))
    }
}

/// Closes the connection, then hands back the operation's result.
async fn release<T>(conn: PgConnection, result: Result<T>) -> Result<T> {
    if let Err(err) = conn.close().await {
        tracing::warn!(error = %err, "Failed to close connection cleanly");
    }
    result
}

/// Inserts rows in one transaction, one statement per chunk of
/// `MAX_BIND_PARAMS / columns` rows. Any failure rolls the whole batch back.
async fn insert_batch<T, F>(
    conn: &mut PgConnection,
    head: &'static str,
    columns: usize,
    rows: Vec<T>,
    mut push_row: F,
) -> sqlx::Result<u64>
where
    F: FnMut(sqlx::query_builder::Separated<'_, '_, Postgres, &'static str>, T),
{
    let chunk_size = schema::MAX_BIND_PARAMS / columns;
    let mut rows = rows.into_iter().peekable();
    let mut written = 0;

    let mut tx = conn.begin().await?;
    while rows.peek().is_some() {
        let chunk: Vec<T> = rows.by_ref().take(chunk_size).collect();
        let mut builder = QueryBuilder::<Postgres>::new(head);
        builder.push_values(chunk, &mut push_row);
        written += builder.build().execute(&mut *tx).await?.rows_affected();
    }
    tx.commit().await?;

    Ok(written)
}

// ============================================================================
// ContactRepository implementation
// ============================================================================

#[async_trait]
impl ContactRepository for PostgresRepository {
    async fn fetch_all(&self) -> Result<Vec<Contact>> {
        let mut conn = self.connect().await?;
        let result = select_contacts(&mut conn, None).await;
        release(conn, result).await
    }

    async fn fetch_with_label(&self, label: &str) -> Result<Vec<Contact>> {
        let mut conn = self.connect().await?;
        let result = select_contacts(&mut conn, Some(label)).await;
        release(conn, result).await
    }

    async fn persist(&self, contacts: &[Contact]) -> Result<u64> {
        if contacts.is_empty() {
            return Ok(0);
        }

        let rows = encode_contacts(contacts, encode_phone_numbers)?;

        let mut conn = self.connect().await?;
        let result = insert_contacts(&mut conn, schema::INSERT_CONTACTS, rows).await;

        if let Ok(written) = &result {
            tracing::debug!(written, "Persisted contacts");
        }
        release(conn, result).await
    }
}

/// Encodes every directory before the store is touched.
fn encode_contacts(
    contacts: &[Contact],
    encode: fn(&PhoneNumbers) -> std::result::Result<String, ContactError>,
) -> Result<Vec<(String, String, String)>> {
    contacts
        .iter()
        .map(|c| -> Result<(String, String, String)> {
            Ok((c.name.clone(), c.email.clone(), encode(&c.phone_numbers)?))
        })
        .collect()
}

async fn insert_contacts(
    conn: &mut PgConnection,
    head: &'static str,
    rows: Vec<(String, String, String)>,
) -> Result<u64> {
    insert_batch(
        conn,
        head,
        3,
        rows,
        |mut separated, (name, email, phone_numbers)| {
            separated.push_bind(name);
            separated.push_bind(email);
            separated.push_bind(phone_numbers);
            separated.push_unseparated("::jsonb");
        },
    )
    .await
    .map_err(|e| map_sqlx_error(e, "Contact"))
}

async fn select_contacts(conn: &mut PgConnection, label: Option<&str>) -> Result<Vec<Contact>> {
    let rows = match label {
        Some(label) => {
            sqlx::query(schema::SELECT_CONTACTS_WITH_LABEL)
                .bind(label)
                .fetch_all(&mut *conn)
                .await
        }
        None => sqlx::query(schema::SELECT_CONTACTS).fetch_all(&mut *conn).await,
    }
    .map_err(|e| map_sqlx_error(e, "Contact"))?;

    rows.iter()
        .map(row_to_contact)
        .collect::<sqlx::Result<Vec<_>>>()
        .map_err(|e| map_sqlx_error(e, "Contact"))
}

// ============================================================================
// TaggedContactRepository implementation
// ============================================================================

#[async_trait]
impl TaggedContactRepository for PostgresRepository {
    async fn fetch_all(&self) -> Result<Vec<Contact>> {
        let mut conn = self.connect().await?;
        let result = select_tagged_contacts(&mut conn, None).await;
        release(conn, result).await
    }

    async fn fetch_with_tag(&self, tag: &str) -> Result<Vec<Contact>> {
        let filter = tag_filter(tag)?;
        let mut conn = self.connect().await?;
        let result = select_tagged_contacts(&mut conn, Some(&filter)).await;
        release(conn, result).await
    }

    async fn fetch_numbers_with_tag(&self, tag: &str) -> Result<Vec<i64>> {
        let filter = tag_filter(tag)?;
        let mut conn = self.connect().await?;
        let result = sqlx::query_scalar::<_, i64>(schema::SELECT_TAGGED_NUMBERS)
            .bind(tag)
            .bind(filter)
            .fetch_all(&mut conn)
            .await
            .map_err(|e| map_sqlx_error(e, "Contact"));
        release(conn, result).await
    }

    async fn persist(&self, contacts: &[Contact]) -> Result<u64> {
        if contacts.is_empty() {
            return Ok(0);
        }

        let rows = encode_contacts(contacts, encode_tagged_phone_numbers)?;

        let mut conn = self.connect().await?;
        let result = insert_contacts(&mut conn, schema::INSERT_TAGGED_CONTACTS, rows).await;

        if let Ok(written) = &result {
            tracing::debug!(written, "Persisted tagged contacts");
        }
        release(conn, result).await
    }
}

async fn select_tagged_contacts(
    conn: &mut PgConnection,
    filter: Option<&str>,
) -> Result<Vec<Contact>> {
    let rows = match filter {
        Some(filter) => {
            sqlx::query(schema::SELECT_TAGGED_CONTACTS_WITH_TAG)
                .bind(filter)
                .fetch_all(&mut *conn)
                .await
        }
        None => {
            sqlx::query(schema::SELECT_TAGGED_CONTACTS)
                .fetch_all(&mut *conn)
                .await
        }
    }
    .map_err(|e| map_sqlx_error(e, "Contact"))?;

    rows.iter()
        .map(row_to_tagged_contact)
        .collect::<sqlx::Result<Vec<_>>>()
        .map_err(|e| map_sqlx_error(e, "Contact"))
}

// ============================================================================
// UserRepository implementation
// ============================================================================

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn fetch_all(&self) -> Result<Vec<User>> {
        let mut conn = self.connect().await?;
        let result = select_users(&mut conn, None).await;
        release(conn, result).await
    }

    async fn fetch_by_pin_code(&self, pin_code: i32) -> Result<Vec<User>> {
        let mut conn = self.connect().await?;
        let result = select_users(&mut conn, Some(pin_code)).await;
        release(conn, result).await
    }

    async fn persist(&self, users: &[NewUser]) -> Result<u64> {
        if users.is_empty() {
            return Ok(0);
        }

        let rows: Vec<(String, PgAddress)> = users
            .iter()
            .map(|u| (u.name.clone(), PgAddress(u.address.clone())))
            .collect();

        let mut conn = self.connect().await?;
        let result = insert_batch(
            &mut conn,
            schema::INSERT_USERS,
            2,
            rows,
            |mut separated, (name, address)| {
                separated.push_bind(name);
                separated.push_bind(address);
            },
        )
        .await
        .map_err(|e| map_sqlx_error(e, "User"));

        if let Ok(written) = &result {
            tracing::debug!(written, "Persisted users");
        }
        release(conn, result).await
    }
}

async fn select_users(conn: &mut PgConnection, pin_code: Option<i32>) -> Result<Vec<User>> {
    let rows = match pin_code {
        Some(pin_code) => {
            sqlx::query(schema::SELECT_USERS_BY_PIN_CODE)
                .bind(pin_code)
                .fetch_all(&mut *conn)
                .await
        }
        None => sqlx::query(schema::SELECT_USERS).fetch_all(&mut *conn).await,
    }
    .map_err(|e| map_sqlx_error(e, "User"))?;

    rows.iter()
        .map(row_to_user)
        .collect::<sqlx::Result<Vec<_>>>()
        .map_err(|e| map_sqlx_error(e, "User"))
}

// ============================================================================
// QueryInspector implementation
// ============================================================================

#[async_trait]
impl QueryInspector for PostgresRepository {
    async fn explain_analyze(
        &self,
        target: &ExplainTarget,
        force_index: bool,
    ) -> Result<QueryTiming> {
        let mut conn = self.connect().await?;
        let result = explain(&mut conn, target, force_index).await;
        release(conn, result).await
    }
}

async fn explain(
    conn: &mut PgConnection,
    target: &ExplainTarget,
    force_index: bool,
) -> Result<QueryTiming> {
    if force_index {
        sqlx::query(schema::DISABLE_SEQSCAN)
            .execute(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error(e, "Plan"))?;
    }

    let statement = match target {
        ExplainTarget::AllUsers => schema::SELECT_USERS,
        ExplainTarget::UsersByPinCode(_) => schema::SELECT_USERS_BY_PIN_CODE,
        ExplainTarget::AllContacts => schema::SELECT_CONTACTS,
        ExplainTarget::ContactsWithLabel(_) => schema::SELECT_CONTACTS_WITH_LABEL,
        ExplainTarget::AllTaggedContacts => schema::SELECT_TAGGED_CONTACTS,
        ExplainTarget::TaggedContactsWithTag(_) => schema::SELECT_TAGGED_CONTACTS_WITH_TAG,
        ExplainTarget::TaggedNumbersWithTag(_) => schema::SELECT_TAGGED_NUMBERS,
    };
    let sql = format!("EXPLAIN ANALYZE {statement}");

    let query = sqlx::query_scalar::<_, String>(&sql);
    let query = match target {
        ExplainTarget::UsersByPinCode(pin_code) => query.bind(*pin_code),
        ExplainTarget::ContactsWithLabel(label) => query.bind(label.clone()),
        ExplainTarget::TaggedContactsWithTag(tag) => query.bind(tag_filter(tag)?),
        ExplainTarget::TaggedNumbersWithTag(tag) => {
            query.bind(tag.clone()).bind(tag_filter(tag)?)
        }
        ExplainTarget::AllUsers | ExplainTarget::AllContacts | ExplainTarget::AllTaggedContacts => {
            query
        }
    };

    let lines = query
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error(e, "Plan"))?;

    let timing = QueryTiming::parse(&lines)?;
    tracing::debug!(
        ?target,
        force_index,
        planning_ms = ?timing.planning_ms,
        execution_ms = timing.execution_ms,
        uses_index = timing.uses_index(),
        "Explained query"
    );
    Ok(timing)
}
