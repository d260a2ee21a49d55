//! Database fixture for the PostgreSQL integration tests.
//!
//! Each test gets its own schema, so tests never see each other's rows and
//! nothing global has to be reset between them. [`TestDatabase::run`] drops the
//! schema after the test body finishes, including when it panics.

use std::future::Future;
use std::panic;

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use uuid::Uuid;

use super::PostgresRepository;

#[derive(Clone)]
pub struct TestDatabase {
    admin: PgConnectOptions,
    pub schema: String,
    pub repo: PostgresRepository,
}

impl TestDatabase {
    /// Runs `test` against a freshly provisioned schema on `DATABASE_URL`.
    ///
    /// The body runs in its own task so a failed assertion surfaces as a
    /// `JoinError`; the schema is dropped and then the panic is resumed.
    pub async fn run<F, Fut>(test: F)
    where
        F: FnOnce(TestDatabase) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let db = Self::setup().await;
        let outcome = tokio::spawn(test(db.clone())).await;
        db.teardown().await;

        if let Err(err) = outcome {
            match err.try_into_panic() {
                Ok(payload) => panic::resume_unwind(payload),
                Err(err) => panic!("test task did not complete: {err}"),
            }
        }
    }

    /// Returns true if a schema named `name` exists on `DATABASE_URL`.
    pub async fn schema_exists(name: &str) -> bool {
        let mut conn = PgConnection::connect_with(&admin_options())
            .await
            .expect("failed to connect to DATABASE_URL");
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM pg_namespace WHERE nspname = $1)",
        )
        .bind(name)
        .fetch_one(&mut conn)
        .await
        .expect("failed to query pg_namespace");
        conn.close().await.expect("failed to close connection");
        exists
    }

    async fn setup() -> Self {
        let admin = admin_options();
        let schema = format!("pgcdt_test_{}", Uuid::new_v4().simple());

        let mut conn = PgConnection::connect_with(&admin)
            .await
            .expect("failed to connect to DATABASE_URL");
        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&mut conn)
            .await
            .expect("failed to create test schema");
        conn.close().await.expect("failed to close connection");

        let options = admin.clone().options([("search_path", schema.as_str())]);
        let db = Self {
            admin,
            schema,
            repo: PostgresRepository::with_options(options),
        };

        if let Err(err) = db.repo.provision().await {
            db.teardown().await;
            panic!("failed to provision test schema: {err}");
        }

        db
    }

    async fn teardown(&self) {
        let mut conn = PgConnection::connect_with(&self.admin)
            .await
            .expect("failed to connect to DATABASE_URL");
        sqlx::query(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema))
            .execute(&mut conn)
            .await
            .expect("failed to drop test schema");
        conn.close().await.expect("failed to close connection");
    }
}

fn admin_options() -> PgConnectOptions {
    std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must point at a PostgreSQL server to run ignored tests")
        .parse()
        .expect("DATABASE_URL is not a valid URL")
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[tokio::test]
    #[ignore = "requires PostgreSQL at DATABASE_URL"]
    async fn test_schema_is_dropped_after_passing_test() {
        let schema = Arc::new(Mutex::new(String::new()));
        let seen = schema.clone();

        TestDatabase::run(move |db| async move {
            assert!(TestDatabase::schema_exists(&db.schema).await);
            *seen.lock().unwrap() = db.schema;
        })
        .await;

        let schema = schema.lock().unwrap().clone();
        assert!(!TestDatabase::schema_exists(&schema).await);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL at DATABASE_URL"]
    async fn test_schema_is_dropped_when_test_panics() {
        let schema = Arc::new(Mutex::new(String::new()));
        let seen = schema.clone();

        let outcome = tokio::spawn(TestDatabase::run(move |db| async move {
            *seen.lock().unwrap() = db.schema;
            panic!("failing test body");
        }))
        .await;

        assert!(outcome.unwrap_err().is_panic());
        let schema = schema.lock().unwrap().clone();
        assert!(schema.starts_with("pgcdt_test_"));
        assert!(!TestDatabase::schema_exists(&schema).await);
    }
}
