//! Database connection pool utilities.

#[cfg(test)]
use diesel::RunQueryDsl;
use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

/// Pooled PostgreSQL connections for the InfraPulse server.
pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Embedded Diesel migrations.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Initialize the database pool from a PostgreSQL connection string.
#[cfg_attr(test, allow(dead_code))]
pub fn init_pool(database_url: &str) -> Result<DbPool, String> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .build(manager)
        .map_err(|err| format!("failed to create database pool: {err}"))?;
    run_migrations(&pool)?;
    Ok(pool)
}

/// Run pending Diesel migrations.
pub fn run_migrations(pool: &DbPool) -> Result<(), String> {
    let mut conn = pool
        .get()
        .map_err(|err| format!("failed to fetch database connection: {err}"))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("run migrations: {err}"))?;
    if !applied.is_empty() {
        log::info!("applied {} database migration(s)", applied.len());
    }
    Ok(())
}

/// Point a connection string at another database on the same server.
#[cfg(test)]
fn with_database_name(url: &str, name: &str) -> String {
    let (location, params) = match url.split_once('?') {
        Some((location, params)) => (location, Some(params)),
        None => (url, None),
    };
    let server = location.rsplit_once('/').map_or(location, |(server, _)| server);
    match params {
        Some(params) => format!("{server}/{name}?{params}"),
        None => format!("{server}/{name}"),
    }
}

/// Throwaway PostgreSQL database, dropped together with the value.
#[cfg(test)]
pub(crate) struct TestDatabase {
    name: String,
    url: String,
    maintenance_url: String,
}

#[cfg(test)]
impl TestDatabase {
    pub(crate) fn new() -> Self {
        use diesel::Connection;

        let server_url = std::env::var("TEST_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("TEST_DATABASE_URL or DATABASE_URL must point at PostgreSQL");
        let name = format!("infrapulse_test_{}", uuid::Uuid::new_v4().simple());
        let maintenance_url = with_database_name(&server_url, "postgres");
        let mut conn =
            PgConnection::establish(&maintenance_url).expect("connect to maintenance database");
        diesel::sql_query(format!("CREATE DATABASE \"{name}\""))
            .execute(&mut conn)
            .expect("create test database");
        Self {
            url: with_database_name(&server_url, &name),
            name,
            maintenance_url,
        }
    }

    pub(crate) fn database_url(&self) -> &str {
        &self.url
    }

    /// Single-connection pool over the migrated database.
    pub(crate) fn pool(&self) -> DbPool {
        let manager = ConnectionManager::<PgConnection>::new(self.url.as_str());
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .build(manager)
            .expect("build test pool");
        run_migrations(&pool).expect("migrate test database");
        pool
    }
}

#[cfg(test)]
impl Drop for TestDatabase {
    fn drop(&mut self) {
        use diesel::Connection;

        // FORCE (PostgreSQL 13+) disconnects pools that outlive the handle.
        if let Ok(mut conn) = PgConnection::establish(&self.maintenance_url) {
            let _ = diesel::sql_query(format!(
                "DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)",
                self.name
            ))
            .execute(&mut conn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TestDatabase, init_pool, with_database_name};
    use diesel::prelude::*;
    use diesel::sql_types::Text;

    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[test]
    fn database_name_swap_keeps_server_and_params() {
        assert_eq!(
            with_database_name(
                "postgres://user:pw@localhost:5432/infrapulse?sslmode=disable",
                "postgres"
            ),
            "postgres://user:pw@localhost:5432/postgres?sslmode=disable"
        );
        assert_eq!(
            with_database_name("postgres://localhost/infrapulse", "scratch"),
            "postgres://localhost/scratch"
        );
    }

    #[test]
    #[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
    fn init_pool_runs_migrations() {
        let test_db = TestDatabase::new();
        let pool = init_pool(test_db.database_url()).expect("pool");

        let mut conn = pool.get().expect("conn");
        let mut tables: Vec<String> = diesel::sql_query(
            "SELECT tablename AS name FROM pg_tables WHERE schemaname = 'public' \
             AND tablename IN ('organizations', 'firewalls', 'switches')",
        )
        .load::<TableName>(&mut conn)
        .expect("query tables")
        .into_iter()
        .map(|table| table.name)
        .collect();
        tables.sort();

        assert_eq!(tables, vec!["firewalls", "organizations", "switches"]);
    }
}
