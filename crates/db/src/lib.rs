//! SQLite persistence for the bookshelf app.
//!
//! All statements run on tokio-rusqlite's single background thread, so a
//! [`Database`] handle is cheap to clone and every [`Database::call`] holds the
//! connection for exactly one closure invocation.

use std::path::Path;

use thiserror::Error;

/// Schema statement contributed by a module.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the database layer
#[derive(Error, Debug)]
pub enum DbError {
    #[error("failed to create database directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open database at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("database connection failed: {0}")]
    Connection(#[source] BoxError),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

fn connection_error(e: tokio_rusqlite::Error<rusqlite::Error>) -> DbError {
    DbError::Connection(Box::new(e))
}

/// Shared handle to the application database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| DbError::CreateDir {
                    path: parent.display().to_string(),
                    source,
                })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| DbError::Open {
                path: path.display().to_string(),
                source: Box::new(e),
            })?;

        tracing::info!(target: "bookshelf-db", path = %path.display(), "database opened");
        Ok(Self { conn })
    }

    /// Open a private in-memory database. Used by tests and dry runs.
    pub async fn open_in_memory() -> Result<Self, DbError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| DbError::Open {
                path: ":memory:".to_string(),
                source: Box::new(e),
            })?;
        Ok(Self { conn })
    }

    /// Run `f` against the connection on the database thread.
    ///
    /// Mutating callers open a transaction inside `f`; dropping it on an early
    /// return rolls back, so the connection is always released clean.
    pub async fn call<F, R>(&self, f: F) -> Result<R, DbError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<R, rusqlite::Error> + Send + 'static,
        R: Send + 'static,
    {
        let result = self
            .conn
            .call(move |conn| Ok::<_, rusqlite::Error>(f(conn)))
            .await
            .map_err(connection_error)?;
        result.map_err(DbError::Sqlite)
    }

    /// Apply module migrations in the given order.
    ///
    /// Statements are expected to be idempotent (`CREATE TABLE IF NOT EXISTS`);
    /// no history table is kept.
    pub async fn apply_migrations(
        &self,
        migrations: Vec<(String, Migration)>,
    ) -> Result<usize, DbError> {
        let count = migrations.len();
        for (module, migration) in migrations {
            tracing::info!(
                target: "bookshelf-db",
                module = %module,
                migration = migration.id,
                "applying migration"
            );
            let up = migration.up;
            self.call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute_batch(up)?;
                tx.commit()
            })
            .await
            .map_err(|err| match err {
                DbError::Sqlite(source) => DbError::Migration {
                    module,
                    id: migration.id,
                    source,
                },
                other => other,
            })?;
        }
        Ok(count)
    }

    /// Close the background connection, flushing pending work.
    pub async fn close(self) -> Result<(), DbError> {
        self.conn.close().await.map_err(|e| DbError::Connection(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migration(id: &'static str, up: &'static str) -> (String, Migration) {
        ("test".to_string(), Migration { id, up })
    }

    #[tokio::test]
    async fn applies_migrations_and_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();
        let up = "CREATE TABLE IF NOT EXISTS item (id INTEGER PRIMARY KEY, name TEXT NOT NULL);";

        assert_eq!(db.apply_migrations(vec![migration("001_init", up)]).await.unwrap(), 1);
        db.apply_migrations(vec![migration("001_init", up)]).await.unwrap();

        let count: i64 = db
            .call(|conn| {
                conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'item'",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn failed_migration_reports_module_and_id() {
        let db = Database::open_in_memory().await.unwrap();
        let err = db
            .apply_migrations(vec![migration("002_broken", "CREATE TABLE (")])
            .await
            .unwrap_err();

        match err {
            DbError::Migration { module, id, .. } => {
                assert_eq!(module, "test");
                assert_eq!(id, "002_broken");
            }
            other => panic!("Expected Migration error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn call_surfaces_sqlite_errors() {
        let db = Database::open_in_memory().await.unwrap();
        let err = db
            .call(|conn| conn.execute("INSERT INTO missing VALUES (1)", []))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Sqlite(_)));
    }

    #[tokio::test]
    async fn open_creates_parent_directories() {
        let dir = std::env::temp_dir().join(format!("bookshelf-db-{}", std::process::id()));
        let path = dir.join("nested").join("books.db");

        let db = Database::open(&path).await.unwrap();
        db.close().await.unwrap();

        assert!(path.exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}
