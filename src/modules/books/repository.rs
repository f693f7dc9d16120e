//! Storage for books: the [`BookRepository`] seam and its SQLite backing.

use async_trait::async_trait;
use bookshelf_db::{Database, DbError};
use rusqlite::{params, OptionalExtension, Row};
use thiserror::Error;

use super::models::{Book, BookId, NewBook, Rating};

/// Schema for the `book` table. `AUTOINCREMENT` keeps ids from being reused
/// after a delete.
pub const CREATE_BOOK_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS book (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        title     VARCHAR(250) NOT NULL UNIQUE,
        author    VARCHAR(250) NOT NULL,
        read_year VARCHAR(250) NOT NULL,
        rating    INTEGER NOT NULL
    );
"#;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("a book titled {0:?} already exists")]
    DuplicateTitle(String),

    #[error("book {0} not found")]
    NotFound(BookId),

    #[error("storage constraint violated: {0}")]
    Constraint(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Store a new book and return it with its assigned id.
    async fn insert(&self, book: NewBook) -> Result<Book, RepositoryError>;

    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>, RepositoryError>;

    /// Case-sensitive check for an existing title.
    async fn title_exists(&self, title: &str) -> Result<bool, RepositoryError>;

    /// Every book, ascending by id.
    async fn list_all(&self) -> Result<Vec<Book>, RepositoryError>;

    async fn update_rating(&self, id: BookId, rating: Rating) -> Result<(), RepositoryError>;

    /// Remove a book. Returns `false` when there was nothing to remove.
    async fn delete(&self, id: BookId) -> Result<bool, RepositoryError>;
}

#[derive(Error, Debug)]
#[error("stored rating {0} is outside 1..=10")]
struct RatingOutOfRange(i64);

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    let raw: i64 = row.get(4)?;
    let rating = u8::try_from(raw)
        .ok()
        .and_then(Rating::new)
        .ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Integer,
                Box::new(RatingOutOfRange(raw)),
            )
        })?;

    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        read_year: row.get(3)?,
        rating,
    })
}

/// Translate constraint failures into domain errors; everything else passes
/// through as a database error.
fn map_constraint(err: DbError, title: &str) -> RepositoryError {
    if let DbError::Sqlite(rusqlite::Error::SqliteFailure(failure, message)) = &err {
        if failure.code == rusqlite::ErrorCode::ConstraintViolation {
            let message = message.clone().unwrap_or_else(|| failure.to_string());
            let unique_title = failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                && message.contains("book.title");
            return if unique_title {
                RepositoryError::DuplicateTitle(title.to_string())
            } else {
                RepositoryError::Constraint(message)
            };
        }
    }
    RepositoryError::Database(err)
}

/// [`BookRepository`] over the shared SQLite connection.
///
/// Each operation is one closure on the database thread; writes run inside a
/// transaction that commits before the call returns.
#[derive(Clone)]
pub struct SqliteBookRepository {
    db: Database,
}

impl SqliteBookRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn insert(&self, book: NewBook) -> Result<Book, RepositoryError> {
        let title = book.title.clone();
        let stored = self
            .db
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO book (title, author, read_year, rating) VALUES (?1, ?2, ?3, ?4)",
                    params![book.title, book.author, book.read_year, book.rating.get()],
                )?;
                let id = tx.last_insert_rowid();
                tx.commit()?;

                Ok(Book {
                    id,
                    title: book.title,
                    author: book.author,
                    read_year: book.read_year,
                    rating: book.rating,
                })
            })
            .await
            .map_err(|err| map_constraint(err, &title))?;

        tracing::info!(book_id = stored.id, title = %stored.title, "book created");
        Ok(stored)
    }

    async fn get_by_id(&self, id: BookId) -> Result<Option<Book>, RepositoryError> {
        let book = self
            .db
            .call(move |conn| {
                conn.query_row(
                    "SELECT id, title, author, read_year, rating FROM book WHERE id = ?1",
                    params![id],
                    book_from_row,
                )
                .optional()
            })
            .await?;
        Ok(book)
    }

    async fn title_exists(&self, title: &str) -> Result<bool, RepositoryError> {
        let title = title.to_string();
        let exists = self
            .db
            .call(move |conn| {
                conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM book WHERE title = ?1)",
                    params![title],
                    |row| row.get(0),
                )
            })
            .await?;
        Ok(exists)
    }

    async fn list_all(&self) -> Result<Vec<Book>, RepositoryError> {
        let books = self
            .db
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, title, author, read_year, rating FROM book ORDER BY id ASC",
                )?;
                let books = stmt
                    .query_map([], book_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(books)
            })
            .await?;
        Ok(books)
    }

    async fn update_rating(&self, id: BookId, rating: Rating) -> Result<(), RepositoryError> {
        let updated = self
            .db
            .call(move |conn| {
                let tx = conn.transaction()?;
                let updated = tx.execute(
                    "UPDATE book SET rating = ?1 WHERE id = ?2",
                    params![rating.get(), id],
                )?;
                tx.commit()?;
                Ok(updated)
            })
            .await
            .map_err(|err| map_constraint(err, ""))?;

        if updated == 0 {
            return Err(RepositoryError::NotFound(id));
        }

        tracing::info!(book_id = id, rating = rating.get(), "book rating updated");
        Ok(())
    }

    async fn delete(&self, id: BookId) -> Result<bool, RepositoryError> {
        let deleted = self
            .db
            .call(move |conn| {
                let tx = conn.transaction()?;
                let deleted = tx.execute("DELETE FROM book WHERE id = ?1", params![id])?;
                tx.commit()?;
                Ok(deleted)
            })
            .await?;

        if deleted > 0 {
            tracing::info!(book_id = id, "book deleted");
        } else {
            tracing::debug!(book_id = id, "delete skipped, book not present");
        }
        Ok(deleted > 0)
    }
}
