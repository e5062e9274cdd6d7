use futures::{StreamExt as _, TryStreamExt as _};
use serde::{Deserialize, Serialize};
use sqlx::Pool;
use time::OffsetDateTime;
use tracing::debug;

use crate::{Error, MAX_LIMIT, error::Result};

/// Payload for creating a book. Fields are not validated, empty strings are
/// accepted and stored as given.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CreateBook {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publications: String,
}

/// Partial update of a book. An empty string means "keep the stored value",
/// so this shape cannot be used to clear a field to empty. This is a quirk
/// of the wire contract kept for compatibility.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct UpdateBook {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publications: String,
}

/// Audit fields owned by the repository. Handlers never set these and they
/// are not part of the wire format.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecordMeta {
    pub created: OffsetDateTime,
    pub modified: OffsetDateTime,
    pub deleted: Option<OffsetDateTime>,
}

impl RecordMeta {
    fn zero() -> Self {
        RecordMeta {
            created: OffsetDateTime::UNIX_EPOCH,
            modified: OffsetDateTime::UNIX_EPOCH,
            deleted: None,
        }
    }
}

#[derive(Debug, Serialize, Clone, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub name: String,
    pub author: String,
    pub publications: String,
    #[serde(skip)]
    #[sqlx(flatten)]
    pub meta: RecordMeta,
}

impl Book {
    /// Zero-valued book, what delete returns when no record matched.
    pub fn empty() -> Self {
        Book {
            id: 0,
            name: String::new(),
            author: String::new(),
            publications: String::new(),
            meta: RecordMeta::zero(),
        }
    }

    /// Overlays non-empty fields of the patch onto this book, keeping
    /// everything else as stored (merge-then-save contract).
    pub fn merge(&mut self, patch: UpdateBook) {
        if !patch.name.is_empty() {
            self.name = patch.name;
        }
        if !patch.author.is_empty() {
            self.author = patch.author;
        }
        if !patch.publications.is_empty() {
            self.publications = patch.publications;
        }
    }
}

pub type BookRepository = BookRepositoryImpl<Pool<crate::ChosenDB>>;

pub struct BookRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> BookRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateBook) -> Result<Book> {
        let now = OffsetDateTime::now_utc();
        let result = sqlx::query(
            "INSERT INTO book (name, author, publications, created, modified) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&payload.name)
        .bind(&payload.author)
        .bind(&payload.publications)
        .bind(now)
        .bind(now)
        .execute(&self.executor)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id).await
    }

    /// Writes an already-merged book back under its id. Soft-deleted rows
    /// are not reachable for update.
    pub async fn update(&self, book: Book) -> Result<Book> {
        let result = sqlx::query(
            "UPDATE book SET name = ?, author = ?, publications = ?, modified = ? WHERE id = ? AND deleted IS NULL",
        )
        .bind(&book.name)
        .bind(&book.author)
        .bind(&book.publications)
        .bind(OffsetDateTime::now_utc())
        .bind(book.id)
        .execute(&self.executor)
        .await?;

        if result.rows_affected() == 0 {
            Err(Error::RecordNotFound(format!("Book {}", book.id)))
        } else {
            self.get(book.id).await
        }
    }

    /// All live books, no ordering guarantee.
    pub async fn list_all(&self) -> Result<Vec<Book>> {
        let records = sqlx::query_as::<_, Book>(
            "SELECT id, name, author, publications, created, modified, deleted FROM book WHERE deleted IS NULL",
        )
        .fetch(&self.executor)
        .take(MAX_LIMIT)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(records)
    }

    /// Soft delete. Returns the deleted record, or a zero-valued book when
    /// nothing matched - absent ids are deliberately not an error, so a
    /// caller cannot distinguish "deleted" from "nothing to delete".
    pub async fn delete(&self, id: i64) -> Result<Book> {
        let book = match self.get(id).await {
            Ok(book) => book,
            Err(Error::RecordNotFound(_)) => {
                debug!("Delete of absent book {id}");
                return Ok(Book::empty());
            }
            Err(e) => return Err(e),
        };

        sqlx::query("UPDATE book SET deleted = ? WHERE id = ?")
            .bind(OffsetDateTime::now_utc())
            .bind(id)
            .execute(&self.executor)
            .await?;

        Ok(book)
    }

    pub async fn get(&self, id: i64) -> Result<Book> {
        let record = sqlx::query_as::<_, Book>(
            "SELECT id, name, author, publications, created, modified, deleted FROM book WHERE id = ? AND deleted IS NULL",
        )
        .bind(id)
        .fetch_one(&self.executor)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => Error::RecordNotFound(format!("Book {id}")),
            other => Error::DatabaseError(other),
        })?;
        Ok(record)
    }
}
