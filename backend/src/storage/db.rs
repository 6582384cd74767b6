//! # Document Store
//!
//! Single-table repository over SQLite. Each operation opens its own
//! connection to the database file, so the store is cheap to clone and share
//! between actix workers; concurrent writers are serialized by SQLite itself
//! (a busy timeout absorbs short lock contention).
//!
//! Only `description` and `tags` are mutable after insertion. The extracted
//! text, size, checksum and timestamps are written once by [`DocumentStore::create`].

use chrono::{SecondsFormat, Utc};
use common::model::document::{split_tags, Document, DocumentPage, ExtractionStatus};
use common::model::stats::Stats;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Characters of extracted text returned per document by [`DocumentStore::list`].
pub const PREVIEW_CHARS: usize = 200;
pub const MAX_PER_PAGE: u32 = 100;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    stored_name       TEXT NOT NULL UNIQUE,
    original_name     TEXT NOT NULL,
    file_path         TEXT NOT NULL,
    content           TEXT NOT NULL DEFAULT '',
    file_size         INTEGER NOT NULL CHECK (file_size > 0),
    page_count        INTEGER NOT NULL DEFAULT 0,
    checksum          TEXT NOT NULL,
    extraction_status TEXT NOT NULL,
    created_at        TEXT NOT NULL,
    description       TEXT,
    tags              TEXT
);
CREATE INDEX IF NOT EXISTS idx_documents_created_at ON documents (created_at);
";

const COLUMNS: &str = "id, stored_name, original_name, file_path, content, file_size, \
     page_count, checksum, extraction_status, created_at, description, tags";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Document {0} not found")]
    NotFound(i64),

    #[error("Failed to create database directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fields of a document about to be inserted.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub stored_name: String,
    pub original_name: String,
    pub file_path: String,
    pub content: String,
    pub file_size: u64,
    pub page_count: u32,
    pub checksum: String,
    pub extraction_status: ExtractionStatus,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// The parts of a document the query service needs.
#[derive(Debug, Clone)]
pub struct DocumentText {
    pub id: i64,
    pub stored_name: String,
    pub original_name: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct DocumentStore {
    path: PathBuf,
}

impl DocumentStore {
    /// Opens (and if needed creates) the database file and its schema.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let store = Self { path };
        store.connect()?.execute_batch(SCHEMA)?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    pub fn create(&self, new: &NewDocument) -> Result<Document, StoreError> {
        let conn = self.connect()?;
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        conn.execute(
            "INSERT INTO documents (stored_name, original_name, file_path, content, file_size, \
             page_count, checksum, extraction_status, created_at, description, tags) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                new.stored_name,
                new.original_name,
                new.file_path,
                new.content,
                new.file_size as i64,
                new.page_count as i64,
                new.checksum,
                new.extraction_status.as_str(),
                created_at,
                new.description,
                join_tags(&new.tags),
            ],
        )?;
        let id = conn.last_insert_rowid();
        fetch(&conn, id)
    }

    pub fn get(&self, id: i64) -> Result<Document, StoreError> {
        fetch(&self.connect()?, id)
    }

    /// Newest documents first. Content is cut down to a short preview.
    pub fn list(&self, page: u32, per_page: u32) -> Result<DocumentPage, StoreError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let conn = self.connect()?;

        let total: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        let offset = (page as i64 - 1) * per_page as i64;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM documents ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
            COLUMNS
        ))?;
        let documents = stmt
            .query_map(params![per_page as i64, offset], map_document)?
            .map(|doc| {
                doc.map(|mut d| {
                    d.content = preview(&d.content, PREVIEW_CHARS);
                    d
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total = total.max(0) as u64;
        let pages = if total == 0 {
            1
        } else {
            total.div_ceil(per_page as u64) as u32
        };

        Ok(DocumentPage {
            documents,
            total,
            page,
            pages,
            per_page,
        })
    }

    /// Removes the row. The caller is responsible for the backing file.
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let removed = self
            .connect()?
            .execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    /// Replaces the given metadata fields; `None` leaves a field as it is.
    /// An empty description or tag list clears the column.
    pub fn update_metadata(
        &self,
        id: i64,
        description: Option<String>,
        tags: Option<Vec<String>>,
    ) -> Result<Document, StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = fetch(&tx, id)?;

        let description = match description {
            Some(d) if d.trim().is_empty() => None,
            Some(d) => Some(d),
            None => current.description,
        };
        let tags = tags.unwrap_or(current.tags);

        tx.execute(
            "UPDATE documents SET description = ?1, tags = ?2 WHERE id = ?3",
            params![description, join_tags(&tags), id],
        )?;
        tx.commit()?;
        fetch(&conn, id)
    }

    /// Folds generated metadata into a document in one write transaction.
    /// `summary` only fills an empty description; `merge_tags` receives the
    /// tags as stored at that moment and returns the new list.
    pub fn apply_enrichment<F>(
        &self,
        id: i64,
        summary: Option<&str>,
        merge_tags: F,
    ) -> Result<Document, StoreError>
    where
        F: FnOnce(&[String]) -> Vec<String>,
    {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = fetch(&tx, id)?;
        let tags = merge_tags(&current.tags);

        tx.execute(
            "UPDATE documents SET description = COALESCE(description, ?1), tags = ?2 WHERE id = ?3",
            params![summary, join_tags(&tags), id],
        )?;
        tx.commit()?;
        fetch(&conn, id)
    }

    pub fn stats(&self) -> Result<Stats, StoreError> {
        let conn = self.connect()?;
        let (count, size, pages): (i64, i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(file_size), 0), COALESCE(SUM(page_count), 0) FROM documents",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        let total_size_bytes = size.max(0) as u64;
        Ok(Stats {
            total_documents: count.max(0) as u64,
            total_size_bytes,
            total_size_mb: (total_size_bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0,
            total_pages: pages.max(0) as u64,
        })
    }

    /// Text of one document (whatever its content), or of every document
    /// that has non-empty text, oldest first.
    pub fn texts(&self, id: Option<i64>) -> Result<Vec<DocumentText>, StoreError> {
        let conn = self.connect()?;
        let map = |row: &Row<'_>| {
            Ok(DocumentText {
                id: row.get(0)?,
                stored_name: row.get(1)?,
                original_name: row.get(2)?,
                content: row.get(3)?,
            })
        };

        match id {
            Some(id) => {
                let text = conn
                    .query_row(
                        "SELECT id, stored_name, original_name, content FROM documents WHERE id = ?1",
                        params![id],
                        map,
                    )
                    .optional()?;
                text.map(|t| vec![t]).ok_or(StoreError::NotFound(id))
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, stored_name, original_name, content FROM documents \
                     WHERE content != '' ORDER BY id ASC",
                )?;
                let texts = stmt.query_map([], map)?.collect::<Result<Vec<_>, _>>()?;
                Ok(texts)
            }
        }
    }
}

fn fetch(conn: &Connection, id: i64) -> Result<Document, StoreError> {
    conn.query_row(
        &format!("SELECT {} FROM documents WHERE id = ?1", COLUMNS),
        params![id],
        map_document,
    )
    .optional()?
    .ok_or(StoreError::NotFound(id))
}

fn map_document(row: &Row<'_>) -> rusqlite::Result<Document> {
    let status: String = row.get(8)?;
    let tags: Option<String> = row.get(11)?;
    Ok(Document {
        id: row.get(0)?,
        stored_name: row.get(1)?,
        original_filename: row.get(2)?,
        file_path: row.get(3)?,
        content: row.get(4)?,
        file_size: row.get::<_, i64>(5)?.max(0) as u64,
        page_count: row.get::<_, i64>(6)?.max(0) as u32,
        checksum: row.get(7)?,
        extraction_status: ExtractionStatus::parse(&status).unwrap_or(ExtractionStatus::Failed),
        created_at: row.get(9)?,
        description: row.get(10)?,
        tags: tags.as_deref().map(split_tags).unwrap_or_default(),
    })
}

fn join_tags(tags: &[String]) -> Option<String> {
    if tags.is_empty() {
        None
    } else {
        Some(tags.join(","))
    }
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
