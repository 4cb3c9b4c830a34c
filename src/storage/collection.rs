//! Persisted vector collections.
//!
//! A collection is a directory holding `collection.db`: chunk rows with
//! their embeddings plus a single metadata row describing how they were
//! embedded. Search is an exhaustive cosine-similarity scan, which is
//! adequate for per-repository collections.
//!
//! Collections are immutable once written. Re-indexing builds a complete
//! replacement in a staging directory next to the target and swaps it in.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::database::{Database, SCHEMA_VERSION};
use crate::constants::layout::COLLECTION_FILE;
use crate::types::{DocumateError, Result, ResultExt};

/// How a collection was embedded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionMeta {
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
    pub chunk_count: usize,
    pub indexed_at: DateTime<Utc>,
}

/// A chunk ready to be persisted
#[derive(Debug, Clone)]
pub struct EmbeddedChunk {
    pub source: String,
    pub ordinal: usize,
    pub content: String,
    pub embedding: Vec<f32>,
}

impl EmbeddedChunk {
    /// Content-addressed row id
    pub fn id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.source.as_bytes());
        hasher.update(self.ordinal.to_le_bytes());
        hasher.update(self.content.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// A search hit
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub source: String,
    pub ordinal: usize,
    pub content: String,
    pub score: f32,
}

pub struct Collection {
    dir: PathBuf,
    db: Database,
    meta: CollectionMeta,
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("dir", &self.dir)
            .field("meta", &self.meta)
            .finish()
    }
}

impl Collection {
    /// Whether `dir` holds a collection database
    pub fn exists(dir: &Path) -> bool {
        dir.join(COLLECTION_FILE).is_file()
    }

    /// Write a fresh collection at `dir`, replacing whatever was there.
    ///
    /// `provider` and `model` identify the embedder that produced the
    /// vectors. All chunks must share one dimensionality.
    pub fn create(dir: &Path, provider: &str, model: &str, chunks: &[EmbeddedChunk]) -> Result<Self> {
        let dimensions = chunks.first().map(|c| c.embedding.len()).unwrap_or(0);
        if chunks.iter().any(|c| c.embedding.len() != dimensions) {
            return Err(DocumateError::Storage(
                "All chunks in a collection must have the same embedding dimensions".to_string(),
            ));
        }

        let staging = staging_dir(dir)?;
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        let meta = CollectionMeta {
            provider: provider.to_string(),
            model: model.to_string(),
            dimensions,
            chunk_count: chunks.len(),
            indexed_at: Utc::now(),
        };

        let written = Self::write_database(&staging.join(COLLECTION_FILE), &meta, chunks);
        if let Err(e) = written {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }

        if dir.exists() {
            debug!("Replacing existing collection at {}", dir.display());
            fs::remove_dir_all(dir).with_context_fn(|| {
                format!("Failed to remove previous collection {}", dir.display())
            })?;
        }
        fs::rename(&staging, dir).with_context_fn(|| {
            format!("Failed to move collection into place at {}", dir.display())
        })?;

        info!(
            "Persisted {} chunks ({} dims) to {}",
            meta.chunk_count,
            meta.dimensions,
            dir.display()
        );
        Self::open(dir)
    }

    fn write_database(path: &Path, meta: &CollectionMeta, chunks: &[EmbeddedChunk]) -> Result<()> {
        let db = Database::open(path)?;
        db.initialize()?;

        db.transaction(|conn| {
            let mut stmt = conn.prepare(
                "INSERT OR REPLACE INTO chunks (id, source, ordinal, content, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for chunk in chunks {
                stmt.execute(params![
                    chunk.id(),
                    chunk.source,
                    chunk.ordinal as i64,
                    chunk.content,
                    encode_embedding(&chunk.embedding),
                ])?;
            }

            conn.execute(
                "INSERT INTO collection_meta (id, provider, model, dimensions, chunk_count, indexed_at)
                 VALUES (1, ?1, ?2, ?3, ?4, ?5)",
                params![
                    meta.provider,
                    meta.model,
                    meta.dimensions as i64,
                    meta.chunk_count as i64,
                    meta.indexed_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })?;

        db.checkpoint()
    }

    /// Open an existing collection
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(COLLECTION_FILE);
        if !path.is_file() {
            return Err(DocumateError::not_found("Vector collection", dir));
        }

        let db = Database::open(&path)?;
        let version = db.schema_version()?;
        if version != SCHEMA_VERSION {
            return Err(DocumateError::Storage(format!(
                "Collection at {} has schema version {} (expected {}); re-index the repository",
                dir.display(),
                version,
                SCHEMA_VERSION
            )));
        }

        let row = db
            .conn()?
            .query_row(
                "SELECT provider, model, dimensions, chunk_count, indexed_at
                 FROM collection_meta WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        let (provider, model, dimensions, chunk_count, indexed_at) = row.ok_or_else(|| {
            DocumateError::Storage(format!("Collection at {} has no metadata", dir.display()))
        })?;

        let indexed_at = DateTime::parse_from_rfc3339(&indexed_at)
            .map(|t| t.with_timezone(&Utc))
            .with_context("Invalid indexed_at timestamp")?;

        Ok(Self {
            dir: dir.to_path_buf(),
            db,
            meta: CollectionMeta {
                provider,
                model,
                dimensions: dimensions as usize,
                chunk_count: chunk_count as usize,
                indexed_at,
            },
        })
    }

    pub fn meta(&self) -> &CollectionMeta {
        &self.meta
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The `k` chunks most similar to `query`, best first
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        if k == 0 || self.meta.chunk_count == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.meta.dimensions {
            return Err(DocumateError::Embedding(format!(
                "Query has {} dimensions but collection {} has {}",
                query.len(),
                self.dir.display(),
                self.meta.dimensions
            )));
        }

        let conn = self.db.conn()?;
        let mut stmt = conn.prepare("SELECT source, ordinal, content, embedding FROM chunks")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Vec<u8>>(3)?,
            ))
        })?;

        let mut hits = Vec::with_capacity(self.meta.chunk_count);
        for row in rows {
            let (source, ordinal, content, blob) = row?;
            let score = cosine_similarity(query, &decode_embedding(&blob));
            hits.push(ScoredChunk {
                source,
                ordinal: ordinal as usize,
                content,
                score,
            });
        }

        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.source.cmp(&b.source))
                .then_with(|| a.ordinal.cmp(&b.ordinal))
        });
        hits.truncate(k);
        Ok(hits)
    }
}

/// Sibling directory a replacement collection is built in
fn staging_dir(dir: &Path) -> Result<PathBuf> {
    let name = dir
        .file_name()
        .ok_or_else(|| DocumateError::Storage(format!("Invalid collection path {}", dir.display())))?;
    let parent = dir.parent().unwrap_or_else(|| Path::new("."));
    Ok(parent.join(format!(".{}.staging", name.to_string_lossy())))
}

fn encode_embedding(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Cosine similarity; zero vectors score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}
