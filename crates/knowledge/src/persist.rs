//! On-disk artifacts of a knowledge base.
//!
//! Two files are written on every rebuild:
//! - the **answers artifact**, pretty JSON keyed by position
//!   (`{"0": {"question": ..., "answer": ...}}`). It is the durable source of
//!   truth: the ordered pair list.
//! - the **index artifact**, a little-endian binary dump of the flat index plus
//!   a header identifying the embedder and a SHA-256 fingerprint of the
//!   questions its rows were embedded from.
//!
//! Index layout:
//!
//! | field        | encoding                          |
//! |--------------|-----------------------------------|
//! | magic        | `b"RQIX"`                         |
//! | version      | `u16`                             |
//! | dimension    | `u32`                             |
//! | row count    | `u32`                             |
//! | provider     | `u32` length + UTF-8              |
//! | model        | `u32` length + UTF-8              |
//! | fingerprint  | 32 bytes                          |
//! | rows         | `count * dimension` x `f32`       |
//!
//! Each file is replaced atomically (temp file + rename), the pair of writes is not.

use crate::index::FlatIndex;
use crate::types::QaPair;
use crate::vector_index::VectorIndex;
use chrono::{DateTime, Utc};
use recall_core::{AppError, AppResult};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

const INDEX_MAGIC: &[u8; 4] = b"RQIX";
const INDEX_VERSION: u16 = 1;

/// SHA-256 over the ordered question list.
pub type Fingerprint = [u8; 32];

/// Decoded index artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexArtifact {
    /// Provider that produced the rows
    pub provider: String,

    /// Model that produced the rows
    pub model: String,

    /// Fingerprint of the questions the rows were embedded from
    pub fingerprint: Fingerprint,

    pub index: FlatIndex,
}

/// Fingerprint an ordered list of questions.
pub fn fingerprint<'a, I>(questions: I) -> Fingerprint
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = Sha256::new();
    for question in questions {
        hasher.update((question.len() as u64).to_le_bytes());
        hasher.update(question.as_bytes());
    }
    hasher.finalize().into()
}

/// Serialize an index artifact.
pub fn encode_index(artifact: &IndexArtifact) -> Vec<u8> {
    let raw = artifact.index.raw();
    let mut bytes = Vec::with_capacity(64 + raw.len() * 4);

    bytes.extend_from_slice(INDEX_MAGIC);
    bytes.extend_from_slice(&INDEX_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(artifact.index.dimension() as u32).to_le_bytes());
    bytes.extend_from_slice(&(artifact.index.len() as u32).to_le_bytes());
    put_str(&mut bytes, &artifact.provider);
    put_str(&mut bytes, &artifact.model);
    bytes.extend_from_slice(&artifact.fingerprint);
    for &value in raw {
        bytes.extend_from_slice(&value.to_le_bytes());
    }

    bytes
}

fn put_str(bytes: &mut Vec<u8>, value: &str) {
    bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
    bytes.extend_from_slice(value.as_bytes());
}

/// Parse an index artifact, rejecting anything truncated or malformed.
pub fn decode_index(bytes: &[u8]) -> AppResult<IndexArtifact> {
    let mut reader = Reader { bytes, offset: 0 };

    if reader.take(4)? != INDEX_MAGIC {
        return Err(corrupt("bad magic"));
    }

    let version = u16::from_le_bytes(reader.array()?);
    if version != INDEX_VERSION {
        return Err(corrupt(&format!("unsupported version {}", version)));
    }

    let dimension = reader.u32()? as usize;
    let count = reader.u32()? as usize;
    let provider = reader.string()?;
    let model = reader.string()?;
    let fingerprint: Fingerprint = reader.array()?;

    let expected = count
        .checked_mul(dimension)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| corrupt("row count overflow"))?;
    let body = reader.take(expected)?;
    if reader.offset != bytes.len() {
        return Err(corrupt("trailing bytes"));
    }

    let data: Vec<f32> = body
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok(IndexArtifact {
        provider,
        model,
        fingerprint,
        index: FlatIndex::from_raw(dimension, data)?,
    })
}

fn corrupt(reason: &str) -> AppError {
    AppError::Persistence(format!("Corrupt index artifact: {}", reason))
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> AppResult<&'a [u8]> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| corrupt("truncated"))?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> AppResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u32(&mut self) -> AppResult<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn string(&mut self) -> AppResult<String> {
        let len = self.u32()? as usize;
        String::from_utf8(self.take(len)?.to_vec()).map_err(|_| corrupt("invalid UTF-8"))
    }
}

/// Write the index artifact.
pub fn write_index(path: &Path, artifact: &IndexArtifact) -> AppResult<()> {
    write_atomic(path, &encode_index(artifact))?;
    tracing::debug!(
        "Wrote index artifact with {} rows to {:?}",
        artifact.index.len(),
        path
    );
    Ok(())
}

/// Read the index artifact; `Ok(None)` when the file does not exist.
pub fn read_index(path: &Path) -> AppResult<Option<IndexArtifact>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(path)?;
    decode_index(&bytes).map(Some)
}

/// Write the ordered pair list as the answers artifact.
pub fn write_pairs(path: &Path, pairs: &[QaPair]) -> AppResult<()> {
    let by_position: BTreeMap<usize, &QaPair> = pairs.iter().enumerate().collect();
    let json = serde_json::to_string_pretty(&by_position)?;
    write_atomic(path, json.as_bytes())?;
    tracing::debug!("Wrote {} pairs to {:?}", pairs.len(), path);
    Ok(())
}

/// Read the answers artifact; `Ok(None)` when the file does not exist.
///
/// Positions must be exactly `0..n`.
pub fn read_pairs(path: &Path) -> AppResult<Option<Vec<QaPair>>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let by_position: BTreeMap<usize, QaPair> = serde_json::from_str(&content).map_err(|e| {
        AppError::Persistence(format!("Failed to parse answers at {:?}: {}", path, e))
    })?;

    if let Some((expected, found)) = by_position
        .keys()
        .enumerate()
        .find(|(expected, found)| expected != *found)
    {
        return Err(AppError::Persistence(format!(
            "Answers at {:?} skip position {} (next key is {})",
            path, expected, found
        )));
    }

    Ok(Some(by_position.into_values().collect()))
}

/// Last modification time of an artifact.
pub fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from)
}

/// Size of an artifact in bytes, 0 when missing.
pub fn size_of(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> AppResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| {
        AppError::Persistence(format!("Failed to create directory {:?}: {}", parent, e))
    })?;

    let staged = tempfile::NamedTempFile::new_in(parent).and_then(|mut file| {
        file.write_all(bytes)?;
        file.as_file().sync_all()?;
        Ok(file)
    });
    let file =
        staged.map_err(|e| AppError::Persistence(format!("Failed to write {:?}: {}", path, e)))?;
    file.persist(path).map_err(|e| {
        AppError::Persistence(format!("Failed to replace {:?}: {}", path, e.error))
    })?;
    Ok(())
}
