//! Flat exact vector index
//!
//! Stores fixed-dimension f32 vectors contiguously and answers
//! nearest-neighbor queries by exhaustive squared-L2 scan (lower distance is
//! better). Ids are assigned densely from 0 in insertion order and stay
//! stable until a full rebuild; there is no in-place deletion.

use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use powersync_core::{Error, Result};

/// On-disk layout: magic, format version (u32), dimension (u32), entry
/// count (u64), then the vector payload as little-endian f32. Loading a
/// saved index reproduces search results exactly.
const MAGIC: &[u8; 4] = b"PSVI";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug)]
pub struct VectorIndex {
    dim: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    /// Create an empty index for vectors of the given dimension.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of vectors currently stored.
    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append vectors, returning the assigned ids (dense, monotonically
    /// increasing from the current size).
    ///
    /// Any vector of the wrong dimension fails the whole call before the
    /// index is touched, so a failed insert never corrupts the index.
    pub fn insert(&mut self, vectors: &[Vec<f32>]) -> Result<Vec<u64>> {
        for vector in vectors {
            if vector.len() != self.dim {
                return Err(Error::DimensionMismatch {
                    expected: self.dim,
                    actual: vector.len(),
                });
            }
        }

        let start = self.len() as u64;
        self.data.reserve(vectors.len() * self.dim);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }

        Ok((start..start + vectors.len() as u64).collect())
    }

    /// Return up to `k` ids by ascending squared-L2 distance to `query`.
    ///
    /// `k` is clamped to the index size; an empty index yields an empty
    /// result rather than an error. Equal distances order by ascending id.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u64, f32)>> {
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }

        let total = self.len();
        if total == 0 || k == 0 {
            return Ok(Vec::new());
        }
        let k = k.min(total);

        let mut hits: Vec<(u64, f32)> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(id, stored)| {
                let distance: f32 = stored
                    .iter()
                    .zip(query)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                (id as u64, distance)
            })
            .collect();

        hits.sort_unstable_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        hits.truncate(k);
        Ok(hits)
    }

    /// Persist the index to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Persistence(e.to_string()))?;
        }

        let file = fs::File::create(path).map_err(|e| Error::Persistence(e.to_string()))?;
        let mut writer = BufWriter::new(file);

        writer
            .write_all(MAGIC)
            .and_then(|_| writer.write_all(&FORMAT_VERSION.to_le_bytes()))
            .and_then(|_| writer.write_all(&(self.dim as u32).to_le_bytes()))
            .and_then(|_| writer.write_all(&(self.len() as u64).to_le_bytes()))
            .map_err(|e| Error::Persistence(e.to_string()))?;

        for value in &self.data {
            writer
                .write_all(&value.to_le_bytes())
                .map_err(|e| Error::Persistence(e.to_string()))?;
        }

        writer.flush().map_err(|e| Error::Persistence(e.to_string()))
    }

    /// Load an index previously written with [`VectorIndex::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let file = fs::File::open(path).map_err(|e| Error::Persistence(e.to_string()))?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|e| Error::Persistence(e.to_string()))?;
        if &magic != MAGIC {
            return Err(Error::Persistence(format!(
                "not a vector index file: {}",
                path.display()
            )));
        }

        let version = read_u32(&mut reader)?;
        if version != FORMAT_VERSION {
            return Err(Error::Persistence(format!(
                "unsupported index format version {version}"
            )));
        }

        let dim = read_u32(&mut reader)? as usize;
        let count = read_u64(&mut reader)? as usize;

        let mut data = vec![0f32; dim * count];
        let mut buf = [0u8; 4];
        for value in &mut data {
            reader
                .read_exact(&mut buf)
                .map_err(|e| Error::Persistence(e.to_string()))?;
            *value = f32::from_le_bytes(buf);
        }

        Ok(Self { dim, data })
    }
}

fn read_u32(reader: &mut impl Read) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader
        .read_exact(&mut buf)
        .map_err(|e| Error::Persistence(e.to_string()))?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64(reader: &mut impl Read) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader
        .read_exact(&mut buf)
        .map_err(|e| Error::Persistence(e.to_string()))?;
    Ok(u64::from_le_bytes(buf))
}
