//! Heap dump loading

use crate::types::HeapDump;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid heap graph document: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DecodeError>;

impl HeapDump {
    /// Decode a dump from raw JSON bytes
    pub fn from_slice(buf: &[u8]) -> Result<Self> {
        let dump: HeapDump = serde_json::from_slice(buf)?;
        tracing::debug!(
            "Decoded heap dump: {} nodes, {} edges",
            dump.nodes.len(),
            dump.edges.len()
        );
        Ok(dump)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let dump: HeapDump = serde_json::from_reader(reader)?;
        Ok(dump)
    }

    /// Read and decode a dump file
    pub fn from_path(path: &Path) -> Result<Self> {
        let buf = read_document(path)?;
        Self::from_slice(&buf)
    }
}

impl FromStr for HeapDump {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_slice(s.as_bytes())
    }
}

/// Read the raw document bytes, keeping the path in the error
pub fn read_document(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })
}
