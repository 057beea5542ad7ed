//! Flat-file Topology Store
//!
//! The whole topology lives in one file that is read in full at the start of
//! every request and rewritten in full after every mutation. Two encodings are
//! accepted on read:
//!
//! - **Document**: a single JSON object `{"devices": [...], "links": [...]}`
//! - **JSON lines**: one object per line, tagged `"_type": "device" | "link"`
//!
//! Writes always produce the document form. There is no locking: two
//! concurrent writers race and the last rename wins.

use crate::topology::{Device, Link, Topology};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Discriminator key used by the JSON-lines encoding
pub const TYPE_KEY: &str = "_type";

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected topology shape: {0}")]
    Schema(#[source] serde_json::Error),

    #[error("Failed to encode topology: {0}")]
    Encode(#[source] serde_json::Error),
}

/// On-disk encoding of the topology file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    Document,
    JsonLines,
}

impl StoreFormat {
    /// Decode raw file content.
    ///
    /// A trial parse of the whole text as one JSON value picks the variant;
    /// anything that is not a single document is read as JSON lines. A lone
    /// tagged record (a one-line JSON-lines file) is also read as JSON lines.
    pub fn decode(raw: &str) -> Result<(Self, Topology), StoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok((Self::Document, Topology::default()));
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(document) if is_tagged_record(&document) => Ok((Self::JsonLines, decode_lines(raw)?)),
            Ok(document) => Ok((Self::Document, decode_document(document)?)),
            Err(_) => Ok((Self::JsonLines, decode_lines(raw)?)),
        }
    }

    /// Encode a topology in this format
    pub fn encode(self, topology: &Topology) -> Result<String, StoreError> {
        match self {
            Self::Document => serde_json::to_string_pretty(topology).map_err(StoreError::Encode),
            Self::JsonLines => encode_lines(topology),
        }
    }
}

fn is_tagged_record(value: &Value) -> bool {
    value.as_object().is_some_and(|map| {
        map.contains_key(TYPE_KEY) && !map.contains_key("devices") && !map.contains_key("links")
    })
}

fn decode_document(document: Value) -> Result<Topology, StoreError> {
    serde_json::from_value(document).map_err(StoreError::Schema)
}

fn decode_lines(raw: &str) -> Result<Topology, StoreError> {
    let mut topology = Topology::default();

    for (index, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut record: Value = serde_json::from_str(line).map_err(|source| StoreError::Parse {
            line: index + 1,
            source,
        })?;

        let kind = match record.as_object_mut().and_then(|map| map.remove(TYPE_KEY)) {
            Some(Value::String(kind)) => Some(kind),
            _ => None,
        };

        match kind.as_deref() {
            Some("device") => {
                let device: Device = serde_json::from_value(record).map_err(StoreError::Schema)?;
                topology.devices.push(device);
            }
            Some("link") => {
                let link: Link = serde_json::from_value(record).map_err(StoreError::Schema)?;
                topology.links.push(link);
            }
            other => debug!("Skipping line {} with discriminator {:?}", index + 1, other),
        }
    }

    Ok(topology)
}

fn encode_lines(topology: &Topology) -> Result<String, StoreError> {
    let mut out = String::new();

    for (kind, records) in [
        ("device", topology.devices.iter().map(serde_json::to_value).collect::<Result<Vec<_>, _>>()),
        ("link", topology.links.iter().map(serde_json::to_value).collect::<Result<Vec<_>, _>>()),
    ] {
        for mut record in records.map_err(StoreError::Encode)? {
            if let Value::Object(ref mut map) = record {
                map.insert(TYPE_KEY.to_string(), Value::from(kind));
            }
            out.push_str(&serde_json::to_string(&record).map_err(StoreError::Encode)?);
            out.push('\n');
        }
    }

    Ok(out)
}

/// File-backed topology store
#[derive(Debug, Clone)]
pub struct TopologyStore {
    path: PathBuf,
}

impl TopologyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bare file name of the backing file
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    async fn discard_temp(&self, tmp_path: &Path) {
        if let Err(e) = tokio::fs::remove_file(tmp_path).await {
            if e.kind() != ErrorKind::NotFound {
                warn!("Failed to remove temp file {}: {}", tmp_path.display(), e);
            }
        }
    }

    /// Raw file bytes, `None` when the file does not exist
    pub async fn read_raw(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    /// Load the full topology. Absent or blank files yield an empty topology.
    pub async fn load(&self) -> Result<Topology, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No topology file at {}, starting empty", self.path.display());
                return Ok(Topology::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let (format, topology) = StoreFormat::decode(&raw)?;
        debug!(
            "Loaded {} devices, {} links from {} ({:?})",
            topology.devices.len(),
            topology.links.len(),
            self.path.display(),
            format
        );
        Ok(topology)
    }

    /// Replace the backing file with `topology` as one pretty-printed document.
    ///
    /// Each save writes its own sibling temp file and renames it into place,
    /// so readers never observe a half-written file and overlapping saves
    /// resolve to whichever rename lands last.
    pub async fn save(&self, topology: &Topology) -> Result<(), StoreError> {
        let encoded = StoreFormat::Document.encode(topology)?;

        let tmp_name = format!(
            ".{}.{}.tmp",
            self.file_name().unwrap_or("topology"),
            Uuid::new_v4().simple()
        );
        let tmp_path = self.path.with_file_name(tmp_name);

        if let Err(e) = tokio::fs::write(&tmp_path, encoded.as_bytes()).await {
            self.discard_temp(&tmp_path).await;
            return Err(self.io_error(e));
        }
        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            self.discard_temp(&tmp_path).await;
            return Err(self.io_error(e));
        }

        debug!(
            "Saved {} devices, {} links to {}",
            topology.devices.len(),
            topology.links.len(),
            self.path.display()
        );
        Ok(())
    }
}
