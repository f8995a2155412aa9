//! Snapshot: save/load the full store state to/from a single file.
//!
//! File layout: [magic: 4][version: u32][crc32: u32][length: u64][payload: bincode(StoreSnapshot)]
//! All integers are little-endian. Saves go to a temporary file that is
//! renamed over the target once fsynced.

use crate::error::{Result, StoreError};
use crate::persistence::serialization::{self, StoreSnapshot};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const MAGIC: &[u8; 4] = b"PSIX";
const HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// Default file name inside the persistence directory.
pub const SNAPSHOT_FILE: &str = "index.bin";

/// Manages saving and loading the store snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotManager {
    path: PathBuf,
}

impl SnapshotManager {
    /// Create a snapshot manager for `dir/index.bin`. Nothing is touched on disk.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_path(dir.as_ref().join(SNAPSHOT_FILE))
    }

    /// Create a snapshot manager for an explicit file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Save a snapshot to disk, replacing any previous one.
    pub fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let payload = serialization::to_bincode(snapshot)?;
        let crc = crc32fast::hash(&payload);

        let tmp = self.temp_path();
        {
            let mut file = File::create(&tmp)?;
            file.write_all(MAGIC)?;
            file.write_all(&FORMAT_VERSION.to_le_bytes())?;
            file.write_all(&crc.to_le_bytes())?;
            file.write_all(&(payload.len() as u64).to_le_bytes())?;
            file.write_all(&payload)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Load the snapshot, or return None if no snapshot exists.
    pub fn load(&self) -> Result<Option<StoreSnapshot>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::IoError(e)),
        };
        decode(&data).map(Some)
    }

    /// Delete the snapshot file. A missing file is not an error.
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::IoError(e)),
        }
    }

    /// Check if a snapshot exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}

fn decode(data: &[u8]) -> Result<StoreSnapshot> {
    if data.len() < HEADER_LEN {
        return Err(StoreError::CorruptSnapshot {
            reason: format!("file is {} bytes, shorter than the header", data.len()),
        });
    }
    if &data[..4] != MAGIC {
        return Err(StoreError::CorruptSnapshot {
            reason: "bad magic bytes".to_string(),
        });
    }

    let version = read_u32(&data[4..8]);
    if version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: version,
            expected: FORMAT_VERSION,
        });
    }

    let expected_crc = read_u32(&data[8..12]);
    let mut len_buf = [0u8; 8];
    len_buf.copy_from_slice(&data[12..HEADER_LEN]);
    let len = u64::from_le_bytes(len_buf) as usize;

    let payload = &data[HEADER_LEN..];
    if payload.len() != len {
        return Err(StoreError::CorruptSnapshot {
            reason: format!("expected {len} payload bytes, found {}", payload.len()),
        });
    }

    let actual_crc = crc32fast::hash(payload);
    if actual_crc != expected_crc {
        return Err(StoreError::ChecksumMismatch {
            expected: expected_crc,
            actual: actual_crc,
        });
    }

    let snapshot: StoreSnapshot = serialization::from_bincode(payload)?;
    snapshot.validate()?;
    Ok(snapshot)
}
