//! Planner data storage
//!
//! Roadmaps are written as a versioned `bincode` envelope. Writes go to a
//! temporary file first and are renamed into place so a crash never leaves a
//! truncated roadmap behind.

use crate::error::StorageError;
use crate::planner::PlannerData;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current on-disk format version
pub const PLANNER_DATA_FORMAT_VERSION: u32 = 1;

/// Reads and writes planner graphs at caller-specified paths
pub trait PlannerDataStorage: Send + Sync {
    fn store(&self, data: &PlannerData, path: &Path) -> Result<(), StorageError>;
    fn load(&self, path: &Path) -> Result<PlannerData, StorageError>;
}

#[derive(Serialize, Deserialize)]
struct StoredPlannerData {
    version: u32,
    data: PlannerData,
}

/// Filesystem-backed planner data storage
#[derive(Debug, Default, Clone)]
pub struct FilePlannerDataStorage;

impl FilePlannerDataStorage {
    pub fn new() -> Self {
        Self
    }
}

impl PlannerDataStorage for FilePlannerDataStorage {
    fn store(&self, data: &PlannerData, path: &Path) -> Result<(), StorageError> {
        if path.as_os_str().is_empty() {
            return Err(StorageError::MissingPath);
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let envelope = StoredPlannerData {
            version: PLANNER_DATA_FORMAT_VERSION,
            data: data.clone(),
        };
        let bytes =
            bincode::serialize(&envelope).map_err(|e| StorageError::Encode(e.to_string()))?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &bytes)?;
        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            StorageError::IoError(e)
        })?;

        Ok(())
    }

    fn load(&self, path: &Path) -> Result<PlannerData, StorageError> {
        if path.as_os_str().is_empty() {
            return Err(StorageError::MissingPath);
        }
        if !path.exists() {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }

        let bytes = fs::read(path)?;
        let envelope: StoredPlannerData =
            bincode::deserialize(&bytes).map_err(|e| StorageError::Decode(e.to_string()))?;
        if envelope.version != PLANNER_DATA_FORMAT_VERSION {
            return Err(StorageError::FormatVersion {
                expected: PLANNER_DATA_FORMAT_VERSION,
                found: envelope.version,
            });
        }

        let mut data = envelope.data;
        data.retain_valid_edges();
        Ok(data)
    }
}
