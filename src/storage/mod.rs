// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use crate::extractors::FilingFacts;
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    fn facts_dir(&self, ticker: &str, period: &str) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(ticker.to_uppercase()).join(period);
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    /// Saves the extracted facts as JSON files under `<base>/<TICKER>/<period>/`.
    /// Upsert semantics at a real datastore (keyed by ticker/period/division
    /// and ticker/period/section_type/title) belong to the consumer; here a
    /// re-run simply overwrites the previous files for the same period.
    pub fn save_facts(
        &self,
        ticker: &str,
        period: &str,
        facts: &FilingFacts,
    ) -> Result<PathBuf, StorageError> {
        let target_dir = self.facts_dir(ticker, period)?;

        let segments_path = target_dir.join("segments.json");
        let segments_json = serde_json::to_string_pretty(&facts.segments)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&segments_path, segments_json).map_err(StorageError::IoError)?;

        let narratives_path = target_dir.join("narratives.json");
        let narratives_json = serde_json::to_string_pretty(&facts.narratives)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&narratives_path, narratives_json).map_err(StorageError::IoError)?;

        let metadata = serde_json::json!({
            "ticker": ticker,
            "period": period,
            "segment_count": facts.segments.len(),
            "narrative_count": facts.narratives.len(),
            "rnd_expense": facts.rnd_expense,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });
        let metadata_path = target_dir.join("facts_meta.json");
        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&metadata_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved extracted facts to {}", target_dir.display());
        Ok(target_dir)
    }

    /// Saves a raw text artifact (narrowed section, candidate table dump)
    /// under `<base>/<TICKER>/<period>/debug/` for layout triage.
    pub fn save_debug_text(
        &self,
        ticker: &str,
        period: &str,
        name: &str,
        content: &str,
    ) -> Result<PathBuf, StorageError> {
        let debug_dir = self.facts_dir(ticker, period)?.join("debug");
        if !debug_dir.exists() {
            fs::create_dir_all(&debug_dir).map_err(StorageError::IoError)?;
        }
        let file_path = debug_dir.join(name);
        fs::write(&file_path, content).map_err(StorageError::IoError)?;
        tracing::debug!("Saved debug artifact to {}", file_path.display());
        Ok(file_path)
    }
}
