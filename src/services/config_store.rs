// Configuration Storage Service
// Handles config file read/write and timestamped backups

use crate::models::{DEFAULT_NGRAM, MAX_NGRAM, MIN_NGRAM};
use crate::services::corpus_store::JsonCorpusStore;
use crate::services::highlight::DEFAULT_MAX_UNITS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    /// Corpus JSON file; defaults to the local data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corpus_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    #[serde(default = "default_ngram")]
    pub ngram: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ngram: DEFAULT_NGRAM,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightConfig {
    #[serde(default = "default_max_units")]
    pub max_units: usize,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            max_units: DEFAULT_MAX_UNITS,
        }
    }
}

fn default_ngram() -> usize { DEFAULT_NGRAM }
fn default_max_units() -> usize { DEFAULT_MAX_UNITS }

impl AppConfig {
    /// Resolve the corpus file location
    pub fn corpus_file(&self) -> PathBuf {
        self.corpus_path
            .clone()
            .or_else(JsonCorpusStore::default_path)
            .unwrap_or_else(|| PathBuf::from("corpus.json"))
    }
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("acadcheck"))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config dir: {}", e))
    }

    /// Load configuration from file
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        self.ensure_dir()?;

        // Create backup if file exists
        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_file, content)
            .map_err(|e| format!("Failed to write config: {}", e))
    }

    /// Create a backup of current config
    fn create_backup(&self) -> Result<(), String> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)
            .map_err(|e| format!("Failed to create backup dir: {}", e))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%.3f");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file)
            .map_err(|e| format!("Failed to create backup: {}", e))?;

        // Keep only last 10 backups
        self.cleanup_old_backups(&backup_dir, 10)?;

        Ok(())
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &Path, keep: usize) -> Result<(), String> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(|e| format!("Failed to read backup dir: {}", e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Oldest first; names carry the timestamp
        entries.sort_by_key(|e| e.file_name());

        for entry in entries.iter().take(entries.len() - keep) {
            let _ = fs::remove_file(entry.path());
        }

        Ok(())
    }

    /// Update the n-gram size, clamped to the supported range
    pub fn set_ngram(&self, ngram: usize) -> Result<AppConfig, String> {
        let mut config = self.load()?;
        config.analysis.ngram = ngram.clamp(MIN_NGRAM, MAX_NGRAM);
        self.save(&config)?;
        Ok(config)
    }

    /// Point the corpus at a different file
    pub fn set_corpus_path(&self, path: &Path) -> Result<AppConfig, String> {
        let mut config = self.load()?;
        config.corpus_path = Some(path.to_path_buf());
        self.save(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.analysis.ngram, 5);
        assert_eq!(config.highlight.max_units, 20_000);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: AppConfig = serde_json::from_str(r#"{"analysis":{}}"#).unwrap();
        assert_eq!(parsed.analysis.ngram, 5);
        assert_eq!(parsed.highlight.max_units, 20_000);
        assert!(parsed.corpus_path.is_none());
    }

    #[test]
    fn test_save_load_and_backups() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        assert_eq!(store.load().unwrap().analysis.ngram, 5);

        let config = store.set_ngram(9).unwrap();
        assert_eq!(config.analysis.ngram, 7);
        let config = store.set_corpus_path(&dir.path().join("refs.json")).unwrap();
        assert_eq!(config.corpus_file(), dir.path().join("refs.json"));

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.analysis.ngram, 7);
        assert!(dir.path().join("backups").exists());
    }

    #[test]
    fn test_backups_are_rotated() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        for n in 0..14 {
            store.set_ngram(3 + n % 5).unwrap();
        }
        let backups = fs::read_dir(dir.path().join("backups")).unwrap().count();
        assert!((1..=10).contains(&backups));
        assert_eq!(store.load().unwrap().analysis.ngram, 3 + 13 % 5);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        fs::write(store.config_file(), "[1, 2").unwrap();
        assert!(store.load().unwrap_err().starts_with("Failed to parse config"));
    }
}
