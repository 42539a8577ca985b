use crate::constants::{EXPORT_SUFFIX, EXPORT_VERSION, MAX_HISTORY};
use crate::error::ImportError;
use crate::models::{CollectionExport, RequestDefinition};
use crate::network::ResponseRecord;
use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

/// One completed send
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub request: RequestDefinition,
    pub response: ResponseRecord,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Manages send history and collection files
pub struct Storage {
    pub history: VecDeque<HistoryEntry>,
    collections_dir: PathBuf,
}

impl Storage {
    pub fn new(collections_dir: impl Into<PathBuf>) -> Self {
        Storage {
            history: VecDeque::with_capacity(MAX_HISTORY),
            collections_dir: collections_dir.into(),
        }
    }

    pub fn collections_dir(&self) -> &Path {
        &self.collections_dir
    }

    /// Add entry to history
    pub fn add_to_history(&mut self, entry: HistoryEntry) {
        if self.history.len() >= MAX_HISTORY {
            self.history.pop_back();
        }
        self.history.push_front(entry);
    }

    /// Get history item by index (0 = most recent)
    pub fn get_history(&self, index: usize) -> Option<&HistoryEntry> {
        self.history.get(index)
    }

    /// History length
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Ensure collections directory exists
    fn ensure_dir(&self) -> Result<()> {
        if !self.collections_dir.exists() {
            fs::create_dir_all(&self.collections_dir).with_context(|| {
                format!("failed to create {}", self.collections_dir.display())
            })?;
        }
        Ok(())
    }

    /// Save a collection under its export file name
    pub fn save_collection(&self, collection: &CollectionExport) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.collections_dir.join(export_file_name(&collection.name));
        let content = serde_json::to_string_pretty(collection)?;
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Load every stored collection; unreadable files are skipped
    pub fn list_collections(&self) -> Result<Vec<CollectionExport>> {
        if !self.collections_dir.exists() {
            return Ok(Vec::new());
        }

        let mut collections = Vec::new();
        for entry in fs::read_dir(&self.collections_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = fs::read_to_string(&path)
                .map_err(ImportError::from)
                .and_then(|c| parse_import(&c));
            match parsed {
                Ok(collection) => collections.push(collection),
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Skipping unreadable collection"
                ),
            }
        }
        collections.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(collections)
    }

    pub fn load_collection(&self, name: &str) -> Result<CollectionExport> {
        self.list_collections()?
            .into_iter()
            .find(|c| c.name == name)
            .with_context(|| format!("collection not found: {}", name))
    }

    /// Import an export file, renaming it when the name is already taken
    pub fn import_file(&self, path: &Path) -> Result<CollectionExport> {
        let content = fs::read_to_string(path).map_err(ImportError::from)?;
        let mut collection = parse_import(&content)?;

        // Distinct names can still share a file name once sanitized
        let file_name = export_file_name(&collection.name);
        let taken = self.list_collections()?.iter().any(|c| {
            c.name == collection.name || export_file_name(&c.name) == file_name
        });
        if taken {
            let renamed = format!(
                "{} (Imported {})",
                collection.name,
                chrono::Utc::now().timestamp_millis()
            );
            tracing::info!(from = %collection.name, to = %renamed, "Renaming imported collection");
            collection.name = renamed;
        }

        self.save_collection(&collection)?;
        Ok(collection)
    }

    /// Write a stored collection as an export document.
    /// A directory destination gets the default export file name.
    pub fn export_collection(&self, name: &str, dest: &Path) -> Result<PathBuf> {
        let mut collection = self.load_collection(name)?;
        collection.version = Some(EXPORT_VERSION.to_string());
        collection.exported_at = Some(chrono::Utc::now());

        let path = if dest.is_dir() {
            dest.join(export_file_name(&collection.name))
        } else {
            dest.to_path_buf()
        };
        fs::write(&path, serde_json::to_string_pretty(&collection)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// `My API v2` -> `my_api_v2_export.json`
pub fn export_file_name(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{}{}", stem, EXPORT_SUFFIX)
}

/// Parse an export document, requiring a name and a folder list
pub fn parse_import(content: &str) -> Result<CollectionExport, ImportError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| ImportError::InvalidFormat(Some(e)))?;

    let has_name = value
        .get("name")
        .and_then(|n| n.as_str())
        .is_some_and(|n| !n.is_empty());
    let has_folders = value.get("folders").is_some_and(|f| f.is_array());
    if !has_name || !has_folders {
        return Err(ImportError::InvalidFormat(None));
    }

    serde_json::from_value(value).map_err(|e| ImportError::InvalidFormat(Some(e)))
}
