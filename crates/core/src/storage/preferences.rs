use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CURRENCY_KEY: &str = "currency";

/// Small string key-value store for user preferences.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences persisted as a flat JSON object. The whole file is rewritten
/// on every `set`. A file that does not decode is treated as empty and gets
/// replaced on the next write.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferenceStore {
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => match serde_json::from_str::<BTreeMap<String, String>>(&text) {
                Ok(values) => values,
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "preferences file unreadable; starting from defaults"
                    );
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read preferences: {}", path.display()))
            }
        };

        tracing::debug!(path = %path.display(), keys = values.len(), "preferences loaded");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("failed to write preferences: {}", self.path.display()))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}
