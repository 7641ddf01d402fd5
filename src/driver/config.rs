//! Audit driver configuration.
//!
//! Configuration-driven backend selection.

use serde::{Deserialize, Serialize};

/// Audit layer configuration.
///
/// Passed to the registry at construction time; the default backend key
/// is fixed for the registry's lifetime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Default backend name used when an entity does not name one
    pub default_backend: String,
    /// Memory-backend config
    pub memory: Option<MemoryConfig>,
    /// File-backend config
    pub file: Option<FileConfig>,
    /// Console-backend config
    pub console: Option<ConsoleConfig>,
}

impl AuditConfig {
    /// Create a memory-backed config.
    pub fn memory() -> Self {
        Self {
            default_backend: "memory".to_string(),
            memory: Some(MemoryConfig::default()),
            file: None,
            console: None,
        }
    }

    /// Create a file-backed config.
    pub fn file(path: &str) -> Self {
        Self {
            default_backend: "file".to_string(),
            memory: None,
            file: Some(FileConfig {
                path: path.to_string(),
                ..Default::default()
            }),
            console: None,
        }
    }

    /// Create a console-backed config.
    pub fn console() -> Self {
        Self {
            default_backend: "console".to_string(),
            memory: None,
            file: None,
            console: Some(ConsoleConfig::default()),
        }
    }

    /// Set the default backend key.
    pub fn with_default_backend(mut self, name: &str) -> Self {
        self.default_backend = name.to_string();
        self
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self::memory()
    }
}

/// Memory backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Records kept per entity; 0 = unbounded
    pub max_records: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { max_records: 0 }
    }
}

/// File backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileConfig {
    /// Path of the JSON-lines log file
    pub path: String,
    /// Records kept per entity; 0 = unbounded
    pub max_records: usize,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: "audit.jsonl".to_string(),
            max_records: 0,
        }
    }
}

/// Console backend configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Pretty-print records
    pub pretty: bool,
}
