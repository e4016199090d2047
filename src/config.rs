use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::tables::LookupTables;

/// Names of every identifier the compiler synthesizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conventions {
    /// Parameter through which generated callables reach the executor.
    pub context: String,

    /// Attribute returned at the end of every action and clamp callback.
    pub end_of_flow: String,

    /// Attribute returned at the end of a mouse program.
    pub end_of_program: String,

    /// Constructor invoked once per mouse program.
    pub entity: String,

    /// Dotted path of the top-level run invocation.
    pub runner: String,

    /// Dotted path of the `print` block's log call.
    pub log: String,

    /// Counted-loop iterators are named `<prefix><depth>`.
    pub iterator_prefix: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            context: "mouse".to_string(),
            end_of_flow: "ENDFLOW".to_string(),
            end_of_program: "ENDMOUSE".to_string(),
            entity: "Mouse".to_string(),
            runner: "MusicBlocks.run".to_string(),
            log: "console.log".to_string(),
            iterator_prefix: "i".to_string(),
        }
    }
}

impl Conventions {
    pub fn iterator(&self, depth: usize) -> String {
        format!("{}{}", self.iterator_prefix, depth)
    }
}

/// Everything a compiler is constructed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub tables: LookupTables,
    pub conventions: Conventions,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            tables: LookupTables::music_blocks(),
            conventions: Conventions::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config error: cannot read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl CompilerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}
