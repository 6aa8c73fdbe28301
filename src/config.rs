//! Import configuration
//!
//! Immutable per-call options plus the `lexigraft.toml` file helpers the CLI
//! uses.

use crate::record::RecordKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Options recognized by the import pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Traverse owns-edges when building the graph
    pub include_owned: bool,
    /// Restrict owned traversal to these kinds; empty = no filter
    pub owned_kinds: HashSet<RecordKind>,
    /// Traverse reference-edges when building the graph
    pub resolve_references: bool,
    /// Bound on owns-edge traversal depth; roots are depth 0.
    /// Reference traversal is exempt from this bound.
    pub max_owned_depth: usize,
    /// Elide records already present in the target (by identity key)
    pub skip_existing: bool,
    /// Validate every resolved record, not just the roots
    pub validate_all: bool,
    /// Break detected cycles instead of aborting
    pub allow_cycles: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            include_owned: true,
            owned_kinds: HashSet::new(),
            resolve_references: true,
            max_owned_depth: 10,
            skip_existing: true,
            validate_all: false,
            allow_cycles: false,
        }
    }
}

impl ImportConfig {
    /// Whether owned children of this kind pass the `owned_kinds` filter
    pub fn wants_owned_kind(&self, kind: RecordKind) -> bool {
        self.owned_kinds.is_empty() || self.owned_kinds.contains(&kind)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("lexigraft.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<ImportConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: ImportConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &ImportConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
