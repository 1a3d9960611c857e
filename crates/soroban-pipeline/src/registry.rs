//! Named identifier registry.
//!
//! Deployment scripts record the ids they create under human-readable names
//! (`"token"`, `"token_wasm_hash"`, ...) in a JSON object file, and later
//! calls look them up by name.

use crate::error::{PipelineError, PipelineResult};
use soroban_pipeline_types::{ContractAddress, Hash32};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A name to identifier map persisted as a JSON object.
#[derive(Debug, Clone)]
pub struct AddressRegistry {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl AddressRegistry {
    /// Loads the registry at `path`; a missing file is an empty registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not a
    /// JSON object of strings.
    pub fn open(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), entries = entries.len(), "Opened address registry");
        Ok(Self { path, entries })
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the identifier recorded under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotFound`] if the name is unknown.
    pub fn get(&self, name: &str) -> PipelineResult<&str> {
        self.entries
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| PipelineError::NotFound(format!("no registry entry named '{name}'")))
    }

    /// Records `id` under `name` and writes the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn set(&mut self, name: impl Into<String>, id: impl ToString) -> PipelineResult<()> {
        self.entries.insert(name.into(), id.to_string());
        self.save()
    }

    /// Looks up a contract address.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or the value is not a contract id.
    pub fn contract(&self, name: &str) -> PipelineResult<ContractAddress> {
        Ok(ContractAddress::parse(self.get(name)?)?)
    }

    /// Looks up a hash, such as an uploaded code hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or the value is not a hash.
    pub fn hash(&self, name: &str) -> PipelineResult<Hash32> {
        Ok(Hash32::from_hex(self.get(name)?)?)
    }

    /// Iterates over all entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn save(&self) -> PipelineResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut contents = serde_json::to_string_pretty(&self.entries)?;
        contents.push('\n');
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}
