//! Repository configuration.
//!
//! Stored as `key=value` lines in `<meta>/config`:
//!
//! ```text
//! version=1
//! algo=blake3-256
//! author=Jane Doe <jane@example.com>
//! committer=Jane Doe <jane@example.com>
//! ```

use crate::error::{Error, Result};
use crate::hash::Algorithm;
use std::fs;
use std::path::Path;

/// Identity used when the config file names none.
pub const DEFAULT_IDENTITY: &str = "mingit <mingit@localhost>";

/// Parsed repository configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoConfig {
    /// Hash algorithm naming objects.
    pub algorithm: Algorithm,
    /// Author recorded in new commits.
    pub author: String,
    /// Committer recorded in new commits.
    pub committer: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Blake3,
            author: DEFAULT_IDENTITY.to_string(),
            committer: DEFAULT_IDENTITY.to_string(),
        }
    }
}

impl RepoConfig {
    /// Load the config file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Write the config file to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())?;
        Ok(())
    }

    /// Parse config file content.
    pub fn parse(content: &str) -> Result<Self> {
        let mut version = None;
        let mut algo = None;
        let mut config = RepoConfig::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                match key.trim() {
                    "version" => version = Some(value.trim()),
                    "algo" => algo = Some(value.trim()),
                    "author" => config.author = value.trim().to_string(),
                    "committer" => config.committer = value.trim().to_string(),
                    _ => {}
                }
            }
        }

        // Validate version
        if version != Some("1") {
            return Err(Error::invalid_repository(
                "config",
                format!("Unsupported config version: {:?}", version),
            ));
        }

        // Parse algorithm
        let algo_str = algo.ok_or_else(|| Error::invalid_repository("config", "Missing algo"))?;
        config.algorithm = Algorithm::parse(algo_str)?;

        Ok(config)
    }

    /// Render as config file content.
    pub fn render(&self) -> String {
        format!(
            "version=1\nalgo={}\nauthor={}\ncommitter={}\n",
            self.algorithm.as_str(),
            self.author,
            self.committer
        )
    }
}
