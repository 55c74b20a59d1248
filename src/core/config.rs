// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Reader configuration
//!
//! Limits applied while parsing a dump. Values come from the defaults, then
//! an optional TOML file, then environment variables:
//!
//! ```toml
//! max_state_size = 67108864
//! max_transfer_size = 268435456
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{DumpError, Result};

/// Default upper bound for the frozen state blob (64 MiB)
pub const DEFAULT_MAX_STATE_SIZE: usize = 64 * 1024 * 1024;

/// Default upper bound for a single transfer payload (256 MiB)
pub const DEFAULT_MAX_TRANSFER_SIZE: usize = 256 * 1024 * 1024;

/// Limits for [`CaptureFile`](super::dump::CaptureFile) parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReaderConfig {
    /// Largest accepted state blob; bigger lengths are a corrupt header
    #[serde(default = "default_max_state_size")]
    pub max_state_size: usize,

    /// Largest accepted transfer payload
    #[serde(default = "default_max_transfer_size")]
    pub max_transfer_size: usize,
}

fn default_max_state_size() -> usize {
    DEFAULT_MAX_STATE_SIZE
}

fn default_max_transfer_size() -> usize {
    DEFAULT_MAX_TRANSFER_SIZE
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_state_size: default_max_state_size(),
            max_transfer_size: default_max_transfer_size(),
        }
    }
}

impl ReaderConfig {
    /// Overrides `max_state_size`
    pub const ENV_MAX_STATE_SIZE: &'static str = "GSDUMP_MAX_STATE_SIZE";

    /// Overrides `max_transfer_size`
    pub const ENV_MAX_TRANSFER_SIZE: &'static str = "GSDUMP_MAX_TRANSFER_SIZE";

    /// Parse configuration from a TOML string
    ///
    /// Missing keys keep their defaults.
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| DumpError::Config(format!("failed to parse config: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DumpError::Config(format!("failed to read config at {}: {}", path.display(), e))
        })?;
        log::debug!("Loaded reader config from {}", path.display());
        Self::parse(&contents)
    }

    /// Build the effective configuration
    ///
    /// # Arguments
    ///
    /// * `path` - Optional TOML file layered over the defaults
    ///
    /// # Returns
    ///
    /// Defaults, then the file, then `GSDUMP_*` environment variables
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup
    ///
    /// `lookup` is called with each environment variable name; the process
    /// environment is the usual source.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(Self::ENV_MAX_STATE_SIZE) {
            self.max_state_size = parse_size(Self::ENV_MAX_STATE_SIZE, &value)?;
        }
        if let Some(value) = lookup(Self::ENV_MAX_TRANSFER_SIZE) {
            self.max_transfer_size = parse_size(Self::ENV_MAX_TRANSFER_SIZE, &value)?;
        }
        Ok(())
    }
}

fn parse_size(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| DumpError::Config(format!("{} must be a byte count, got {:?}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReaderConfig::default();
        assert_eq!(config.max_state_size, DEFAULT_MAX_STATE_SIZE);
        assert_eq!(config.max_transfer_size, DEFAULT_MAX_TRANSFER_SIZE);
    }

    #[test]
    fn test_parse_partial_toml_keeps_defaults() {
        let config = ReaderConfig::parse("max_state_size = 1024\n").unwrap();
        assert_eq!(config.max_state_size, 1024);
        assert_eq!(config.max_transfer_size, DEFAULT_MAX_TRANSFER_SIZE);
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        let err = ReaderConfig::parse("max_frames = 3\n").unwrap_err();
        assert!(matches!(err, DumpError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ReaderConfig::parse("max_state_size = 1024\n").unwrap();
        config
            .apply_overrides(|key| match key {
                "GSDUMP_MAX_STATE_SIZE" => Some("2048".to_string()),
                "GSDUMP_MAX_TRANSFER_SIZE" => Some(" 4096 ".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.max_state_size, 2048);
        assert_eq!(config.max_transfer_size, 4096);
    }

    #[test]
    fn test_env_override_must_be_numeric() {
        let mut config = ReaderConfig::default();
        let err = config
            .apply_overrides(|key| (key == ReaderConfig::ENV_MAX_TRANSFER_SIZE).then(|| "lots".to_string()))
            .unwrap_err();

        assert!(err.to_string().contains("GSDUMP_MAX_TRANSFER_SIZE"));
        assert_eq!(config.max_transfer_size, DEFAULT_MAX_TRANSFER_SIZE);
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gsdump.toml");
        std::fs::write(&path, "max_transfer_size = 64\n").unwrap();

        let config = ReaderConfig::load_from_path(&path).unwrap();
        assert_eq!(config.max_transfer_size, 64);

        let missing = ReaderConfig::load_from_path(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(DumpError::Config(_))));
    }
}
