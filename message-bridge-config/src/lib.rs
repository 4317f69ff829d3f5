// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

// Config files are read as YAML when the extension says so, JSON otherwise.
pub trait Config: Serialize + DeserializeOwned {
    fn persisted(self, path: &Path) -> PersistedConfig<Self>
    where
        Self: Sized,
    {
        PersistedConfig {
            inner: self,
            path: path.to_path_buf(),
        }
    }

    fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = if is_yaml(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config {}", path.display()))?
        };
        Ok(config)
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml(path) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }
}

pub struct PersistedConfig<C> {
    inner: C,
    path: PathBuf,
}

impl<C: Config> PersistedConfig<C> {
    pub fn read(&self) -> Result<C> {
        C::load(&self.path)
    }

    pub fn save(&self) -> Result<()> {
        self.inner.save(&self.path)
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    struct TestConfig {
        hub_chain_id: u64,
        spoke_chain_ids: Vec<u64>,
    }

    impl Config for TestConfig {}

    fn test_config() -> TestConfig {
        TestConfig {
            hub_chain_id: 1111,
            spoke_chain_ids: vec![1112, 1113],
        }
    }

    #[test]
    fn test_json_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bridge.json");
        test_config().save(&path)?;
        let content = std::fs::read_to_string(&path)?;
        assert!(content.contains("hub-chain-id"));
        assert_eq!(TestConfig::load(&path)?, test_config());
        Ok(())
    }

    #[test]
    fn test_yaml_round_trip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bridge.yaml");
        let persisted = test_config().persisted(&path);
        persisted.save()?;
        assert_eq!(persisted.read()?, test_config());
        assert_eq!(persisted.path(), path.as_path());
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TestConfig::load(dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
