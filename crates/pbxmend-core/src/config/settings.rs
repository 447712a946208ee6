use std::path::Path;

use git2::{Config, Repository};

use crate::edit::{AddOptions, OnExisting};
use crate::error::CoreError;
use crate::ids::IdStrategy;
use crate::repair::RepairOptions;

/// Settings from the `[pbxmend]` section of the enclosing repository's
/// git config. CLI flags take precedence over every field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PbxConfig {
    pub id_strategy: IdStrategy,
    pub create_groups: bool,
    pub skip_existing: bool,
    pub prune_empty_groups: bool,
}

impl Default for PbxConfig {
    fn default() -> Self {
        Self {
            id_strategy: IdStrategy::Random,
            create_groups: false,
            skip_existing: false,
            prune_empty_groups: true,
        }
    }
}

impl PbxConfig {
    /// Read config from a git config's [pbxmend] section.
    pub fn load(config: &Config) -> Result<Self, CoreError> {
        let defaults = Self::default();
        let id_strategy = match config.get_string("pbxmend.idStrategy") {
            Ok(value) => value.parse::<IdStrategy>()?,
            Err(_) => defaults.id_strategy,
        };
        Ok(Self {
            id_strategy,
            create_groups: config
                .get_bool("pbxmend.createGroups")
                .unwrap_or(defaults.create_groups),
            skip_existing: config
                .get_bool("pbxmend.skipExisting")
                .unwrap_or(defaults.skip_existing),
            prune_empty_groups: config
                .get_bool("pbxmend.pruneEmptyGroups")
                .unwrap_or(defaults.prune_empty_groups),
        })
    }

    /// Write config to a git config's [pbxmend] section.
    pub fn save(&self, config: &mut Config) -> Result<(), CoreError> {
        let strategy = match self.id_strategy {
            IdStrategy::Random => "random",
            IdStrategy::Deterministic => "deterministic",
        };
        config.set_str("pbxmend.idStrategy", strategy)?;
        config.set_bool("pbxmend.createGroups", self.create_groups)?;
        config.set_bool("pbxmend.skipExisting", self.skip_existing)?;
        config.set_bool("pbxmend.pruneEmptyGroups", self.prune_empty_groups)?;
        Ok(())
    }

    /// Config of the repository containing `start`, or defaults when there
    /// is none.
    pub fn discover(start: &Path) -> Result<Self, CoreError> {
        match Repository::discover(start) {
            Ok(repo) => {
                let config = repo.config()?;
                Self::load(&config)
            }
            Err(err) => {
                tracing::debug!("No repository config at {}: {}", start.display(), err.message());
                Ok(Self::default())
            }
        }
    }

    /// Save into the local config of the repository containing `start`.
    pub fn save_to_repository(&self, start: &Path) -> Result<(), CoreError> {
        let repo = Repository::discover(start)?;
        let mut config = repo.config()?;
        self.save(&mut config)?;
        tracing::info!("Saved pbxmend config to {}", repo.path().display());
        Ok(())
    }

    pub fn add_options(&self) -> AddOptions {
        AddOptions {
            strategy: self.id_strategy,
            create_groups: self.create_groups,
            on_existing: if self.skip_existing {
                OnExisting::Skip
            } else {
                OnExisting::Fail
            },
        }
    }

    pub fn repair_options(&self) -> RepairOptions {
        RepairOptions {
            prune_empty_groups: self.prune_empty_groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_outside_a_repository() {
        let dir = TempDir::new().unwrap();
        let config = PbxConfig::discover(dir.path()).unwrap();
        assert_eq!(config.id_strategy, IdStrategy::Random);
        assert!(config.prune_empty_groups);
        assert_eq!(config.add_options().on_existing, OnExisting::Fail);
    }

    #[test]
    fn test_save_then_discover() {
        let dir = TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();
        let wanted = PbxConfig {
            id_strategy: IdStrategy::Deterministic,
            create_groups: true,
            skip_existing: true,
            prune_empty_groups: false,
        };
        wanted.save_to_repository(dir.path()).unwrap();

        let nested = dir.path().join("App");
        std::fs::create_dir_all(&nested).unwrap();
        let loaded = PbxConfig::discover(&nested).unwrap();
        assert_eq!(loaded, wanted);
        assert!(loaded.add_options().create_groups);
        assert!(!loaded.repair_options().prune_empty_groups);
    }

    #[test]
    fn test_save_outside_a_repository_fails() {
        let dir = TempDir::new().unwrap();
        let err = PbxConfig::default().save_to_repository(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::Git(_)));
    }

    #[test]
    fn test_bad_strategy_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        repo.config().unwrap().set_str("pbxmend.idStrategy", "sequential").unwrap();
        let err = PbxConfig::discover(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
