//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing: names must be non-empty, the
//! engine timeout cannot drop below the floor large working trees need, and
//! the log page size must be positive.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Smallest accepted engine timeout in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 300;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// [git]
/// binary = "git"
/// timeout_secs = 600
///
/// [dispatch]
/// default_remote = "origin"
/// fallback_branch = "main"
/// log_limit = 50
///
/// [ssh]
/// dir = "/home/me/.ssh"
/// builtin_host_keys = false
///
/// [recent]
/// path = "/home/me/.gitdeck/preferences.toml"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Engine binding settings
    pub git: Option<GitSection>,

    /// Dispatcher defaults
    pub dispatch: Option<DispatchSection>,

    /// Key pair and trusted hosts
    pub ssh: Option<SshSection>,

    /// Recent-repository storage
    pub recent: Option<RecentSection>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(git) = &self.git {
            git.validate()?;
        }
        if let Some(dispatch) = &self.dispatch {
            dispatch.validate()?;
        }
        Ok(())
    }
}

/// `[git]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GitSection {
    /// Engine executable (default: "git")
    pub binary: Option<String>,

    /// Timeout for one engine command, in seconds (default: 300)
    pub timeout_secs: Option<u64>,
}

impl GitSection {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_empty("git.binary", self.binary.as_deref())?;
        if let Some(secs) = self.timeout_secs {
            if secs < MIN_TIMEOUT_SECS {
                return Err(ConfigError::InvalidValue(format!(
                    "git.timeout_secs must be at least {}, got {}",
                    MIN_TIMEOUT_SECS, secs
                )));
            }
        }
        Ok(())
    }
}

/// `[dispatch]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchSection {
    /// Remote used by the upstream retry and defaulted arguments
    pub default_remote: Option<String>,

    /// Branch assumed when the current branch cannot be determined
    pub fallback_branch: Option<String>,

    /// Maximum commits returned by `log`
    pub log_limit: Option<usize>,
}

impl DispatchSection {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_empty("dispatch.default_remote", self.default_remote.as_deref())?;
        non_empty("dispatch.fallback_branch", self.fallback_branch.as_deref())?;
        if self.log_limit == Some(0) {
            return Err(ConfigError::InvalidValue(
                "dispatch.log_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// `[ssh]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SshSection {
    /// Key directory (default: `~/.ssh`)
    pub dir: Option<PathBuf>,

    /// Fall back to built-in host keys when live discovery fails
    pub builtin_host_keys: Option<bool>,
}

/// `[recent]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RecentSection {
    /// Preference file (default: `~/.gitdeck/preferences.toml`)
    pub path: Option<PathBuf>,
}

fn non_empty(key: &str, value: Option<&str>) -> Result<(), ConfigError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ConfigError::InvalidValue(format!(
            "{} cannot be empty",
            key
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GlobalConfig::default().validate().is_ok());
    }

    #[test]
    fn short_timeout_rejected() {
        let config = GlobalConfig {
            git: Some(GitSection {
                timeout_secs: Some(30),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_log_limit_rejected() {
        let config = GlobalConfig {
            dispatch: Some(DispatchSection {
                log_limit: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_remote_rejected() {
        let config = GlobalConfig {
            dispatch: Some(DispatchSection {
                default_remote: Some("".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn roundtrip() {
        let config = GlobalConfig {
            git: Some(GitSection {
                binary: Some("/usr/bin/git".to_string()),
                timeout_secs: Some(900),
            }),
            dispatch: Some(DispatchSection {
                default_remote: Some("upstream".to_string()),
                fallback_branch: Some("trunk".to_string()),
                log_limit: Some(20),
            }),
            ssh: Some(SshSection {
                dir: Some(PathBuf::from("/tmp/ssh")),
                builtin_host_keys: Some(false),
            }),
            recent: Some(RecentSection {
                path: Some(PathBuf::from("/tmp/prefs.toml")),
            }),
        };

        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: GlobalConfig = toml::from_str(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn reject_unknown_fields() {
        let toml = r#"
            [git]
            binary = "git"
            colour = true
        "#;
        let result: Result<GlobalConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }
}
