//! Types for the scaler crate.

use std::path::{Path, PathBuf};

use mscale_core::{FailurePolicy, NamespaceSet, ResourceKind};

use crate::{Result, ScaleError};

/// Precondition flag value that means "no precondition".
pub const NO_PRECONDITION: i64 = -1;

/// Everything one invocation needs, fixed before any cluster call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleConfig {
    /// Kind chosen by the subcommand.
    pub kind: ResourceKind,
    /// Desired scale value.
    pub target: u32,
    /// Required current value, if any.
    pub precondition: Option<u32>,
    /// Namespaces to fan out over. Ignored in file mode.
    pub namespaces: NamespaceSet,
    /// Manifest to read targets from.
    pub filename: Option<PathBuf>,
    /// Positional resource tokens. Ignored in file mode.
    pub names: Vec<String>,
    /// Scale every resource of the kind, ignoring `names`.
    pub all: bool,
    /// Whether per-target failures fail the process.
    pub failure_policy: FailurePolicy,
}

/// Which fan-out a configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode<'a> {
    /// Targets come from a manifest file.
    File(&'a Path),
    /// Every resource of the kind in each namespace.
    All,
    /// The given resource tokens in each namespace.
    Names(&'a [String]),
}

impl ScaleConfig {
    /// A configuration for `kind` and `target` with every option at its default.
    #[must_use]
    pub fn new(kind: ResourceKind, target: u32) -> Self {
        Self {
            kind,
            target,
            precondition: None,
            namespaces: NamespaceSet::default(),
            filename: None,
            names: Vec::new(),
            all: false,
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Select the fan-out mode.
    ///
    /// A filename takes precedence, then `all` or an empty name list, then
    /// explicit names.
    #[must_use]
    pub fn mode(&self) -> Mode<'_> {
        if let Some(path) = &self.filename {
            Mode::File(path)
        } else if self.all || self.names.is_empty() {
            Mode::All
        } else {
            Mode::Names(&self.names)
        }
    }

    /// Convert a `--current-replicas` value; any negative value means none.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not fit a scale count.
    pub fn precondition_from_flag(value: i64) -> Result<Option<u32>> {
        if value < 0 {
            return Ok(None);
        }
        u32::try_from(value)
            .map(Some)
            .map_err(|_| ScaleError::Config(format!("current replicas {value} is out of range")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_takes_precedence() {
        let mut config = ScaleConfig::new(ResourceKind::Deployment, 1);
        config.filename = Some(PathBuf::from("web.yaml"));
        config.all = true;
        config.names = vec!["web".to_string()];

        assert_eq!(config.mode(), Mode::File(Path::new("web.yaml")));
    }

    #[test]
    fn all_flag_or_no_names_selects_all() {
        let mut config = ScaleConfig::new(ResourceKind::Job, 1);
        assert_eq!(config.mode(), Mode::All);

        config.names = vec!["etl".to_string()];
        config.all = true;
        assert_eq!(config.mode(), Mode::All);
    }

    #[test]
    fn names_mode() {
        let mut config = ScaleConfig::new(ResourceKind::Job, 1);
        config.names = vec!["etl".to_string()];
        assert_eq!(config.mode(), Mode::Names(&["etl".to_string()]));
    }

    #[test]
    fn precondition_flag() {
        assert_eq!(ScaleConfig::precondition_from_flag(NO_PRECONDITION).unwrap(), None);
        assert_eq!(ScaleConfig::precondition_from_flag(-7).unwrap(), None);
        assert_eq!(ScaleConfig::precondition_from_flag(0).unwrap(), Some(0));
        assert!(ScaleConfig::precondition_from_flag(i64::MAX).is_err());
    }
}
