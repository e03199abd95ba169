//! Scale requests and the inputs they are expanded from.

use crate::error::{CoreError, Result};
use crate::kind::ResourceKind;

/// Namespace used when none is given on the command line or in a manifest.
pub const DEFAULT_NAMESPACE: &str = "default";

/// A single mutation: set one resource's scale value to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleRequest {
    /// Kind of the resource to scale.
    pub kind: ResourceKind,
    /// Resource name.
    pub name: String,
    /// Namespace the resource lives in.
    pub namespace: String,
    /// Desired scale value.
    pub target: u32,
    /// If set, the current scale value must equal this before mutating.
    pub precondition: Option<u32>,
}

impl ScaleRequest {
    /// Create a request without a precondition.
    #[must_use]
    pub fn new(
        kind: ResourceKind,
        name: impl Into<String>,
        namespace: impl Into<String>,
        target: u32,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            namespace: namespace.into(),
            target,
            precondition: None,
        }
    }

    /// Require the current scale value to equal `expected`.
    #[must_use]
    pub fn with_precondition(mut self, expected: Option<u32>) -> Self {
        self.precondition = expected;
        self
    }
}

/// Ordered list of namespaces a request fans out over.
///
/// Duplicates are kept; a namespace listed twice is visited twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceSet(Vec<String>);

impl NamespaceSet {
    /// Build a set from explicit namespaces, falling back to `default` when empty.
    #[must_use]
    pub fn new<I, S>(namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<String> = namespaces
            .into_iter()
            .map(Into::into)
            .map(|ns| ns.trim().to_string())
            .filter(|ns| !ns.is_empty())
            .collect();

        if list.is_empty() {
            Self::default()
        } else {
            Self(list)
        }
    }

    /// Parse a comma-separated namespace list such as `default,staging`.
    #[must_use]
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// The first namespace in the set.
    #[must_use]
    pub fn first(&self) -> &str {
        self.0.first().map_or(DEFAULT_NAMESPACE, String::as_str)
    }

    /// Iterate namespaces in the order given.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of namespaces, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: an empty input collapses to `["default"]`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for NamespaceSet {
    fn default() -> Self {
        Self(vec![DEFAULT_NAMESPACE.to_string()])
    }
}

/// Extract resource names from positional arguments.
///
/// Each token is either a bare `name` or a `kind/name` pair. The kind prefix
/// is accepted for compatibility and dropped; the subcommand decides the kind.
///
/// # Errors
///
/// Returns [`CoreError::InvalidResourceToken`] for the first token that has
/// more than one `/` or an empty part. Nothing is scaled in that case.
pub fn parse_resource_names<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<String>> {
    tokens
        .iter()
        .map(|token| {
            let token = token.as_ref();
            if !token.contains('/') {
                return Ok(token.to_string());
            }
            match token.split('/').collect::<Vec<_>>().as_slice() {
                [kind, name] if !kind.is_empty() && !name.is_empty() => Ok((*name).to_string()),
                _ => Err(CoreError::InvalidResourceToken(token.to_string())),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces_default_when_empty() {
        let set = NamespaceSet::parse("");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["default"]);
        assert_eq!(NamespaceSet::new(Vec::<String>::new()), NamespaceSet::default());
    }

    #[test]
    fn namespaces_keep_order_and_duplicates() {
        let set = NamespaceSet::parse("prod, staging,,prod");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["prod", "staging", "prod"]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.first(), "prod");
    }

    #[test]
    fn bare_and_prefixed_names() {
        let names = parse_resource_names(&["web", "deployment/nginx"]).unwrap();
        assert_eq!(names, vec!["web".to_string(), "nginx".to_string()]);
    }

    #[test]
    fn malformed_token_is_rejected() {
        let err = parse_resource_names(&["ok", "deployment/nginx/extra"]).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidResourceToken("deployment/nginx/extra".to_string())
        );
        assert!(parse_resource_names(&["deployment/"]).is_err());
    }

    #[test]
    fn request_builder() {
        let request = ScaleRequest::new(ResourceKind::Job, "batch", "ns", 2).with_precondition(Some(1));
        assert_eq!(request.precondition, Some(1));
        assert_eq!(request.target, 2);
    }
}
