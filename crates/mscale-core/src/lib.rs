//! Core types for kubectl-mscale.
//!
//! This crate holds the pieces of the scaling orchestrator that do not talk to
//! a cluster:
//!
//! - **Resource kinds**: the registry of scalable workload kinds and their aliases
//! - **Requests**: scale requests, namespace sets and resource-name tokens
//! - **Outcomes**: per-target results and the summary of a whole run
//!
//! # Example
//!
//! ```
//! use mscale_core::{NamespaceSet, ResourceKind, ScaleRequest};
//!
//! let kind = ResourceKind::resolve("STS").unwrap();
//! assert_eq!(kind, ResourceKind::StatefulSet);
//!
//! let namespaces = NamespaceSet::parse("staging,production");
//! let request = ScaleRequest::new(kind, "web", namespaces.first(), 3);
//! assert_eq!(request.namespace, "staging");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod kind;
pub mod outcome;
pub mod request;

pub use error::{CoreError, Result};
pub use kind::ResourceKind;
pub use outcome::{FailurePolicy, Report, RunSummary, ScaleOutcome, ScaleResult};
pub use request::{parse_resource_names, NamespaceSet, ScaleRequest, DEFAULT_NAMESPACE};
