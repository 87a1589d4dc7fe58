//! Custom attribute types for the PowerScale (OneFS) Terraform provider data model.
//!
//! OneFS hands back several names with a casing of its own choosing: an access
//! zone configured as `"System"` is read back as `"system"`. Modelling such an
//! attribute as a plain string makes every plan show a spurious change. This
//! crate provides [`CaseInsensitiveString`], a string value whose semantic
//! equality ignores letter case, together with the small amount of machinery
//! needed to exercise it the way a plan engine does.
//!
//! ## Quick Start
//!
//! ```
//! use powerscale_tftypes::{plan_attribute, CaseInsensitiveString, Diagnostics, SemanticEquals};
//!
//! let configured = CaseInsensitiveString::new("System");
//! let remote = CaseInsensitiveString::new("system");
//!
//! // only the casing differs: no change is planned
//! assert!(configured.semantic_equals(&remote).unwrap());
//!
//! // and the remote's casing is what ends up in state
//! let mut diags = Diagnostics::new();
//! let plan = plan_attribute(&configured, &remote, &mut diags);
//! assert!(!plan.is_change());
//! assert_eq!(plan.planned().as_str(), "system");
//!
//! // a different zone is a change
//! let plan = plan_attribute(&CaseInsensitiveString::new("Zone1"), &CaseInsensitiveString::new("Zone2"), &mut diags);
//! assert!(plan.is_change());
//! assert!(diags.is_empty());
//! ```
//!
//! ## Planning against a provider schema
//!
//! The `tfplan` binary reads the schema exported by
//! `terraform providers schema -json`, marks the requested attributes as
//! `CaseInsensitiveType` and plans a resource configuration against its state:
//!
//! ```bash
//! cargo run --bin tfplan -- \
//!     --schema powerscale-schema.json \
//!     --resource powerscale_smb_share \
//!     --case-insensitive zone \
//!     --config share.json --state share-state.json
//! ```
//!
//! Set `RUST_LOG=powerscale_tftypes=debug` to follow each attribute decision.

pub mod config;

pub mod diag;

pub mod error;

// provider schema registry
pub mod schema;

// configuration diffing
pub mod plan;

pub mod types;

/// Utility functions to help testing against the schema fixtures.
#[cfg(test)]
#[doc(hidden)]
pub mod test_utils;

pub use config::PlanConfig;
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use error::{Error, Result};
pub use plan::{plan_attribute, plan_attribute_dyn, plan_resource, AttributePlan, ResourcePlan};
pub use schema::{BlockKind, SchemaRegistry};
pub use types::{AttrType, AttrValue, CaseInsensitiveString, SemanticEquals, StringValue, Value};
