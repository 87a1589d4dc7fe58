use crate::schema::BlockKind;
use std::collections::BTreeSet;

/// Attribute of one block, e.g. `(Resource, "powerscale_smb_share", "zone")`.
pub type AttributeRef = (BlockKind, /* type name */ String, /* attribute */ String);

/// Plan options layered on top of the provider schema.
#[derive(Clone, Debug, Default)]
pub struct PlanConfig {
    pub(crate) case_insensitive: BTreeSet<AttributeRef>,
    pub(crate) unknown: BTreeSet<String>,
}

impl PlanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `attribute` of the `kind` block `name` as `CaseInsensitiveType`.
    pub fn with_case_insensitive<N: Into<String>, A: Into<String>>(
        mut self,
        kind: BlockKind,
        name: N,
        attribute: A,
    ) -> Self {
        self.case_insensitive
            .insert((kind, name.into(), attribute.into()));
        self
    }

    /// Treat `attribute` of the configuration as not known until apply.
    pub fn with_unknown<A: Into<String>>(mut self, attribute: A) -> Self {
        self.unknown.insert(attribute.into());
        self
    }

    pub fn case_insensitive(&self) -> impl Iterator<Item = &AttributeRef> {
        self.case_insensitive.iter()
    }

    pub fn is_unknown(&self, attribute: &str) -> bool {
        self.unknown.contains(attribute)
    }
}
