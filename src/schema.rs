//! Provider schema registry.
//!
//! Reads the document printed by `terraform providers schema -json` and keeps,
//! for every provider, resource and data source block, the scalar attributes
//! the planner knows how to compare. Custom attribute types are not part of
//! that document, so they are layered on afterwards with
//! [`SchemaRegistry::apply`].

use crate::config::PlanConfig;
use crate::error::{Error, Result};
use crate::types::AttrType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TerraformSchemaExport {
    provider_schemas: BTreeMap<String, Schema>,
    format_version: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Schema {
    provider: SchemaItem,
    data_source_schemas: Option<BTreeMap<String, SchemaItem>>,
    resource_schemas: Option<BTreeMap<String, SchemaItem>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SchemaItem {
    version: i64,
    block: Block,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Block {
    attributes: Option<BTreeMap<String, Attribute>>,
    block_types: Option<BTreeMap<String, NestedBlock>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Attribute {
    r#type: AttributeType,
    description: Option<String>,
    required: Option<bool>,
    optional: Option<bool>,
    computed: Option<bool>,
    sensitive: Option<bool>,
    deprecated: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct NestedBlock {
    block: Block,
    nesting_mode: Option<String>,
    min_items: Option<u8>,
    max_items: Option<u16>,
}

/// Either a primitive type name (`"string"`) or a collection (`["set", "string"]`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct AttributeType(Value);

impl AttributeType {
    /// Scalar type of the attribute, `Ok(None)` for collections and objects.
    fn scalar(&self) -> Result<Option<AttrType>> {
        match &self.0 {
            Value::String(t) if t == "string" => Ok(Some(AttrType::String)),
            Value::String(t) if t == "bool" => Ok(Some(AttrType::Bool)),
            Value::String(t) if t == "number" => Ok(Some(AttrType::Number)),
            Value::String(t) if t == "dynamic" => Ok(None),
            Value::String(t) => Err(Error::Schema(format!("Unknown type {}", t))),
            Value::Array(_) => Ok(None),
            unknown => Err(Error::Schema(format!("Type {} not supported", unknown))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlockKind {
    Provider,
    Resource,
    DataSource,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BlockKind::Provider => "provider",
            BlockKind::Resource => "resource",
            BlockKind::DataSource => "data source",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeSpec {
    pub attr_type: AttrType,
    pub required: bool,
    pub computed: bool,
    pub sensitive: bool,
}

impl AttributeSpec {
    pub fn new(attr_type: AttrType) -> Self {
        AttributeSpec {
            attr_type,
            required: false,
            computed: false,
            sensitive: false,
        }
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }
}

/// Attributes of one block, keyed by dotted path (`filter.zone`).
pub type Attributes = BTreeMap<String, AttributeSpec>;

#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    blocks: BTreeMap<(BlockKind, String), Attributes>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn insert<N: Into<String>>(&mut self, kind: BlockKind, name: N, attrs: Attributes) {
        self.blocks.insert((kind, name.into()), attrs);
    }

    pub fn attributes(&self, kind: BlockKind, name: &str) -> Option<&Attributes> {
        self.blocks.get(&(kind, name.to_owned()))
    }

    pub fn get(&self, kind: BlockKind, name: &str, attribute: &str) -> Option<&AttributeSpec> {
        self.attributes(kind, name).and_then(|a| a.get(attribute))
    }

    /// Re-registers the attributes listed in `config` as `CaseInsensitiveType`.
    ///
    /// Only string attributes can be re-registered.
    pub fn apply(&mut self, config: &PlanConfig) -> Result<()> {
        for (kind, name, attribute) in config.case_insensitive() {
            let spec = self
                .blocks
                .get_mut(&(*kind, name.clone()))
                .and_then(|attrs| attrs.get_mut(attribute))
                .ok_or_else(|| {
                    Error::Schema(format!("{} {} has no attribute {}", kind, name, attribute))
                })?;

            match spec.attr_type {
                AttrType::String | AttrType::CaseInsensitiveString => {
                    tracing::debug!(%kind, block = %name, %attribute, "registered as CaseInsensitiveType");
                    spec.attr_type = AttrType::CaseInsensitiveString;
                }
                other => {
                    return Err(Error::Schema(format!(
                        "{}.{} is {}, only string attributes can be {}",
                        name,
                        attribute,
                        other,
                        AttrType::CaseInsensitiveString
                    )))
                }
            }
        }
        Ok(())
    }
}

pub fn export_schema_to_registry(schema: &TerraformSchemaExport) -> Result<SchemaRegistry> {
    let mut r = SchemaRegistry::new();

    for (pn, pv) in &schema.provider_schemas {
        // registry.terraform.io/dell/powerscale -> powerscale
        let pn = pn.split('/').last().unwrap_or(pn);
        r.insert(BlockKind::Provider, pn, export_block(&pv.provider.block)?);

        for (n, i) in pv.resource_schemas.iter().flatten() {
            r.insert(BlockKind::Resource, n.as_str(), export_block(&i.block)?);
        }
        for (n, i) in pv.data_source_schemas.iter().flatten() {
            r.insert(BlockKind::DataSource, n.as_str(), export_block(&i.block)?);
        }
    }
    Ok(r)
}

fn export_block(blk: &Block) -> Result<Attributes> {
    let mut attrs = Attributes::new();
    export_attributes(None, blk, &mut attrs)?;
    Ok(attrs)
}

fn export_attributes(prefix: Option<&str>, blk: &Block, out: &mut Attributes) -> Result<()> {
    let path = |name: &str| prefix.map_or_else(|| name.to_owned(), |p| format!("{}.{}", p, name));

    for (an, at) in blk.attributes.iter().flatten() {
        let attribute = path(an);
        let attr_type = match at.r#type.scalar()? {
            Some(t) => t,
            None => {
                tracing::debug!(%attribute, "skipping non-scalar attribute");
                continue;
            }
        };
        out.insert(
            attribute,
            AttributeSpec {
                attr_type,
                required: at.required.unwrap_or(false),
                computed: at.computed.unwrap_or(false),
                sensitive: at.sensitive.unwrap_or(false),
            },
        );
    }

    // Only single nested blocks map onto one object; list and set blocks are
    // collections and are left out like collection attributes.
    for (bn, nested) in blk.block_types.iter().flatten() {
        let block = path(bn);
        match nested.nesting_mode.as_deref() {
            Some("single") | Some("group") => {
                export_attributes(Some(block.as_str()), &nested.block, out)?
            }
            mode => tracing::debug!(%block, ?mode, "skipping nested block"),
        }
    }
    Ok(())
}

pub fn read_tf_schema_from_file<P: AsRef<Path>>(path: P) -> Result<TerraformSchemaExport> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
