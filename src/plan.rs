//! A minimal configuration-diff engine.
//!
//! Each registered attribute is read from the configuration and from the
//! prior (or refreshed) state, compared with [`SemanticEquals`], and planned
//! as either unchanged or updated. When the two sides are semantically equal
//! the state side is kept, so the remote's casing of a case-insensitive value
//! wins over the configuration's.

use crate::config::PlanConfig;
use crate::diag::{Diagnostic, Diagnostics};
use crate::error::{Error, Result};
use crate::schema::{AttributeSpec, BlockKind, SchemaRegistry};
use crate::types::{
    AttrType, AttrValue, BoolValue, CaseInsensitiveString, NumberValue, SemanticEquals,
    StringValue, Value,
};
use serde_json::{Map, Value as Json};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// JSON object holding attribute values by name.
pub type Document = Map<String, Json>;

#[derive(Clone, Debug, PartialEq)]
pub enum AttributePlan<V> {
    NoChange { value: V },
    Update { from: V, to: V },
}

impl<V> AttributePlan<V> {
    pub fn is_change(&self) -> bool {
        matches!(self, AttributePlan::Update { .. })
    }

    /// The value the attribute will hold after apply.
    pub fn planned(&self) -> &V {
        match self {
            AttributePlan::NoChange { value } => value,
            AttributePlan::Update { to, .. } => to,
        }
    }
}

/// Plans a single attribute.
///
/// A failed comparison is reported to `diags` and planned as a change.
pub fn plan_attribute<V>(config: &V, state: &V, diags: &mut Diagnostics) -> AttributePlan<V>
where
    V: SemanticEquals + Clone,
{
    match config.reconcile(state) {
        Ok(Some(value)) => AttributePlan::NoChange { value },
        Ok(None) => AttributePlan::Update {
            from: state.clone(),
            to: config.clone(),
        },
        Err(err) => {
            diags.push(Diagnostic::from(&err));
            AttributePlan::Update {
                from: state.clone(),
                to: config.clone(),
            }
        }
    }
}

/// Plans a configured value against a state value of any kind.
///
/// State written by an older schema may hold a different value type than the
/// one now configured; such a pair is reported as a
/// "Semantic Equality Check Error" and planned as a change.
pub fn plan_attribute_dyn<V>(
    config: &V,
    state: &dyn AttrValue,
    diags: &mut Diagnostics,
) -> AttributePlan<Value<Json>>
where
    V: SemanticEquals + Clone,
{
    match config.reconcile(state) {
        Ok(Some(value)) => AttributePlan::NoChange {
            value: value.to_json(),
        },
        Ok(None) => AttributePlan::Update {
            from: state.to_json(),
            to: config.to_json(),
        },
        Err(err) => {
            diags.push(Diagnostic::from(&err));
            AttributePlan::Update {
                from: state.to_json(),
                to: config.to_json(),
            }
        }
    }
}

/// Planned changes of one resource or data source instance.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourcePlan {
    pub kind: BlockKind,
    pub type_name: String,
    pub attributes: BTreeMap<String, AttributePlan<Value<Json>>>,
    /// Attributes whose values are masked when the plan is rendered.
    pub sensitive: BTreeSet<String>,
}

impl ResourcePlan {
    pub fn has_changes(&self) -> bool {
        self.attributes.values().any(AttributePlan::is_change)
    }

    pub fn changes(&self) -> impl Iterator<Item = (&String, &AttributePlan<Value<Json>>)> {
        self.attributes.iter().filter(|(_, p)| p.is_change())
    }

    /// Planned values as a JSON object. Dotted attribute paths become nested
    /// objects and values unknown until apply are written as `null`.
    pub fn planned_state(&self) -> Document {
        let mut doc = Document::new();
        for (path, plan) in &self.attributes {
            let value = plan.planned().as_known().cloned().unwrap_or(Json::Null);
            insert_path(&mut doc, path, value);
        }
        doc
    }
}

impl fmt::Display for ResourcePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let changes = self.changes().count();
        if changes == 0 {
            return writeln!(f, "{} {}: no changes", self.kind, self.type_name);
        }
        writeln!(f, "{} {}: {} to change", self.kind, self.type_name, changes)?;
        for (name, plan) in self.changes() {
            match plan {
                AttributePlan::Update { .. } if self.sensitive.contains(name) => {
                    writeln!(f, "  ~ {}: (sensitive)", name)?;
                }
                AttributePlan::Update { from, to } => {
                    writeln!(f, "  ~ {}: {} -> {}", name, from, to)?;
                }
                AttributePlan::NoChange { .. } => (),
            }
        }
        Ok(())
    }
}

/// Plans every registered attribute of `type_name` against the configuration
/// and state documents.
///
/// Attributes whose values cannot be read are reported to `diags` and left
/// out of the plan; the rest are still planned.
pub fn plan_resource(
    registry: &SchemaRegistry,
    kind: BlockKind,
    type_name: &str,
    config: &Document,
    state: &Document,
    plan_config: &PlanConfig,
    diags: &mut Diagnostics,
) -> Result<ResourcePlan> {
    let attrs = registry
        .attributes(kind, type_name)
        .ok_or_else(|| Error::Schema(format!("{} {} is not registered", kind, type_name)))?;

    let mut attributes = BTreeMap::new();
    let mut sensitive = BTreeSet::new();
    for (path, spec) in attrs {
        if spec.sensitive {
            sensitive.insert(path.clone());
        }
        let config_value = lookup(config, path);
        let state_value = lookup(state, path);
        let unknown = plan_config.is_unknown(path);

        let mut attr_diags = Diagnostics::new();
        let planned = match spec.attr_type {
            AttrType::String => {
                plan_json::<StringValue>(spec, config_value, state_value, unknown, &mut attr_diags)
            }
            AttrType::Bool => {
                plan_json::<BoolValue>(spec, config_value, state_value, unknown, &mut attr_diags)
            }
            AttrType::Number => {
                plan_json::<NumberValue>(spec, config_value, state_value, unknown, &mut attr_diags)
            }
            AttrType::CaseInsensitiveString => plan_json::<CaseInsensitiveString>(
                spec,
                config_value,
                state_value,
                unknown,
                &mut attr_diags,
            ),
        };
        for d in &attr_diags {
            diags.push(d.clone().with_attribute(path.as_str()));
        }

        match planned {
            Ok(plan) => {
                tracing::debug!(
                    resource = type_name,
                    attribute = %path,
                    attr_type = %spec.attr_type,
                    change = plan.is_change(),
                    "planned attribute"
                );
                attributes.insert(path.clone(), plan);
            }
            Err(err) => {
                tracing::warn!(resource = type_name, attribute = %path, error = %err, "attribute not planned");
                diags.push(Diagnostic::from(&err).with_attribute(path.as_str()));
            }
        }
    }

    Ok(ResourcePlan {
        kind,
        type_name: type_name.to_owned(),
        attributes,
        sensitive,
    })
}

fn plan_json<V>(
    spec: &AttributeSpec,
    config: Option<&Json>,
    state: Option<&Json>,
    unknown: bool,
    diags: &mut Diagnostics,
) -> Result<AttributePlan<Value<Json>>>
where
    V: SemanticEquals + Clone,
{
    let config = if unknown {
        V::new_unknown()
    } else {
        V::from_json(config)?
    };
    let state = V::from_json(state)?;

    if config.is_null() {
        // A computed attribute left out of the configuration is owned by the
        // remote side.
        if spec.computed {
            return Ok(AttributePlan::NoChange {
                value: state.to_json(),
            });
        }
        if spec.required {
            diags.push(Diagnostic::error(
                "Missing Configuration for Required Attribute",
                "Must set a configuration value for the attribute. The provider \
                 requires it to be set.",
            ));
        }
    }

    Ok(plan_attribute_dyn(&config, &state, diags))
}

fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Json> {
    let mut parts = path.split('.');
    let first = doc.get(parts.next()?)?;
    parts.try_fold(first, |v, part| v.get(part))
}

fn insert_path(doc: &mut Document, path: &str, value: Json) {
    match path.split_once('.') {
        Some((head, rest)) => {
            let entry = doc
                .entry(head)
                .or_insert_with(|| Json::Object(Document::new()));
            if !entry.is_object() {
                *entry = Json::Object(Document::new());
            }
            if let Json::Object(inner) = entry {
                insert_path(inner, rest, value);
            }
        }
        None => {
            doc.insert(path.to_owned(), value);
        }
    }
}

/// Reads a JSON object (a resource configuration or state) from disk.
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<Document> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let doc: Json = serde_json::from_reader(reader)?;
    match doc {
        Json::Object(doc) => Ok(doc),
        other => Err(Error::Document(format!(
            "{} must hold a JSON object, found {}",
            path.as_ref().display(),
            json_kind(&other)
        ))),
    }
}

fn json_kind(v: &Json) -> &'static str {
    match v {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}
