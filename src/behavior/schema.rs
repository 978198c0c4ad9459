//! Statically declared models, their relations, and compiled addressing.
//!
//! Every content type registers a [`ModelDef`] naming its table, the
//! relations it can navigate and how its metadata is addressed. Addressing
//! strings are parsed once in [`Registry::new`]; an unknown relation or a
//! path that does not end on a metadata table is a configuration error at
//! startup rather than at query time.

use crate::behavior::criteria::{CONTENT_ALIAS, Join};
use crate::behavior::error::{MetaError, MetaResult};
use std::collections::HashMap;

/// Addressing value for a metadata table that is its own metadata.
pub const SELF_ADDRESSING: &str = "_self_";

/// How a relation finds its target row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKey {
    /// Target row has the same id as the source row.
    SameId,
    /// Source column holding the target id.
    ForeignKey(String),
}

#[derive(Debug, Clone)]
pub struct RelationDef {
    pub name: String,
    pub target: String,
    pub key: RelationKey,
}

#[derive(Debug, Clone)]
pub struct ModelDef {
    pub name: String,
    pub table: String,
    pub is_metadata: bool,
    pub addressing: Option<String>,
    pub relations: Vec<RelationDef>,
}

impl ModelDef {
    pub fn content(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            is_metadata: false,
            addressing: None,
            relations: Vec::new(),
        }
    }

    /// A metadata table; addressed as `_self_` so it carries the behavior too.
    pub fn metadata(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            is_metadata: true,
            addressing: Some(SELF_ADDRESSING.to_string()),
            ..Self::content(name, table)
        }
    }

    pub fn relation(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        key: RelationKey,
    ) -> Self {
        self.relations.push(RelationDef {
            name: name.into(),
            target: target.into(),
            key,
        });
        self
    }

    pub fn addressed_by(mut self, addressing: impl Into<String>) -> Self {
        self.addressing = Some(addressing.into());
        self
    }

    fn find_relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|rel| rel.name == name)
    }
}

/// One hop of an addressing path, with tables already looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationStep {
    pub relation: String,
    pub source_table: String,
    pub target_model: String,
    pub target_table: String,
    pub key: RelationKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Addressing {
    SelfReferential,
    Relation(RelationStep),
    Path(Vec<RelationStep>),
}

impl Addressing {
    pub fn is_self(&self) -> bool {
        matches!(self, Addressing::SelfReferential)
    }

    pub fn steps(&self) -> &[RelationStep] {
        match self {
            Addressing::SelfReferential => &[],
            Addressing::Relation(step) => std::slice::from_ref(step),
            Addressing::Path(steps) => steps,
        }
    }

    /// Alias under which the metadata columns are visible in a content query.
    pub fn metadata_alias(&self) -> &str {
        self.steps()
            .last()
            .map(|step| step.relation.as_str())
            .unwrap_or(CONTENT_ALIAS)
    }

    /// LEFT joins that bring the metadata table into a content query.
    pub fn joins(&self) -> Vec<Join> {
        let mut previous = CONTENT_ALIAS.to_string();
        let mut joins = Vec::with_capacity(self.steps().len());
        for step in self.steps() {
            let on = match &step.key {
                RelationKey::SameId => format!("{}.id = {}.id", step.relation, previous),
                RelationKey::ForeignKey(column) => {
                    format!("{}.id = {}.{}", step.relation, previous, column)
                }
            };
            joins.push(Join {
                table: step.target_table.clone(),
                alias: step.relation.clone(),
                on,
            });
            previous = step.relation.clone();
        }
        joins
    }
}

#[derive(Debug)]
struct RegisteredModel {
    def: ModelDef,
    addressing: Option<Addressing>,
}

/// Registered models keyed by name.
#[derive(Debug)]
pub struct Registry {
    models: HashMap<String, RegisteredModel>,
}

impl Registry {
    pub fn new(models: impl IntoIterator<Item = ModelDef>) -> MetaResult<Self> {
        let mut defs: HashMap<String, ModelDef> = HashMap::new();
        for def in models {
            validate_def(&def)?;
            if defs.contains_key(&def.name) {
                return Err(MetaError::config(format!(
                    "model `{}` registered twice",
                    def.name
                )));
            }
            defs.insert(def.name.clone(), def);
        }

        for def in defs.values() {
            for rel in &def.relations {
                if !defs.contains_key(&rel.target) {
                    return Err(MetaError::config(format!(
                        "relation `{}.{}` targets unknown model `{}`",
                        def.name, rel.name, rel.target
                    )));
                }
            }
        }

        let mut compiled = HashMap::with_capacity(defs.len());
        for (name, def) in &defs {
            let addressing = match def.addressing.as_deref() {
                Some(spec) => Some(compile(&defs, def, spec)?),
                None => None,
            };
            compiled.insert(
                name.clone(),
                RegisteredModel {
                    def: def.clone(),
                    addressing,
                },
            );
        }

        Ok(Self { models: compiled })
    }

    pub fn model(&self, name: &str) -> MetaResult<&ModelDef> {
        self.models
            .get(name)
            .map(|m| &m.def)
            .ok_or_else(|| MetaError::config(format!("model `{}` is not registered", name)))
    }

    /// Compiled addressing of a model; absent addressing is a setup defect.
    pub fn addressing(&self, name: &str) -> MetaResult<&Addressing> {
        let model = self
            .models
            .get(name)
            .ok_or_else(|| MetaError::config(format!("model `{}` is not registered", name)))?;
        model.addressing.as_ref().ok_or_else(|| {
            MetaError::config(format!("addressing for model `{}` not set", name))
        })
    }

    /// Table holding the metadata rows of `name`.
    pub fn metadata_table(&self, name: &str) -> MetaResult<&str> {
        match self.addressing(name)? {
            Addressing::SelfReferential => Ok(self.model(name)?.table.as_str()),
            addressing => Ok(addressing
                .steps()
                .last()
                .map(|step| step.target_table.as_str())
                .unwrap_or_default()),
        }
    }
}

fn compile(defs: &HashMap<String, ModelDef>, def: &ModelDef, spec: &str) -> MetaResult<Addressing> {
    if spec.is_empty() {
        return Err(MetaError::config(format!(
            "addressing for model `{}` not set",
            def.name
        )));
    }
    if spec == SELF_ADDRESSING {
        if !def.is_metadata {
            return Err(MetaError::config(format!(
                "model `{}` uses `{}` addressing but is not a metadata table",
                def.name, SELF_ADDRESSING
            )));
        }
        return Ok(Addressing::SelfReferential);
    }

    let mut steps = Vec::new();
    let mut current = def;
    for part in spec.split('.') {
        if part.is_empty() {
            return Err(MetaError::config(format!(
                "addressing `{}` of model `{}` has an empty segment",
                spec, def.name
            )));
        }
        let rel = current.find_relation(part).ok_or_else(|| {
            MetaError::config(format!(
                "model `{}` has no relation `{}` (addressing `{}` of `{}`)",
                current.name, part, spec, def.name
            ))
        })?;
        // Targets were checked in Registry::new.
        let target = &defs[&rel.target];
        steps.push(RelationStep {
            relation: rel.name.clone(),
            source_table: current.table.clone(),
            target_model: target.name.clone(),
            target_table: target.table.clone(),
            key: rel.key.clone(),
        });
        current = target;
    }

    if !current.is_metadata {
        return Err(MetaError::config(format!(
            "addressing `{}` of model `{}` ends on `{}`, which is not a metadata table",
            spec, def.name, current.name
        )));
    }

    if steps.len() == 1 {
        let step = steps.remove(0);
        // New metadata shares the record's id; a foreign key would never point at it.
        if let RelationKey::ForeignKey(column) = &step.key {
            return Err(MetaError::config(format!(
                "addressing `{}` of model `{}` must use a same-id relation, `{}` is keyed by `{}`",
                spec, def.name, step.relation, column
            )));
        }
        Ok(Addressing::Relation(step))
    } else {
        Ok(Addressing::Path(steps))
    }
}

fn validate_def(def: &ModelDef) -> MetaResult<()> {
    let mut names = vec![def.table.as_str()];
    for rel in &def.relations {
        names.push(rel.name.as_str());
        if let RelationKey::ForeignKey(column) = &rel.key {
            names.push(column.as_str());
        }
    }
    match names.into_iter().find(|name| !is_identifier(name)) {
        Some(bad) => Err(MetaError::config(format!(
            "`{}` in model `{}` is not a valid SQL identifier",
            bad, def.name
        ))),
        None => Ok(()),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
