//! Inter-atom spacing chosen from the types of neighbouring atoms and the current style.

use log::{debug, warn};

use super::environment::StyleEnvironment;
use super::math_box::MathBox;
use crate::error::ResourceError;
use crate::resources::{self, ResourceProvider};
use crate::types::AtomType;

/// A named glue triple, in mu.
#[derive(Debug, Clone, PartialEq)]
pub struct GlueRule {
    pub name: String,
    pub space: f32,
    pub stretch: f32,
    pub shrink: f32,
}

impl GlueRule {
    fn zero(name: &str) -> GlueRule {
        GlueRule {
            name: name.to_string(),
            space: 0.0,
            stretch: 0.0,
            shrink: 0.0,
        }
    }
}

/// A glue triple in em of the text size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlueAmount {
    pub space: f32,
    pub stretch: f32,
    pub shrink: f32,
}

const TYPE_CLASSES: usize = 8;
const STYLE_CLASSES: usize = 4;

#[derive(Debug, Clone)]
pub struct GlueEngine {
    /// Slot 0 always holds the `default` glue.
    catalog: Vec<GlueRule>,
    table: [[[usize; STYLE_CLASSES]; TYPE_CLASSES]; TYPE_CLASSES],
}

impl GlueEngine {
    pub fn load(provider: &dyn ResourceProvider) -> Result<GlueEngine, ResourceError> {
        let resource = resources::GLUE;
        let doc = provider.parse(resource)?;

        let mut catalog = Vec::new();
        for glue in doc.required_child(resource, "GlueTypes")?.children_named("GlueType") {
            catalog.push(GlueRule {
                name: glue.required_attr(resource, "name")?.to_string(),
                space: glue.parse_attr(resource, "space")?.unwrap_or(0.0),
                stretch: glue.parse_attr(resource, "stretch")?.unwrap_or(0.0),
                shrink: glue.parse_attr(resource, "shrink")?.unwrap_or(0.0),
            });
        }
        let mut engine = GlueEngine::with_catalog(catalog);

        for entry in doc.required_child(resource, "GlueTable")?.children_named("Glue") {
            let left = glue_class(resource, entry.required_attr(resource, "lefttype")?)?;
            let right = glue_class(resource, entry.required_attr(resource, "righttype")?)?;
            let name = entry.required_attr(resource, "gluetype")?;
            let index = engine.index_of(name).ok_or_else(|| ResourceError::UnknownName {
                resource: resource.to_string(),
                kind: "glue type",
                name: name.to_string(),
            })?;
            for style in entry.children_named("Style") {
                let style_name = style.required_attr(resource, "name")?;
                let style_class = style_class(style_name).ok_or_else(|| ResourceError::UnknownName {
                    resource: resource.to_string(),
                    kind: "style",
                    name: style_name.to_string(),
                })?;
                engine.table[left][right][style_class] = index;
            }
        }

        debug!("loaded {} glue types", engine.catalog.len());
        Ok(engine)
    }

    /// Creates an engine with an all-default rule table. The `default` glue is moved to slot 0
    /// and synthesised with zero size if missing.
    pub fn with_catalog(mut catalog: Vec<GlueRule>) -> GlueEngine {
        match catalog.iter().position(|g| g.name == "default") {
            Some(0) => {}
            Some(index) => {
                let default = catalog.remove(index);
                catalog.insert(0, default);
            }
            None => {
                warn!("glue catalog has no \"default\" entry, using zero glue");
                catalog.insert(0, GlueRule::zero("default"));
            }
        }
        GlueEngine {
            catalog,
            table: [[[0; STYLE_CLASSES]; TYPE_CLASSES]; TYPE_CLASSES],
        }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.catalog.iter().position(|g| g.name == name)
    }

    pub fn named(&self, name: &str) -> Option<&GlueRule> {
        self.index_of(name).map(|index| &self.catalog[index])
    }

    pub fn catalog(&self) -> &[GlueRule] {
        &self.catalog
    }

    /// The glue rule between two atom types in the environment's style.
    pub fn rule(&self, left: AtomType, right: AtomType, env: &StyleEnvironment) -> &GlueRule {
        let index = self.table[left.glue_class()][right.glue_class()][env.style().class()];
        &self.catalog[index]
    }

    /// The glue between two atom types, converted from mu to em.
    pub fn glue_amount(&self, left: AtomType, right: AtomType, env: &StyleEnvironment) -> GlueAmount {
        let rule = self.rule(left, right, env);
        let mu = env.fonts().mu(env.style());
        GlueAmount {
            space: rule.space * mu,
            stretch: rule.stretch * mu,
            shrink: rule.shrink * mu,
        }
    }

    pub fn glue_box(&self, left: AtomType, right: AtomType, env: &StyleEnvironment) -> MathBox {
        MathBox::glue(self.glue_amount(left, right, env))
    }
}

fn glue_class(resource: &str, name: &str) -> Result<usize, ResourceError> {
    match AtomType::from_name(name) {
        Some(atom_type) if atom_type.code() < TYPE_CLASSES as i32 => Ok(atom_type.glue_class()),
        _ => Err(ResourceError::UnknownName {
            resource: resource.to_string(),
            kind: "atom type",
            name: name.to_string(),
        }),
    }
}

fn style_class(name: &str) -> Option<usize> {
    match name {
        "display" => Some(0),
        "text" => Some(1),
        "script" => Some(2),
        "script_script" | "scriptscript" => Some(3),
        _ => None,
    }
}
