//! Predefined formulas such as `\sin` or `\ldots`.
//!
//! `formulas.xml` describes each formula as a short recipe: create named temporaries, invoke
//! builder operations on them, return one. Recipes are compiled against a fixed operation table
//! when the context loads, so an unknown operation or a wrong argument fails at startup.

use std::collections::HashMap;

use log::debug;

use crate::atom::{PhantomDims, SpaceKind};
use crate::context::TypesetContext;
use crate::error::{Error, InvalidArgument, ResourceError};
use crate::formula::TeXFormula;
use crate::resources::{self, Element, ResourceProvider};
use crate::types::{AtomType, Color, Unit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgKind {
    Str,
    Float,
    Int,
    Bool,
    Char,
    Formula,
}

#[derive(Debug, Clone, PartialEq)]
enum Arg {
    Str(String),
    Float(f32),
    Int(i32),
    Bool(bool),
    Char(char),
    /// Name of a temporary created earlier in the recipe.
    Formula(String),
}

impl Arg {
    fn kind(&self) -> ArgKind {
        match *self {
            Arg::Str(_) => ArgKind::Str,
            Arg::Float(_) => ArgKind::Float,
            Arg::Int(_) => ArgKind::Int,
            Arg::Bool(_) => ArgKind::Bool,
            Arg::Char(_) => ArgKind::Char,
            Arg::Formula(_) => ArgKind::Formula,
        }
    }

    /// Whether the argument can be passed where `kind` is expected. Integers widen to floats.
    fn fits(&self, kind: ArgKind) -> bool {
        self.kind() == kind || (kind == ArgKind::Float && self.kind() == ArgKind::Int)
    }
}

/// Named integer constants usable as `constant` arguments.
const CONSTANTS: &[(&str, i32)] = &[
    ("TYPE_ORDINARY", 0),
    ("TYPE_BIG_OPERATOR", 1),
    ("TYPE_BINARY_OPERATOR", 2),
    ("TYPE_RELATION", 3),
    ("TYPE_OPENING", 4),
    ("TYPE_CLOSING", 5),
    ("TYPE_PUNCTUATION", 6),
    ("TYPE_INNER", 7),
    ("TYPE_ACCENT", 10),
    ("UNIT_EM", 0),
    ("UNIT_EX", 1),
    ("UNIT_PIXEL", 2),
    ("UNIT_POINT", 3),
    ("UNIT_PICA", 4),
    ("UNIT_MU", 5),
    ("THINMUSKIP", 1),
    ("MEDMUSKIP", 2),
    ("THICKMUSKIP", 3),
    ("NEGTHINMUSKIP", -1),
];

/// Arguments of one invocation, with temporaries already resolved.
struct Args<'r> {
    values: &'r [Arg],
    temporaries: &'r HashMap<String, TeXFormula>,
}

impl<'r> Args<'r> {
    fn mismatch(&self, index: usize) -> Error {
        InvalidArgument::new("recipe argument", format!("{:?}", self.values.get(index))).into()
    }

    fn str(&self, index: usize) -> Result<&'r str, Error> {
        match self.values.get(index) {
            Some(Arg::Str(s)) => Ok(s.as_str()),
            _ => Err(self.mismatch(index)),
        }
    }

    fn float(&self, index: usize) -> Result<f32, Error> {
        match self.values.get(index) {
            Some(&Arg::Float(f)) => Ok(f),
            Some(&Arg::Int(i)) => Ok(i as f32),
            _ => Err(self.mismatch(index)),
        }
    }

    fn int(&self, index: usize) -> Result<i32, Error> {
        match self.values.get(index) {
            Some(&Arg::Int(i)) => Ok(i),
            _ => Err(self.mismatch(index)),
        }
    }

    fn bool(&self, index: usize) -> Result<bool, Error> {
        match self.values.get(index) {
            Some(&Arg::Bool(b)) => Ok(b),
            _ => Err(self.mismatch(index)),
        }
    }

    fn char(&self, index: usize) -> Result<char, Error> {
        match self.values.get(index) {
            Some(&Arg::Char(c)) => Ok(c),
            _ => Err(self.mismatch(index)),
        }
    }

    fn formula(&self, index: usize) -> Result<&'r TeXFormula, Error> {
        match self.values.get(index) {
            Some(Arg::Formula(name)) => self.temporaries.get(name).ok_or_else(|| self.mismatch(index)),
            _ => Err(self.mismatch(index)),
        }
    }
}

type Apply = fn(&mut TeXFormula, &Args, &TypesetContext) -> Result<(), Error>;

struct Operation {
    name: &'static str,
    params: &'static [ArgKind],
    apply: Apply,
}

use self::ArgKind::*;

static OPERATIONS: &[Operation] = &[
    Operation {
        name: "add",
        params: &[Formula],
        apply: |f, a, _| {
            f.add_formula(a.formula(0)?);
            Ok(())
        },
    },
    Operation {
        name: "add_markup",
        params: &[Str],
        apply: |f, a, ctx| {
            f.add_markup(ctx, a.str(0)?)?;
            Ok(())
        },
    },
    Operation {
        name: "add_space",
        params: &[Int],
        apply: |f, a, _| {
            f.add_space(SpaceKind::from_code(a.int(0)?)?);
            Ok(())
        },
    },
    Operation {
        name: "add_strut",
        params: &[Int, Float, Float, Float],
        apply: |f, a, _| {
            f.add_strut(Unit::from_code(a.int(0)?)?, a.float(1)?, a.float(2)?, a.float(3)?);
            Ok(())
        },
    },
    Operation {
        name: "set_type",
        params: &[Int],
        apply: |f, a, _| {
            f.set_type(AtomType::from_code(a.int(0)?)?);
            Ok(())
        },
    },
    Operation {
        name: "set_types",
        params: &[Int, Int],
        apply: |f, a, _| {
            f.set_types(AtomType::from_code(a.int(0)?)?, AtomType::from_code(a.int(1)?)?);
            Ok(())
        },
    },
    Operation {
        name: "set_limits",
        params: &[Bool],
        apply: |f, a, _| {
            f.set_limits(a.bool(0)?);
            Ok(())
        },
    },
    Operation {
        name: "embrace",
        params: &[Char, Char],
        apply: |f, a, ctx| {
            f.embrace(ctx, a.char(0)?, a.char(1)?)?;
            Ok(())
        },
    },
    Operation {
        name: "fence",
        params: &[Str, Str],
        apply: |f, a, ctx| {
            f.fence(ctx, Some(a.str(0)?), Some(a.str(1)?))?;
            Ok(())
        },
    },
    Operation {
        name: "fraction",
        params: &[Formula, Bool],
        apply: |f, a, _| {
            f.fraction(a.formula(0)?, a.bool(1)?);
            Ok(())
        },
    },
    Operation {
        name: "sqrt",
        params: &[],
        apply: |f, _, _| {
            f.sqrt();
            Ok(())
        },
    },
    Operation {
        name: "nth_root",
        params: &[Formula],
        apply: |f, a, _| {
            f.nth_root(a.formula(0)?);
            Ok(())
        },
    },
    Operation {
        name: "put_over",
        params: &[Formula, Int, Float, Bool],
        apply: |f, a, _| {
            f.put_over(a.formula(0)?, Unit::from_code(a.int(1)?)?, a.float(2)?, a.bool(3)?);
            Ok(())
        },
    },
    Operation {
        name: "put_under",
        params: &[Formula, Int, Float, Bool],
        apply: |f, a, _| {
            f.put_under(a.formula(0)?, Unit::from_code(a.int(1)?)?, a.float(2)?, a.bool(3)?);
            Ok(())
        },
    },
    Operation {
        name: "accent",
        params: &[Str],
        apply: |f, a, ctx| {
            f.accent(ctx, a.str(0)?)?;
            Ok(())
        },
    },
    Operation {
        name: "overline",
        params: &[],
        apply: |f, _, _| {
            f.overline();
            Ok(())
        },
    },
    Operation {
        name: "underline",
        params: &[],
        apply: |f, _, _| {
            f.underline();
            Ok(())
        },
    },
    Operation {
        name: "phantom",
        params: &[],
        apply: |f, _, _| {
            f.phantom(PhantomDims::all());
            Ok(())
        },
    },
    Operation {
        name: "vcenter",
        params: &[],
        apply: |f, _, _| {
            f.vcenter();
            Ok(())
        },
    },
    Operation {
        name: "set_color",
        params: &[Str],
        apply: |f, a, _| {
            f.set_color(Color::parse(a.str(0)?)?);
            Ok(())
        },
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Constructor {
    Empty,
    Markup,
    StyledMarkup,
    Copy,
}

impl Constructor {
    fn for_args(args: &[Arg]) -> Option<Constructor> {
        let kinds: Vec<ArgKind> = args.iter().map(Arg::kind).collect();
        match kinds.as_slice() {
            [] => Some(Constructor::Empty),
            [Str] => Some(Constructor::Markup),
            [Str, Str] => Some(Constructor::StyledMarkup),
            [Formula] => Some(Constructor::Copy),
            _ => None,
        }
    }
}

enum Step {
    Create {
        target: String,
        constructor: Constructor,
        args: Vec<Arg>,
    },
    Invoke {
        target: String,
        operation: &'static Operation,
        args: Vec<Arg>,
    },
    Return(String),
}

/// A compiled recipe for one predefined formula.
struct Recipe {
    name: String,
    steps: Vec<Step>,
}

fn invalid(formula: &str, reason: String) -> ResourceError {
    ResourceError::InvalidRecipe {
        formula: formula.to_string(),
        reason,
    }
}

fn parse_arg(resource: &str, formula: &str, element: &Element) -> Result<Arg, ResourceError> {
    let kind = element.required_attr(resource, "type")?;
    let value = element.required_attr(resource, "value")?;
    let bad_value = || invalid(formula, format!("bad {} argument \"{}\"", kind, value));
    let arg = match kind {
        "string" => Arg::Str(value.to_string()),
        "float" => Arg::Float(value.trim().parse().map_err(|_| bad_value())?),
        "int" => Arg::Int(value.trim().parse().map_err(|_| bad_value())?),
        "bool" => Arg::Bool(value.trim().parse().map_err(|_| bad_value())?),
        "char" => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Arg::Char(c),
                _ => return Err(bad_value()),
            }
        }
        "constant" => CONSTANTS
            .iter()
            .find(|&&(name, _)| name == value)
            .map(|&(_, v)| Arg::Int(v))
            .ok_or_else(|| invalid(formula, format!("unknown constant {}", value)))?,
        "formula" => Arg::Formula(value.to_string()),
        other => return Err(invalid(formula, format!("unknown argument type {}", other))),
    };
    Ok(arg)
}

fn parse_args(resource: &str, formula: &str, element: &Element) -> Result<Vec<Arg>, ResourceError> {
    element
        .children_named("Argument")
        .map(|arg| parse_arg(resource, formula, arg))
        .collect()
}

/// Checks that every temporary named by `args` is already defined and is not `target`.
fn check_temporaries(formula: &str, target: &str, args: &[Arg], defined: &[String]) -> Result<(), ResourceError> {
    for arg in args {
        if let Arg::Formula(ref name) = *arg {
            if name == target {
                return Err(invalid(formula, format!("{} is passed to itself", name)));
            }
            if !defined.contains(name) {
                return Err(invalid(formula, format!("temporary {} is not defined", name)));
            }
        }
    }
    Ok(())
}

fn compile(resource: &str, element: &Element) -> Result<Recipe, ResourceError> {
    let name = element.required_attr(resource, "name")?.to_string();
    let mut defined: Vec<String> = Vec::new();
    let mut steps = Vec::new();

    for step in &element.children {
        let target_attr = match step.name.as_str() {
            "CreateTeXFormula" | "Return" => "name",
            "MethodInvocation" => "formula",
            other => return Err(invalid(&name, format!("unknown step <{}>", other))),
        };
        let target = step.required_attr(resource, target_attr)?.to_string();
        match step.name.as_str() {
            "CreateTeXFormula" => {
                let args = parse_args(resource, &name, step)?;
                check_temporaries(&name, &target, &args, &defined)?;
                let constructor = Constructor::for_args(&args).ok_or_else(|| {
                    invalid(&name, format!("no constructor takes {:?}", args))
                })?;
                defined.push(target.clone());
                steps.push(Step::Create {
                    target,
                    constructor,
                    args,
                });
            }
            "MethodInvocation" => {
                let method = step.required_attr(resource, "name")?;
                let operation = OPERATIONS
                    .iter()
                    .find(|op| op.name == method)
                    .ok_or_else(|| invalid(&name, format!("unknown operation {}", method)))?;
                let args = parse_args(resource, &name, step)?;
                let arity_ok = args.len() == operation.params.len();
                if !arity_ok || !args.iter().zip(operation.params).all(|(a, &k)| a.fits(k)) {
                    return Err(invalid(
                        &name,
                        format!("{} expects {:?}, got {:?}", method, operation.params, args),
                    ));
                }
                if !defined.contains(&target) {
                    return Err(invalid(&name, format!("temporary {} is not defined", target)));
                }
                check_temporaries(&name, &target, &args, &defined)?;
                steps.push(Step::Invoke {
                    target,
                    operation,
                    args,
                });
            }
            _ => {
                if !defined.contains(&target) {
                    return Err(invalid(&name, format!("temporary {} is not defined", target)));
                }
                steps.push(Step::Return(target));
            }
        }
    }

    match steps.last() {
        Some(Step::Return(_)) => Ok(Recipe { name, steps }),
        _ => Err(invalid(&name, "recipe does not end with <Return>".to_string())),
    }
}

impl Recipe {
    fn evaluate(&self, ctx: &TypesetContext) -> Result<TeXFormula, Error> {
        let mut temporaries: HashMap<String, TeXFormula> = HashMap::new();
        for step in &self.steps {
            match *step {
                Step::Create {
                    ref target,
                    constructor,
                    ref args,
                } => {
                    let values = Args {
                        values: args,
                        temporaries: &temporaries,
                    };
                    let formula = match constructor {
                        Constructor::Empty => TeXFormula::new(),
                        Constructor::Markup => TeXFormula::parse(ctx, values.str(0)?)?,
                        Constructor::StyledMarkup => {
                            TeXFormula::parse_with_style(ctx, values.str(0)?, values.str(1)?)?
                        }
                        Constructor::Copy => values.formula(0)?.clone(),
                    };
                    temporaries.insert(target.clone(), formula);
                }
                Step::Invoke {
                    ref target,
                    operation,
                    ref args,
                } => {
                    let mut formula = temporaries.remove(target).unwrap_or_default();
                    let values = Args {
                        values: args,
                        temporaries: &temporaries,
                    };
                    (operation.apply)(&mut formula, &values, ctx)?;
                    temporaries.insert(target.clone(), formula);
                }
                Step::Return(ref target) => {
                    return Ok(temporaries.remove(target).unwrap_or_default());
                }
            }
        }
        Ok(TeXFormula::new())
    }
}

/// Compiles every recipe, then evaluates them in file order into `ctx`.
pub fn load(provider: &dyn ResourceProvider, ctx: &mut TypesetContext) -> Result<(), ResourceError> {
    let resource = resources::FORMULAS;
    let doc = provider.parse(resource)?;
    let recipes = doc
        .children_named("TeXFormula")
        .map(|element| compile(resource, element))
        .collect::<Result<Vec<_>, _>>()?;

    for recipe in &recipes {
        let formula = recipe.evaluate(ctx).map_err(|source| ResourceError::RecipeFailed {
            formula: recipe.name.clone(),
            source: Box::new(source),
        })?;
        ctx.formulas.insert(recipe.name.clone(), formula);
    }
    debug!("built {} predefined formulas", recipes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::xml_reader::parse_document;

    fn compile_str(xml: &str) -> Result<Recipe, ResourceError> {
        let doc = parse_document("test.xml", xml).unwrap();
        compile("test.xml", &doc)
    }

    fn reason(result: Result<Recipe, ResourceError>) -> String {
        match result {
            Err(ResourceError::InvalidRecipe { reason, .. }) => reason,
            Err(other) => panic!("unexpected error {}", other),
            Ok(_) => panic!("recipe compiled"),
        }
    }

    #[test]
    fn compiles_a_valid_recipe() {
        let recipe = compile_str(
            r#"<TeXFormula name="quad">
                 <CreateTeXFormula name="f"/>
                 <MethodInvocation name="add_strut" formula="f">
                   <Argument type="constant" value="UNIT_EM"/>
                   <Argument type="float" value="1"/>
                   <Argument type="int" value="0"/>
                   <Argument type="float" value="0"/>
                 </MethodInvocation>
                 <Return name="f"/>
               </TeXFormula>"#,
        )
        .unwrap();
        assert_eq!(recipe.name, "quad");
        assert_eq!(recipe.steps.len(), 3);
    }

    #[test]
    fn rejects_bad_recipes_at_compile_time() {
        assert!(reason(compile_str(
            r#"<TeXFormula name="x"><CreateTeXFormula name="f"/>
               <MethodInvocation name="explode" formula="f"/><Return name="f"/></TeXFormula>"#
        ))
        .contains("unknown operation"));
        assert!(reason(compile_str(
            r#"<TeXFormula name="x"><CreateTeXFormula name="f"/>
               <MethodInvocation name="set_limits" formula="f">
                 <Argument type="string" value="yes"/>
               </MethodInvocation><Return name="f"/></TeXFormula>"#
        ))
        .contains("expects"));
        assert!(reason(compile_str(
            r#"<TeXFormula name="x"><MethodInvocation name="sqrt" formula="g"/>
               <Return name="g"/></TeXFormula>"#
        ))
        .contains("not defined"));
        assert!(reason(compile_str(
            r#"<TeXFormula name="x"><CreateTeXFormula name="f">
                 <Argument type="constant" value="TYPE_NONSENSE"/>
               </CreateTeXFormula><Return name="f"/></TeXFormula>"#
        ))
        .contains("unknown constant"));
        assert!(reason(compile_str(
            r#"<TeXFormula name="x"><CreateTeXFormula name="f"/></TeXFormula>"#
        ))
        .contains("<Return>"));
        assert!(reason(compile_str(
            r#"<TeXFormula name="x"><CreateTeXFormula name="f"/>
               <MethodInvocation name="add" formula="f">
                 <Argument type="formula" value="f"/>
               </MethodInvocation><Return name="f"/></TeXFormula>"#
        ))
        .contains("itself"));
    }

    #[test]
    fn constants_cover_every_atom_type() {
        for &(name, value) in CONSTANTS.iter().filter(|c| c.0.starts_with("TYPE_")) {
            assert!(AtomType::from_code(value).is_ok(), "{}", name);
        }
    }
}
