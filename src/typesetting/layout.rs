//! Lowering of atoms into boxes, following the rules of the TeXbook, appendix G.

use super::environment::StyleEnvironment;
use super::font::SizedGlyph;
use super::font_registry::MathConstant;
use super::math_box::MathBox;
use super::multiscripts::*;
use super::stretchy::stretch_delimiter;
use crate::atom::{Atom, Attachment, LinePosition, PhantomDims, SpaceKind};
use crate::error::LookupError;
use crate::types::{AtomType, Color};

pub type Result<T> = std::result::Result<T, LookupError>;

pub trait MathBoxLayout {
    fn layout(&self, env: &StyleEnvironment) -> Result<MathBox>;
}

impl Atom {
    /// Sizes the atom and everything below it in the given environment.
    pub fn create_box(&self, env: &StyleEnvironment) -> Result<MathBox> {
        self.layout(env)
    }
}

impl MathBoxLayout for Atom {
    fn layout(&self, env: &StyleEnvironment) -> Result<MathBox> {
        match *self {
            Atom::Char { c, ref text_style } => {
                let glyph = char_glyph(c, text_style.as_ref().map(String::as_str), env)?;
                let italic = glyph.metrics.italic;
                let mut math_box = MathBox::glyph(glyph);
                math_box.width += italic;
                Ok(math_box)
            }
            Atom::Symbol {
                ref name,
                atom_type,
                ..
            } => {
                if atom_type == AtomType::BigOperator {
                    let glyph = big_operator_glyph(name, env)?;
                    let axis = env.fonts().axis_height(env.style());
                    Ok(MathBox::glyph(glyph).centered_on_axis(axis))
                } else {
                    let glyph = env.fonts().resolve_symbol(name, env.style())?;
                    env.set_last_font_id(glyph.font_id());
                    Ok(MathBox::glyph(glyph))
                }
            }
            Atom::Row(ref atoms) => layout_row(atoms, env),
            Atom::Scripts {
                ref base,
                ref sub,
                ref sup,
            } => {
                let nucleus = base.layout(env)?;
                let delta = char_italic(base, env)?;
                layout_sub_superscript(
                    nucleus,
                    delta,
                    is_char_like(base),
                    sub.as_ref().map(|s| &**s),
                    sup.as_ref().map(|s| &**s),
                    env,
                )
            }
            Atom::BigOperator {
                ref base,
                ref under,
                ref over,
                limits,
            } => layout_big_operator(
                base,
                under.as_ref().map(|s| &**s),
                over.as_ref().map(|s| &**s),
                limits,
                env,
            ),
            Atom::Fraction {
                ref numerator,
                ref denominator,
                rule,
            } => layout_fraction(numerator, denominator, rule, env),
            Atom::NthRoot {
                ref base,
                ref index,
            } => layout_root(base, index.as_ref().map(|i| &**i), env),
            Atom::Accented {
                ref base,
                ref accent,
            } => layout_accent(base, accent, env),
            Atom::Fenced {
                ref base,
                ref left,
                ref right,
            } => layout_fenced(base, left.as_ref(), right.as_ref(), env),
            Atom::UnderOver {
                ref base,
                ref over,
                ref under,
            } => layout_under_over(base, over.as_ref(), under.as_ref(), env),
            Atom::Line {
                ref base,
                position,
            } => layout_line(base, position, env),
            Atom::Typed { ref base, .. } => base.layout(env),
            Atom::Space(kind) => Ok(MathBox::kern(space_width(kind, env))),
            Atom::Strut {
                unit,
                width,
                height,
                depth,
            } => {
                let factor = env.unit_factor(unit);
                Ok(MathBox::empty(width * factor, height * factor, depth * factor))
            }
            Atom::Phantom { ref base, keep } => {
                let content = base.layout(env)?;
                let dim = |flag, value: f32| if keep.contains(flag) { value } else { 0.0 };
                Ok(MathBox::empty(
                    dim(PhantomDims::WIDTH, content.width),
                    dim(PhantomDims::HEIGHT, content.height),
                    dim(PhantomDims::DEPTH, content.depth),
                ))
            }
            Atom::Color {
                ref base,
                foreground,
                background,
            } => layout_color(base, foreground, background, env),
            Atom::VCentered(ref base) => {
                let axis = env.fonts().axis_height(env.style());
                Ok(base.layout(env)?.centered_on_axis(axis))
            }
        }
    }
}

fn char_glyph(c: char, text_style: Option<&str>, env: &StyleEnvironment) -> Result<SizedGlyph> {
    let fonts = env.fonts();
    let glyph = match text_style {
        Some(text_style) => fonts.resolve_text_char(c, text_style, env.style())?,
        None => fonts.resolve_default_char(c, env.style())?,
    };
    env.set_last_font_id(glyph.font_id());
    Ok(glyph)
}

/// Big operators use their next larger variant in display style.
fn big_operator_glyph(name: &str, env: &StyleEnvironment) -> Result<SizedGlyph> {
    let fonts = env.fonts();
    let glyph = fonts.resolve_symbol(name, env.style())?;
    if env.style().is_display() {
        if let Some(larger) = fonts.next_larger(&glyph, env.style()) {
            return Ok(larger);
        }
    }
    Ok(glyph)
}

fn is_char_like(atom: &Atom) -> bool {
    match *atom {
        Atom::Char { .. } => true,
        Atom::Symbol { atom_type, .. } => atom_type != AtomType::BigOperator,
        _ => false,
    }
}

/// Italic correction of a single character nucleus.
fn char_italic(atom: &Atom, env: &StyleEnvironment) -> Result<f32> {
    match *atom {
        Atom::Char { c, ref text_style } => {
            Ok(char_glyph(c, text_style.as_ref().map(String::as_str), env)?
                .metrics
                .italic)
        }
        Atom::Symbol {
            ref name,
            atom_type: AtomType::BigOperator,
            ..
        } => Ok(big_operator_glyph(name, env)?.metrics.italic),
        _ => Ok(0.0),
    }
}

fn next_type(atoms: &[Atom], index: usize) -> Option<AtomType> {
    atoms[index + 1..]
        .iter()
        .find(|a| !a.is_space())
        .map(Atom::left_type)
}

/// A binary operator becomes ordinary where it cannot have two operands.
fn bin_becomes_ordinary(previous: Option<AtomType>, next: Option<AtomType>) -> bool {
    use crate::types::AtomType::*;
    let bad_left = match previous {
        None => true,
        Some(t) => [BigOperator, BinaryOperator, Relation, Opening, Punctuation].contains(&t),
    };
    let bad_right = match next {
        None => true,
        Some(t) => [Relation, Closing, Punctuation].contains(&t),
    };
    bad_left || bad_right
}

fn layout_row(atoms: &[Atom], env: &StyleEnvironment) -> Result<MathBox> {
    let fonts = env.fonts();
    let style = env.style();
    let mut children = Vec::with_capacity(atoms.len());
    let mut previous: Option<AtomType> = None;

    let mut index = 0;
    while index < atoms.len() {
        let atom = &atoms[index];
        if atom.is_space() {
            children.push(atom.layout(env)?);
            index += 1;
            continue;
        }

        let (mut left, mut right) = (atom.left_type(), atom.right_type());
        if left == AtomType::BinaryOperator && bin_becomes_ordinary(previous, next_type(atoms, index)) {
            left = AtomType::Ordinary;
            if right == AtomType::BinaryOperator {
                right = AtomType::Ordinary;
            }
        }
        if let Some(previous) = previous {
            let glue = env.glue().glue_amount(previous, left, env);
            if glue.space != 0.0 {
                children.push(MathBox::glue(glue));
            }
        }

        if let Atom::Char { c, ref text_style } = *atom {
            let mut glyph = char_glyph(c, text_style.as_ref().map(String::as_str), env)?;
            // merge ligatures, then kern against the following character
            let mut kern = None;
            while let Some(&Atom::Char {
                c: next_c,
                text_style: ref next_style,
            }) = atoms.get(index + 1)
            {
                let next = char_glyph(next_c, next_style.as_ref().map(String::as_str), env)?;
                match fonts.ligature(glyph.glyph, next.glyph) {
                    Some(ligature) => {
                        glyph = fonts.resolve_char(ligature, style);
                        index += 1;
                    }
                    None => {
                        kern = Some(fonts.kern(&glyph, &next, style));
                        break;
                    }
                }
            }
            env.set_last_font_id(glyph.font_id());
            let italic = glyph.metrics.italic;
            let mut math_box = MathBox::glyph(glyph);
            match kern {
                Some(kern) => {
                    children.push(math_box);
                    if kern != 0.0 {
                        children.push(MathBox::kern(kern));
                    }
                }
                None => {
                    math_box.width += italic;
                    children.push(math_box);
                }
            }
        } else {
            children.push(atom.layout(env)?);
        }

        previous = Some(right);
        index += 1;
    }
    Ok(MathBox::hbox(children))
}

fn layout_sub_superscript(
    nucleus: MathBox,
    delta: f32,
    nucleus_is_char: bool,
    subscript: Option<&Atom>,
    superscript: Option<&Atom>,
    env: &StyleEnvironment,
) -> Result<MathBox> {
    let script_space = env.fonts().math_constant(MathConstant::ScriptSpace, env.style());
    let subscript = subscript
        .map(|s| s.layout(&env.subscript()))
        .transpose()?
        .map(|mut s| {
            s.width += script_space;
            s
        });
    let superscript = superscript
        .map(|s| s.layout(&env.superscript()))
        .transpose()?
        .map(|mut s| {
            s.width += script_space;
            s
        });

    let mut children = Vec::with_capacity(3);
    match (subscript, superscript) {
        (None, None) => return Ok(nucleus),
        (None, Some(sup)) => {
            let shift = get_superscript_shift_up(&sup, &nucleus, nucleus_is_char, env);
            children.push(nucleus);
            children.push(sup.with_shift(-shift));
        }
        (Some(sub), None) => {
            let shift = get_subscript_shift_dn(&sub, &nucleus, nucleus_is_char, env);
            children.push(nucleus);
            if delta != 0.0 {
                children.push(MathBox::kern(-delta));
            }
            children.push(sub.with_shift(shift));
        }
        (Some(sub), Some(sup)) => {
            let (sub_shift, super_shift) = get_subsup_shifts(&sub, &sup, &nucleus, nucleus_is_char, env);
            let gap = (super_shift - sup.depth) - (sub.height - sub_shift);
            children.push(nucleus);
            if delta != 0.0 {
                children.push(MathBox::kern(-delta));
            }
            let scripts = MathBox::vbox(vec![
                sup.with_shift(delta),
                MathBox::vertical_kern(gap),
                sub,
            ]);
            children.push(scripts.with_shift(sub_shift));
        }
    }
    Ok(MathBox::hbox(children))
}

fn layout_big_operator(
    base: &Atom,
    under: Option<&Atom>,
    over: Option<&Atom>,
    limits: Option<bool>,
    env: &StyleEnvironment,
) -> Result<MathBox> {
    let fonts = env.fonts();
    let style = env.style();
    let nucleus = base.layout(env)?;
    let delta = char_italic(base, env)?;
    if !limits.unwrap_or_else(|| style.is_display()) {
        return layout_sub_superscript(nucleus, delta, false, under, over, env);
    }

    let over = over.map(|o| o.layout(&env.superscript())).transpose()?;
    let under = under.map(|u| u.layout(&env.subscript())).transpose()?;
    let width = [
        nucleus.width,
        over.as_ref().map_or(0.0, |o| o.width),
        under.as_ref().map_or(0.0, |u| u.width),
    ]
    .iter()
    .cloned()
    .fold(0.0, f32::max);
    let constant = |c| fonts.math_constant(c, style);

    let mut children = Vec::with_capacity(7);
    if let Some(over) = over {
        let kern = constant(MathConstant::BigOpSpacing1)
            .max(constant(MathConstant::BigOpSpacing3) - over.depth);
        children.push(MathBox::vertical_kern(constant(MathConstant::BigOpSpacing5)));
        children.push(over.centered(width).with_shift(delta / 2.0));
        children.push(MathBox::vertical_kern(kern));
    }
    let baseline = children.len();
    children.push(nucleus.centered(width));
    if let Some(under) = under {
        let kern = constant(MathConstant::BigOpSpacing2)
            .max(constant(MathConstant::BigOpSpacing4) - under.height);
        children.push(MathBox::vertical_kern(kern));
        children.push(under.centered(width).with_shift(-delta / 2.0));
        children.push(MathBox::vertical_kern(constant(MathConstant::BigOpSpacing5)));
    }
    Ok(MathBox::stack(children, baseline))
}

fn layout_fraction(
    numerator: &Atom,
    denominator: &Atom,
    rule: bool,
    env: &StyleEnvironment,
) -> Result<MathBox> {
    let fonts = env.fonts();
    let style = env.style();
    let constant = |c| fonts.math_constant(c, style);
    let rule_thickness = fonts.default_rule_thickness(style);

    let num = numerator.layout(&env.numerator())?;
    let den = denominator.layout(&env.denominator())?;
    let width = num.width.max(den.width);

    let (shift_up, mut shift_down) = if style.is_display() {
        (constant(MathConstant::Num1), constant(MathConstant::Denom1))
    } else if rule {
        (constant(MathConstant::Num2), constant(MathConstant::Denom2))
    } else {
        (constant(MathConstant::Num3), constant(MathConstant::Denom2))
    };
    let (num_depth, den_height) = (num.depth, den.height);

    let mut children = Vec::with_capacity(5);
    children.push(num.centered(width));
    if rule {
        let axis = fonts.axis_height(style);
        let clearance = if style.is_display() {
            3.0 * rule_thickness
        } else {
            rule_thickness
        };
        let kern_above = ((shift_up - num_depth) - (axis + rule_thickness / 2.0)).max(clearance);
        let kern_below_raw = (axis - rule_thickness / 2.0) - (den_height - shift_down);
        if kern_below_raw < clearance {
            shift_down += clearance - kern_below_raw;
        }
        children.push(MathBox::vertical_kern(kern_above));
        children.push(MathBox::rule(width, rule_thickness));
        children.push(MathBox::vertical_kern(kern_below_raw.max(clearance)));
    } else {
        let clearance = if style.is_display() {
            7.0 * rule_thickness
        } else {
            3.0 * rule_thickness
        };
        let mut shift_up = shift_up;
        let gap = (shift_up - num_depth) - (den_height - shift_down);
        if gap < clearance {
            shift_up += (clearance - gap) / 2.0;
            shift_down += (clearance - gap) / 2.0;
        }
        children.push(MathBox::vertical_kern((shift_up - num_depth) - (den_height - shift_down)));
    }
    children.push(den.centered(width));

    let fraction = MathBox::vbox(children).lowered(shift_down);
    let null_delimiter = constant(MathConstant::NullDelimiterSpace);
    Ok(MathBox::hbox(vec![
        MathBox::kern(null_delimiter),
        fraction,
        MathBox::kern(null_delimiter),
    ]))
}

fn layout_root(base: &Atom, index: Option<&Atom>, env: &StyleEnvironment) -> Result<MathBox> {
    let fonts = env.fonts();
    let style = env.style();
    let rule_thickness = fonts.default_rule_thickness(style);
    let phi = if style.is_display() {
        fonts.x_height(fonts.settings().mu_font, style).abs()
    } else {
        rule_thickness
    };
    let mut clearance = rule_thickness + phi / 4.0;

    let body = base.layout(&env.cramp())?;
    let sign = stretch_delimiter("sqrt", env, body.total_height() + clearance + rule_thickness)?;
    let excess = sign.total_height() - rule_thickness - (body.total_height() + clearance);
    if excess > 0.0 {
        clearance += excess / 2.0;
    }

    let top = rule_thickness + clearance + body.height;
    let sign_shift = sign.height - top;
    let sign_bottom = sign.depth + sign_shift;
    let sign_height = sign.total_height();
    let radicand = MathBox::vbox(vec![
        MathBox::rule(body.width, rule_thickness),
        MathBox::vertical_kern(clearance),
        body,
    ]);

    let mut children = Vec::with_capacity(5);
    if let Some(index) = index {
        let mu = fonts.mu(style);
        let index_box = index.layout(&env.root())?;
        let raise = 0.6 * sign_height;
        let index_shift = sign_bottom - raise - index_box.depth;
        children.push(MathBox::kern(5.0 * mu));
        children.push(index_box.with_shift(index_shift));
        children.push(MathBox::kern(-10.0 * mu));
    }
    children.push(sign.lowered(sign_shift));
    children.push(radicand);
    Ok(MathBox::hbox(children))
}

fn layout_accent(base: &Atom, accent: &str, env: &StyleEnvironment) -> Result<MathBox> {
    let fonts = env.fonts();
    let style = env.style();
    let body = base.layout(&env.cramp())?;
    let skew = match *base {
        Atom::Char { c, ref text_style } => {
            let glyph = char_glyph(c, text_style.as_ref().map(String::as_str), env)?;
            fonts.skew(&glyph, style)
        }
        _ => 0.0,
    };

    // widest variant that still fits over the base
    let mut glyph = fonts.resolve_symbol(accent, style)?;
    while let Some(larger) = fonts.next_larger(&glyph, style) {
        if larger.metrics.width > body.width {
            break;
        }
        glyph = larger;
    }
    let delta = body.height.min(fonts.x_height(glyph.font_id(), style));
    let accent_box = MathBox::glyph(glyph);
    let shift = skew + (body.width - accent_box.width) / 2.0;

    Ok(MathBox::vbox(vec![
        accent_box.with_shift(shift),
        MathBox::vertical_kern(-delta),
        body,
    ]))
}

fn layout_fenced(
    base: &Atom,
    left: Option<&String>,
    right: Option<&String>,
    env: &StyleEnvironment,
) -> Result<MathBox> {
    let fonts = env.fonts();
    let style = env.style();
    let body = base.layout(env)?;

    let axis = fonts.axis_height(style);
    let delta = (body.height - axis).max(body.depth + axis);
    let factor = fonts.math_constant(MathConstant::DelimiterFactor, style);
    let shortfall = fonts.math_constant(MathConstant::DelimiterShortfall, style);
    let min_height = (2.0 * delta * factor / 1000.0).max(2.0 * delta - shortfall);

    let delimiter = |name: Option<&String>| -> Result<MathBox> {
        match name {
            Some(name) => Ok(stretch_delimiter(name, env, min_height)?.centered_on_axis(axis)),
            None => Ok(MathBox::kern(
                fonts.math_constant(MathConstant::NullDelimiterSpace, style),
            )),
        }
    };
    Ok(MathBox::hbox(vec![delimiter(left)?, body, delimiter(right)?]))
}

fn layout_attachment(
    attachment: &Attachment,
    env: &StyleEnvironment,
    below: bool,
) -> Result<(MathBox, f32)> {
    let math_box = if !attachment.script_size {
        attachment.atom.layout(env)?
    } else if below {
        attachment.atom.layout(&env.subscript())?
    } else {
        attachment.atom.layout(&env.superscript())?
    };
    Ok((math_box, attachment.space * env.unit_factor(attachment.unit)))
}

fn layout_under_over(
    base: &Atom,
    over: Option<&Attachment>,
    under: Option<&Attachment>,
    env: &StyleEnvironment,
) -> Result<MathBox> {
    let body = base.layout(env)?;
    let over = over.map(|o| layout_attachment(o, env, false)).transpose()?;
    let under = under.map(|u| layout_attachment(u, env, true)).transpose()?;
    let width = [
        body.width,
        over.as_ref().map_or(0.0, |o| o.0.width),
        under.as_ref().map_or(0.0, |u| u.0.width),
    ]
    .iter()
    .cloned()
    .fold(0.0, f32::max);

    let mut children = Vec::with_capacity(5);
    if let Some((over, space)) = over {
        children.push(over.centered(width));
        children.push(MathBox::vertical_kern(space));
    }
    let baseline = children.len();
    children.push(body.centered(width));
    if let Some((under, space)) = under {
        children.push(MathBox::vertical_kern(space));
        children.push(under.centered(width));
    }
    Ok(MathBox::stack(children, baseline))
}

fn layout_line(base: &Atom, position: LinePosition, env: &StyleEnvironment) -> Result<MathBox> {
    let thickness = env.fonts().default_rule_thickness(env.style());
    match position {
        LinePosition::Over => {
            let body = base.layout(&env.cramp())?;
            let width = body.width;
            Ok(MathBox::vbox(vec![
                MathBox::vertical_kern(thickness),
                MathBox::rule(width, thickness),
                MathBox::vertical_kern(3.0 * thickness),
                body,
            ]))
        }
        LinePosition::Under => {
            let body = base.layout(env)?;
            let width = body.width;
            Ok(MathBox::stack(
                vec![
                    body,
                    MathBox::vertical_kern(3.0 * thickness),
                    MathBox::rule(width, thickness),
                    MathBox::vertical_kern(thickness),
                ],
                0,
            ))
        }
    }
}

fn space_width(kind: SpaceKind, env: &StyleEnvironment) -> f32 {
    let fonts = env.fonts();
    let (name, fallback, sign) = match kind {
        SpaceKind::Interword => return fonts.space(env.style()),
        SpaceKind::Thin => ("thin", 3.0, 1.0),
        SpaceKind::NegativeThin => ("thin", 3.0, -1.0),
        SpaceKind::Medium => ("med", 4.0, 1.0),
        SpaceKind::Thick => ("thick", 5.0, 1.0),
    };
    let space = env.glue().named(name).map_or(fallback, |glue| glue.space);
    sign * space * fonts.mu(env.style())
}

fn layout_color(
    base: &Atom,
    foreground: Option<Color>,
    background: Option<Color>,
    env: &StyleEnvironment,
) -> Result<MathBox> {
    let mut inner_env = env.clone();
    if foreground.is_some() {
        inner_env.set_foreground(foreground);
    }
    if background.is_some() {
        inner_env.set_background(background);
    }
    let mut math_box = MathBox::hbox(vec![base.layout(&inner_env)?]);
    math_box.foreground = foreground;
    math_box.background = background;
    Ok(math_box)
}
