//! Vertical placement of subscripts and superscripts (TeXbook, appendix G, rule 18).

use super::environment::StyleEnvironment;
use super::font_registry::MathConstant;
use super::math_box::MathBox;

/// Baseline drops taken from the nucleus. Single characters start from zero.
fn initial_shifts(nucleus: &MathBox, nucleus_is_char: bool, env: &StyleEnvironment) -> (f32, f32) {
    if nucleus_is_char {
        return (0.0, 0.0);
    }
    let fonts = env.fonts();
    let sup_drop = fonts.math_constant(MathConstant::SupDrop, env.style().superscript());
    let sub_drop = fonts.math_constant(MathConstant::SubDrop, env.style().subscript());
    (nucleus.height - sup_drop, nucleus.depth + sub_drop)
}

pub fn get_superscript_shift_up(
    superscript: &MathBox,
    nucleus: &MathBox,
    nucleus_is_char: bool,
    env: &StyleEnvironment,
) -> f32 {
    let fonts = env.fonts();
    let style = env.style();
    let (shift_from_drop, _) = initial_shifts(nucleus, nucleus_is_char, env);
    let std_shift_up = fonts.math_constant(
        if style.is_cramped() {
            MathConstant::Sup3
        } else if style.is_display() {
            MathConstant::Sup1
        } else {
            MathConstant::Sup2
        },
        style,
    );
    let min_shift_up = superscript.depth + env.x_height().abs() / 4.0;

    shift_from_drop.max(std_shift_up).max(min_shift_up)
}

pub fn get_subscript_shift_dn(
    subscript: &MathBox,
    nucleus: &MathBox,
    nucleus_is_char: bool,
    env: &StyleEnvironment,
) -> f32 {
    let (_, shift_from_drop) = initial_shifts(nucleus, nucleus_is_char, env);
    let std_shift_dn = env.fonts().math_constant(MathConstant::Sub1, env.style());
    let min_shift_dn = subscript.height - env.x_height().abs() * 4.0 / 5.0;

    shift_from_drop.max(std_shift_dn).max(min_shift_dn)
}

/// Returns `(sub_shift, super_shift)` for a nucleus with both scripts, keeping a gap of at
/// least four rule thicknesses between them.
pub fn get_subsup_shifts(
    subscript: &MathBox,
    superscript: &MathBox,
    nucleus: &MathBox,
    nucleus_is_char: bool,
    env: &StyleEnvironment,
) -> (f32, f32) {
    let fonts = env.fonts();
    let mut super_shift = get_superscript_shift_up(superscript, nucleus, nucleus_is_char, env);
    let (_, shift_from_drop) = initial_shifts(nucleus, nucleus_is_char, env);
    let mut sub_shift = shift_from_drop.max(fonts.math_constant(MathConstant::Sub2, env.style()));

    let gap_min = 4.0 * fonts.default_rule_thickness(env.style());
    let gap = (super_shift - superscript.depth) - (subscript.height - sub_shift);
    if gap < gap_min {
        sub_shift = gap_min - super_shift + superscript.depth + subscript.height;
        let psi = env.x_height().abs() * 4.0 / 5.0 - (super_shift - superscript.depth);
        if psi > 0.0 {
            super_shift += psi;
            sub_shift -= psi;
        }
    }

    (sub_shift, super_shift)
}

#[cfg(all(test, feature = "embedded_resources"))]
mod tests {
    use super::*;
    use crate::resources::EmbeddedProvider;
    use crate::typesetting::font_registry::FontRegistry;
    use crate::typesetting::glue::GlueEngine;
    use crate::types::TeXStyle;

    #[test]
    fn scripts_keep_their_minimum_gap() {
        let fonts = FontRegistry::load(&EmbeddedProvider).unwrap();
        let glue = GlueEngine::load(&EmbeddedProvider).unwrap();
        let env = StyleEnvironment::new(TeXStyle::Text, &fonts, &glue, 10.0);
        let nucleus = MathBox::empty(0.5, 0.7, 0.2);
        // tall scripts force the shifts apart
        let sub = MathBox::empty(0.3, 0.8, 0.1);
        let sup = MathBox::empty(0.3, 0.5, 0.6);

        let (sub_shift, super_shift) = get_subsup_shifts(&sub, &sup, &nucleus, false, &env);
        let gap = (super_shift - sup.depth) - (sub.height - sub_shift);
        assert!(gap >= 4.0 * fonts.default_rule_thickness(TeXStyle::Text) - 1e-5);
        assert!(super_shift >= get_superscript_shift_up(&sup, &nucleus, false, &env));
    }

    #[test]
    fn cramped_styles_raise_superscripts_less() {
        let fonts = FontRegistry::load(&EmbeddedProvider).unwrap();
        let glue = GlueEngine::load(&EmbeddedProvider).unwrap();
        let sup = MathBox::empty(0.3, 0.4, 0.0);
        let nucleus = MathBox::empty(0.5, 0.4, 0.0);
        let shift = |style| {
            let env = StyleEnvironment::new(style, &fonts, &glue, 10.0);
            get_superscript_shift_up(&sup, &nucleus, true, &env)
        };
        assert!(shift(TeXStyle::Display) > shift(TeXStyle::Text));
        assert!(shift(TeXStyle::Text) > shift(TeXStyle::TextCramped));
    }
}
