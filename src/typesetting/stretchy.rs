//! Growing delimiters to a requested size, either by picking a larger pre-built variant or by
//! stacking the pieces of an extensible glyph.

use bitflags::bitflags;
use log::trace;

use super::environment::StyleEnvironment;
use super::font::{Extension, GlyphRef, SizedGlyph};
use super::math_box::MathBox;
use crate::error::LookupError;

bitflags! {
    /// The optional pieces an extensible glyph is made of.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Parts: u8 {
        const TOP = 0b001;
        const MIDDLE = 0b010;
        const BOTTOM = 0b100;
    }
}

/// Returns the named delimiter with a height plus depth of at least `min_height` if the font
/// allows it, or the largest available variant otherwise.
pub fn stretch_delimiter(
    name: &str,
    env: &StyleEnvironment,
    min_height: f32,
) -> Result<MathBox, LookupError> {
    let glyph = env.fonts().resolve_symbol(name, env.style())?;
    Ok(stretch_glyph(glyph, env, min_height))
}

pub fn stretch_glyph(glyph: SizedGlyph, env: &StyleEnvironment, min_height: f32) -> MathBox {
    let fonts = env.fonts();
    let style = env.style();

    let mut visited: Vec<GlyphRef> = vec![glyph.glyph];
    let mut largest = glyph.clone();
    let mut current = glyph;
    // an extensible glyph ends the chain, it is assembled below
    while current.total_height() < min_height && !fonts.is_extensible(current.glyph) {
        let larger = match fonts.next_larger(&current, style) {
            Some(larger) if !visited.contains(&larger.glyph) => larger,
            _ => break,
        };
        trace!(
            "delimiter {:?} -> {:?} ({} < {})",
            current.glyph,
            larger.glyph,
            current.total_height(),
            min_height
        );
        visited.push(larger.glyph);
        if larger.total_height() > largest.total_height() {
            largest = larger.clone();
        }
        current = larger;
    }

    if current.total_height() >= min_height {
        return MathBox::glyph(current);
    }
    match fonts.extension(&current, style) {
        Some(extension) => assemble(extension, min_height),
        None => MathBox::glyph(largest),
    }
}

/// Upper bound on the repeated pieces of one assembled delimiter.
const MAX_REPEATS: usize = 1024;

/// Number of `rep` pieces needed to cover `deficit`.
fn repeat_count(deficit: f32, rep_height: f32, limit: usize) -> usize {
    if rep_height <= 0.0 || deficit.is_nan() || deficit <= 0.0 {
        return 0;
    }
    ((deficit / rep_height).ceil() as usize).min(limit)
}

fn assemble(extension: Extension, min_height: f32) -> MathBox {
    let mut parts = Parts::empty();
    parts.set(Parts::TOP, extension.top.is_some());
    parts.set(Parts::MIDDLE, extension.mid.is_some());
    parts.set(Parts::BOTTOM, extension.bot.is_some());

    let mut fixed = 0.0;
    for part in [&extension.top, &extension.mid, &extension.bot].iter() {
        if let Some(glyph) = part {
            fixed += glyph.total_height();
        }
    }
    let rep_height = extension.rep.total_height();
    let deficit = min_height - fixed;
    if parts.is_empty() {
        let count = repeat_count(deficit, rep_height, MAX_REPEATS).max(1);
        let rep = MathBox::glyph(extension.rep);
        return match count {
            1 => rep,
            _ => MathBox::vbox(vec![rep; count]),
        };
    }

    let rep = MathBox::glyph(extension.rep);
    let glyph = |part: Option<SizedGlyph>| part.map(MathBox::glyph);
    let mut pieces = Vec::new();
    if parts.contains(Parts::TOP | Parts::BOTTOM | Parts::MIDDLE) {
        let pairs = repeat_count(deficit / 2.0, rep_height, MAX_REPEATS / 2);
        pieces.extend(glyph(extension.top));
        pieces.extend(vec![rep.clone(); pairs]);
        pieces.extend(glyph(extension.mid));
        pieces.extend(vec![rep; pairs]);
        pieces.extend(glyph(extension.bot));
    } else {
        let count = repeat_count(deficit, rep_height, MAX_REPEATS);
        if parts.contains(Parts::TOP | Parts::BOTTOM) {
            pieces.extend(glyph(extension.top));
            pieces.extend(vec![rep; count]);
            pieces.extend(glyph(extension.bot));
        } else if parts.contains(Parts::BOTTOM) {
            pieces.extend(vec![rep; count]);
            pieces.extend(glyph(extension.mid));
            pieces.extend(glyph(extension.bot));
        } else {
            pieces.extend(glyph(extension.top));
            pieces.extend(glyph(extension.mid));
            pieces.extend(vec![rep; count]);
        }
    }
    trace!(
        "assembled delimiter from {} pieces for height {}",
        pieces.len(),
        min_height
    );
    MathBox::vbox(pieces)
}

#[cfg(all(test, feature = "embedded_resources"))]
mod tests {
    use super::*;
    use crate::resources::EmbeddedProvider;
    use crate::typesetting::font_registry::FontRegistry;
    use crate::typesetting::glue::GlueEngine;
    use crate::typesetting::math_box::MathBoxContent;
    use crate::types::TeXStyle;

    fn heights(name: &str, fonts: &FontRegistry, glue: &GlueEngine) -> Vec<(f32, f32)> {
        let env = StyleEnvironment::new(TeXStyle::Text, fonts, glue, 10.0);
        (0..60)
            .map(|i| i as f32 * 0.125)
            .map(|h| (h, stretch_delimiter(name, &env, h).unwrap().total_height()))
            .collect()
    }

    #[test]
    fn extensible_delimiters_reach_any_height_monotonically() {
        let fonts = FontRegistry::load(&EmbeddedProvider).unwrap();
        let glue = GlueEngine::load(&EmbeddedProvider).unwrap();
        for name in &["lbrack", "rbrace", "lsqbrack", "sqrt", "vert"] {
            let results = heights(name, &fonts, &glue);
            for window in results.windows(2) {
                assert!(window[1].1 >= window[0].1, "{} shrinks at {}", name, window[1].0);
            }
            for &(requested, got) in &results {
                assert!(got >= requested, "{}: {} < {}", name, got, requested);
            }
        }
    }

    #[test]
    fn non_extensible_delimiters_stop_at_the_largest_variant() {
        let fonts = FontRegistry::load(&EmbeddedProvider).unwrap();
        let glue = GlueEngine::load(&EmbeddedProvider).unwrap();
        let results = heights("langle", &fonts, &glue);
        let tallest = results.iter().map(|r| r.1).fold(0.0, f32::max);
        assert!(tallest > 2.9);
        for window in results.windows(2) {
            assert!(window[1].1 >= window[0].1);
        }
        for &(requested, got) in &results {
            assert!(got >= requested.min(tallest));
        }
    }

    #[test]
    fn small_requests_keep_the_base_glyph() {
        let fonts = FontRegistry::load(&EmbeddedProvider).unwrap();
        let glue = GlueEngine::load(&EmbeddedProvider).unwrap();
        let env = StyleEnvironment::new(TeXStyle::Text, &fonts, &glue, 10.0);
        let paren = stretch_delimiter("lbrack", &env, 0.5).unwrap();
        match paren.content {
            MathBoxContent::Glyph(ref glyph) => assert_eq!(glyph.glyph, GlyphRef::new(40, 0)),
            ref other => panic!("expected a glyph, got {:?}", other),
        }
        let brace = stretch_delimiter("lbrace", &env, 6.0).unwrap();
        assert!(matches!(brace.content, MathBoxContent::VBox(_)));
        assert!(stretch_delimiter("nodelim", &env, 1.0).is_err());
    }

    #[test]
    fn huge_requests_stay_bounded() {
        let fonts = FontRegistry::load(&EmbeddedProvider).unwrap();
        let glue = GlueEngine::load(&EmbeddedProvider).unwrap();
        let env = StyleEnvironment::new(TeXStyle::Text, &fonts, &glue, 10.0);
        for &height in &[1.0e5, 1.0e8, f32::INFINITY] {
            for name in &["lbrace", "sqrt", "vert"] {
                let delimiter = stretch_delimiter(name, &env, height).unwrap();
                match delimiter.content {
                    MathBoxContent::VBox(ref pieces) => assert!(pieces.len() <= MAX_REPEATS + 3),
                    ref other => panic!("expected an assembly, got {:?}", other),
                }
                assert!(delimiter.total_height().is_finite());
            }
        }
    }
}
