mod util;

use std::thread;

use texmath_render::typesetting::stretchy::stretch_delimiter;
use texmath_render::{
    AtomType, Color, MathBox, SizedGlyph, Surface, TeXFormula, TeXStyle, TypesetContext, Unit,
};
use util::context;

#[test]
fn style_algebra() {
    let ctx = context();
    for &style in TeXStyle::ALL.iter() {
        let fonts = ctx.fonts();
        assert_eq!(fonts.size_factor(style.cramped()), fonts.size_factor(style));
        assert_eq!(style.cramped().cramped(), style.cramped());
        assert_eq!(style.root(), TeXStyle::ScriptScript);
    }
    assert_eq!(TeXStyle::Display.numerator(), TeXStyle::Text);
    assert_eq!(TeXStyle::Display.denominator(), TeXStyle::TextCramped);
    assert_eq!(TeXStyle::Text.superscript(), TeXStyle::Script);
    assert_eq!(TeXStyle::Text.subscript(), TeXStyle::ScriptCramped);
}

#[test]
fn glue_is_total() {
    let ctx = context();
    for &style in TeXStyle::ALL.iter() {
        let env = ctx.environment(style, 10.0);
        for &left in AtomType::GLUE_CLASSES.iter().chain(Some(&AtomType::Accent)) {
            for &right in AtomType::GLUE_CLASSES.iter() {
                let glue = ctx.glue().glue_amount(left, right, &env);
                assert!(glue.space >= 0.0 && glue.space.is_finite());
            }
        }
    }
    let env = ctx.environment(TeXStyle::Text, 10.0);
    let thick = ctx.glue().glue_amount(AtomType::Ordinary, AtomType::Relation, &env);
    assert!(thick.space > 0.0);
    let script = ctx.environment(TeXStyle::Script, 10.0);
    let none = ctx.glue().glue_amount(AtomType::Ordinary, AtomType::Relation, &script);
    assert_eq!(none.space, 0.0);
}

#[test]
fn delimiters_grow_monotonically() {
    let ctx = context();
    let env = ctx.environment(TeXStyle::Display, 10.0);
    for name in &["lbrack", "rsqbrack", "lbrace", "vert", "sqrt", "langle"] {
        let mut previous = 0.0;
        for step in 0..40 {
            let requested = step as f32 * 0.2;
            let total = stretch_delimiter(name, &env, requested).unwrap().total_height();
            assert!(total >= previous, "{} shrank at {}", name, requested);
            previous = total;
        }
    }
    assert!(stretch_delimiter("nosuch", &env, 1.0).is_err());
}

fn layout(ctx: &TypesetContext, markup: &str, style: TeXStyle) -> MathBox {
    TeXFormula::parse(ctx, markup)
        .unwrap_or_else(|e| panic!("{}: {}", markup, e))
        .create_box(ctx, style, 20.0)
        .unwrap_or_else(|e| panic!("{}: {}", markup, e))
}

#[test]
fn every_construct_lays_out() {
    let ctx = context();
    let samples = [
        "a+b=c",
        r"\frac{a+b}{c}",
        r"\sqrt[3]{x^2+y^2}",
        r"\sum_{i=1}^n i^2",
        r"\int_0^1 f(x)\,dx",
        r"\hat a + \vec{v} + \bar x",
        r"\overline{AB} \underline{cd}",
        r"\lim_{n\to\infty} \sin x",
        r"x_1' \ldots x_n''",
        r"\mathrm{d}x \quad \phantom{x} y",
        r"a \doteq b \iff c \neq d",
        r"\emptyparens",
    ];
    for markup in &samples {
        for &style in &[TeXStyle::Display, TeXStyle::Text, TeXStyle::ScriptScript] {
            let math_box = layout(&ctx, markup, style);
            assert!(math_box.width > 0.0, "{} has no width", markup);
            assert!(math_box.height >= 0.0 && math_box.depth >= 0.0);
        }
    }
}

#[test]
fn display_style_is_larger() {
    let ctx = context();
    let display = layout(&ctx, r"\sum_{i=1}^n \frac{1}{i}", TeXStyle::Display);
    let text = layout(&ctx, r"\sum_{i=1}^n \frac{1}{i}", TeXStyle::Text);
    assert!(display.total_height() > text.total_height());
    let script = layout(&ctx, "x", TeXStyle::Script);
    let plain = layout(&ctx, "x", TeXStyle::Text);
    assert!(script.width < plain.width);
}

#[test]
fn fences_cover_their_content() {
    let ctx = context();
    let mut formula = TeXFormula::parse(&ctx, r"\frac{\frac{a}{b}}{\frac{c}{d}}").unwrap();
    let inner = formula.create_box(&ctx, TeXStyle::Display, 20.0).unwrap();
    formula.embrace(&ctx, '(', ')').unwrap();
    let fenced = formula.create_box(&ctx, TeXStyle::Display, 20.0).unwrap();
    assert!(fenced.width > inner.width);
    assert!(fenced.total_height() >= inner.total_height() * 0.9);
}

#[test]
fn very_tall_radicands_and_fences_finish() {
    let ctx = context();
    for &height in &[1.0e3, 1.0e5, 1.0e8] {
        let mut root = TeXFormula::new();
        root.add_strut(Unit::Em, 0.0, height, 0.0).sqrt();
        let math_box = root.create_box(&ctx, TeXStyle::Display, 10.0).unwrap();
        assert!(math_box.total_height().is_finite());

        let mut fenced = TeXFormula::new();
        fenced.add_strut(Unit::Em, 0.0, height, 0.0);
        fenced.embrace(&ctx, '(', ')').unwrap();
        let math_box = fenced.create_box(&ctx, TeXStyle::Text, 10.0).unwrap();
        assert!(math_box.total_height().is_finite());
    }
}

#[derive(Default)]
struct Counter {
    glyphs: usize,
    rules: usize,
    colors: Vec<Option<Color>>,
}

impl Surface for Counter {
    fn draw_glyph(&mut self, _: &SizedGlyph, _: f32, _: f32) {
        self.glyphs += 1;
    }
    fn fill_rect(&mut self, _: f32, _: f32, _: f32, _: f32) {
        self.rules += 1;
    }
    fn set_color(&mut self, color: Option<Color>) {
        self.colors.push(color);
    }
}

#[test]
fn painting_visits_every_glyph() {
    let ctx = context();
    let mut formula = TeXFormula::parse(&ctx, r"\frac{ab}{c}").unwrap();
    formula.set_color(Color::rgb(0, 0, 255));
    let math_box = formula.create_box(&ctx, TeXStyle::Text, 20.0).unwrap();
    let mut counter = Counter::default();
    math_box.paint(&mut counter, 0.0, 0.0);
    assert_eq!(counter.glyphs, 3);
    assert_eq!(counter.rules, 1);
    assert_eq!(counter.colors.first(), Some(&Some(Color::rgb(0, 0, 255))));
}

#[test]
fn context_is_shared_between_threads() {
    let ctx = context();
    let markups = [r"\frac{1}{2}", r"\sqrt{x}", "a_i^2", r"\sum_k k"];
    let widths: Vec<f32> = thread::scope(|scope| {
        let handles: Vec<_> = markups
            .iter()
            .map(|markup| {
                let ctx = &ctx;
                scope.spawn(move || layout(ctx, markup, TeXStyle::Display).width)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for (markup, width) in markups.iter().zip(widths) {
        assert_eq!(width, layout(&ctx, markup, TeXStyle::Display).width);
    }
}
