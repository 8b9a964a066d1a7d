mod util;

use pretty_assertions::assert_eq;

use texmath_render::{Atom, AtomType, Error, ErrorType, TeXFormula};
use util::context;

fn root(formula: &TeXFormula) -> Atom {
    formula.to_atom()
}

#[test]
fn sum_parses_to_three_atoms() {
    let ctx = context();
    let formula = TeXFormula::parse(&ctx, "a+b").unwrap();
    assert_eq!(
        root(&formula),
        Atom::Row(vec![
            Atom::char('a', None),
            ctx.symbol("plus").unwrap(),
            Atom::char('b', None),
        ])
    );
}

#[test]
fn fraction_has_single_char_operands() {
    let ctx = context();
    let formula = TeXFormula::parse(&ctx, r"\frac{a}{b}").unwrap();
    assert_eq!(
        root(&formula),
        Atom::Fraction {
            numerator: Box::new(Atom::char('a', None)),
            denominator: Box::new(Atom::char('b', None)),
            rule: true,
        }
    );
}

#[test]
fn script_order_does_not_matter() {
    let ctx = context();
    let expected = Atom::Scripts {
        base: Box::new(Atom::char('a', None)),
        sub: Some(Box::new(Atom::char('3', None))),
        sup: Some(Box::new(Atom::char('2', None))),
    };
    assert_eq!(root(&TeXFormula::parse(&ctx, "a^2_3").unwrap()), expected);
    assert_eq!(root(&TeXFormula::parse(&ctx, "a_3^2").unwrap()), expected);
}

#[test]
fn prime_is_a_superscript() {
    let ctx = context();
    assert_eq!(
        TeXFormula::parse(&ctx, "a'").unwrap(),
        TeXFormula::parse(&ctx, r"a^{\prime}").unwrap()
    );
}

#[test]
fn unknown_command_is_reported() {
    let ctx = context();
    match TeXFormula::parse(&ctx, r"\notacommand") {
        Err(Error::Parsing(error)) => {
            assert_eq!(error.error_type, ErrorType::UnknownCommand("notacommand".to_string()));
            assert!(error.to_string().contains("notacommand"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn scripts_attach_to_whole_groups() {
    let ctx = context();
    let formula = TeXFormula::parse(&ctx, "{a+b}^2").unwrap();
    assert_eq!(
        root(&formula),
        Atom::Scripts {
            base: Box::new(Atom::Row(vec![
                Atom::char('a', None),
                ctx.symbol("plus").unwrap(),
                Atom::char('b', None),
            ])),
            sub: None,
            sup: Some(Box::new(Atom::char('2', None))),
        }
    );
}

#[test]
fn embedding_copies_the_donor() {
    let ctx = context();
    let first = TeXFormula::parse(&ctx, r"x^2").unwrap();
    let before = first.clone();

    let mut second = TeXFormula::parse(&ctx, "y=").unwrap();
    second.add_formula(&first);
    second
        .add_markup(&ctx, r"\alpha")
        .unwrap()
        .set_type(AtomType::Relation)
        .sqrt();

    assert_eq!(first, before);
    assert!(second.to_atom() != first.to_atom());
}

#[test]
fn predefined_formulas_expand_in_markup() {
    let ctx = context();
    let formula = TeXFormula::parse(&ctx, r"\lim_{n\to\infty} \sin^2 x").unwrap();
    match root(&formula) {
        Atom::Row(atoms) => {
            assert_eq!(atoms.len(), 3);
            assert_eq!(atoms[0].left_type(), AtomType::BigOperator);
            assert_eq!(atoms[1].left_type(), AtomType::BigOperator);
        }
        other => panic!("unexpected {:?}", other),
    }
    for name in &["ldots", "cdots", "neq", "notin", "doteq", "iff", "bmod", "quad", "liminf"] {
        assert!(ctx.formula(name).is_ok(), "missing {}", name);
    }
    assert_eq!(ctx.formula("neq").unwrap().to_atom().left_type(), AtomType::Relation);
}

#[test]
fn malformed_markup_fails_cleanly() {
    let ctx = context();
    let cases: &[(&str, ErrorType)] = &[
        ("{a", ErrorType::UnbalancedGroup('{')),
        ("a}", ErrorType::StrayCloseGroup),
        (r"a\", ErrorType::DanglingEscape),
        ("a^1^2", ErrorType::DoubleScript('^')),
        ("_1", ErrorType::LonelyScript('_')),
        (r"\frac{}{2}", ErrorType::EmptyOperand("frac".to_string())),
        ("a & b", ErrorType::UnknownCharacter('&')),
    ];
    for (markup, expected) in cases {
        match TeXFormula::parse(&ctx, markup) {
            Err(Error::Parsing(error)) => assert_eq!(&error.error_type, expected, "{}", markup),
            other => panic!("{}: unexpected {:?}", markup, other),
        }
    }
}
