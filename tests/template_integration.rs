//! Dice formulas and templates through the public API

use grimoire::content::Record;
use grimoire::dice::{Bindings, DiceRoll, Symbol, Term};
use grimoire::md::TemplateNode;
use grimoire::reference::{ref_to, CollectionName, Registry};
use grimoire::{parse_dice, parse_template, ParseError};
use pretty_assertions::assert_eq;

fn registry() -> Registry {
    let mut builder = Registry::builder();
    builder
        .register(
            CollectionName::Items,
            vec![Record::new("arrow").with_name("Arrow")],
        )
        .register(
            CollectionName::DamageTypes,
            vec![
                Record::new("fire").with_name("Fire"),
                Record::new("radiant").with_name("Radiant"),
            ],
        );
    builder.freeze()
}

#[test]
fn test_spell_formulas_parse() {
    for source in ["1d6", "3d8", "1d4 + 1", "1d4 + MOD", "4d8 + MOD", "1d4 × 10"] {
        let expr = parse_dice(source).expect("Should parse");
        assert_eq!(expr.to_string(), source);
    }
}

#[test]
fn test_malformed_formulas_fail_whole() {
    for source in ["2dd6", "1d", "d", "1d6 +", "1d6 ++ 2", "3d8 + STR"] {
        assert!(parse_dice(source).is_err(), "{:?} should not parse", source);
    }
}

#[test]
fn test_summed_pools_stay_separate() {
    let expr = parse_dice("4d6 + 4d6").expect("Should parse");
    let pools: Vec<DiceRoll> = expr.dice_pools().copied().collect();
    assert_eq!(pools, vec![DiceRoll::new(4, 6), DiceRoll::new(4, 6)]);
    assert_eq!(expr.to_string(), "4d6 + 4d6");
}

#[test]
fn test_modifier_bound_at_evaluation() {
    let expr = parse_dice("4d8 + MOD").expect("Should parse");
    assert_eq!(expr.symbols().collect::<Vec<_>>(), vec![Symbol::Modifier]);
    assert!(expr.bounds(&Bindings::new()).is_err());
    assert_eq!(
        expr.bounds(&Bindings::new().with_modifier(3)),
        Ok((7, 35))
    );
}

#[test]
fn test_multiplied_pool() {
    let expr = parse_dice("1d4 × 10").expect("Should parse");
    assert_eq!(expr.bounds(&Bindings::new()), Ok((10, 40)));
    match &expr.terms[0].term {
        Term::Dice(roll) => assert_eq!(roll.multiplier, Some(10)),
        other => panic!("expected dice, got {:?}", other),
    }
}

#[test]
fn test_dice_error_inside_template_points_at_formula() {
    let text = "Roll %{dice 2dd6} now";
    let err = parse_template(text).unwrap_err();
    assert!(matches!(err, ParseError::Syntax { .. }));
    let span = err.span();
    assert!(span.start >= 12 && span.end <= 16, "span {:?}", span);

    let report = err.format(text, "fireball.desc");
    assert!(report.contains("fireball.desc"));
}

#[test]
fn test_unterminated_directive_is_fatal() {
    assert!(parse_template("Takes %{dice 1d6} damage.").is_ok());
    let err = parse_template("Takes %{dice 1d6 damage.").unwrap_err();
    assert!(matches!(err, ParseError::UnterminatedDirective { .. }));
    assert_eq!(err.span().start, 6);
}

#[test]
fn test_display_override() {
    let resolved = parse_template("%{ref items arrow|arrows}")
        .expect("Should parse")
        .resolve(&registry());

    let (directive, target) = resolved.links().next().expect("one reference");
    assert_eq!(directive.reference, ref_to(CollectionName::Items, "arrow"));
    assert_eq!(directive.display.as_deref(), Some("arrows"));
    assert_eq!(target.map(|e| e.display_name()), Some("Arrow"));
    assert_eq!(resolved.render(), "arrows");
}

#[test]
fn test_two_damage_types_render_in_order() {
    let resolved = parse_template(
        "Deals %{dice 4d6} %{ref damageTypes fire} and %{dice 4d6} %{ref damageTypes radiant} damage.",
    )
    .expect("Should parse")
    .resolve(&registry());

    assert!(resolved.is_fully_resolved());
    insta::assert_snapshot!(resolved.render(), @"Deals 4d6 Fire and 4d6 Radiant damage.");
    assert_eq!(resolved.dice().count(), 2);
}

#[test]
fn test_template_nodes_in_source_order() {
    let template = parse_template("A %{ref items arrow} B").expect("Should parse");
    let spans: Vec<_> = template.nodes().iter().map(|n| n.span.clone()).collect();
    assert_eq!(spans, vec![0..2, 2..20, 20..22]);
    assert!(matches!(template.nodes()[1].node, TemplateNode::Ref(_)));
}
