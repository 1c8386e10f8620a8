// tests/mechanics.rs
use std::cell::RefCell;

use world_optim::EnvError;
use world_optim::env::{LabelSchema, LabelledState};
use world_optim::mechanics::{Nudge, Table, seeded, shift, signed_unit, uniform01};

/* ──────────────────────────────────────────────────────────────────────────
Table functions
────────────────────────────────────────────────────────────────────────── */

const RAMP: Table = Table::new(0.0, 4.0, &[0.0, 1.0, 1.6, 1.9, 2.0]);

#[test]
fn table_interpolates_between_points() {
    assert_eq!(RAMP.at(1.0), 1.0);
    assert!((RAMP.at(1.5) - 1.3).abs() < 1e-12);
    assert!((RAMP.at(3.25) - 1.925).abs() < 1e-12);
}

#[test]
fn table_is_flat_outside_its_range() {
    assert_eq!(RAMP.at(-3.0), 0.0);
    assert_eq!(RAMP.at(4.0), 2.0);
    assert_eq!(RAMP.at(100.0), 2.0);
    assert_eq!(RAMP.at(f64::INFINITY), 2.0);
}

/* ──────────────────────────────────────────────────────────────────────────
Control nudges and RNG helpers
────────────────────────────────────────────────────────────────────────── */

#[test]
fn nudge_parses_only_unit_values() {
    assert_eq!(Nudge::from_unit(-1), Some(Nudge::Down));
    assert_eq!(Nudge::from_unit(0), Some(Nudge::Hold));
    assert_eq!(Nudge::from_unit(1), Some(Nudge::Up));
    assert_eq!(Nudge::from_unit(2), None);
    assert_eq!(Nudge::from_unit(-2), None);
}

#[test]
fn shift_scales_with_the_current_value() {
    assert!((shift(10.0, Nudge::Up, 0.1, 0.0, 100.0) - 11.0).abs() < 1e-12);
    assert!((shift(100.0, Nudge::Down, 0.1, 0.0, 1000.0) - 90.0).abs() < 1e-12);
    assert_eq!(shift(10.0, Nudge::Hold, 0.1, 0.0, 100.0), 10.0);
    assert_eq!(shift(99.0, Nudge::Up, 0.1, 0.0, 100.0), 100.0);
    // already outside the range: clipped even on hold
    assert_eq!(shift(150.0, Nudge::Hold, 0.1, 0.0, 100.0), 100.0);
}

#[test]
fn rng_helpers_stay_in_range_and_are_seeded() {
    let a = RefCell::new(seeded(42));
    let b = RefCell::new(seeded(42));
    let mut seen = [false; 3];
    for _ in 0..300 {
        let u = uniform01(&a);
        assert!((0.0..1.0).contains(&u));
        assert_eq!(u, uniform01(&b));
        let s = signed_unit(&a);
        assert_eq!(s, signed_unit(&b));
        seen[(s + 1) as usize] = true;
    }
    assert_eq!(seen, [true; 3]);
}

/* ──────────────────────────────────────────────────────────────────────────
Label schema
────────────────────────────────────────────────────────────────────────── */

fn schema() -> LabelSchema {
    LabelSchema::new(vec!["a".into(), "b".into(), "c".into()]).expect("schema")
}

#[test]
fn labelled_state_orders_by_schema() {
    let mut s = LabelledState::new();
    s.insert("c", 3.0);
    s.insert("a", 1.0);
    s.insert("b", 2.0);
    assert_eq!(s.to_vector(&schema()).expect("vector"), vec![1.0, 2.0, 3.0]);
    assert_eq!(schema().value(&[1.0, 2.0, 3.0], "b").expect("b"), 2.0);
}

#[test]
fn labelled_state_reports_missing_and_unexpected_labels() {
    let mut s = LabelledState::new();
    s.insert("a", 1.0);
    s.insert("c", 3.0);
    s.insert("z", 0.0);
    match s.to_vector(&schema()) {
        Err(EnvError::LabelMismatch {
            missing,
            unexpected,
        }) => {
            assert_eq!(missing, ["b"]);
            assert_eq!(unexpected, ["z"]);
        }
        other => panic!("expected a label mismatch, got {other:?}"),
    }
}

#[test]
fn schema_rejects_duplicates_and_unknown_labels() {
    assert!(matches!(
        LabelSchema::new(vec!["a".into(), "a".into()]),
        Err(EnvError::DuplicateLabel { .. })
    ));
    assert!(matches!(schema().id("q"), Err(EnvError::UnknownLabel { .. })));
    assert!(matches!(
        schema().value(&[1.0], "c"),
        Err(EnvError::StateLength { expected: 3, actual: 1 })
    ));
}
