use proptest::prelude::*;
use qcdesk::errors::ValidationError;
use qcdesk::quantity::{IpqcQuantities, OqcQuantities, clamp, parse_raw};

#[derive(Debug, Clone)]
enum IpqcEdit {
    Before(i64),
    After(i64, bool),
    Reallocate(i64, bool),
    AfterPostcured(i64),
    AllPass(bool),
}

#[derive(Debug, Clone)]
enum OqcEdit {
    Before(i64),
    After(i64),
    Hold(i64),
    AllPass,
}

/// Mostly everyday counts, with the occasional extreme value.
fn raw() -> impl Strategy<Value = i64> {
    prop_oneof![
        4 => -500i64..50_000,
        1 => any::<i64>(),
        1 => Just(i64::MAX),
    ]
}

fn ipqc_edit() -> impl Strategy<Value = IpqcEdit> {
    prop_oneof![
        raw().prop_map(IpqcEdit::Before),
        (raw(), any::<bool>()).prop_map(|(v, d)| IpqcEdit::After(v, d)),
        (raw(), any::<bool>()).prop_map(|(v, d)| IpqcEdit::Reallocate(v, d)),
        raw().prop_map(IpqcEdit::AfterPostcured),
        any::<bool>().prop_map(IpqcEdit::AllPass),
    ]
}

fn oqc_edit() -> impl Strategy<Value = OqcEdit> {
    prop_oneof![
        raw().prop_map(OqcEdit::Before),
        raw().prop_map(OqcEdit::After),
        raw().prop_map(OqcEdit::Hold),
        Just(OqcEdit::AllPass),
    ]
}

fn apply_ipqc(q: &mut IpqcQuantities, edit: &IpqcEdit) {
    match *edit {
        IpqcEdit::Before(v) => q.set_before(v),
        IpqcEdit::After(v, d) => q.set_after(v, d),
        IpqcEdit::Reallocate(v, d) => q.reallocate_after(v, d),
        IpqcEdit::AfterPostcured(v) => q.set_after_postcured(v),
        IpqcEdit::AllPass(d) => q.all_pass(d),
    }
}

fn apply_oqc(q: &mut OqcQuantities, edit: &OqcEdit) {
    match *edit {
        OqcEdit::Before(v) => q.set_before(v),
        OqcEdit::After(v) => q.set_after(v),
        OqcEdit::Hold(v) => q.set_hold_return(v),
        OqcEdit::AllPass => q.all_pass(),
    }
}

#[test]
fn test_fresh_ipqc_form_keeps_after_without_before() {
    let mut q = IpqcQuantities::default();
    q.set_after(40, true);
    assert_eq!((q.before, q.after, q.source), (0, 40, 40));

    let mut q = IpqcQuantities::default();
    q.set_before(100);
    q.set_after(40, true);
    assert_eq!((q.before, q.after, q.after_postcured), (60, 40, 0));
}

#[test]
fn test_extreme_input_does_not_panic() {
    let max = parse_raw("9223372036854775807");
    assert_eq!(max, i64::MAX);

    let err = OqcQuantities::validated(10, max, 1).unwrap_err();
    assert!(matches!(err, ValidationError::ExceedsSource { source_qty: 10, .. }));

    let mut ipqc = IpqcQuantities::default();
    ipqc.set_before(max);
    ipqc.set_after(max, false);
    ipqc.set_after_postcured(max);
    ipqc.all_pass(true);
    assert!(ipqc.is_conserved());

    let mut oqc = OqcQuantities::default();
    oqc.set_before(max);
    oqc.set_after(max);
    oqc.set_hold_return(max);
    assert_eq!(oqc.before + oqc.after + oqc.hold_return, oqc.source);
}

#[test]
fn test_parse_raw_garbage_is_zero() {
    assert_eq!(parse_raw("abc"), 0);
    assert_eq!(parse_raw(""), 0);
    assert_eq!(parse_raw("12.9"), 12);
    assert_eq!(parse_raw("-3"), -3);
}

proptest! {
    #[test]
    fn prop_ipqc_edits_conserve_source(
        start in (0u64..10_000, 0u64..10_000, 0u64..10_000),
        edits in prop::collection::vec(ipqc_edit(), 0..20)
    ) {
        let mut q = IpqcQuantities::from_parts(start.0, start.1, start.2);
        for edit in &edits {
            apply_ipqc(&mut q, edit);
            prop_assert!(q.is_conserved(), "not conserved after {:?}: {:?}", edit, q);
        }
    }

    #[test]
    fn prop_ipqc_form_after_is_kept(
        start in (0u64..10_000, 0u64..10_000, 0u64..10_000),
        v in raw(),
        auto_deduct in any::<bool>()
    ) {
        let mut q = IpqcQuantities::from_parts(start.0, start.1, start.2);
        q.set_after(v, auto_deduct);
        prop_assert_eq!(q.after, clamp(v));
        prop_assert_eq!(q.after_postcured, start.2);
        prop_assert!(q.is_conserved());
        if !auto_deduct {
            prop_assert_eq!(q.before, start.0);
        }
    }

    #[test]
    fn prop_ipqc_row_reallocation_keeps_source(
        start in (0u64..10_000, 0u64..10_000, 0u64..10_000),
        v in raw()
    ) {
        let mut q = IpqcQuantities::from_parts(start.0, start.1, start.2);
        let source = q.source;
        q.reallocate_after(v, true);
        prop_assert_eq!(q.source, source);
        prop_assert!(q.after <= source - q.after_postcured);
    }

    #[test]
    fn prop_set_after_is_idempotent(
        start in (0u64..10_000, 0u64..10_000, 0u64..10_000),
        v in raw(),
        auto_deduct in any::<bool>()
    ) {
        let mut ipqc = IpqcQuantities::from_parts(start.0, start.1, start.2);
        ipqc.set_after(v, auto_deduct);
        let once = ipqc;
        ipqc.set_after(v, auto_deduct);
        prop_assert_eq!(ipqc, once);

        let mut oqc = OqcQuantities::from_parts(start.0, start.1, start.2);
        oqc.set_after(v);
        let once = oqc;
        oqc.set_after(v);
        prop_assert_eq!(oqc, once);
    }

    #[test]
    fn prop_ipqc_postcure_moves_within_post_total(
        start in (0u64..10_000, 0u64..10_000, 0u64..10_000),
        v in raw()
    ) {
        let mut q = IpqcQuantities::from_parts(start.0, start.1, start.2);
        let before = q;
        q.set_after_postcured(v);
        prop_assert_eq!(q.before, before.before);
        prop_assert_eq!(q.source, before.source);
        prop_assert_eq!(q.post_total(), before.post_total());
    }

    #[test]
    fn prop_oqc_edits_partition_source(
        start in (0u64..10_000, 0u64..10_000, 0u64..10_000),
        edits in prop::collection::vec(oqc_edit(), 0..20)
    ) {
        let mut q = OqcQuantities::from_parts(start.0, start.1, start.2);
        for edit in &edits {
            apply_oqc(&mut q, edit);
            prop_assert_eq!(q.before + q.after + q.hold_return, q.source, "after {:?}", edit);
        }
    }

    #[test]
    fn prop_oqc_validated_matches_rule(s in raw(), a in raw(), h in raw()) {
        match OqcQuantities::validated(s, a, h) {
            Ok(q) => {
                prop_assert!(s >= 0 && a >= 0 && h >= 0);
                prop_assert!(a.checked_add(h).is_some_and(|sum| sum <= s));
                prop_assert_eq!(q.before + q.after + q.hold_return, s as u64);
            }
            Err(ValidationError::NegativeQuantity { value, .. }) => prop_assert!(value < 0),
            Err(ValidationError::ExceedsSource { allocated, source_qty }) => {
                prop_assert_eq!(source_qty, s);
                prop_assert!(allocated >= source_qty);
                prop_assert!(a.checked_add(h).is_none_or(|sum| sum > s));
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }
}
