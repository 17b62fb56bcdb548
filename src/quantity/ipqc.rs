//! IPQC partition: units waiting for inspection, inspected and allocated to
//! curing, and units that finished postcure.

use serde::{Deserialize, Serialize};

use super::clamp;

/// Quantity state of one IPQC form or row.
///
/// `source` is the last established total. Two edit rules exist for `after`:
/// the create form deducts from `before` and lets the total follow
/// ([`set_after`](Self::set_after)), while row editing moves units within a
/// fixed source ([`reallocate_after`](Self::reallocate_after)).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpqcQuantities {
    pub before: u64,
    pub after: u64,
    pub after_postcured: u64,
    pub source: u64,
}

impl IpqcQuantities {
    /// Seed from persisted values. The source is their sum.
    pub fn from_parts(before: u64, after: u64, after_postcured: u64) -> Self {
        Self {
            before,
            after,
            after_postcured,
            source: before.saturating_add(after).saturating_add(after_postcured),
        }
    }

    /// Units already past inspection (`after + after_postcured`).
    pub fn post_total(&self) -> u64 {
        self.after.saturating_add(self.after_postcured)
    }

    pub fn total(&self) -> u64 {
        self.before.saturating_add(self.post_total())
    }

    /// Source units not yet allocated to curing.
    pub fn remaining(&self) -> u64 {
        self.source.saturating_sub(self.post_total())
    }

    /// Units allocated to curing that have not finished postcure.
    pub fn waiting_postcure(&self) -> u64 {
        self.after
    }

    /// Edit `before`. Grows or shrinks the total itself.
    pub fn set_before(&mut self, raw: i64) {
        self.before = clamp(raw);
        self.source = self.total();
    }

    /// Edit `after` on the create form. The value is always kept.
    ///
    /// With `auto_deduct`, the change in post-total comes out of `before`
    /// (floored at 0, so `after` may be entered without `before`). The total
    /// becomes the new source either way.
    pub fn set_after(&mut self, raw: i64, auto_deduct: bool) {
        let previous_post = self.post_total();
        self.after = clamp(raw);
        if auto_deduct {
            self.deduct_post_change(previous_post);
        }
        self.source = self.total();
    }

    /// Edit `after` on a persisted row.
    ///
    /// With `auto_deduct`, `after` is capped at what the source can supply
    /// and `before` takes the rest. Without it, `before` is left alone and
    /// the total becomes the new source.
    pub fn reallocate_after(&mut self, raw: i64, auto_deduct: bool) {
        let v = clamp(raw);
        if auto_deduct {
            let cap = self.source.saturating_sub(self.after_postcured);
            self.after = v.min(cap);
            self.before = self.source.saturating_sub(self.post_total());
        } else {
            self.after = v;
            self.source = self.total();
        }
    }

    /// Edit `after_postcured`. Units move between `after` and
    /// `after_postcured`; `before` and the source are not touched.
    pub fn set_after_postcured(&mut self, raw: i64) {
        let post_total = self.post_total();
        let v = clamp(raw).min(post_total);
        self.after_postcured = v;
        self.after = post_total - v;
    }

    /// Pass everything waiting: `after` takes the current `before` and
    /// `after_postcured` is cleared, deducting like [`set_after`](Self::set_after).
    pub fn all_pass(&mut self, auto_deduct: bool) {
        let previous_post = self.post_total();
        self.after = self.before;
        self.after_postcured = 0;
        if auto_deduct {
            self.deduct_post_change(previous_post);
        }
        self.source = self.total();
    }

    fn deduct_post_change(&mut self, previous_post: u64) {
        let post = self.post_total();
        self.before = if post >= previous_post {
            self.before.saturating_sub(post - previous_post)
        } else {
            self.before.saturating_add(previous_post - post)
        };
    }

    /// Whether the partition matches the tracked source.
    pub fn is_conserved(&self) -> bool {
        self.total() == self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_source(source: i64) -> IpqcQuantities {
        let mut q = IpqcQuantities::default();
        q.set_before(source);
        q
    }

    #[test]
    fn set_before_establishes_source() {
        let q = with_source(100);
        assert_eq!(q.before, 100);
        assert_eq!(q.source, 100);
    }

    #[test]
    fn set_before_adds_to_existing_post_total() {
        let mut q = IpqcQuantities::from_parts(0, 20, 5);
        q.set_before(10);
        assert_eq!(q.source, 35);
        assert!(q.is_conserved());
    }

    #[test]
    fn after_then_postcured_moves_units_within_source() {
        let mut q = with_source(100);
        q.set_after(30, true);
        assert_eq!((q.before, q.after, q.after_postcured), (70, 30, 0));

        q.set_after_postcured(20);
        assert_eq!((q.before, q.after, q.after_postcured), (70, 10, 20));
        assert_eq!(q.source, 100);
    }

    #[test]
    fn reallocate_after_is_capped_by_source() {
        let mut q = with_source(50);
        q.reallocate_after(80, true);
        assert_eq!(q.after, 50);
        assert_eq!(q.before, 0);
        assert!(q.is_conserved());
    }

    #[test]
    fn lowering_after_returns_units_to_before() {
        let mut q = with_source(40);
        q.set_after(25, true);
        q.set_after(10, true);
        assert_eq!(q.before, 30);
        assert!(q.is_conserved());
    }

    #[test]
    fn set_after_without_auto_deduct_grows_total() {
        let mut q = with_source(40);
        q.set_after(25, false);
        assert_eq!(q.before, 40);
        assert_eq!(q.after, 25);
        assert_eq!(q.source, 65);
    }

    #[test]
    fn after_can_be_entered_without_before() {
        let mut q = IpqcQuantities::default();
        q.set_after(30, true);
        assert_eq!((q.before, q.after, q.after_postcured), (0, 30, 0));
        assert_eq!(q.source, 30);
    }

    #[test]
    fn set_after_deducts_from_before_and_floors() {
        let mut q = with_source(20);
        q.set_after(50, true);
        assert_eq!((q.before, q.after), (0, 50));
        assert_eq!(q.source, 50);
        assert!(q.is_conserved());
    }

    #[test]
    fn all_pass_moves_before_into_after() {
        let mut q = with_source(100);
        q.all_pass(true);
        assert_eq!((q.before, q.after, q.after_postcured), (0, 100, 0));
        assert_eq!(q.source, 100);
    }

    #[test]
    fn all_pass_clears_postcured_and_deducts_difference() {
        let mut q = with_source(70);
        q.set_after(30, false);
        q.set_after_postcured(10);
        q.all_pass(true);
        // post-total goes from 30 to 70, so 40 leaves `before`.
        assert_eq!((q.before, q.after, q.after_postcured), (30, 70, 0));
        assert!(q.is_conserved());
    }

    #[test]
    fn all_pass_without_auto_deduct_keeps_before() {
        let mut q = with_source(40);
        q.all_pass(false);
        assert_eq!((q.before, q.after), (40, 40));
        assert_eq!(q.source, 80);
    }

    #[test]
    fn huge_input_saturates_instead_of_overflowing() {
        let mut q = IpqcQuantities::from_parts(u64::MAX, 5, 5);
        assert_eq!(q.source, u64::MAX);
        q.set_before(i64::MAX);
        q.set_after(i64::MAX, false);
        q.set_after_postcured(i64::MAX);
        assert_eq!(q.total(), q.source);
    }

    #[test]
    fn postcured_cannot_exceed_post_total() {
        let mut q = with_source(100);
        q.set_after(30, true);
        q.set_after_postcured(45);
        assert_eq!(q.after_postcured, 30);
        assert_eq!(q.after, 0);
        assert_eq!(q.before, 70);
    }

    #[test]
    fn lowering_postcured_returns_units_to_after() {
        let mut q = IpqcQuantities::from_parts(10, 0, 20);
        q.set_after_postcured(5);
        assert_eq!((q.before, q.after, q.after_postcured), (10, 15, 5));
    }

    #[test]
    fn negative_input_is_floored() {
        let mut q = with_source(-5);
        assert_eq!(q.before, 0);
        q.set_after(-1, true);
        q.set_after_postcured(-9);
        assert_eq!(q, IpqcQuantities::default());
    }

    #[test]
    fn remaining_and_waiting_hints() {
        let mut q = with_source(100);
        q.set_after(30, true);
        q.set_after_postcured(12);
        assert_eq!(q.remaining(), 70);
        assert_eq!(q.waiting_postcure(), 18);
    }
}
