//! Inline editing of persisted entries.
//!
//! An editor is built from the record as loaded; the source is rebuilt from
//! the stored counters, so a fresh editor always reconciles against what the
//! server holds.

use serde::Serialize;

use crate::model::DailyEntry;
use crate::quantity::{IpqcQuantities, OqcQuantities};

/// Editable IPQC fields sent on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpqcPatch {
    pub before_ipqc: u64,
    pub after_ipqc: u64,
    pub on_going_postcured: u64,
    pub after_postcured: u64,
    pub note: String,
}

impl IpqcPatch {
    /// Merge into a local copy, as the optimistic list does before the request.
    pub fn apply_to(&self, entry: &mut DailyEntry) {
        entry.before_ipqc = self.before_ipqc;
        entry.after_ipqc = self.after_ipqc;
        entry.on_going_postcured = self.on_going_postcured;
        entry.after_postcured = self.after_postcured;
        entry.note = Some(self.note.clone());
    }
}

/// Editable OQC fields sent on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OqcPatch {
    pub before_oqc: u64,
    pub after_oqc: u64,
    pub on_hold_or_return: u64,
    pub note: String,
}

impl OqcPatch {
    pub fn apply_to(&self, entry: &mut DailyEntry) {
        entry.before_oqc = self.before_oqc;
        entry.after_oqc = self.after_oqc;
        entry.on_hold_or_return = self.on_hold_or_return;
        entry.note = Some(self.note.clone());
    }
}

#[derive(Debug, Clone)]
pub struct IpqcRowEditor {
    original: DailyEntry,
    quantities: IpqcQuantities,
    pub note: String,
    pub auto_deduct: bool,
}

impl IpqcRowEditor {
    pub fn new(entry: &DailyEntry) -> Self {
        Self {
            quantities: IpqcQuantities::from_parts(
                entry.before_ipqc,
                entry.after_ipqc,
                entry.after_postcured,
            ),
            note: entry.note_or_empty().to_string(),
            original: entry.clone(),
            auto_deduct: true,
        }
    }

    pub fn entry_id(&self) -> &str {
        &self.original.id
    }

    pub fn quantities(&self) -> IpqcQuantities {
        self.quantities
    }

    pub fn set_before(&mut self, raw: i64) {
        self.quantities.set_before(raw);
    }

    pub fn set_after(&mut self, raw: i64) {
        self.quantities.reallocate_after(raw, self.auto_deduct);
    }

    pub fn set_after_postcured(&mut self, raw: i64) {
        self.quantities.set_after_postcured(raw);
    }

    pub fn is_dirty(&self) -> bool {
        let q = self.quantities;
        q.before != self.original.before_ipqc
            || q.after != self.original.after_ipqc
            || q.after_postcured != self.original.after_postcured
            || self.note != self.original.note_or_empty()
    }

    /// `None` when nothing changed, so there is nothing to save.
    pub fn patch(&self) -> Option<IpqcPatch> {
        if !self.is_dirty() {
            return None;
        }
        let q = self.quantities;
        Some(IpqcPatch {
            before_ipqc: q.before,
            after_ipqc: q.after,
            on_going_postcured: q.after,
            after_postcured: q.after_postcured,
            note: self.note.clone(),
        })
    }

    /// Discard edits and go back to the loaded record.
    pub fn revert(&mut self) {
        *self = Self {
            auto_deduct: self.auto_deduct,
            ..Self::new(&self.original)
        };
    }
}

#[derive(Debug, Clone)]
pub struct OqcRowEditor {
    original: DailyEntry,
    quantities: OqcQuantities,
    pub note: String,
}

impl OqcRowEditor {
    pub fn new(entry: &DailyEntry) -> Self {
        Self {
            quantities: OqcQuantities::from_parts(
                entry.before_oqc,
                entry.after_oqc,
                entry.on_hold_or_return,
            ),
            note: entry.note_or_empty().to_string(),
            original: entry.clone(),
        }
    }

    pub fn entry_id(&self) -> &str {
        &self.original.id
    }

    pub fn quantities(&self) -> OqcQuantities {
        self.quantities
    }

    pub fn set_before(&mut self, raw: i64) {
        self.quantities.set_before(raw);
    }

    pub fn set_after(&mut self, raw: i64) {
        self.quantities.set_after(raw);
    }

    pub fn set_hold_return(&mut self, raw: i64) {
        self.quantities.set_hold_return(raw);
    }

    pub fn is_dirty(&self) -> bool {
        let q = self.quantities;
        q.before != self.original.before_oqc
            || q.after != self.original.after_oqc
            || q.hold_return != self.original.on_hold_or_return
            || self.note != self.original.note_or_empty()
    }

    pub fn patch(&self) -> Option<OqcPatch> {
        if !self.is_dirty() {
            return None;
        }
        let q = self.quantities;
        Some(OqcPatch {
            before_oqc: q.before,
            after_oqc: q.after,
            on_hold_or_return: q.hold_return,
            note: self.note.clone(),
        })
    }

    pub fn revert(&mut self) {
        *self = Self::new(&self.original);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Shift;

    fn entry() -> DailyEntry {
        serde_json::from_value(serde_json::json!({
            "id": "e1",
            "productId": "p1",
            "date": "2025-05-01",
            "shift": "S1",
            "beforeIpqc": 60,
            "afterIpqc": 30,
            "onGoingPostcured": 30,
            "afterPostcured": 10,
            "beforeOqc": 5,
            "afterOqc": 40,
            "onHoldOrReturn": 5,
            "note": "ok"
        }))
        .unwrap()
    }

    #[test]
    fn ipqc_editor_rebuilds_source_from_record() {
        let editor = IpqcRowEditor::new(&entry());
        assert_eq!(editor.quantities().source, 100);
        assert!(!editor.is_dirty());
        assert!(editor.patch().is_none());
    }

    #[test]
    fn ipqc_edit_produces_patch_with_ongoing_mirror() {
        let mut editor = IpqcRowEditor::new(&entry());
        editor.set_after(50);
        let patch = editor.patch().unwrap();
        assert_eq!(patch.before_ipqc, 40);
        assert_eq!(patch.after_ipqc, 50);
        assert_eq!(patch.on_going_postcured, 50);
        assert_eq!(patch.after_postcured, 10);
        assert_eq!(patch.note, "ok");

        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body["onGoingPostcured"], 50);
        assert!(body.get("beforeOqc").is_none());
    }

    #[test]
    fn ipqc_row_after_stays_within_loaded_total() {
        let mut editor = IpqcRowEditor::new(&entry());
        editor.set_after(150);
        let q = editor.quantities();
        assert_eq!((q.before, q.after, q.after_postcured), (0, 90, 10));
        assert_eq!(q.source, 100);
    }

    #[test]
    fn note_change_alone_is_dirty() {
        let mut editor = OqcRowEditor::new(&entry());
        editor.note = "recheck".into();
        assert!(editor.is_dirty());
        assert_eq!(editor.patch().unwrap().note, "recheck");
    }

    #[test]
    fn edit_back_to_original_is_clean() {
        let mut editor = OqcRowEditor::new(&entry());
        editor.set_after(20);
        assert!(editor.is_dirty());
        editor.set_after(40);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn oqc_editor_conserves_loaded_total() {
        let mut editor = OqcRowEditor::new(&entry());
        assert_eq!(editor.quantities().source, 50);
        editor.set_hold_return(30);
        let q = editor.quantities();
        assert_eq!(q.hold_return, 10);
        assert_eq!(q.before, 0);
    }

    #[test]
    fn revert_discards_edits() {
        let mut editor = IpqcRowEditor::new(&entry());
        editor.auto_deduct = false;
        editor.set_before(5);
        editor.revert();
        assert!(!editor.is_dirty());
        assert!(!editor.auto_deduct);
    }

    #[test]
    fn patch_apply_updates_local_copy() {
        let mut local = entry();
        let mut editor = OqcRowEditor::new(&local);
        editor.set_after(10);
        editor.patch().unwrap().apply_to(&mut local);
        assert_eq!(local.after_oqc, 10);
        assert_eq!(local.before_oqc, 35);
        assert_eq!(local.shift, Shift::S1);
    }
}
