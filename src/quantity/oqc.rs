//! OQC partition: units waiting for outgoing inspection, passed, and held
//! or returned.

use serde::{Deserialize, Serialize};

use super::clamp;
use crate::errors::ValidationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OqcQuantities {
    pub before: u64,
    pub after: u64,
    pub hold_return: u64,
    pub source: u64,
}

impl OqcQuantities {
    /// Seed from persisted values. The source is their sum.
    pub fn from_parts(before: u64, after: u64, hold_return: u64) -> Self {
        Self {
            before,
            after,
            hold_return,
            source: before.saturating_add(after).saturating_add(hold_return),
        }
    }

    /// Build from literal user input, checking it the way a create request is
    /// checked: nothing negative, and passed + held within the source.
    pub fn validated(source: i64, after: i64, hold_return: i64) -> Result<Self, ValidationError> {
        for (field, value) in [
            ("beforeOqc", source),
            ("afterOqc", after),
            ("onHoldOrReturn", hold_return),
        ] {
            if value < 0 {
                return Err(ValidationError::NegativeQuantity { field, value });
            }
        }
        let allocated = match after.checked_add(hold_return) {
            Some(allocated) if allocated <= source => allocated,
            sum => {
                return Err(ValidationError::ExceedsSource {
                    allocated: sum.unwrap_or(i64::MAX),
                    source_qty: source,
                });
            }
        };
        let (source, after, hold_return) = (source as u64, after as u64, hold_return as u64);
        Ok(Self {
            before: source - allocated as u64,
            after,
            hold_return,
            source,
        })
    }

    pub fn allocated(&self) -> u64 {
        self.after.saturating_add(self.hold_return)
    }

    /// Source units not yet passed or held.
    pub fn remaining(&self) -> u64 {
        self.source.saturating_sub(self.allocated())
    }

    /// Edit the source. Existing allocations shrink to fit.
    pub fn set_before(&mut self, raw: i64) {
        self.source = clamp(raw);
        self.after = self.after.min(self.source.saturating_sub(self.hold_return));
        self.hold_return = self.hold_return.min(self.source.saturating_sub(self.after));
        self.recompute();
    }

    pub fn set_after(&mut self, raw: i64) {
        self.after = clamp(raw).min(self.source.saturating_sub(self.hold_return));
        self.recompute();
    }

    pub fn set_hold_return(&mut self, raw: i64) {
        self.hold_return = clamp(raw).min(self.source.saturating_sub(self.after));
        self.recompute();
    }

    /// Mark the whole source as passed.
    pub fn all_pass(&mut self) {
        self.after = self.source;
        self.hold_return = 0;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.before = self.remaining();
    }
}
