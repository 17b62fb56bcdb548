//! Quick-entry forms for new IPQC and OQC records.

use crate::errors::ValidationError;
use crate::model::{EntryFilter, NewEntry, PreviousQty, Product, Role};
use crate::quantity::{IpqcQuantities, OqcQuantities};

use super::non_blank;

/// IPQC create form.
#[derive(Debug, Clone)]
pub struct IpqcQuickEntry {
    product: Option<Product>,
    pub note: String,
    pub auto_deduct: bool,
    quantities: IpqcQuantities,
}

impl Default for IpqcQuickEntry {
    fn default() -> Self {
        Self {
            product: None,
            note: String::new(),
            auto_deduct: true,
            quantities: IpqcQuantities::default(),
        }
    }
}

impl IpqcQuickEntry {
    pub fn new(auto_deduct: bool) -> Self {
        Self {
            auto_deduct,
            ..Self::default()
        }
    }

    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    pub fn quantities(&self) -> IpqcQuantities {
        self.quantities
    }

    /// Pick a product. Quantities from a previous pick are dropped.
    pub fn select_product(&mut self, product: Product) {
        self.product = Some(product);
        self.quantities = IpqcQuantities::default();
    }

    /// Prefill from the previous shift's carry-over for the selected product.
    pub fn load_previous(&mut self, previous: &PreviousQty) {
        self.quantities = if previous.found {
            IpqcQuantities::from_parts(
                previous.before_ipqc,
                previous.after_ipqc,
                previous.after_postcured,
            )
        } else {
            IpqcQuantities::default()
        };
    }

    pub fn set_before(&mut self, raw: i64) {
        self.quantities.set_before(raw);
    }

    pub fn set_after(&mut self, raw: i64) {
        self.quantities.set_after(raw, self.auto_deduct);
    }

    pub fn set_after_postcured(&mut self, raw: i64) {
        self.quantities.set_after_postcured(raw);
    }

    /// Mark everything entered as `before` as passed.
    pub fn all_pass(&mut self) {
        self.quantities.all_pass(self.auto_deduct);
    }

    /// Assemble the create payload. The OQC half is zero-filled and
    /// `onGoingPostcured` mirrors `afterIpqc`.
    pub fn payload(&self, filter: &EntryFilter, role: Option<Role>) -> Result<NewEntry, ValidationError> {
        let role = role.ok_or(ValidationError::MissingSession)?;
        let product = self.product.as_ref().ok_or(ValidationError::MissingProduct)?;
        let q = self.quantities;

        Ok(NewEntry {
            product_id: product.id.clone(),
            date: filter.date.clone(),
            shift: filter.shift,
            plant: filter.plant.clone(),
            line: filter.line.clone(),
            role,
            before_ipqc: q.before,
            after_ipqc: q.after,
            on_going_postcured: q.after,
            after_postcured: q.after_postcured,
            before_oqc: 0,
            after_oqc: 0,
            on_hold_or_return: 0,
            note: non_blank(&self.note),
        })
    }

    /// Clear everything except the auto-deduct preference.
    pub fn reset(&mut self) {
        *self = Self::new(self.auto_deduct);
    }
}

/// OQC create form.
#[derive(Debug, Clone, Default)]
pub struct OqcQuickEntry {
    product: Option<Product>,
    pub note: String,
    quantities: OqcQuantities,
    /// Raw values as typed; checked again at submit.
    raw: Option<(i64, i64, i64)>,
}

impl OqcQuickEntry {
    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    pub fn quantities(&self) -> OqcQuantities {
        self.quantities
    }

    pub fn select_product(&mut self, product: Product) {
        self.product = Some(product);
        self.quantities = OqcQuantities::default();
        self.raw = None;
    }

    /// Take source/passed/held literally, without reconciling. `payload`
    /// rejects them if they do not form a valid partition.
    pub fn seed(&mut self, source: i64, after: i64, hold_return: i64) {
        self.raw = Some((source, after, hold_return));
    }

    pub fn set_before(&mut self, raw: i64) {
        self.settle();
        self.quantities.set_before(raw);
    }

    pub fn set_after(&mut self, raw: i64) {
        self.settle();
        self.quantities.set_after(raw);
    }

    pub fn set_hold_return(&mut self, raw: i64) {
        self.settle();
        self.quantities.set_hold_return(raw);
    }

    pub fn all_pass(&mut self) {
        self.settle();
        self.quantities.all_pass();
    }

    /// Fold literal seed values into the reconciled state before an edit.
    fn settle(&mut self) {
        if let Some((source, after, hold)) = self.raw.take() {
            let mut q = OqcQuantities::default();
            q.set_before(source);
            q.set_after(after);
            q.set_hold_return(hold);
            self.quantities = q;
        }
    }

    fn checked(&self) -> Result<OqcQuantities, ValidationError> {
        match self.raw {
            Some((source, after, hold)) => OqcQuantities::validated(source, after, hold),
            None => {
                let q = self.quantities;
                OqcQuantities::validated(q.source as i64, q.after as i64, q.hold_return as i64)
            }
        }
    }

    /// Assemble the create payload with role OQC and the IPQC half zeroed.
    /// `beforeOqc` carries what is left of the source.
    pub fn payload(&self, filter: &EntryFilter, role: Option<Role>) -> Result<NewEntry, ValidationError> {
        role.ok_or(ValidationError::MissingSession)?;
        let product = self.product.as_ref().ok_or(ValidationError::MissingProduct)?;
        let q = self.checked()?;

        Ok(NewEntry {
            product_id: product.id.clone(),
            date: filter.date.clone(),
            shift: filter.shift,
            plant: filter.plant.clone(),
            line: filter.line.clone(),
            role: Role::Oqc,
            before_ipqc: 0,
            after_ipqc: 0,
            on_going_postcured: 0,
            after_postcured: 0,
            before_oqc: q.before,
            after_oqc: q.after,
            on_hold_or_return: q.hold_return,
            note: non_blank(&self.note),
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
