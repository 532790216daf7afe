use chrono::Months;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::Money;
use crate::errors::{PaymentError, Result};
use crate::types::{PaymentHistoryItem, PaymentId, PaymentStatus, StatusFilter};

use super::PaymentPatch;

/// outcome of settling an upcoming payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub settled: PaymentHistoryItem,
    /// next monthly occurrence of a recurring payment
    pub next: Option<PaymentHistoryItem>,
}

/// in-memory payment history in submission order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentHistory {
    items: Vec<PaymentHistoryItem>,
}

impl PaymentHistory {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// append an item; ids must be unique
    pub fn add(&mut self, item: PaymentHistoryItem) -> Result<()> {
        if self.get(item.id).is_some() {
            return Err(PaymentError::DuplicatePayment { id: item.id });
        }
        self.items.push(item);
        Ok(())
    }

    pub fn get(&self, id: PaymentId) -> Option<&PaymentHistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// items matching the filter, in submission order
    pub fn filter(&self, filter: StatusFilter) -> Vec<&PaymentHistoryItem> {
        self.items
            .iter()
            .filter(|item| filter.matches(item.status))
            .collect()
    }

    /// apply a patch to an upcoming payment
    ///
    /// Unknown ids and completed payments are left alone; the return value
    /// only tells the caller whether anything changed.
    pub fn edit(&mut self, id: PaymentId, patch: &PaymentPatch) -> bool {
        let Some(item) = self.upcoming_mut(id) else {
            debug!(%id, "edit ignored, no upcoming payment with this id");
            return false;
        };

        if let Some(purpose_name) = &patch.purpose_name {
            item.purpose_name = purpose_name.clone();
        }
        if let Some(amount) = patch.amount {
            // validated amounts always fit; an overflowing one keeps the old value
            if let Some(minor) = amount.to_minor().filter(|m| *m > 0) {
                item.amount_minor = minor;
                item.formatted_amount = amount.formatted();
            }
        }
        if let Some(at) = patch.scheduled_at {
            item.scheduled_at = at;
        }
        true
    }

    /// remove an upcoming payment, returning it
    pub fn cancel(&mut self, id: PaymentId) -> Option<PaymentHistoryItem> {
        let Some(index) = self
            .items
            .iter()
            .position(|item| item.id == id && item.is_upcoming())
        else {
            debug!(%id, "cancel ignored, no upcoming payment with this id");
            return None;
        };
        Some(self.items.remove(index))
    }

    /// mark an upcoming payment completed
    ///
    /// Recurring payments roll over: the same payment is scheduled again one
    /// month later under `next_id`, clamped to the end of shorter months.
    pub fn settle(&mut self, id: PaymentId, next_id: PaymentId) -> Option<Settlement> {
        let item = self.upcoming_mut(id)?;
        item.status = PaymentStatus::Completed;
        let settled = item.clone();

        let next = match settled.scheduled_at.checked_add_months(Months::new(1)) {
            Some(scheduled_at) if settled.is_recurring => {
                let next = PaymentHistoryItem {
                    id: next_id,
                    scheduled_at,
                    status: PaymentStatus::Upcoming,
                    ..settled.clone()
                };
                match self.add(next.clone()) {
                    Ok(()) => Some(next),
                    Err(err) => {
                        debug!(%id, error = %err, "next occurrence not scheduled");
                        None
                    }
                }
            }
            _ => None,
        };

        Some(Settlement { settled, next })
    }

    /// total still due across upcoming payments
    pub fn upcoming_total(&self) -> Money {
        self.items
            .iter()
            .filter(|item| item.is_upcoming())
            .map(|item| item.amount())
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaymentHistoryItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn upcoming_mut(&mut self, id: PaymentId) -> Option<&mut PaymentHistoryItem> {
        self.items
            .iter_mut()
            .find(|item| item.id == id && item.is_upcoming())
    }
}
